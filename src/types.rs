/// Core domain types for citations, authors, and work identifiers.
use serde::{Deserialize, Serialize};

/// Canonical author record: the URN stem and whether the author's corpus is
/// addressed as one default work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorRecord {
    /// Citations name only a location, never a work title.
    pub single_work: bool,
    /// Author URN stem, e.g. `urn:cts:greekLit:tlg0011`.
    pub stem: String,
}

/// Value side of an author abbreviation table.
/// Decoded once from the raw JSON string; `_which_*` strings become markers.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum AuthorMapping {
    /// The abbreviation names exactly one canonical author key.
    Direct(String),
    /// The author identity depends on the cited work.
    NeedsWorkContext(Disambiguation),
}

impl TryFrom<String> for AuthorMapping {
    type Error = String;

    /// Markers start with `_which_`; anything else is a canonical key.
    fn try_from(raw: String) -> Result<Self, Self::Error> {
        if !raw.starts_with("_which_") {
            return Ok(Self::Direct(raw));
        }
        return Disambiguation::from_marker(&raw)
            .map(Self::NeedsWorkContext)
            .ok_or_else(|| return format!("unknown disambiguation marker `{raw}`"));
    }
}

/// One output record per extracted citation, serialized as a JSONL line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    /// Inline text of the `<bibl>` element.
    pub bibl: String,
    /// Sequential citation tag, e.g. `:citations-1.12`.
    pub doc_cit_urn: String,
    /// Document the citation was extracted from.
    pub filename: String,
    /// Literal `n` attribute of the `<bibl>` element.
    pub n_attrib: String,
    /// Quoted passage accompanying the citation, if any.
    pub quote: String,
    /// Why resolution failed. Absent on resolved records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Reference string chosen from `n_attrib` and `bibl`.
    #[serde(rename = "ref")]
    pub reference: String,
    /// Resolved CTS URN, empty when unresolved.
    pub urn: String,
    /// Surrounding markup with whitespace collapsed.
    pub xml_context: String,
}

impl Citation {
    /// A record counts as resolved only when both the reference and the URN are set.
    pub fn is_resolved(&self) -> bool {
        return !self.reference.is_empty() && !self.urn.is_empty();
    }
}

/// Homonymous authors whose identity is chosen by the cited work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Disambiguation {
    /// Pliny the Elder (naturalist) or Pliny the Younger (letters).
    Pliny,
    /// Seneca the Elder (rhetoric) or Seneca the Younger (tragedies, philosophy).
    Seneca,
}

impl Disambiguation {
    /// Candidate identities in the order their work tables are consulted.
    pub const fn candidates(self) -> &'static [&'static str] {
        return match self {
            Self::Pliny => &["pliny_senior", "pliny_junior"],
            Self::Seneca => &["seneca_senior", "seneca_junior"],
        };
    }

    /// Identity chosen when no candidate recognizes the work.
    pub const fn default_identity(self) -> &'static str {
        return match self {
            Self::Pliny => "pliny_senior",
            Self::Seneca => "seneca_junior",
        };
    }

    /// Parse a reference-data marker string.
    pub fn from_marker(marker: &str) -> Option<Self> {
        return match marker {
            "_which_pliny" => Some(Self::Pliny),
            "_which_seneca" => Some(Self::Seneca),
            _ => None,
        };
    }
}

/// A reference split into author, work, and passage tokens. Any may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedReference {
    /// Leading author abbreviation or canonical name, e.g. `soph.`.
    pub author: String,
    /// Location within the work, dot-separated, e.g. `1.151`.
    pub passage: String,
    /// Work title or abbreviation, underscore-joined when multi-word.
    pub work: String,
}

/// JSON shape of a work identifier before validation.
#[derive(Deserialize)]
#[serde(untagged)]
pub enum RawWorkIdentifier {
    /// `["tlg", 1, 61]`
    Range(String, u32, u32),
    /// `"tlg004"`
    Simple(String),
}

/// How a title entered a work table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleOrigin {
    /// Produced by the abbreviation generator from a literal title.
    Generated,
    /// Present verbatim in the reference data.
    Literal,
}

/// A work table value together with how its title was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkEntry {
    /// Work code or code family.
    pub identifier: WorkIdentifier,
    /// Literal entries outrank generated ones.
    pub origin: TitleOrigin,
}

/// Work code for one title: a single code, or a numbered family such as the
/// orations of Demosthenes (`tlg001` through `tlg061`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawWorkIdentifier")]
pub enum WorkIdentifier {
    /// `prefix + zero-padded(n)` for `n` in `start..=end`.
    Range {
        /// Last valid number, inclusive.
        end: u32,
        /// Code prefix, usually `tlg` or `phi`.
        prefix: String,
        /// First valid number, inclusive.
        start: u32,
    },
    /// A single alphanumeric work code.
    Simple(String),
}

impl WorkIdentifier {
    /// Format the code for `number` if it falls within this family.
    /// A `Simple` identifier ignores the number.
    pub fn code_for_number(&self, number: u32) -> Option<String> {
        return match self {
            Self::Range { end, prefix, start } => {
                (*start..=*end).contains(&number).then(|| return format!("{prefix}{number:03}"))
            },
            Self::Simple(code) => Some(code.clone()),
        };
    }

    /// Resolve against a work token: `Simple` returns its code; `Range` takes
    /// the first number in `work` and checks it against the bounds.
    pub fn code_for_work(&self, work: &str) -> Option<String> {
        return match self {
            Self::Range { .. } => first_number(work).and_then(|n| return self.code_for_number(n)),
            Self::Simple(code) => Some(code.clone()),
        };
    }

    /// The single code, if this is not a range.
    pub fn simple_code(&self) -> Option<&str> {
        return match self {
            Self::Range { .. } => None,
            Self::Simple(code) => Some(code),
        };
    }
}

impl TryFrom<RawWorkIdentifier> for WorkIdentifier {
    type Error = String;

    /// Reject ranges whose start exceeds their end.
    fn try_from(raw: RawWorkIdentifier) -> Result<Self, Self::Error> {
        return match raw {
            RawWorkIdentifier::Range(prefix, start, end) if start > end => {
                Err(format!("range `{prefix}` starts at {start} after its end {end}"))
            },
            RawWorkIdentifier::Range(prefix, start, end) => Ok(Self::Range { end, prefix, start }),
            RawWorkIdentifier::Simple(code) => Ok(Self::Simple(code)),
        };
    }
}

/// First run of ASCII digits in `text`, parsed as a number.
pub fn first_number(text: &str) -> Option<u32> {
    let start = text.find(|c: char| return c.is_ascii_digit())?;
    let digits: String = text
        .get(start..)?
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    return digits.parse().ok();
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "test assertions")]
mod tests {
    use super::*;

    #[test]
    fn range_formats_zero_padded_code() {
        let range = WorkIdentifier::Range { end: 61, prefix: "tlg".to_string(), start: 1 };
        assert_eq!(range.code_for_work("or. 15"), Some("tlg015".to_string()));
    }

    #[test]
    fn range_rejects_out_of_bounds_number() {
        let range = WorkIdentifier::Range { end: 61, prefix: "tlg".to_string(), start: 1 };
        assert_eq!(range.code_for_work("or. 75"), None);
        assert_eq!(range.code_for_work("or."), None);
    }

    #[test]
    fn simple_ignores_numbers() {
        let simple = WorkIdentifier::Simple("tlg004".to_string());
        assert_eq!(simple.code_for_work("ot 3"), Some("tlg004".to_string()));
    }

    #[test]
    fn decodes_string_and_range_forms() {
        let simple: WorkIdentifier = serde_json::from_str(r#""tlg004""#).unwrap();
        assert_eq!(simple, WorkIdentifier::Simple("tlg004".to_string()));

        let range: WorkIdentifier = serde_json::from_str(r#"["tlg", 1, 61]"#).unwrap();
        assert_eq!(range, WorkIdentifier::Range { end: 61, prefix: "tlg".to_string(), start: 1 });
    }

    #[test]
    fn rejects_inverted_range() {
        let result: Result<WorkIdentifier, _> = serde_json::from_str(r#"["tlg", 9, 2]"#);
        assert!(result.is_err());
    }

    #[test]
    fn decodes_disambiguation_markers() {
        let mapping: AuthorMapping = serde_json::from_str(r#""_which_pliny""#).unwrap();
        assert_eq!(mapping, AuthorMapping::NeedsWorkContext(Disambiguation::Pliny));

        let direct: AuthorMapping = serde_json::from_str(r#""sophocles""#).unwrap();
        assert_eq!(direct, AuthorMapping::Direct("sophocles".to_string()));

        let unknown: Result<AuthorMapping, _> = serde_json::from_str(r#""_which_cato""#);
        assert!(unknown.is_err());
    }

    #[test]
    fn first_number_finds_leading_digits() {
        assert_eq!(first_number("or. 15.3"), Some(15));
        assert_eq!(first_number("nubes"), None);
    }
}
