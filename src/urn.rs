//! CTS URN traditions and already-embedded identifier handling.

use std::sync::LazyLock;

use regex::Regex;

/// Embedded work codes, tried in order. A colon locant directly after the
/// code is captured whole, at any depth.
#[allow(clippy::expect_used, reason = "hardcoded patterns are valid")]
static EMBEDDED_CODES: LazyLock<[(Tradition, Regex); 3]> = LazyLock::new(|| {
    let pattern = |prefix: &str| {
        return Regex::new(&format!(
            r"(?P<code>{prefix}\d+\.{prefix}\d+)(?::(?P<locant>\d+(?:ff|[a-z])?(?:\.\d+(?:ff|[a-z])?)*))?"
        ))
        .expect("embedded code pattern");
    };
    return [
        (Tradition::Greek, pattern("tlg")),
        (Tradition::Latin, pattern("phi")),
        (Tradition::Latin, pattern("stoa")),
    ];
});

/// Trailing locant text after an embedded code without a colon locant.
#[allow(clippy::expect_used, reason = "hardcoded pattern is valid")]
static TRAILING_LOCANT: LazyLock<Regex> =
    LazyLock::new(|| return Regex::new(r"\d+.*").expect("trailing locant pattern"));

/// An author/work code found verbatim inside a reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedCode {
    /// `author.work` code, e.g. `tlg0012.tlg001`.
    pub code: String,
    /// Locant written with a colon directly after the code, verbatim.
    pub locant: Option<String>,
    /// Byte offset just past the whole match in the searched text.
    pub match_end: usize,
    /// Tradition implied by the code prefix.
    pub tradition: Tradition,
}

/// Literary tradition of an author, read off the namespace marker in a URN stem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tradition {
    /// `englishLit`
    English,
    /// `greekLit`, and the fallback for unmarked stems.
    Greek,
    /// `greekSchol`
    GreekScholia,
    /// `latinLit`
    Latin,
}

impl Tradition {
    /// Default edition suffix appended after the work code.
    pub const fn edition_suffix(self) -> &'static str {
        return match self {
            Self::English => "perseus-eng2",
            Self::Greek | Self::GreekScholia => "perseus-grc2",
            Self::Latin => "perseus-lat2",
        };
    }

    /// Work code assumed when nothing better is known.
    pub const fn first_work_code(self) -> &'static str {
        return match self {
            Self::English | Self::Greek | Self::GreekScholia => "tlg001",
            Self::Latin => "phi001",
        };
    }

    /// `urn:cts:<namespace>` prefix for codes of this tradition.
    pub const fn namespace(self) -> &'static str {
        return match self {
            Self::English => "urn:cts:englishLit",
            Self::Greek => "urn:cts:greekLit",
            Self::GreekScholia => "urn:cts:greekSchol",
            Self::Latin => "urn:cts:latinLit",
        };
    }

    /// Letter prefix for synthesizing a work code from a bare number.
    /// Only the Greek and Latin canons number their works this way.
    pub const fn numeric_prefix(self) -> Option<&'static str> {
        return match self {
            Self::English | Self::GreekScholia => None,
            Self::Greek => Some("tlg"),
            Self::Latin => Some("phi"),
        };
    }

    /// Tradition named by the namespace marker inside `stem`; Greek if none.
    pub fn of_stem(stem: &str) -> Self {
        if stem.contains("greekLit") {
            return Self::Greek;
        }
        if stem.contains("latinLit") {
            return Self::Latin;
        }
        if stem.contains("englishLit") {
            return Self::English;
        }
        if stem.contains("greekSchol") {
            return Self::GreekScholia;
        }
        return Self::Greek;
    }
}

/// Find the first embedded work code in `text`, trying Greek, Latin, then
/// Stoa codes.
pub fn detect(text: &str) -> Option<EmbeddedCode> {
    return EMBEDDED_CODES.iter().find_map(|(tradition, pattern)| {
        let captures = pattern.captures(text)?;
        let whole = captures.get(0)?;
        let code = captures.name("code")?;
        return Some(EmbeddedCode {
            code: code.as_str().to_string(),
            locant: captures.name("locant").map(|m| return m.as_str().to_string()),
            match_end: whole.end(),
            tradition: *tradition,
        });
    });
}

/// Rewrite a reference holding an embedded code into a full URN with the
/// tradition's namespace and edition suffix. The locant is the colon locant
/// if present, else the first numeric run after the code.
pub fn format_embedded(reference: &str) -> Option<String> {
    let embedded = detect(reference)?;

    let locant = embedded.locant.or_else(|| {
        let remaining = reference.get(embedded.match_end..)?;
        return TRAILING_LOCANT.find(remaining).map(|m| return m.as_str().to_string());
    });

    let base = format!(
        "{}:{}.{}",
        embedded.tradition.namespace(),
        embedded.code,
        embedded.tradition.edition_suffix()
    );
    return Some(match locant {
        Some(locant) if !locant.is_empty() => format!("{base}:{locant}"),
        _ => base,
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "test assertions")]
mod tests {
    use super::*;

    #[test]
    fn bare_greek_code_gains_namespace_and_suffix() {
        assert_eq!(
            format_embedded("tlg0012.tlg001 1.5").as_deref(),
            Some("urn:cts:greekLit:tlg0012.tlg001.perseus-grc2:1.5")
        );
    }

    #[test]
    fn full_latin_urn_keeps_colon_locant() {
        assert_eq!(
            format_embedded("urn:cts:latinLit:phi0690.phi003:1.1").as_deref(),
            Some("urn:cts:latinLit:phi0690.phi003.perseus-lat2:1.1")
        );
    }

    #[test]
    fn locant_with_following_pages_survives() {
        assert_eq!(
            format_embedded("phi0474.phi055:2.14ff").as_deref(),
            Some("urn:cts:latinLit:phi0474.phi055.perseus-lat2:2.14ff")
        );
    }

    #[test]
    fn deep_colon_locant_is_kept_whole() {
        assert_eq!(
            format_embedded("tlg0012.tlg001:1.5.3").as_deref(),
            Some("urn:cts:greekLit:tlg0012.tlg001.perseus-grc2:1.5.3")
        );
        assert_eq!(detect("phi0690.phi003:2.10.4b").unwrap().locant.as_deref(), Some("2.10.4b"));
    }

    #[test]
    fn code_without_locant() {
        assert_eq!(
            format_embedded("see tlg0011.tlg004").as_deref(),
            Some("urn:cts:greekLit:tlg0011.tlg004.perseus-grc2")
        );
    }

    #[test]
    fn stoa_codes_are_latin() {
        let embedded = detect("stoa0045.stoa001 3").unwrap();
        assert_eq!(embedded.tradition, Tradition::Latin);
        assert_eq!(embedded.code, "stoa0045.stoa001");
    }

    #[test]
    fn plain_references_have_no_code() {
        assert_eq!(detect("soph. ot 151"), None);
        assert_eq!(detect("tlg0012"), None);
    }

    #[test]
    fn tradition_from_stem() {
        assert_eq!(Tradition::of_stem("urn:cts:latinLit:phi0978"), Tradition::Latin);
        assert_eq!(Tradition::of_stem("urn:cts:englishLit:shak"), Tradition::English);
        assert_eq!(Tradition::of_stem("urn:cts:greekSchol:x"), Tradition::GreekScholia);
        assert_eq!(Tradition::of_stem("urn:cts:unknown:x"), Tradition::Greek);
        assert_eq!(Tradition::English.edition_suffix(), "perseus-eng2");
        assert_eq!(Tradition::Latin.first_work_code(), "phi001");
    }
}
