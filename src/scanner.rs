//! Citation extraction from TEI-style XML commentaries.
//!
//! Extraction is regex-based and line-oriented for bare `<bibl>` elements,
//! matching how commentaries are typeset in practice; `<cit>` groups may span
//! lines. Nothing here resolves references.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::{Match, Regex};
use walkdir::WalkDir;

use crate::error::Error;

/// Bytes of surrounding markup kept as context on each side.
const CONTEXT_RADIUS: usize = 500;

/// Bytes after a `<bibl>` searched for its `<quote>`.
const QUOTE_LOOKAHEAD: usize = 200;

/// Bytes on each side of an `n`-attributed `<bibl>` searched for a nearby `<quote>`.
const QUOTE_PROXIMITY: usize = 250;

/// One `<bibl>` element on a single line: opening tag and content.
#[allow(clippy::expect_used, reason = "hardcoded pattern is valid")]
static BIBL: LazyLock<Regex> =
    LazyLock::new(|| return Regex::new(r"(<bibl\b[^>]*>)(.*?)</bibl>").expect("bibl pattern"));

/// `<bibl>` whose `n` attribute is set and whose content has no markup.
#[allow(clippy::expect_used, reason = "hardcoded pattern is valid")]
static BIBL_WITH_N: LazyLock<Regex> = LazyLock::new(|| {
    return Regex::new(r#"<bibl\b[^>]*\bn\s*=\s*"([^"]+)"[^>]*>([^<]*)</bibl>"#).expect("bibl-with-n pattern");
});

/// A `<cit>` group, possibly spanning lines.
#[allow(clippy::expect_used, reason = "hardcoded pattern is valid")]
static CIT: LazyLock<Regex> = LazyLock::new(|| return Regex::new(r"(?s)<cit\b[^>]*>.*?</cit>").expect("cit pattern"));

/// `n="..."` inside an opening tag.
#[allow(clippy::expect_used, reason = "hardcoded pattern is valid")]
static N_ATTRIBUTE: LazyLock<Regex> =
    LazyLock::new(|| return Regex::new(r#"\bn\s*=\s*"([^"]*)""#).expect("n attribute pattern"));

/// A `<quote>` element, possibly spanning lines.
#[allow(clippy::expect_used, reason = "hardcoded pattern is valid")]
static QUOTE: LazyLock<Regex> =
    LazyLock::new(|| return Regex::new(r"(?s)<quote[^>]*>(.*?)</quote>").expect("quote pattern"));

/// A `<quote>` element without nested markup.
#[allow(clippy::expect_used, reason = "hardcoded pattern is valid")]
static QUOTE_PLAIN: LazyLock<Regex> =
    LazyLock::new(|| return Regex::new(r"<quote[^>]*>([^<]+)</quote>").expect("plain quote pattern"));

/// A `<ref>` element with plain text content.
#[allow(clippy::expect_used, reason = "hardcoded pattern is valid")]
static REF: LazyLock<Regex> = LazyLock::new(|| return Regex::new(r"<ref\b[^>]*>([^<]+)</ref>").expect("ref pattern"));

/// Text shaped like `Word. work N`.
#[allow(clippy::expect_used, reason = "hardcoded pattern is valid")]
static REF_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| return Regex::new(r"[A-Za-z]+\.\s*[A-Za-z]*\s*\d+").expect("ref shape pattern"));

/// A citation found in a document, before resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    /// Literal `n` attribute, empty if absent.
    pub attribute: String,
    /// Surrounding markup with whitespace collapsed.
    pub context: String,
    /// Trimmed element content.
    pub inline: String,
    /// Accompanying quotation, empty if none.
    pub quote: String,
    /// Rule that produced this citation.
    pub rule: Rule,
}

impl Extracted {
    /// Identity used to drop repeated finds in `<cit>` mode.
    pub fn dedup_key(&self) -> (String, String, String) {
        return (self.inline.clone(), self.attribute.clone(), self.quote.clone());
    }
}

/// Extraction strategy for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Every single-line `<bibl>` element.
    Bibl,
    /// `<cit>` groups, standalone and quoted `<bibl>`s, and citation-shaped `<ref>`s.
    Cit,
}

/// Which extraction rule found a citation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// A `<bibl>` element, in either mode.
    Bibl,
    /// A `<cit>` group containing a `<bibl>`.
    Cit,
    /// An `n`-attributed `<bibl>` near a `<quote>`.
    QuotedBibl,
    /// A `<ref>` element. Only kept when it resolves.
    Ref,
}

/// Trimmed content of a `<bibl>` match with its `n` attribute.
fn bibl_parts(open_tag: &str, content: &str) -> (String, String) {
    let attribute = N_ATTRIBUTE
        .captures(open_tag)
        .and_then(|caps| return caps.get(1))
        .map(|m| return m.as_str().to_string())
        .unwrap_or_default();
    return (attribute, content.trim().to_string());
}

/// Collapse runs of whitespace to one space and trim.
fn collapse_whitespace(text: &str) -> String {
    return text.split_whitespace().collect::<Vec<_>>().join(" ");
}

/// Context window around a match: `CONTEXT_RADIUS` bytes each side, collapsed.
fn context_around(content: &str, matched: &Match<'_>) -> String {
    return collapse_whitespace(window(content, matched.start(), matched.end(), CONTEXT_RADIUS));
}

/// Extract every citation from one document.
pub fn extract(content: &str, mode: Mode) -> Vec<Extracted> {
    return match mode {
        Mode::Bibl => extract_bibls(content, &[]),
        Mode::Cit => {
            let (mut found, cit_spans) = extract_cits(content);
            found.extend(
                extract_bibls(content, &cit_spans)
                    .into_iter()
                    .filter(|bibl| return !bibl.inline.is_empty()),
            );
            found.extend(extract_quoted_bibls(content));
            found.extend(extract_refs(content));
            found
        },
    };
}

/// `<bibl>` elements outside the given `<cit>` spans, each with the first
/// `<quote>` shortly after it.
fn extract_bibls(content: &str, excluded: &[(usize, usize)]) -> Vec<Extracted> {
    let mut found = Vec::new();

    for caps in BIBL.captures_iter(content) {
        let (Some(whole), Some(open), Some(inner)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            continue;
        };
        if excluded.iter().any(|&(start, end)| return (start..end).contains(&whole.start())) {
            continue;
        }

        let (attribute, inline) = bibl_parts(open.as_str(), inner.as_str());
        let lookahead = suffix_from(content, whole.end(), QUOTE_LOOKAHEAD).unwrap_or_default();

        found.push(Extracted {
            attribute,
            context: context_around(content, &whole),
            inline,
            quote: first_quote(&QUOTE, lookahead).unwrap_or_default(),
            rule: Rule::Bibl,
        });
    }

    return found;
}

/// `<cit>` groups holding a `<bibl>`, and the byte spans of every group.
fn extract_cits(content: &str) -> (Vec<Extracted>, Vec<(usize, usize)>) {
    let mut found = Vec::new();
    let mut spans = Vec::new();

    for cit in CIT.find_iter(content) {
        spans.push((cit.start(), cit.end()));

        let Some(caps) = BIBL.captures(cit.as_str()) else {
            continue;
        };
        let (Some(open), Some(inner)) = (caps.get(1), caps.get(2)) else {
            continue;
        };

        let (attribute, inline) = bibl_parts(open.as_str(), inner.as_str());
        if inline.is_empty() {
            continue;
        }
        found.push(Extracted {
            attribute,
            context: context_around(content, &cit),
            inline,
            quote: first_quote(&QUOTE, cit.as_str()).unwrap_or_default(),
            rule: Rule::Cit,
        });
    }

    return (found, spans);
}

/// `n`-attributed `<bibl>` elements with the first plain `<quote>` nearby.
fn extract_quoted_bibls(content: &str) -> Vec<Extracted> {
    let mut found = Vec::new();

    for caps in BIBL_WITH_N.captures_iter(content) {
        let (Some(whole), Some(n), Some(inner)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            continue;
        };
        let inline = inner.as_str().trim().to_string();
        if inline.is_empty() {
            continue;
        }

        let nearby = window(content, whole.start(), whole.end(), QUOTE_PROXIMITY);
        found.push(Extracted {
            attribute: n.as_str().to_string(),
            context: context_around(content, &whole),
            inline,
            quote: first_quote(&QUOTE_PLAIN, nearby).unwrap_or_default(),
            rule: Rule::QuotedBibl,
        });
    }

    return found;
}

/// `<ref>` elements whose text looks like a citation.
fn extract_refs(content: &str) -> Vec<Extracted> {
    let mut found = Vec::new();

    for caps in REF.captures_iter(content) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let inline = inner.as_str().trim();
        if inline.is_empty() || !REF_SHAPE.is_match(inline) {
            continue;
        }
        found.push(Extracted {
            attribute: String::new(),
            context: context_around(content, &whole),
            inline: inline.to_string(),
            quote: String::new(),
            rule: Rule::Ref,
        });
    }

    return found;
}

/// Trimmed text of the first quote `pattern` matches in `text`.
fn first_quote(pattern: &Regex, text: &str) -> Option<String> {
    let inner = pattern.captures(text)?.get(1)?;
    return Some(inner.as_str().trim().to_string());
}

/// Up to `len` bytes of `content` starting at `start`, clamped to char boundaries.
fn suffix_from(content: &str, start: usize, len: usize) -> Option<&str> {
    let mut end = start.saturating_add(len).min(content.len());
    while !content.is_char_boundary(end) {
        end = end.saturating_add(1);
    }
    return content.get(start..end);
}

/// `radius` bytes either side of `start..end`, widened to char boundaries.
fn window(content: &str, start: usize, end: usize, radius: usize) -> &str {
    let mut lo = start.saturating_sub(radius);
    while !content.is_char_boundary(lo) {
        lo = lo.saturating_sub(1);
    }
    let mut hi = end.saturating_add(radius).min(content.len());
    while !content.is_char_boundary(hi) {
        hi = hi.saturating_add(1);
    }
    return content.get(lo..hi).unwrap_or_default();
}

/// Every `*.xml` file directly inside `dir`, sorted by path.
///
/// # Errors
///
/// Returns `Error::InputNotFound` if `dir` is not a directory.
pub fn xml_files(dir: &Path) -> Result<Vec<PathBuf>, Error> {
    if !dir.is_dir() {
        return Err(Error::InputNotFound { path: dir.to_path_buf() });
    }

    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| {
            return entry
                .inspect_err(|e| {
                    tracing::warn!(error = %e, "skipping unreadable directory entry");
                })
                .ok();
        })
        .filter(|entry| return entry.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .filter(|path| return path.extension().is_some_and(|ext| return ext == "xml"))
        .collect();
    files.sort();
    return Ok(files);
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, reason = "test assertions")]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<p>As the chorus says <bibl n="Soph. OT 151">O. T. 151</bibl> <quote>ὦ Διὸς ἁδυεπὲς φάτι</quote> and later
<cit><quote>μῆνιν ἄειδε</quote>
<bibl n="Hom. Il. 1.1">Il. 1.1</bibl></cit>
see <ref target="x">Thuc. 2.40</ref> and <ref>chapter 3</ref>.</p>"#;

    #[test]
    fn bibl_mode_finds_single_line_bibls_with_quotes() {
        let found = extract(SAMPLE, Mode::Bibl);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].attribute, "Soph. OT 151");
        assert_eq!(found[0].inline, "O. T. 151");
        assert_eq!(found[0].quote, "ὦ Διὸς ἁδυεπὲς φάτι");
        assert_eq!(found[1].inline, "Il. 1.1");
        assert!(found.iter().all(|e| return e.rule == Rule::Bibl));
    }

    #[test]
    fn cit_mode_groups_quotes_and_refs() {
        let found = extract(SAMPLE, Mode::Cit);
        let cit = found.iter().find(|e| return e.rule == Rule::Cit).unwrap();
        assert_eq!(cit.attribute, "Hom. Il. 1.1");
        assert_eq!(cit.quote, "μῆνιν ἄειδε");

        let bibls: Vec<_> = found.iter().filter(|e| return e.rule == Rule::Bibl).collect();
        assert_eq!(bibls.len(), 1, "bibl inside <cit> is not standalone");

        let refs: Vec<_> = found.iter().filter(|e| return e.rule == Rule::Ref).collect();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].inline, "Thuc. 2.40");
    }

    #[test]
    fn cit_mode_drops_empty_standalone_bibls() {
        let text = r#"<p><bibl n="Hom. Il. 2.4"></bibl> <bibl n="Hom. Il. 2.5">  </bibl></p>"#;
        let standalone = |mode| {
            return extract(text, mode).into_iter().filter(|e| return e.rule == Rule::Bibl).count();
        };
        assert_eq!(standalone(Mode::Cit), 0);
        assert_eq!(standalone(Mode::Bibl), 2);
    }

    #[test]
    fn context_is_collapsed() {
        let found = extract(SAMPLE, Mode::Bibl);
        assert!(!found[1].context.contains('\n'));
        assert!(found[1].context.contains("<cit><quote>"));
    }

    #[test]
    fn windows_respect_char_boundaries() {
        let text = "ἀἀἀ<bibl>x</bibl>ἀἀἀ";
        let start = text.find("<bibl>").unwrap();
        let end = text.find("</bibl>").unwrap() + "</bibl>".len();
        assert_eq!(window(text, start, end, 1), "ἀ<bibl>x</bibl>ἀ");
        assert_eq!(window(text, 0, text.len(), 500), text);
    }

    #[test]
    fn lists_xml_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.xml", "a.xml", "notes.txt"] {
            std::fs::write(dir.path().join(name), "").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested/c.xml"), "").unwrap();

        let files = xml_files(dir.path()).unwrap();
        let names: Vec<_> = files.iter().map(|p| return p.file_name().unwrap().to_str().unwrap()).collect();
        assert_eq!(names, ["a.xml", "b.xml"]);
    }

    #[test]
    fn missing_input_dir() {
        let err = xml_files(Path::new("/nonexistent/citelink")).unwrap_err();
        assert!(matches!(err, Error::InputNotFound { .. }));
    }
}
