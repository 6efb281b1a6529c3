//! Reference selection: choose between a citation's `n` attribute and its
//! inline text.
//!
//! Commentaries often carry two renderings of one citation, a structured
//! attribute (`n="Soph. OT 151"`) and the typeset text (`O. T. 151 lyr.`).
//! Both are normalized, then ranked by how closely each looks like
//! `author work N.N` with a recognized author.

use std::sync::LazyLock;

use regex::Regex;

use crate::disambiguate;
use crate::store::ReferenceStore;
use crate::urn;

/// Loosest leading-author window, in tokens.
const MAX_AUTHOR_TOKENS: usize = 3;

/// Loosest work-title window, in tokens.
const MAX_WORK_TOKENS: usize = 3;

/// A digit run followed by a space and a letter (`12 b` → `12b`).
#[allow(clippy::expect_used, reason = "hardcoded pattern is valid")]
static DIGIT_LETTER_GAP: LazyLock<Regex> =
    LazyLock::new(|| return Regex::new(r"(\d+) ([A-Za-z])").expect("digit-letter pattern"));

/// Parentheses are dropped outright.
#[allow(clippy::expect_used, reason = "hardcoded pattern is valid")]
static PARENS: LazyLock<Regex> = LazyLock::new(|| return Regex::new(r"[()]").expect("parens pattern"));

/// Reference shapes, best first: `author work N.N`, `author work N`,
/// `author N.N`, `author N`.
#[allow(clippy::expect_used, reason = "hardcoded patterns are valid")]
static RANKED_SHAPES: LazyLock<[Regex; 4]> = LazyLock::new(|| {
    return [
        r"([a-zA-Z]+\.?\s?[a-zA-Z]*) ([a-zA-Z]+\.?\s?[a-zA-Z]*) \d+(\s|\.|:)\d+",
        r"([a-zA-Z]+\.?\s?[a-zA-Z]*) ([a-zA-Z]+\.?\s?[a-zA-Z]*) \d+",
        r"([a-zA-Z]+\.?) \d+(\s|\.|:)\d+",
        r"([a-zA-Z]+\.?) \d+",
    ]
    .map(|pattern| return Regex::new(pattern).expect("reference shape pattern"));
});

/// Section marks become a period, swallowing surrounding spaces.
#[allow(clippy::expect_used, reason = "hardcoded pattern is valid")]
static SECTION_MARK: LazyLock<Regex> =
    LazyLock::new(|| return Regex::new(r" *§ *").expect("section mark pattern"));

/// Opening `<title ...>` markup.
#[allow(clippy::expect_used, reason = "hardcoded pattern is valid")]
static TITLE_OPEN: LazyLock<Regex> =
    LazyLock::new(|| return Regex::new(r"<title.*?>").expect("title pattern"));

/// Everything from the first digit on.
#[allow(clippy::expect_used, reason = "hardcoded pattern is valid")]
static TRAILING_NUMERALS: LazyLock<Regex> =
    LazyLock::new(|| return Regex::new(r"\d.*").expect("numeral pattern"));

/// Whether the first one to three tokens name a known author.
pub fn has_recognized_author(store: &ReferenceStore, reference: &str) -> bool {
    let tokens: Vec<&str> = reference.split_whitespace().collect();
    return (1..=tokens.len().min(MAX_AUTHOR_TOKENS)).any(|len| {
        return tokens
            .get(..len)
            .is_some_and(|span| return store.is_known_author(&span.join(" ")));
    });
}

/// Whether the tokens after a recognized author begin with a title from that
/// author's work table.
pub fn has_recognized_work(store: &ReferenceStore, reference: &str) -> bool {
    let tokens: Vec<&str> = reference.split_whitespace().collect();

    let found = (1..=tokens.len().min(MAX_AUTHOR_TOKENS)).find_map(|len| {
        let candidate = tokens.get(..len)?.join(" ");
        let hint = tokens.get(len).copied().unwrap_or_default();
        return disambiguate::resolve_author(store, &candidate, hint).map(|key| return (key, len));
    });
    let Some((author, author_len)) = found else {
        return false;
    };
    let Some(table) = store.works(&author) else {
        return false;
    };
    let Some(rest) = tokens.get(author_len..).filter(|rest| return !rest.is_empty()) else {
        return false;
    };

    let joined = rest.join(" ");
    let work_part = TRAILING_NUMERALS.replace(&joined, "");
    let work_tokens: Vec<&str> = work_part.split_whitespace().collect();

    return (1..=work_tokens.len().min(MAX_WORK_TOKENS)).any(|len| {
        return work_tokens
            .get(..len)
            .is_some_and(|span| return table.get(&span.join(" ")).is_some());
    });
}

/// Lowercase and clean one candidate reference string.
pub fn normalize(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let collapsed = lowered.split_whitespace().collect::<Vec<_>>().join(" ");

    let without_titles = TITLE_OPEN.replace_all(&collapsed, "").replace("</title>", "");
    let without_parens = PARENS.replace_all(&without_titles, "");
    let without_commas = without_parens.replace(", ", " ");
    let sections = SECTION_MARK.replace_all(&without_commas, ".");
    return DIGIT_LETTER_GAP.replace_all(&sections, "$1$2").into_owned();
}

/// Pick the more resolvable of the attribute value and the inline text.
/// `None` when neither yields a usable reference.
pub fn select(store: &ReferenceStore, attribute: &str, inline: &str) -> Option<String> {
    let attribute = normalize(attribute);
    let inline = normalize(inline);

    if inline.is_empty() {
        return (!attribute.is_empty()).then_some(attribute);
    }
    if attribute.is_empty() {
        return Some(inline);
    }

    if urn::detect(&attribute).is_some() {
        return Some(attribute);
    }

    for shape in RANKED_SHAPES.iter() {
        if shape.is_match(&attribute) && has_recognized_author(store, &attribute) {
            return Some(attribute);
        }
        if shape.is_match(&inline) && has_recognized_author(store, &inline) {
            return Some(inline);
        }
    }

    let attribute_author = has_recognized_author(store, &attribute);
    let inline_author = has_recognized_author(store, &inline);

    return match (attribute_author, inline_author) {
        (true, false) => Some(attribute),
        (false, true) => Some(inline),
        (true, true) if has_recognized_work(store, &attribute) => Some(attribute),
        (true, true) if has_recognized_work(store, &inline) => Some(inline),
        _ => None,
    };
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "test assertions")]
mod tests {
    use super::*;

    fn store() -> ReferenceStore {
        return ReferenceStore::bundled().unwrap();
    }

    #[test]
    fn normalize_collapses_and_strips_markup() {
        assert_eq!(normalize("  Soph.\n  <title rend=\"it\">OT</title>   151 "), "soph. ot 151");
        assert_eq!(normalize("Hom. (Il.) 1, 5"), "hom. il. 1 5");
        assert_eq!(normalize("Thuc. 2 § 40"), "thuc. 2.40");
        assert_eq!(normalize("Pl. Rep. 327 a"), "pl. rep. 327a");
    }

    #[test]
    fn attribute_with_recognized_author_wins() {
        assert_eq!(select(&store(), "Soph. OT 151", "O. T. 151 lyr.").as_deref(), Some("soph. ot 151"));
    }

    #[test]
    fn inline_wins_when_attribute_unrecognized() {
        assert_eq!(select(&store(), "xyz 3", "Hom. Il. 1.5").as_deref(), Some("hom. il. 1.5"));
    }

    #[test]
    fn embedded_identifier_is_preferred() {
        assert_eq!(
            select(&store(), "tlg0012.tlg001:1.1", "Il. 1.1").as_deref(),
            Some("tlg0012.tlg001:1.1")
        );
    }

    #[test]
    fn empty_sides() {
        let store = store();
        assert_eq!(select(&store, "Soph. OT", "").as_deref(), Some("soph. ot"));
        assert_eq!(select(&store, "", "Soph. OT").as_deref(), Some("soph. ot"));
        assert_eq!(select(&store, "", ""), None);
    }

    #[test]
    fn author_without_shape_still_selected() {
        assert_eq!(select(&store(), "Soph. OT", "see above").as_deref(), Some("soph. ot"));
    }

    #[test]
    fn recognized_work_breaks_author_tie() {
        assert_eq!(select(&store(), "soph. xyz", "soph. electra").as_deref(), Some("soph. electra"));
    }

    #[test]
    fn attribute_wins_when_both_works_are_recognized() {
        assert_eq!(select(&store(), "soph. ajax", "soph. electra").as_deref(), Some("soph. ajax"));
    }

    #[test]
    fn nothing_recognizable() {
        assert_eq!(select(&store(), "ibid.", "loc. cit."), None);
    }

    #[test]
    fn multi_token_author_abbreviations() {
        let store = store();
        assert!(has_recognized_author(&store, "schol. ar. nub. 12"));
        assert!(has_recognized_author(&store, "ap. rhod. 1.5"));
        assert!(!has_recognized_author(&store, "o. t. 151"));
    }
}
