//! Split a normalized reference into author, work, and passage tokens.

use crate::disambiguate;
use crate::store::ReferenceStore;
use crate::types::ParsedReference;

/// Book labels accepted as the start of a passage.
const ROMAN_NUMERALS: &[&str] = &[
    "i", "ii", "iii", "iv", "v", "vi", "vii", "viii", "ix", "x", "xi", "xii", "xiii", "xiv", "xv", "xvi",
    "xvii", "xviii", "xix", "xx",
];

/// Whether `token` is a bare Roman numeral I..XX, with or without a trailing period.
pub fn is_roman_numeral(token: &str) -> bool {
    let lowered = token.trim().to_lowercase();
    let bare = lowered.strip_suffix('.').unwrap_or(&lowered);
    return ROMAN_NUMERALS.contains(&bare);
}

/// Join passage tokens with periods, dropping empty segments.
fn join_passage(tokens: &[String]) -> String {
    return tokens
        .iter()
        .flat_map(|token| return token.split('.'))
        .filter(|segment| return !segment.is_empty())
        .collect::<Vec<_>>()
        .join(".");
}

/// Parse `reference` into its author, work, and passage. Any part may be empty.
pub fn parse(store: &ReferenceStore, reference: &str) -> ParsedReference {
    let tokens: Vec<&str> = reference.split_whitespace().collect();
    let Some(first) = tokens.first() else {
        return ParsedReference::default();
    };

    let (author, author_len) = match tokens.get(..2).map(|pair| return pair.join(" ")) {
        Some(bigram) if store.is_known_author(&bigram.to_lowercase()) => (bigram, 2),
        _ => ((*first).to_string(), 1),
    };

    let rest = tokens.get(author_len..).unwrap_or_default();
    if rest.is_empty() {
        return ParsedReference { author, ..ParsedReference::default() };
    }

    let parts = substitute_titles(store, &author, rest);

    if let [only] = parts.as_slice()
        && let Some((work, passage)) = only.split_once('.')
    {
        return ParsedReference {
            author,
            passage: passage.to_string(),
            work: work.to_string(),
        };
    }

    let passage_start = parts.iter().position(|part| {
        return part.starts_with(|c: char| return c.is_ascii_digit()) || is_roman_numeral(part);
    });

    return match passage_start {
        Some(index) => {
            let (work, passage) = parts.split_at(index);
            ParsedReference {
                author,
                passage: join_passage(passage),
                work: work.join(" "),
            }
        },
        None => ParsedReference {
            author,
            passage: String::new(),
            work: parts.join(" "),
        },
    };
}

/// Underscore-join the longest-leading multi-word title the author's work
/// table knows, so it survives as one work token.
fn substitute_titles(store: &ReferenceStore, author: &str, rest: &[&str]) -> Vec<String> {
    let owned = || return rest.iter().map(|token| return (*token).to_string()).collect();

    if rest.len() < 2 {
        return owned();
    }
    let Some(table) = disambiguate::resolve_author(store, author, "").and_then(|key| return store.works(&key))
    else {
        return owned();
    };

    for len in 2..=rest.len() {
        let Some((span, tail)) = rest.split_at_checked(len) else {
            break;
        };
        if table.get(&span.join(" ").to_lowercase()).is_some() {
            let mut parts = vec![span.join("_")];
            parts.extend(tail.iter().map(|token| return (*token).to_string()));
            return parts;
        }
    }
    return owned();
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "test assertions")]
mod tests {
    use super::*;

    fn parsed(reference: &str) -> (String, String, String) {
        let store = ReferenceStore::bundled().unwrap();
        let parsed = parse(&store, reference);
        return (parsed.author, parsed.work, parsed.passage);
    }

    fn triple(author: &str, work: &str, passage: &str) -> (String, String, String) {
        return (author.to_string(), work.to_string(), passage.to_string());
    }

    #[test]
    fn author_work_passage() {
        assert_eq!(parsed("soph. ot 151"), triple("soph.", "ot", "151"));
        assert_eq!(parsed("hom. il. 1.1"), triple("hom.", "il.", "1.1"));
    }

    #[test]
    fn roman_numeral_starts_passage() {
        assert_eq!(parsed("shakespeare cymb. iv. 2"), triple("shakespeare", "cymb.", "iv.2"));
    }

    #[test]
    fn bigram_author() {
        assert_eq!(parsed("schol. ar. nub. 12"), triple("schol. ar.", "nub.", "12"));
    }

    #[test]
    fn single_dotted_token_splits_on_first_period() {
        assert_eq!(parsed("thuc. 2.40"), triple("thuc.", "2", "40"));
    }

    #[test]
    fn multi_word_titles_are_underscored() {
        assert_eq!(parsed("plin. nat. hist. 2.3"), triple("plin.", "nat._hist.", "2.3"));
    }

    #[test]
    fn author_only_and_empty() {
        assert_eq!(parsed("soph."), triple("soph.", "", ""));
        assert_eq!(parsed("   "), triple("", "", ""));
    }

    #[test]
    fn no_passage_means_whole_remainder_is_work() {
        assert_eq!(parsed("soph. ajax lyr"), triple("soph.", "ajax lyr", ""));
    }

    #[test]
    fn passage_periods_are_collapsed() {
        assert_eq!(parsed("hom. il. 1. 5"), triple("hom.", "il.", "1.5"));
    }

    #[test]
    fn roman_numerals() {
        assert!(is_roman_numeral("XIV."));
        assert!(is_roman_numeral("iv"));
        assert!(!is_roman_numeral("xxi"));
        assert!(!is_roman_numeral("il."));
    }
}
