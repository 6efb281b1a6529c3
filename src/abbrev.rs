//! Work-title abbreviation generator.
//!
//! Classical commentaries cite works by a zoo of shorthand forms: initials
//! (`O.T.`), truncations (`Cymb.`), suspensions that cut a word after its
//! first syllable (`Nat. Hist.`), and Latin/English plural swaps. Every form
//! produced here is a lowercase string; the set keeps insertion order so
//! table expansion and lookups are reproducible.

use indexmap::IndexSet;

/// Words skipped by content-word initials and suspensions.
const FUNCTION_WORDS: &[&str] = &["a", "ad", "an", "and", "by", "de", "for", "in", "of", "on", "the"];

/// Longest plain prefix taken from the first word.
const MAX_PREFIX_LEN: usize = 6;

/// A suspension ends right after one of these once a vowel has been seen.
const PLOSIVES: &[char] = &['b', 'c', 'd', 'g', 'k', 'p', 't', 'x'];

/// Vowels for suspension purposes (`y` included for Greek transliterations).
const VOWELS: &[char] = &['a', 'e', 'i', 'o', 'u', 'y'];

/// Whether the leading particle of a suspension is dropped or kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Particle {
    /// `de officiis` → `de.off.`
    Keep,
    /// `de officiis` → `off.`
    Skip,
}

/// Generate every abbreviation of a work title, lowercased, without duplicates.
/// Numeric titles produce nothing; any other title is a member of its own set.
pub fn generate(title: &str) -> IndexSet<String> {
    let title = title.to_lowercase();
    let mut abbreviations = IndexSet::new();

    if is_numeric_title(&title) {
        return abbreviations;
    }

    let words: Vec<&str> = title.split_whitespace().collect();
    let Some(first_word) = words.first().copied() else {
        return abbreviations;
    };

    if words.len() == 1
        && let Some(swapped) = swap_plural_suffix(first_word)
    {
        push(&mut abbreviations, swapped);
    }

    push_prefixes(&mut abbreviations, first_word);

    if words.len() > 1 {
        push_initials(&mut abbreviations, &words);
        push(&mut abbreviations, first_word.to_string());
    }

    if words.len() >= 3 {
        push_leading_words(&mut abbreviations, &words, 2);
        push_leading_words(&mut abbreviations, &words, 3);
    }

    for particle in [Particle::Skip, Particle::Keep] {
        if let Some(suspended) = suspension(&words, particle) {
            push(&mut abbreviations, suspended);
        }
    }

    if words.len() > 1 {
        push(&mut abbreviations, words.join("_"));
    }

    push(&mut abbreviations, title.clone());
    return abbreviations;
}

/// Titles made only of digits have no meaningful abbreviations.
fn is_numeric_title(title: &str) -> bool {
    return !title.is_empty() && title.chars().all(|c| return c.is_ascii_digit());
}

/// Insert a candidate unless it is empty. Duplicates keep their first position.
fn push(abbreviations: &mut IndexSet<String>, candidate: String) {
    if !candidate.is_empty() {
        abbreviations.insert(candidate);
    }
}

/// Plain, dotted, underscored, and dotted-underscored initials, first over all
/// words and then over content words only.
fn push_initials(abbreviations: &mut IndexSet<String>, words: &[&str]) {
    let all: Vec<char> = words.iter().filter_map(|w| return w.chars().next()).collect();
    push_initial_forms(abbreviations, &all);

    let has_function_words = words.iter().any(|w| return FUNCTION_WORDS.contains(w));
    if !has_function_words {
        return;
    }

    let content: Vec<char> = words
        .iter()
        .filter(|w| return !FUNCTION_WORDS.contains(*w))
        .filter_map(|w| return w.chars().next())
        .collect();
    push_initial_forms(abbreviations, &content);
}

/// The four spellings of one set of initials: `ot`, `o.t.`, `o_t`, `o._t.`.
fn push_initial_forms(abbreviations: &mut IndexSet<String>, letters: &[char]) {
    if letters.is_empty() {
        return;
    }

    let dotted: Vec<String> = letters.iter().map(|c| return format!("{c}.")).collect();
    let plain: Vec<String> = letters.iter().map(char::to_string).collect();

    push(abbreviations, plain.concat());
    push(abbreviations, dotted.concat());
    push(abbreviations, plain.join("_"));
    push(abbreviations, dotted.join("_"));
}

/// The first `count` words, space-joined and underscore-joined.
fn push_leading_words(abbreviations: &mut IndexSet<String>, words: &[&str], count: usize) {
    let Some(leading) = words.get(..count) else {
        return;
    };
    push(abbreviations, leading.join(" "));
    push(abbreviations, leading.join("_"));
}

/// First letter, then prefixes of two to six letters, each bare and dotted.
fn push_prefixes(abbreviations: &mut IndexSet<String>, first_word: &str) {
    let letter_count = first_word.chars().count();
    for len in 1..=letter_count.min(MAX_PREFIX_LEN) {
        let prefix: String = first_word.chars().take(len).collect();
        let dotted = format!("{prefix}.");
        push(abbreviations, prefix);
        push(abbreviations, dotted);
    }
}

/// Cut one word after its first syllable: capture leading consonants and the
/// first vowel run, then stop before a second vowel run, or just after a
/// plosive that follows a vowel.
fn suspend_word(word: &str) -> String {
    let mut span = String::new();
    let mut vowel_seen = false;
    let mut consonant_last = false;

    for c in word.chars() {
        if VOWELS.contains(&c) {
            if vowel_seen && consonant_last {
                break;
            }
            vowel_seen = true;
            consonant_last = false;
            span.push(c);
        } else if vowel_seen && PLOSIVES.contains(&c) {
            span.push(c);
            break;
        } else {
            consonant_last = true;
            span.push(c);
        }
    }

    return span;
}

/// Dot-joined suspensions of the content words, with a trailing period.
fn suspension(words: &[&str], particle: Particle) -> Option<String> {
    let mut spans: Vec<String> = Vec::new();

    for word in words {
        if matches!(*word, "de" | "on") {
            if particle == Particle::Keep {
                spans.push((*word).to_string());
            }
            continue;
        }
        if FUNCTION_WORDS.contains(word) {
            continue;
        }
        let span = suspend_word(word);
        if !span.is_empty() {
            spans.push(span);
        }
    }

    if spans.is_empty() {
        return None;
    }

    let mut joined = spans.join(".");
    if !joined.ends_with('.') {
        joined.push('.');
    }
    return Some(joined);
}

/// Naive Latin/English plural swap for one-word titles: `-s` ↔ `-a`.
fn swap_plural_suffix(word: &str) -> Option<String> {
    if let Some(stem) = word.strip_suffix('s') {
        return Some(format!("{stem}a"));
    }
    return word.strip_suffix('a').map(|stem| return format!("{stem}s"));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contains_all(title: &str, expected: &[&str]) {
        let generated = generate(title);
        for abbreviation in expected {
            assert!(
                generated.contains(*abbreviation),
                "`{abbreviation}` missing from {generated:?}"
            );
        }
    }

    #[test]
    fn single_word_prefixes() {
        contains_all("cymbeline", &["c", "c.", "cy", "cy.", "cym", "cym.", "cymb", "cymb.", "cymbeline"]);
        contains_all(
            "electra",
            &["e", "e.", "el", "el.", "ele", "ele.", "elec", "elec.", "elect", "elect.", "electra"],
        );
    }

    #[test]
    fn prefixes_stop_at_six_letters() {
        let generated = generate("metamorphoses");
        assert!(generated.contains("metamo."));
        assert!(!generated.contains("metamor"));
    }

    #[test]
    fn first_letter_comes_first() {
        let generated = generate("Iliad");
        assert_eq!(generated.first().map(String::as_str), Some("i"));
        assert_eq!(generated.get_index(1).map(String::as_str), Some("i."));
    }

    #[test]
    fn numeric_titles_have_no_abbreviations() {
        assert!(generate("19").is_empty());
    }

    #[test]
    fn plural_swap_for_single_words() {
        contains_all("carmina", &["carmins"]);
        contains_all("nubes", &["nubea"]);
        assert!(!generate("oedipus tyrannus").contains("oedipus tyrannua"));
    }

    #[test]
    fn initials_in_four_spellings() {
        contains_all("Oedipus Tyrannus", &["ot", "o.t.", "o_t", "o._t.", "oedipus", "oedipus_tyrannus"]);
    }

    #[test]
    fn content_word_initials_skip_particles() {
        contains_all("de bello gallico", &["dbg", "bg", "b.g.", "b_g", "b._g."]);
    }

    #[test]
    fn leading_word_combinations() {
        contains_all("de rerum natura", &["de rerum", "de_rerum", "de rerum natura", "de_rerum_natura"]);
    }

    #[test]
    fn suspension_cuts_after_plosive() {
        contains_all("naturalis historia", &["nat.hist."]);
        contains_all("oedipus tyrannus", &["oed.tyr."]);
    }

    #[test]
    fn suspension_with_and_without_particle() {
        contains_all("de officiis", &["off.", "de.off."]);
    }

    #[test]
    fn never_empty_and_always_contains_title() {
        for title in ["iliad", "works and days", "the", "ars poetica", "ion"] {
            let generated = generate(title);
            assert!(!generated.contains(""), "empty abbreviation for {title}");
            assert!(generated.contains(title), "{title} missing from its own abbreviations");
        }
    }
}
