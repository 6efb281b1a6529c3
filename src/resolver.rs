//! Identifier resolution: normalized reference → CTS URN.
//!
//! Resolution never fails the process. Every miss comes back as an
//! [`Unresolved`] carrying the citation's origin and a [`Reason`], and the
//! caller decides how to report it.

use std::fmt;

use crate::disambiguate;
use crate::parser;
use crate::selector;
use crate::store::{ReferenceStore, WorkTable};
use crate::types::{AuthorRecord, TitleOrigin, WorkIdentifier, first_number};
use crate::urn::{self, Tradition};

/// Outcome of linking one citation: the chosen reference text and its URN.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Linked {
    /// Reference chosen from the attribute and inline text; empty if neither.
    pub reference: String,
    /// Resolved URN or the reason resolution failed.
    pub urn: Result<String, Unresolved>,
}

/// Why a citation could not be linked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Reason {
    /// No abbreviation or canonical name matches the leading token(s).
    AuthorNotRecognized,
    /// The reference has no leading author token.
    NoAuthorToken,
    /// The author is known but has no URN stem in the reference data.
    NoIdentifierStem,
    /// Neither the attribute nor the inline text yielded a usable reference.
    NoReferenceSelected,
    /// A numbered work family was cited out of range.
    WorkUnresolved,
}

impl Reason {
    /// Every reason, in report order.
    pub const ALL: [Self; 5] = [
        Self::NoReferenceSelected,
        Self::NoAuthorToken,
        Self::AuthorNotRecognized,
        Self::NoIdentifierStem,
        Self::WorkUnresolved,
    ];

    /// Stable kebab-case label for reports and output records.
    pub const fn label(self) -> &'static str {
        return match self {
            Self::AuthorNotRecognized => "author-not-recognized",
            Self::NoAuthorToken => "no-author-token",
            Self::NoIdentifierStem => "no-identifier-stem",
            Self::NoReferenceSelected => "no-reference-selected",
            Self::WorkUnresolved => "work-unresolved",
        };
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::AuthorNotRecognized => "author not recognized",
            Self::NoAuthorToken => "no author token",
            Self::NoIdentifierStem => "no URN stem for author",
            Self::NoReferenceSelected => "no usable reference",
            Self::WorkUnresolved => "work number out of range",
        };
        return f.write_str(text);
    }
}

/// A citation that could not be linked. Never a process-level fault.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{origin}: {reason}: `{detail}`")]
pub struct Unresolved {
    /// Token or reference that triggered the failure.
    pub detail: String,
    /// Provenance label passed in by the caller, e.g. the document name.
    pub origin: String,
    /// Failure kind.
    pub reason: Reason,
}

/// Assemble `stem.work.suffix[:passage]`.
fn assemble(stem: &str, work_code: &str, tradition: Tradition, passage: &str) -> String {
    let base = format!("{stem}.{work_code}.{}", tradition.edition_suffix());
    if passage.is_empty() {
        return base;
    }
    return format!("{base}:{passage}");
}

/// Text before the first digit of `work`, trimmed; `None` if nothing precedes it.
fn before_first_digit(work: &str) -> Option<&str> {
    let index = work.find(|c: char| return c.is_ascii_digit())?;
    let head = work.get(..index)?.trim();
    return (!head.is_empty()).then_some(head);
}

/// Close up the space before a trailing "ff" or "ff.".
fn close_following_pages(reference: &str) -> String {
    if let Some(head) = reference.strip_suffix(" ff") {
        return format!("{head}ff");
    }
    if let Some(head) = reference.strip_suffix("ff.") {
        return format!("{}ff", head.strip_suffix(' ').unwrap_or(head));
    }
    return reference.to_string();
}

/// Work code for a table entry. A numbered family without a number in the
/// work token takes the first passage segment as the number.
fn code_from_identifier(
    identifier: &WorkIdentifier,
    work: &str,
    passage: &str,
) -> Result<(String, String), Reason> {
    if let Some(code) = identifier.simple_code() {
        return Ok((code.to_string(), passage.to_string()));
    }
    if first_number(work).is_some() {
        let code = identifier.code_for_work(work).ok_or(Reason::WorkUnresolved)?;
        return Ok((code, passage.to_string()));
    }

    let (head, tail) = passage.split_once('.').unwrap_or((passage, ""));
    let code = head
        .parse::<u32>()
        .ok()
        .and_then(|number| return identifier.code_for_number(number))
        .ok_or(Reason::WorkUnresolved)?;
    return Ok((code, tail.to_string()));
}

/// Link one citation: choose its reference, then resolve it.
pub fn link(store: &ReferenceStore, attribute: &str, inline: &str, context: &str, origin: &str) -> Linked {
    let Some(reference) = selector::select(store, attribute, inline) else {
        tracing::debug!(origin, attribute, inline, "no usable reference");
        return Linked {
            reference: String::new(),
            urn: Err(Unresolved {
                detail: format!("{attribute} | {inline}"),
                origin: origin.to_string(),
                reason: Reason::NoReferenceSelected,
            }),
        };
    };

    let urn = resolve_identifier(store, &reference, context, origin);
    return Linked { reference, urn };
}

/// A bare Roman numeral I..XX or a bare number, optionally dotted.
fn looks_like_book_label(work: &str) -> bool {
    if parser::is_roman_numeral(work) {
        return true;
    }
    let digits = work.strip_suffix('.').unwrap_or(work);
    return !digits.is_empty() && digits.chars().all(|c| return c.is_ascii_digit());
}

/// Tier two: titles whose generated abbreviations include `work`. A literal
/// title beats a generated key; otherwise the first hit in table order wins.
fn lookup_by_abbreviation(table: &WorkTable, work: &str) -> Option<String> {
    let mut generated_hit = None;

    for entry in table.abbreviated_as(work) {
        let Some(code) = entry.identifier.code_for_work(work) else {
            continue;
        };
        match entry.origin {
            TitleOrigin::Generated => {
                if generated_hit.is_none() {
                    generated_hit = Some(code);
                }
            },
            TitleOrigin::Literal => return Some(code),
        }
    }

    return generated_hit;
}

/// Tier one: exact lookup of `work`, retried with the text before its first digit.
fn lookup_exact(table: &WorkTable, work: &str, passage: &str) -> Option<Result<(String, String), Reason>> {
    let entry = table
        .get(work)
        .or_else(|| return before_first_digit(work).and_then(|head| return table.get(head)))?;
    return Some(code_from_identifier(&entry.identifier, work, passage));
}

/// Synthesize a work code from a bare number: `19` → `tlg019`, `05` → `tlg05`.
fn numeric_work_code(tradition: Tradition, work: &str) -> Option<String> {
    if work.is_empty() || !work.chars().all(|c| return c.is_ascii_digit()) {
        return None;
    }
    let prefix = tradition.numeric_prefix()?;
    if work.starts_with('0') {
        return Some(format!("{prefix}{work}"));
    }
    return Some(format!("{prefix}{:0>3}", format!("0{work}")));
}

/// Resolve a normalized reference to a URN. `context` is surrounding text
/// kept only for failure logs; `origin` labels the reported outcome.
///
/// # Errors
///
/// Returns `Unresolved` with the failing step's [`Reason`].
pub fn resolve_identifier(
    store: &ReferenceStore,
    reference: &str,
    context: &str,
    origin: &str,
) -> Result<String, Unresolved> {
    let result = resolve_reference(store, reference, origin);
    if let Err(unresolved) = &result {
        tracing::debug!(
            origin,
            reference,
            reason = unresolved.reason.label(),
            detail = %unresolved.detail,
            context_len = context.len(),
            "citation unresolved"
        );
    }
    return result;
}

/// Steps of [`resolve_identifier`] without logging.
fn resolve_reference(store: &ReferenceStore, reference: &str, origin: &str) -> Result<String, Unresolved> {
    let fail = |reason: Reason, detail: &str| {
        return Unresolved {
            detail: detail.to_string(),
            origin: origin.to_string(),
            reason,
        };
    };

    let reference = close_following_pages(reference.trim());

    if let Some(urn) = urn::format_embedded(&reference) {
        return Ok(urn);
    }

    let parsed = parser::parse(store, &reference);
    if parsed.author.is_empty() {
        return Err(fail(Reason::NoAuthorToken, &reference));
    }

    let key = disambiguate::resolve_author(store, &parsed.author, &parsed.work)
        .ok_or_else(|| return fail(Reason::AuthorNotRecognized, &parsed.author))?;
    let record = store.author(&key).ok_or_else(|| return fail(Reason::NoIdentifierStem, &key))?;
    let tradition = Tradition::of_stem(&record.stem);
    let work = parsed.work.to_lowercase();

    if record.single_work && (work.is_empty() || looks_like_book_label(&work)) {
        return Ok(single_work_urn(record, &reference));
    }

    let (work_code, passage) =
        resolve_work_code(store.works(&key), tradition, &work, &parsed.passage)
            .map_err(|reason| return fail(reason, &parsed.work))?;

    return Ok(assemble(&record.stem, &work_code, tradition, &passage));
}

/// Resolve the work code through the fallback tiers: exact title, generated
/// abbreviation, bare number, then the tradition's first work. Returns the
/// code with the passage, which loses its first segment when that segment
/// numbered a work family.
///
/// # Errors
///
/// Returns `Reason::WorkUnresolved` when a numbered work family is cited
/// outside its bounds.
fn resolve_work_code(
    table: Option<&WorkTable>,
    tradition: Tradition,
    work: &str,
    passage: &str,
) -> Result<(String, String), Reason> {
    if let Some(table) = table {
        if let Some(exact) = lookup_exact(table, work, passage) {
            return exact;
        }
        if let Some(code) = lookup_by_abbreviation(table, work) {
            return Ok((code, passage.to_string()));
        }
    }

    let code = numeric_work_code(tradition, work)
        .unwrap_or_else(|| return tradition.first_work_code().to_string());
    return Ok((code, passage.to_string()));
}

/// URN for an author addressed as one default work. The location is the
/// reference's digit-led tokens, dot-joined; book labels written any other
/// way do not contribute.
fn single_work_urn(record: &AuthorRecord, reference: &str) -> String {
    let tradition = Tradition::of_stem(&record.stem);
    let location = reference
        .split(|c: char| return c.is_whitespace() || matches!(c, ',' | '.' | ':'))
        .filter(|token| return token.starts_with(|c: char| return c.is_ascii_digit()))
        .collect::<Vec<_>>()
        .join(".");
    return assemble(&record.stem, tradition.first_work_code(), tradition, &location);
}
