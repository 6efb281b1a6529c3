use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;

use crate::config::CONFIG_FILE;
use crate::error::Error;
use crate::resolver::{Reason, Unresolved};

const BOLD: &str = "\x1b[1m";
/// Unresolved examples kept per reason in the end-of-run report.
const EXAMPLES_PER_REASON: usize = 3;
const RESET: &str = "\x1b[0m";

/// Per-reason tally of unresolved citations for one run.
#[derive(Debug, Default)]
pub struct FailureReport {
    /// Reason → (count, first few failures).
    by_reason: BTreeMap<Reason, (u64, Vec<Unresolved>)>,
}

impl FailureReport {
    /// Whether nothing failed.
    pub fn is_empty(&self) -> bool {
        return self.by_reason.is_empty();
    }

    /// Count one failure, keeping it as an example if there is room.
    pub fn record(&mut self, unresolved: &Unresolved) {
        let (count, examples) = self.by_reason.entry(unresolved.reason).or_default();
        *count = count.saturating_add(1);
        if examples.len() < EXAMPLES_PER_REASON {
            examples.push(unresolved.clone());
        }
    }

    /// Render the tally as markdown, reasons in pipeline order.
    pub fn render(&self) -> String {
        let mut out = String::from("# Unresolved Citations\n");
        for reason in Reason::ALL {
            let Some((count, examples)) = self.by_reason.get(&reason) else {
                continue;
            };
            let _ = write!(out, "\n## {reason} ({count})\n\n");
            for example in examples {
                let _ = writeln!(out, "- `{}` in {}", example.detail, example.origin);
            }
        }
        return out;
    }
}

/// Print a markdown block to stderr with bold headings.
fn print_markdown(md: &str) {
    for line in md.lines() {
        if line.starts_with('#') {
            eprintln!("{BOLD}{line}{RESET}");
        } else {
            eprintln!("{line}");
        }
    }
}

/// Render an error as valid markdown with bold headings and print to stderr.
pub fn print_error(e: &Error) {
    print_markdown(&render_error(e));
}

/// Print the end-of-run failure report, if anything failed.
pub fn print_failure_report(report: &FailureReport) {
    if !report.is_empty() {
        print_markdown(&report.render());
    }
}

fn render_config_invalid(reason: &str) -> String {
    format!("\
# Error: Invalid Config

{reason}

## Fix

Edit `{CONFIG_FILE}` in the working directory.
")
}

fn render_data_corrupt(file: &Path, reason: &str) -> String {
    format!("\
# Error: Reference Data Corrupt

`{}` does not decode: {reason}

## Fix

Work identifiers are either a code string (`\"tlg004\"`) or a range
`[\"tlg\", start, end]` with `start <= end`. Disambiguation markers must be
`_which_pliny` or `_which_seneca`.
", file.display())
}

fn render_data_not_found(path: &Path) -> String {
    format!("\
# Error: Reference Data Not Found

`{}` does not exist.

## Fix

Point `data_dir` in `{CONFIG_FILE}` (or `--data`) at a directory holding
`greek_data.json`, `latin_data.json`, `schol_data.json`, and `other_data.json`,
or remove it to use the bundled data.
", path.display())
}

/// Render an error as a structured markdown diagnostic.
///
/// Each variant produces a block with what happened and, where there is
/// one, how to fix it.
pub fn render_error(e: &Error) -> String {
    match e {
        Error::ConfigInvalid { reason } => render_config_invalid(reason),
        Error::DataCorrupt { file, reason } => render_data_corrupt(file, reason),
        Error::DataNotFound { path } => render_data_not_found(path),
        Error::InputNotFound { path } => render_input_not_found(path),
        _ => render_generic(e),
    }
}

fn render_generic(e: &Error) -> String {
    match e {
        Error::Io(e) => format!("\
# Error: I/O

{e}
"),
        Error::Json(e) => format!("\
# Error: JSON

{e}
"),
        Error::TomlDe(e) => format!("\
# Error: Invalid TOML

{e}

## Fix

Check `{CONFIG_FILE}` for syntax errors and unknown keys.
"),
        // Already handled in render_error, but need exhaustive match.
        _ => format!("\
# Error

{e}
"),
    }
}

fn render_input_not_found(path: &Path) -> String {
    format!("\
# Error: Input Directory Not Found

`{}` is not a directory.

## Fix

Pass `--input DIR` or set `input` in `{CONFIG_FILE}`.
", path.display())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "test assertions")]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn unresolved(reason: Reason, detail: &str) -> Unresolved {
        return Unresolved {
            detail: detail.to_string(),
            origin: "a.xml".to_string(),
            reason,
        };
    }

    #[test]
    fn data_not_found_names_file_and_fix() {
        let md = render_error(&Error::DataNotFound { path: PathBuf::from("data/greek_data.json") });
        assert!(md.starts_with("# Error: Reference Data Not Found"));
        assert!(md.contains("`data/greek_data.json`"));
        assert!(md.contains("## Fix"));
    }

    #[test]
    fn io_errors_render_generically() {
        let md = render_error(&Error::Io(std::io::Error::other("disk on fire")));
        assert!(md.contains("# Error: I/O"));
        assert!(md.contains("disk on fire"));
    }

    #[test]
    fn report_groups_by_reason_and_caps_examples() {
        let mut report = FailureReport::default();
        assert!(report.is_empty());
        for n in 0..5 {
            report.record(&unresolved(Reason::AuthorNotRecognized, &format!("x{n}.")));
        }
        report.record(&unresolved(Reason::NoReferenceSelected, "|"));

        let md = report.render();
        assert!(md.contains("## author not recognized (5)"));
        assert!(md.contains("## no usable reference (1)"));
        assert!(md.contains("`x2.`"));
        assert!(!md.contains("`x3.`"));
        let selected = md.find("no usable reference").unwrap();
        let author = md.find("author not recognized").unwrap();
        assert!(selected < author, "reasons follow pipeline order");
    }
}
