//! CLI commands for citelink: process, resolve, abbreviations.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::abbrev;
use crate::config::Config;
use crate::diagnostics::{self, FailureReport};
use crate::error;
use crate::output::RecordWriter;
use crate::resolver;
use crate::scanner::{self, Extracted, Mode, Rule};
use crate::sequence::CitationSequence;
use crate::store::ReferenceStore;
use crate::types::Citation;

/// Origin label for references typed on the command line.
const COMMAND_LINE_ORIGIN: &str = "<command line>";

/// CLI overrides for `process`. `None` keeps the config file's value.
#[derive(Debug, Default)]
pub struct ProcessOptions {
    /// Extract `<cit>` groups instead of bare `<bibl>` elements.
    pub cit: bool,
    /// Reference data directory.
    pub data: Option<PathBuf>,
    /// Directory of XML documents.
    pub input: Option<PathBuf>,
    /// Directory receiving the JSONL files.
    pub output: Option<PathBuf>,
}

/// State threaded through one `process` run.
struct Run<'a> {
    /// Extraction strategy.
    mode: Mode,
    /// Unresolved tally for the end-of-run report.
    report: FailureReport,
    /// Citation tag source.
    sequence: CitationSequence,
    /// Shared reference data.
    store: &'a ReferenceStore,
    /// JSONL destination.
    writer: RecordWriter,
}

impl Run<'_> {
    /// Link one extracted citation and write its record. Unresolvable `<ref>`
    /// finds are dropped. Returns whether a record was written.
    ///
    /// # Errors
    ///
    /// Returns `Error::Json` or `Error::Io` if the record cannot be written.
    fn emit(&mut self, extracted: Extracted, origin: &str) -> Result<bool, error::Error> {
        let linked = resolver::link(self.store, &extracted.attribute, &extracted.inline, &extracted.context, origin);

        let (urn, reason) = match linked.urn {
            Ok(urn) => (urn, None),
            Err(_) if extracted.rule == Rule::Ref => return Ok(false),
            Err(unresolved) => {
                self.report.record(&unresolved);
                (String::new(), Some(unresolved.reason.label().to_string()))
            },
        };

        let citation = Citation {
            bibl: extracted.inline,
            doc_cit_urn: self.sequence.next_tag(),
            filename: origin.to_string(),
            n_attrib: extracted.attribute,
            quote: extracted.quote,
            reason,
            reference: linked.reference,
            urn,
            xml_context: extracted.context,
        };
        self.writer.write(&citation)?;
        return Ok(true);
    }

    /// Extract, link, and write every citation in one document.
    /// Returns the number of records written.
    ///
    /// # Errors
    ///
    /// Returns `Error::Json` or `Error::Io` if a record cannot be written.
    fn process_document(&mut self, content: &str, origin: &str) -> Result<u64, error::Error> {
        let mut seen = HashSet::new();
        let mut written: u64 = 0;

        for extracted in scanner::extract(content, self.mode) {
            let key = extracted.dedup_key();
            if self.mode == Mode::Cit && seen.contains(&key) {
                continue;
            }
            if self.emit(extracted, origin)? {
                seen.insert(key);
                written = written.saturating_add(1);
            }
        }

        return Ok(written);
    }
}

/// Print every generated abbreviation of a work title, one per line.
pub fn abbreviations(title: &str) {
    for abbreviation in abbrev::generate(title) {
        println!("{abbreviation}");
    }
}

/// Load reference data from `data_dir`, or the bundled copy when `None`.
///
/// # Errors
///
/// Returns `Error::DataNotFound`, `Error::DataCorrupt`, or `Error::Io` from loading.
fn load_store(data_dir: Option<&Path>) -> Result<ReferenceStore, error::Error> {
    return match data_dir {
        Some(dir) => ReferenceStore::load(dir),
        None => ReferenceStore::bundled(),
    };
}

/// Extract and link citations from every XML document in the input directory,
/// writing resolved and unresolved JSONL records.
///
/// # Errors
///
/// Returns errors from config loading, reference data loading, input
/// listing, or record writing. Unreadable documents are skipped with a warning.
pub fn process(options: ProcessOptions) -> Result<(), error::Error> {
    let mut config = Config::load(Path::new("."))?;
    if let Some(input) = options.input {
        config.input = input;
    }
    if let Some(output) = options.output {
        config.output = output;
    }
    if let Some(data) = options.data {
        config.data_dir = Some(data);
    }
    config.use_cit_tags |= options.cit;

    let store = load_store(config.data_dir.as_deref())?;
    let files = scanner::xml_files(&config.input)?;

    let mut run = Run {
        mode: if config.use_cit_tags { Mode::Cit } else { Mode::Bibl },
        report: FailureReport::default(),
        sequence: CitationSequence::new(),
        store: &store,
        writer: RecordWriter::create(&config.resolved_path(), &config.unresolved_path())?,
    };

    for file in &files {
        let content = match std::fs::read_to_string(file) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(file = %file.display(), error = %e, "skipping unreadable document");
                continue;
            },
        };
        let written = run.process_document(&content, &file.display().to_string())?;
        tracing::info!(file = %file.display(), citations = written, "processed");
    }

    let issued = run.sequence.issued();
    let counts = run.writer.finish()?;
    tracing::info!(
        documents = files.len(),
        citations = issued,
        resolved = counts.resolved,
        unresolved = counts.unresolved,
        "run complete"
    );
    diagnostics::print_failure_report(&run.report);
    eprintln!(
        "Wrote {} resolved and {} unresolved citations to {}",
        counts.resolved,
        counts.unresolved,
        config.output.display()
    );

    return Ok(());
}

/// Resolve one reference typed on the command line and print its URN.
/// Exits with failure, printing the reason, when it does not resolve.
///
/// # Errors
///
/// Returns errors from reference data loading.
pub fn resolve(reference: &str, inline: Option<&str>, data: Option<&Path>) -> Result<ExitCode, error::Error> {
    let store = load_store(data)?;
    let linked = resolver::link(&store, reference, inline.unwrap_or_default(), "", COMMAND_LINE_ORIGIN);

    return match linked.urn {
        Ok(urn) => {
            println!("{urn}");
            Ok(ExitCode::SUCCESS)
        },
        Err(unresolved) => {
            eprintln!("unresolved: {} (`{}`)", unresolved.reason, unresolved.detail);
            Ok(ExitCode::FAILURE)
        },
    };
}
