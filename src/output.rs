//! JSONL record output: one file for resolved citations, one for the rest.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write as _};
use std::path::Path;

use crate::error::Error;
use crate::types::Citation;

/// Record counts for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordCounts {
    /// Records written to the resolved file.
    pub resolved: u64,
    /// Records written to the unresolved file.
    pub unresolved: u64,
}

/// Appends citation records to the resolved and unresolved JSONL files.
/// Both files are removed when the writer is created, so each run starts empty.
#[derive(Debug)]
pub struct RecordWriter {
    /// Running totals.
    counts: RecordCounts,
    /// Destination for resolved records.
    resolved: BufWriter<File>,
    /// Destination for unresolved records.
    unresolved: BufWriter<File>,
}

impl RecordWriter {
    /// Create the output directory, clear both files, and open them for appending.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the directory cannot be created or a file
    /// cannot be removed or opened.
    pub fn create(resolved_path: &Path, unresolved_path: &Path) -> Result<Self, Error> {
        return Ok(Self {
            counts: RecordCounts::default(),
            resolved: open_fresh(resolved_path)?,
            unresolved: open_fresh(unresolved_path)?,
        });
    }

    /// Flush both files and return the totals.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if buffered records cannot be written out.
    pub fn finish(mut self) -> Result<RecordCounts, Error> {
        self.resolved.flush()?;
        self.unresolved.flush()?;
        return Ok(self.counts);
    }

    /// Append one record as a JSON line to the file its status selects.
    ///
    /// # Errors
    ///
    /// Returns `Error::Json` if the record cannot be serialized,
    /// or `Error::Io` if the line cannot be written.
    pub fn write(&mut self, citation: &Citation) -> Result<(), Error> {
        let line = serde_json::to_string(citation)?;
        if citation.is_resolved() {
            writeln!(self.resolved, "{line}")?;
            self.counts.resolved = self.counts.resolved.saturating_add(1);
        } else {
            writeln!(self.unresolved, "{line}")?;
            self.counts.unresolved = self.counts.unresolved.saturating_add(1);
        }
        return Ok(());
    }
}

/// Remove any previous file at `path`, then open it for appending.
fn open_fresh(path: &Path) -> Result<BufWriter<File>, Error> {
    if let Some(parent) = path.parent().filter(|p| return !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    if let Err(e) = std::fs::remove_file(path)
        && e.kind() != std::io::ErrorKind::NotFound
    {
        return Err(Error::Io(e));
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    return Ok(BufWriter::new(file));
}
