//! Sequential citation tags, e.g. `:citations-1.12`.

use std::sync::atomic::{AtomicU64, Ordering};

/// Tag prefix shared by every citation in a run.
const TAG_PREFIX: &str = ":citations-1";

/// Hands out unique, increasing citation tags for one processing run.
/// Owned by the caller; resolution never sees it.
#[derive(Debug, Default)]
pub struct CitationSequence {
    /// Number of tags issued so far.
    issued: AtomicU64,
}

impl CitationSequence {
    /// Number of tags issued so far.
    pub fn issued(&self) -> u64 {
        return self.issued.load(Ordering::Relaxed);
    }

    /// Start a new sequence at `:citations-1.1`.
    pub const fn new() -> Self {
        return Self { issued: AtomicU64::new(0) };
    }

    /// Issue the next tag.
    pub fn next_tag(&self) -> String {
        let previous = self.issued.fetch_add(1, Ordering::Relaxed);
        return format!("{TAG_PREFIX}.{}", previous.saturating_add(1));
    }
}
