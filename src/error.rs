/// Crate-level error types for citelink diagnostics.
use std::path::PathBuf;

/// Process-level failures: bad configuration, missing or corrupt reference
/// data, unreadable input. Each variant names the file or reason for failure.
/// Per-citation resolution failures are not errors; see `resolver::Unresolved`.
#[allow(clippy::error_impl_error, reason = "crate-internal error type in binary")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// `.citelink.toml` parsed but holds a value that cannot be used.
    #[error("config invalid: {reason}")]
    ConfigInvalid {
        /// Description of the offending value.
        reason: String,
    },

    /// A reference data file exists but does not decode into the expected tables.
    #[error("reference data corrupt: {}: {reason}", file.display())]
    DataCorrupt {
        /// Data file that failed to decode.
        file: PathBuf,
        /// Description of the decoding failure.
        reason: String,
    },

    /// A reference data file named by the data directory does not exist.
    #[error("reference data not found: {}", path.display())]
    DataNotFound {
        /// Path to the missing data file.
        path: PathBuf,
    },

    /// The configured input directory does not exist.
    #[error("input directory not found: {}", path.display())]
    InputNotFound {
        /// Path to the missing directory.
        path: PathBuf,
    },

    /// Underlying I/O error from the filesystem.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// JSON serialization of an output record failed.
    #[error("json: {0}")]
    Json(
        /// The wrapped JSON error.
        #[from]
        serde_json::Error,
    ),

    /// TOML deserialization failed.
    #[error("toml deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),
}
