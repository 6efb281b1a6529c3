use std::path::{Path, PathBuf};

use crate::error::Error;

/// Name of the optional configuration file in the working directory.
pub const CONFIG_FILE: &str = ".citelink.toml";

/// Default directory holding the commentary XML files.
const DEFAULT_INPUT: &str = ".";

/// Default directory receiving the JSONL output.
const DEFAULT_OUTPUT: &str = "cit_data";

/// Default file name for resolved records.
const DEFAULT_RESOLVED_FILE: &str = "resolved.jsonl";

/// Default file name for unresolved records.
const DEFAULT_UNRESOLVED_FILE: &str = "unresolved.jsonl";

/// Run configuration loaded from `.citelink.toml`, before CLI overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Reference data directory; `None` uses the bundled data.
    pub data_dir: Option<PathBuf>,
    /// Directory scanned for `*.xml` files.
    pub input: PathBuf,
    /// Directory the JSONL files are written to.
    pub output: PathBuf,
    /// File name for resolved records inside `output`.
    pub resolved_file: String,
    /// File name for unresolved records inside `output`.
    pub unresolved_file: String,
    /// Extract `<cit>` groups and quoted `<bibl>`s instead of bare `<bibl>`s.
    pub use_cit_tags: bool,
}

/// Raw TOML structure for `.citelink.toml`. Every key is optional.
#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct CitelinkTomlConfig {
    /// See [`Config::data_dir`].
    data_dir: Option<PathBuf>,
    /// See [`Config::input`].
    input: Option<PathBuf>,
    /// See [`Config::output`].
    output: Option<PathBuf>,
    /// See [`Config::resolved_file`].
    resolved_file: Option<String>,
    /// See [`Config::unresolved_file`].
    unresolved_file: Option<String>,
    /// See [`Config::use_cit_tags`].
    #[serde(default)]
    use_cit_tags: bool,
}

impl Config {
    /// Load config from `.citelink.toml` in the given root directory.
    /// Returns the defaults if the file doesn't exist. A file that exists but
    /// is malformed is an error, never a silent fallback.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if reading fails (other than not-found),
    /// `Error::TomlDe` if the TOML is malformed,
    /// or `Error::ConfigInvalid` if an output file name is empty or has a directory part.
    pub fn load(root: &Path) -> Result<Self, Error> {
        let path = root.join(CONFIG_FILE);
        let content = match std::fs::read_to_string(&path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(Error::Io(e)),
            Ok(c) => c,
        };
        return Self::parse(&content);
    }

    /// Parse config from TOML content.
    ///
    /// # Errors
    ///
    /// Returns `Error::TomlDe` if the TOML is malformed,
    /// or `Error::ConfigInvalid` if an output file name is unusable.
    pub fn parse(content: &str) -> Result<Self, Error> {
        let raw: CitelinkTomlConfig = toml::from_str(content)?;
        let defaults = Self::default();

        let config = Self {
            data_dir: raw.data_dir,
            input: raw.input.unwrap_or(defaults.input),
            output: raw.output.unwrap_or(defaults.output),
            resolved_file: raw.resolved_file.unwrap_or(defaults.resolved_file),
            unresolved_file: raw.unresolved_file.unwrap_or(defaults.unresolved_file),
            use_cit_tags: raw.use_cit_tags,
        };
        validate_file_name("resolved_file", &config.resolved_file)?;
        validate_file_name("unresolved_file", &config.unresolved_file)?;
        if config.resolved_file == config.unresolved_file {
            return Err(Error::ConfigInvalid {
                reason: format!("resolved_file and unresolved_file are both `{}`", config.resolved_file),
            });
        }
        return Ok(config);
    }

    /// Full path of the resolved-records file.
    pub fn resolved_path(&self) -> PathBuf {
        return self.output.join(&self.resolved_file);
    }

    /// Full path of the unresolved-records file.
    pub fn unresolved_path(&self) -> PathBuf {
        return self.output.join(&self.unresolved_file);
    }
}

impl Default for Config {
    fn default() -> Self {
        return Self {
            data_dir: None,
            input: PathBuf::from(DEFAULT_INPUT),
            output: PathBuf::from(DEFAULT_OUTPUT),
            resolved_file: DEFAULT_RESOLVED_FILE.to_string(),
            unresolved_file: DEFAULT_UNRESOLVED_FILE.to_string(),
            use_cit_tags: false,
        };
    }
}

/// Output file names are plain names inside the output directory.
fn validate_file_name(key: &str, name: &str) -> Result<(), Error> {
    let plain = Path::new(name).file_name().is_some_and(|file| return file == name);
    if name.is_empty() || !plain {
        return Err(Error::ConfigInvalid {
            reason: format!("{key} must be a plain file name, got `{name}`"),
        });
    }
    return Ok(());
}
