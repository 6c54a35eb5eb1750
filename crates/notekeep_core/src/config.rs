//! Store and logging configuration.
//!
//! # Responsibility
//! - Describe where the note database lives and which schema it expects.
//! - Load configuration from TOML, falling back to defaults per field.
//!
//! # Invariants
//! - A missing config file is not an error; defaults apply.
//! - `StoreConfig::directory == None` selects an in-memory database.

use crate::db::migrations::latest_version;
use crate::logging::default_log_level;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const DEFAULT_DATABASE_NAME: &str = "notes_db";
const DATABASE_FILE_EXTENSION: &str = "sqlite3";
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Configuration load error.
#[derive(Debug)]
pub enum ConfigError {
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(toml::de::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "failed to parse config: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        Self::Parse(value)
    }
}

/// Where and how to open the note database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Logical database name; becomes the file stem on disk.
    pub name: String,
    /// Data directory. `None` keeps the database in memory.
    pub directory: Option<PathBuf>,
    /// Schema version to open at.
    pub schema_version: u32,
    /// How long a transaction waits on a locked database before failing.
    pub busy_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_DATABASE_NAME.to_string(),
            directory: None,
            schema_version: latest_version(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

impl StoreConfig {
    /// In-memory store with the given name at the latest schema version.
    pub fn in_memory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// File-backed store `<directory>/<name>.sqlite3` at the latest schema version.
    pub fn on_disk(name: impl Into<String>, directory: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            directory: Some(directory.into()),
            ..Self::default()
        }
    }

    /// Database file path, or `None` for in-memory stores.
    pub fn database_path(&self) -> Option<PathBuf> {
        self.directory
            .as_ref()
            .map(|dir| dir.join(format!("{}.{DATABASE_FILE_EXTENSION}", self.name)))
    }
}

/// Logging bootstrap options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// One of `trace|debug|info|warn|error`.
    pub level: String,
    /// Absolute directory for rolling log files; `None` logs to stderr.
    pub directory: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level().to_string(),
            directory: None,
        }
    }
}

/// Top-level configuration file shape.
///
/// ```toml
/// [store]
/// name = "notes_db"
/// directory = "/home/me/.local/share/notekeep"
///
/// [logging]
/// level = "info"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotekeepConfig {
    pub store: StoreConfig,
    pub logging: LoggingConfig,
}

impl NotekeepConfig {
    /// Parses configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Loads configuration from `path`; a missing file yields defaults.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }
}

/// Platform data directory for file-backed stores, if one exists.
pub fn default_data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("notekeep"))
}
