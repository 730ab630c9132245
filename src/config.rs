//! Application configuration management.
//!
//! Settings are layered with figment: built-in defaults, then a TOML file,
//! then `FILEINVENTORY_`-prefixed environment variables (nested keys joined
//! with `__`, e.g. `FILEINVENTORY_SCAN__FOLDER_COLUMNS=5`). Command-line flags
//! are applied on top by the application.
//!
//! ```toml
//! [scan]
//! folder_columns = 4
//! extensions = "pdf, docx"
//!
//! [cache]
//! max_entries = 20
//!
//! [duplicates]
//! io_threads = 4
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cache::{CacheSettings, DEFAULT_MAX_AGE_SECONDS, DEFAULT_MAX_ENTRIES};
use crate::duplicates::DetectorConfig;
use crate::scanner::classify::parse_extensions;
use crate::scanner::ScanOptions;

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "FILEINVENTORY_";

/// Name of the configuration file in the platform config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Errors raised while loading or saving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A layer could not be parsed or merged.
    #[error("Invalid configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    /// The configuration could not be encoded as TOML.
    #[error("Failed to encode configuration: {0}")]
    Encode(#[from] toml::ser::Error),

    /// The configuration file could not be written.
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// `[scan]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSection {
    /// Number of `FolderN` columns
    pub folder_columns: usize,
    /// Title-case folder segments
    pub title_case: bool,
    /// Comma-separated extension filter; empty means all files
    pub extensions: String,
    /// Read creation and modification dates
    pub include_dates: bool,
    /// Extract document authors
    pub include_author: bool,
}

impl Default for ScanSection {
    fn default() -> Self {
        let options = ScanOptions::default();
        Self {
            folder_columns: options.folder_column_count,
            title_case: options.title_case,
            extensions: String::new(),
            include_dates: options.include_dates,
            include_author: options.include_author,
        }
    }
}

/// `[cache]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSection {
    /// Use the scan cache at all
    pub enabled: bool,
    /// Maximum number of cached directories
    pub max_entries: usize,
    /// Maximum entry age in seconds
    pub max_age_seconds: u64,
    /// Cache file location; the platform cache directory when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            enabled: true,
            max_entries: DEFAULT_MAX_ENTRIES,
            max_age_seconds: DEFAULT_MAX_AGE_SECONDS,
            file: None,
        }
    }
}

/// `[duplicates]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DuplicatesSection {
    /// Filter with the quick hash before full hashing
    pub use_quick_hash: bool,
    /// Hashing threads
    pub io_threads: usize,
}

impl Default for DuplicatesSection {
    fn default() -> Self {
        Self {
            use_quick_hash: true,
            io_threads: 1,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scan: ScanSection,
    pub cache: CacheSection,
    pub duplicates: DuplicatesSection,
}

impl Config {
    /// Default platform-specific configuration path.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "fileinventory", "fileinventory")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// Layered provider: defaults, then `file` (or the default file when it
    /// exists), then the environment.
    #[must_use]
    pub fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));

        let file = file
            .map(Path::to_path_buf)
            .or_else(|| Self::default_path().filter(|p| p.exists()));
        if let Some(path) = file {
            log::debug!("Loading configuration from {}", path.display());
            figment = figment.merge(Toml::file(path));
        }

        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Load the layered configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Load`] when a layer holds invalid values.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        Self::figment(file).extract().map_err(|e| ConfigError::Load(Box::new(e)))
    }

    /// Save the configuration as TOML, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if encoding or writing fails.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let io_error = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).map_err(io_error)
    }

    /// Scan options described by the `[scan]` section.
    #[must_use]
    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            folder_column_count: self.scan.folder_columns,
            title_case: self.scan.title_case,
            extension_filter: parse_extensions(&self.scan.extensions),
            include_dates: self.scan.include_dates,
            include_author: self.scan.include_author,
            ..ScanOptions::default()
        }
    }

    /// Cache limits described by the `[cache]` section.
    #[must_use]
    pub fn cache_settings(&self) -> CacheSettings {
        CacheSettings {
            max_entries: self.cache.max_entries,
            max_age_seconds: self.cache.max_age_seconds,
        }
    }

    /// Detector configuration described by the `[duplicates]` section.
    #[must_use]
    pub fn detector_config(&self) -> DetectorConfig {
        DetectorConfig::default()
            .with_quick_hash(self.duplicates.use_quick_hash)
            .with_io_threads(self.duplicates.io_threads)
    }
}
