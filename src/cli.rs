//! Command-line interface definitions for fileinventory.
//!
//! This module defines all CLI arguments, subcommands, and options using the clap derive API.
//! The CLI follows standard conventions with global options (verbosity, config file) and
//! subcommands for different operations.
//!
//! # Example
//!
//! ```bash
//! # Inventory a share into FileLocations.csv
//! fileinventory scan /mnt/share
//!
//! # JSON export of PDFs and Word documents only
//! fileinventory scan /mnt/share -e "pdf, docx" --format json -o docs.json
//!
//! # Annotate duplicates and write a text report
//! fileinventory scan /mnt/share --duplicates --report Duplicate_Report.txt
//!
//! # Inspect the scan cache
//! fileinventory cache stats
//!
//! # Write the default configuration file
//! fileinventory config init
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::output::ExportFormat;

/// Default export file stem.
pub const DEFAULT_OUTPUT_STEM: &str = "FileLocations";

/// Directory inventory exporter with duplicate detection.
///
/// fileinventory walks a directory tree, exports one row per file with its
/// folder structure, dates and document author, and can flag files with
/// identical content.
#[derive(Debug, Parser)]
#[command(name = "fileinventory")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Configuration file (TOML)
    ///
    /// If not specified, the platform-specific default is used when present.
    #[arg(long, value_name = "PATH", global = true, env = "FILEINVENTORY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print errors as structured JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Inventory a directory and export the rows
    Scan(ScanArgs),
    /// Inspect or clear the scan cache
    Cache(CacheArgs),
    /// Write a configuration file
    Config(ConfigArgs),
}

/// Arguments for the scan subcommand.
#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Directory to inventory
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Output file (default: FileLocations.<format> in the current directory)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Export format
    #[arg(long, value_enum, default_value = "csv")]
    pub format: OutputFormat,

    /// Label for the RootFolder column (default: the directory's name)
    #[arg(long, value_name = "LABEL")]
    pub root_label: Option<String>,

    /// Number of Folder1..FolderN columns
    #[arg(long, value_name = "N")]
    pub folder_columns: Option<usize>,

    /// Keep folder names as they are instead of title-casing them
    #[arg(long)]
    pub no_title_case: bool,

    /// Only include these extensions (comma-separated, e.g. "pdf, .docx")
    ///
    /// Filtered scans bypass the cache.
    #[arg(short, long, value_name = "LIST")]
    pub extensions: Option<String>,

    /// Skip the DateCreated and DateModified columns
    #[arg(long)]
    pub no_dates: bool,

    /// Skip document author extraction
    #[arg(long)]
    pub no_author: bool,

    /// Treat the directory as a network share (throttled walk)
    #[arg(long, conflicts_with = "local")]
    pub network: bool,

    /// Treat the directory as local storage even if it looks remote
    #[arg(long)]
    pub local: bool,

    /// Detect duplicate files and add a DuplicateGroup column
    #[arg(long)]
    pub duplicates: bool,

    /// Full-hash every same-size file instead of filtering with a quick hash
    #[arg(long)]
    pub no_quick_hash: bool,

    /// Number of I/O threads for duplicate hashing
    #[arg(long, value_name = "N")]
    pub io_threads: Option<usize>,

    /// Write a plain-text duplicate report (implies --duplicates)
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Neither read nor update the scan cache
    #[arg(long)]
    pub no_cache: bool,

    /// Path to the scan cache file
    #[arg(long, value_name = "PATH")]
    pub cache_file: Option<PathBuf>,
}

impl ScanArgs {
    /// Whether duplicate detection was requested.
    #[must_use]
    pub fn detect_duplicates(&self) -> bool {
        self.duplicates || self.report.is_some()
    }

    /// Output path, defaulting to `FileLocations.<ext>`.
    #[must_use]
    pub fn output_path(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| {
            PathBuf::from(format!(
                "{}.{}",
                DEFAULT_OUTPUT_STEM,
                ExportFormat::from(self.format).extension()
            ))
        })
    }
}

/// Arguments for the cache subcommand.
#[derive(Debug, Args)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub action: CacheCommand,

    /// Path to the scan cache file
    #[arg(long, value_name = "PATH", global = true)]
    pub cache_file: Option<PathBuf>,
}

/// Cache maintenance actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum CacheCommand {
    /// Show cache statistics
    Stats,
    /// Remove every cached scan and the history
    Clear,
}

/// Arguments for the config subcommand.
#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigCommand,
}

/// Configuration file actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum ConfigCommand {
    /// Write the effective configuration to `--config` or the default path
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Export format for the inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Comma-separated values
    Csv,
    /// JSON array of objects
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Csv => write!(f, "csv"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

impl From<OutputFormat> for ExportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Csv => ExportFormat::Csv,
            OutputFormat::Json => ExportFormat::Json,
        }
    }
}
