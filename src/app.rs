//! Application workflow behind the `fileinventory` binary.
//!
//! A scan run goes: cache lookup, directory walk, cache write-back,
//! optional duplicate detection with row annotation, export, notification.
//! The cache is only consulted and updated for unfiltered scans, and a
//! cancelled walk is never written back. Cache hits are refitted to the
//! requested folder columns and root label; an interrupted duplicate
//! detection leaves the rows unannotated.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::cache::ScanCache;
use crate::cli::{CacheArgs, CacheCommand, Cli, Commands, ConfigArgs, ConfigCommand, ScanArgs};
use crate::config::Config;
use crate::duplicates::{annotate_duplicates, DuplicateDetector, DuplicateStats};
use crate::error::ExitCode;
use crate::logging::init_logging;
use crate::notify::{LogNotifier, Notification, Notifier};
use crate::output::ExportFormat;
use crate::progress::{Progress, ProgressCallback};
use crate::scanner::classify::{
    folder_slots, parse_extensions, parse_folder_structure, root_folder_name,
};
use crate::scanner::path_utils::lexical_normalize;
use crate::scanner::walker::CancelCheck;
use crate::scanner::{
    DirectoryScanner, ExtractorRegistry, FileRecord, NetworkMode, RowLayout, ScanOptions,
};
use crate::signal::install_handler;

/// Collaborators of a scan run.
#[derive(Clone)]
pub struct RunContext {
    /// Polled between files
    pub cancel_check: CancelCheck,
    /// Receives scan and hash progress
    pub progress: Option<Arc<dyn ProgressCallback>>,
    /// Receives the outcome
    pub notifier: Arc<dyn Notifier>,
    /// Author extractors by extension
    pub extractors: Arc<ExtractorRegistry>,
}

impl std::fmt::Debug for RunContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunContext")
            .field("progress", &self.progress.as_ref().map(|_| "<callback>"))
            .field("extractors", &self.extractors)
            .finish_non_exhaustive()
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self {
            cancel_check: Arc::new(|| false),
            progress: None,
            notifier: Arc::new(LogNotifier),
            extractors: Arc::new(ExtractorRegistry::with_defaults()),
        }
    }
}

/// What a scan run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Rows written to the export
    pub rows_exported: usize,
    /// Export destination, when one was written
    pub output: Option<PathBuf>,
    /// Rows came from the cache instead of a walk
    pub from_cache: bool,
    /// Cancellation stopped the walk or the duplicate detection
    pub cancelled: bool,
    /// Duplicate statistics, when detection ran
    pub duplicates: Option<DuplicateStats>,
}

impl RunSummary {
    /// Process exit code for this outcome.
    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        if self.cancelled {
            ExitCode::Interrupted
        } else if self.rows_exported == 0 {
            ExitCode::NoFiles
        } else {
            ExitCode::Success
        }
    }
}

/// Run the command described by `cli`.
///
/// # Errors
///
/// Returns an error when configuration, scanning, detection reporting or
/// export fails.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    init_logging(cli.verbose, cli.quiet);
    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Scan(args) => {
            let handler = install_handler()?;
            let context = RunContext {
                cancel_check: handler.cancel_check(),
                progress: Some(Arc::new(Progress::new(cli.quiet))),
                ..RunContext::default()
            };
            let summary = run_scan(&args, &config, &context)?;
            Ok(summary.exit_code())
        }
        Commands::Cache(args) => run_cache_command(&args, &config),
        Commands::Config(args) => run_config_command(&args, &config, cli.config.as_deref()),
    }
}

/// Scan options from the configuration with command-line overrides applied.
#[must_use]
pub fn scan_options(args: &ScanArgs, config: &Config) -> ScanOptions {
    let mut options = config.scan_options();
    options.root_label = args.root_label.clone();
    if let Some(columns) = args.folder_columns {
        options.folder_column_count = columns;
    }
    if args.no_title_case {
        options.title_case = false;
    }
    if let Some(ref list) = args.extensions {
        options.extension_filter = parse_extensions(list);
    }
    if args.no_dates {
        options.include_dates = false;
    }
    if args.no_author {
        options.include_author = false;
    }
    options.network_mode = if args.network {
        NetworkMode::Remote
    } else if args.local {
        NetworkMode::Local
    } else {
        NetworkMode::Auto
    };
    options
}

fn cache_path(flag: Option<&Path>, config: &Config) -> Option<PathBuf> {
    flag.map(Path::to_path_buf)
        .or_else(|| config.cache.file.clone())
        .or_else(ScanCache::default_path)
}

/// Run one inventory scan and export it.
///
/// # Errors
///
/// Returns an error when the walk fails (including transport failures on
/// network shares), the duplicate report cannot be written, or the export
/// fails. Failures are also sent to the notifier.
pub fn run_scan(args: &ScanArgs, config: &Config, context: &RunContext) -> Result<RunSummary> {
    let result = scan_and_export(args, config, context);
    match result {
        Ok(ref summary) => {
            if let Some(ref output) = summary.output {
                context.notifier.notify(&Notification::Success {
                    file_count: summary.rows_exported,
                    output: output.clone(),
                });
            } else if summary.cancelled {
                context.notifier.notify(&Notification::Failure {
                    message: format!(
                        "Scan of {} cancelled before any files were found",
                        args.path.display()
                    ),
                });
            } else {
                context.notifier.notify(&Notification::Failure {
                    message: format!("No files found in {}", args.path.display()),
                });
            }
        }
        Err(ref e) => context.notifier.notify(&Notification::Failure {
            message: format!("{e:#}"),
        }),
    }
    result
}

fn scan_and_export(args: &ScanArgs, config: &Config, context: &RunContext) -> Result<RunSummary> {
    let options = scan_options(args, config);
    let mut layout = RowLayout::from_options(&options);
    let mut summary = RunSummary::default();

    let use_cache = config.cache.enabled && !args.no_cache && options.extension_filter.is_empty();
    let mut cache = if use_cache {
        match cache_path(args.cache_file.as_deref(), config) {
            Some(path) => Some(ScanCache::open(&path, config.cache_settings())),
            None => {
                log::warn!("Could not determine a cache location, caching disabled");
                None
            }
        }
    } else {
        None
    };

    // Cached rows must carry every column so any later layout can be served.
    let caches_all_fields = options.include_dates && options.include_author;
    let cached = cache.as_mut().and_then(|cache| cache.get(&args.path));
    let mut records = match cached {
        Some(records) => {
            log::info!(
                "Using {} cached rows for {}",
                records.len(),
                args.path.display()
            );
            summary.from_cache = true;
            refit_cached_rows(records, &args.path, &options)
        }
        None => {
            let mut scanner = DirectoryScanner::new(&args.path, options.clone())
                .with_cancel_check(Arc::clone(&context.cancel_check))
                .with_extractors(Arc::clone(&context.extractors));
            if let Some(ref progress) = context.progress {
                scanner = scanner.with_progress_callback(Arc::clone(progress));
            }

            let outcome = scanner
                .scan()
                .with_context(|| format!("Failed to scan {}", args.path.display()))?;

            if outcome.skipped_entries > 0 {
                log::warn!("Skipped {} unreadable entries", outcome.skipped_entries);
            }
            if outcome.cancelled {
                log::warn!("Scan cancelled after {} files", outcome.records.len());
                summary.cancelled = true;
            } else if let Some(cache) = cache.as_mut().filter(|_| caches_all_fields) {
                if let Err(e) = cache.put(&args.path, outcome.records.clone()) {
                    log::warn!("Failed to update scan cache: {}", e);
                }
            }
            outcome.records
        }
    };

    if records.is_empty() {
        log::warn!("No files found in {}", args.path.display());
        return Ok(summary);
    }

    if args.detect_duplicates() && !summary.cancelled {
        let mut detector_config = config
            .detector_config()
            .with_cancel_check(Arc::clone(&context.cancel_check));
        if args.no_quick_hash {
            detector_config = detector_config.with_quick_hash(false);
        }
        if let Some(threads) = args.io_threads {
            detector_config = detector_config.with_io_threads(threads);
        }
        if let Some(ref progress) = context.progress {
            detector_config = detector_config.with_progress_callback(Arc::clone(progress));
        }

        let mut detector = DuplicateDetector::new(detector_config);
        let groups = detector.find_duplicates(&records).to_vec();
        if detector.summary().interrupted {
            log::warn!("Duplicate detection interrupted, rows are exported without annotation");
            summary.cancelled = true;
        } else {
            annotate_duplicates(&mut records, &groups);
            layout = layout.with_duplicate_group(true);
        }

        let stats = detector.stats();
        log::info!(
            "{} duplicate groups, {} duplicate files",
            stats.group_count,
            stats.duplicate_file_count
        );
        if let Some(ref report) = args.report {
            detector
                .export_report(report)
                .context("Failed to write duplicate report")?;
        }
        summary.duplicates = Some(stats);
    }

    let output = args.output_path();
    let exporter = ExportFormat::from(args.format).exporter();
    summary.rows_exported = exporter
        .export(&records, &layout, &output)
        .with_context(|| format!("Failed to export to {}", output.display()))?;
    summary.output = Some(output);

    Ok(summary)
}

/// Fit cached rows to the current options: folder slots are rebuilt from
/// each row's directory and the root label is reapplied.
fn refit_cached_rows(
    mut records: Vec<FileRecord>,
    root: &Path,
    options: &ScanOptions,
) -> Vec<FileRecord> {
    let root_label = options
        .root_label
        .clone()
        .unwrap_or_else(|| root_folder_name(root));
    let base = lexical_normalize(root);

    for record in &mut records {
        let segments = parse_folder_structure(
            &lexical_normalize(&record.folder_path),
            &base,
            options.title_case,
        );
        record.folders = folder_slots(&segments, options.folder_column_count);
        record.root_label.clone_from(&root_label);
    }
    records
}

/// Run a `cache` subcommand.
///
/// # Errors
///
/// Returns an error when no cache location is known or clearing fails.
pub fn run_cache_command(args: &CacheArgs, config: &Config) -> Result<ExitCode> {
    let path = cache_path(args.cache_file.as_deref(), config)
        .context("Could not determine the cache location")?;
    let mut cache = ScanCache::open(&path, config.cache_settings());

    match args.action {
        CacheCommand::Stats => {
            let stats = cache.stats();
            println!("Cache file:        {}", path.display());
            println!("Cached directories: {}", stats.cached_dir_count);
            println!("Cached files:      {}", stats.total_cached_files);
            println!("History entries:   {}", stats.history_size);
            println!(
                "Most scanned:      {}",
                stats.most_scanned_dir.as_deref().unwrap_or("-")
            );
            println!("Size on disk:      {} bytes", stats.store_size_bytes);
        }
        CacheCommand::Clear => {
            cache.clear().context("Failed to clear the scan cache")?;
            println!("Cache cleared: {}", path.display());
        }
    }
    Ok(ExitCode::Success)
}

/// Run a `config` subcommand. `target` defaults to
/// [`Config::default_path`].
///
/// # Errors
///
/// Returns an error when no location is known, the file exists and
/// `--force` was not given, or writing fails.
pub fn run_config_command(
    args: &ConfigArgs,
    config: &Config,
    target: Option<&Path>,
) -> Result<ExitCode> {
    let path = target
        .map(Path::to_path_buf)
        .or_else(Config::default_path)
        .context("Could not determine the configuration location")?;

    match args.action {
        ConfigCommand::Init { force } => {
            if path.exists() && !force {
                anyhow::bail!(
                    "Configuration file {} already exists (use --force to overwrite)",
                    path.display()
                );
            }
            config
                .save(&path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Configuration written to {}", path.display());
        }
    }
    Ok(ExitCode::Success)
}
