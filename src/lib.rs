//! fileinventory - directory inventory exporter
//!
//! Walks a directory tree and exports one row per file (folder structure,
//! type, dates, document author), with content-based duplicate detection
//! (BLAKE3) and a time-boxed cache of recent scans.

pub mod app;
pub mod cache;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod notify;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

pub use app::run_app;
