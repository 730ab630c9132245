//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Size-based file grouping (Phase 1)
//! - Quick hash comparison of head and tail samples (Phase 2)
//! - Full hash comparison (Phase 3)
//! - Group statistics, row annotation and the plain-text report

pub mod finder;
pub mod groups;
pub mod report;

pub use finder::{DetectionSummary, DetectorConfig, DuplicateDetector, PROGRESS_INTERVAL};
pub use groups::{
    annotate_duplicates, group_by_size, group_label, DuplicateGroup,
    DuplicateStats, GroupingStats, SizeGroup, UNIQUE_LABEL,
};
pub use report::{format_size, render_report, write_report, ReportError};
