//! Duplicate grouping and size-based file organization.
//!
//! # Overview
//!
//! This module provides structures for grouping records by file size (the
//! first phase of duplicate detection), the confirmed [`DuplicateGroup`]s
//! the detector produces, their aggregate [`DuplicateStats`], and the
//! annotation of inventory rows with their group label.
//!
//! ## Size Grouping
//!
//! Files with different sizes cannot be duplicates, so sizes seen only once
//! are discarded before any content is read. Sizes are read from the
//! filesystem at grouping time; records whose file has disappeared are
//! dropped.
//!
//! # Example
//!
//! ```
//! use fileinventory::duplicates::{annotate_duplicates, UNIQUE_LABEL};
//! use fileinventory::scanner::FileRecord;
//!
//! let mut rows = vec![FileRecord::new("Share", "/data", "a.txt")];
//! annotate_duplicates(&mut rows, &[]);
//! assert_eq!(rows[0].duplicate_group.as_deref(), Some(UNIQUE_LABEL));
//! ```

use std::collections::HashMap;
use std::path::PathBuf;

use serde::Serialize;

use crate::scanner::{hash_to_hex, FileRecord, Hash};

/// Annotation for rows that belong to no duplicate group.
pub const UNIQUE_LABEL: &str = "Unique";

/// A group of input records whose files have the same size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeGroup {
    /// File size in bytes (shared by all members)
    pub size: u64,
    /// Input positions of the members, ascending
    pub members: Vec<usize>,
}

impl SizeGroup {
    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Statistics from the size grouping phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingStats {
    /// Records examined
    pub total_files: usize,
    /// Records whose file could not be stat'ed
    pub missing_files: usize,
    /// Records in size groups of two or more
    pub potential_duplicates: usize,
    /// Records eliminated because their size is unique
    pub eliminated_unique: usize,
}

/// Group records by the current size of their file.
///
/// Groups are ordered by the input position of their first member and only
/// sizes shared by two or more files are returned. Empty files take part
/// like any other size.
///
/// # Example
///
/// ```
/// use fileinventory::duplicates::group_by_size;
/// use fileinventory::scanner::FileRecord;
///
/// let rows = vec![FileRecord::new("R", "/nonexistent", "gone.txt")];
/// let (groups, stats) = group_by_size(&rows);
/// assert!(groups.is_empty());
/// assert_eq!(stats.missing_files, 1);
/// ```
#[must_use]
pub fn group_by_size(records: &[FileRecord]) -> (Vec<SizeGroup>, GroupingStats) {
    let mut stats = GroupingStats {
        total_files: records.len(),
        ..GroupingStats::default()
    };
    let mut groups: Vec<SizeGroup> = Vec::new();
    let mut by_size: HashMap<u64, usize> = HashMap::new();

    for (index, record) in records.iter().enumerate() {
        let size = match std::fs::metadata(&record.full_path) {
            Ok(metadata) if metadata.is_file() => metadata.len(),
            Ok(_) => {
                stats.missing_files += 1;
                continue;
            }
            Err(e) => {
                log::debug!("Cannot stat {}: {}", record.full_path.display(), e);
                stats.missing_files += 1;
                continue;
            }
        };

        let slot = *by_size.entry(size).or_insert_with(|| {
            groups.push(SizeGroup {
                size,
                members: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].members.push(index);
    }

    let before = groups.len();
    groups.retain(|group| {
        if group.len() < 2 {
            stats.eliminated_unique += group.len();
            false
        } else {
            stats.potential_duplicates += group.len();
            true
        }
    });

    log::debug!(
        "Size grouping: {} files, {} size groups, {} candidate groups, {} candidates",
        stats.total_files,
        before,
        groups.len(),
        stats.potential_duplicates
    );

    (groups, stats)
}

/// Confirmed group of files with identical content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateGroup {
    /// BLAKE3 hash of the file content
    #[serde(serialize_with = "serialize_hash")]
    pub hash: Hash,
    /// Size of each member in bytes
    pub size: u64,
    /// Sum of member sizes in bytes
    pub total_size: u64,
    /// Members in input order
    pub files: Vec<FileRecord>,
}

fn serialize_hash<S: serde::Serializer>(hash: &Hash, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&hash_to_hex(hash))
}

impl DuplicateGroup {
    /// Create a group of `files`, each `size` bytes long.
    #[must_use]
    pub fn new(hash: Hash, size: u64, files: Vec<FileRecord>) -> Self {
        Self {
            hash,
            size,
            total_size: size * files.len() as u64,
            files,
        }
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Number of duplicate copies (total - 1 original).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.files.len().saturating_sub(1)
    }

    /// Space taken by the copies: `total_size - total_size / len`.
    #[must_use]
    pub fn wasted_space(&self) -> f64 {
        if self.files.is_empty() {
            return 0.0;
        }
        let total = self.total_size as f64;
        total - total / self.files.len() as f64
    }

    /// Hash as hexadecimal string.
    #[must_use]
    pub fn hash_hex(&self) -> String {
        hash_to_hex(&self.hash)
    }

    /// Get just the paths of files in this group.
    #[must_use]
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.iter().map(|f| f.full_path.clone()).collect()
    }
}

/// Aggregate statistics over a set of duplicate groups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DuplicateStats {
    /// Number of groups
    pub group_count: usize,
    /// Copies beyond the first in every group
    pub duplicate_file_count: usize,
    /// Bytes recoverable by keeping one file per group
    pub wasted_bytes: u64,
    /// Member count of the largest group (0 when there are none)
    pub largest_group_size: usize,
}

impl DuplicateStats {
    /// Compute statistics for `groups`.
    #[must_use]
    pub fn from_groups(groups: &[DuplicateGroup]) -> Self {
        let wasted: f64 = groups
            .iter()
            .filter(|g| !g.is_empty())
            .map(|g| (g.len() - 1) as f64 * (g.total_size as f64 / g.len() as f64))
            .sum();

        Self {
            group_count: groups.len(),
            duplicate_file_count: groups.iter().map(DuplicateGroup::duplicate_count).sum(),
            wasted_bytes: wasted as u64,
            largest_group_size: groups.iter().map(DuplicateGroup::len).max().unwrap_or(0),
        }
    }
}

/// Label for the `index`-th (1-based) group.
#[must_use]
pub fn group_label(index: usize, group: &DuplicateGroup) -> String {
    format!("Group {} ({} files)", index, group.len())
}

/// Set `duplicate_group` on every record.
///
/// Members of a group (matched by full path) get `"Group <i> (<n> files)"`
/// with `i` the 1-based position in `groups`; every other record gets
/// [`UNIQUE_LABEL`].
pub fn annotate_duplicates(records: &mut [FileRecord], groups: &[DuplicateGroup]) {
    let mut labels: HashMap<&PathBuf, String> = HashMap::new();
    for (i, group) in groups.iter().enumerate() {
        let label = group_label(i + 1, group);
        for file in &group.files {
            labels.entry(&file.full_path).or_insert_with(|| label.clone());
        }
    }

    for record in records.iter_mut() {
        record.duplicate_group = Some(
            labels
                .get(&record.full_path)
                .cloned()
                .unwrap_or_else(|| UNIQUE_LABEL.to_string()),
        );
    }
}
