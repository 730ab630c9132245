//! Path normalization utilities.
//!
//! Cache keys must compare equal for every spelling of the same directory:
//! `/data/share`, `/data/share/`, `/data//share` and `/data/x/../share` all
//! map to one key. Keys are also NFC-normalized, since macOS hands out NFD
//! file names while Windows and Linux typically use NFC:
//!
//! - NFC: `café` - 'é' is U+00E9 (single code point)
//! - NFD: `café` - 'e' U+0065 + combining acute accent U+0301
//!
//! # Example
//!
//! ```
//! use fileinventory::scanner::path_utils::normalize_dir_key;
//! use std::path::Path;
//!
//! assert_eq!(
//!     normalize_dir_key(Path::new("/data//share/./x/../")),
//!     normalize_dir_key(Path::new("/data/share")),
//! );
//! ```

use std::path::{Component, Path, PathBuf};
use unicode_normalization::UnicodeNormalization;

/// Normalize a path string to NFC (Composed) form.
#[must_use]
pub fn normalize_path_str(s: &str) -> String {
    s.nfc().collect()
}

/// Check if two path strings are equal after NFC normalization.
#[must_use]
pub fn paths_equal(a: &str, b: &str) -> bool {
    normalize_path_str(a) == normalize_path_str(b)
}

/// Lexically normalize a path without touching the filesystem.
///
/// `.` components are dropped, `..` pops the previous normal component
/// (and is dropped at the root of an absolute path), and repeated or
/// trailing separators disappear. An empty result becomes `.`.
#[must_use]
pub fn lexical_normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    let mut normal_depth = 0usize;

    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                if normal_depth > 0 {
                    out.pop();
                    normal_depth -= 1;
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            Component::Normal(name) => {
                out.push(name);
                normal_depth += 1;
            }
        }
    }

    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// Build the cache key for a directory: lexical normalization plus NFC.
#[must_use]
pub fn normalize_dir_key(path: &Path) -> String {
    normalize_path_str(&lexical_normalize(path).to_string_lossy())
}

/// Heuristic check for a remote (UNC) path such as `\\server\share` or
/// `//server/share`.
///
/// Mapped drive letters are not probed; callers that know a path is remote
/// force network mode explicitly.
#[must_use]
pub fn is_network_path(path: &Path) -> bool {
    let s = path.to_string_lossy();
    let unc = s.starts_with(r"\\") || s.starts_with("//");
    // `\\?\C:\...` is a local verbatim path, not a share.
    unc && !s.starts_with(r"\\?\") && !s.starts_with(r"\\.\")
}
