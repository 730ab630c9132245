//! Filename and path classification.
//!
//! Pure functions that turn a filename into an extension and category label,
//! and a directory path into the ordered folder segments used for the
//! `Folder1..FolderN` columns of the export.
//!
//! # Example
//!
//! ```
//! use fileinventory::scanner::classify::{file_extension, file_type_category, parse_extensions};
//!
//! assert_eq!(file_extension("Report.PDF"), ".pdf");
//! assert_eq!(file_type_category(".pdf"), "PDF");
//! assert_eq!(parse_extensions(".PSD, tif,.Pdf"), vec![".psd", ".tif", ".pdf"]);
//! ```

use std::path::{Component, Path};

use super::path_utils::normalize_dir_key;

/// Category used when the extension is not in the lookup table.
pub const CATEGORY_OTHER: &str = "Other";

/// Category used for files without an extension.
pub const CATEGORY_NONE: &str = "No Extension";

/// Extension → category lookup table.
///
/// Extensions are lowercase and dot-prefixed, matching [`file_extension`].
const CATEGORY_TABLE: &[(&str, &[&str])] = &[
    (
        "Image",
        &[
            ".jpg", ".jpeg", ".png", ".gif", ".bmp", ".tif", ".tiff", ".webp", ".heic", ".heif",
            ".svg", ".ico", ".raw", ".cr2", ".nef", ".arw", ".dng",
        ],
    ),
    ("Design", &[".psd", ".ai", ".indd", ".eps", ".sketch", ".xd", ".fig"]),
    ("PDF", &[".pdf"]),
    ("Document", &[".doc", ".docx", ".odt", ".rtf", ".pages", ".wpd"]),
    (
        "Spreadsheet",
        &[".xls", ".xlsx", ".xlsm", ".xlsb", ".ods", ".csv", ".numbers"],
    ),
    ("Presentation", &[".ppt", ".pptx", ".odp", ".key"]),
    ("Text", &[".txt", ".md", ".log", ".ini", ".cfg", ".conf"]),
    (
        "Code",
        &[
            ".rs", ".py", ".js", ".ts", ".java", ".c", ".cpp", ".h", ".hpp", ".cs", ".go", ".rb",
            ".php", ".html", ".htm", ".css", ".json", ".xml", ".yaml", ".yml", ".toml", ".sh",
            ".ps1", ".bat", ".sql",
        ],
    ),
    (
        "Archive",
        &[".zip", ".rar", ".7z", ".tar", ".gz", ".bz2", ".xz", ".tgz", ".iso"],
    ),
    (
        "Audio",
        &[".mp3", ".wav", ".flac", ".aac", ".ogg", ".m4a", ".wma", ".aiff"],
    ),
    (
        "Video",
        &[".mp4", ".mov", ".avi", ".mkv", ".wmv", ".flv", ".webm", ".m4v", ".mpg", ".mpeg"],
    ),
    ("Executable", &[".exe", ".msi", ".dll", ".app", ".dmg", ".deb", ".rpm"]),
    ("Font", &[".ttf", ".otf", ".woff", ".woff2"]),
    ("Database", &[".db", ".sqlite", ".mdb", ".accdb"]),
];

/// Extract the lowercase, dot-prefixed extension of a filename.
///
/// Dot-files such as `.bashrc` have no extension and yield `""`.
/// A trailing dot (`"file."`) yields `"."`.
#[must_use]
pub fn file_extension(file_name: &str) -> String {
    match Path::new(file_name).extension() {
        Some(ext) => format!(".{}", ext.to_string_lossy().to_lowercase()),
        None => String::new(),
    }
}

/// Map an extension (as returned by [`file_extension`]) to its category label.
#[must_use]
pub fn file_type_category(extension: &str) -> &'static str {
    if extension.is_empty() {
        return CATEGORY_NONE;
    }
    let extension = extension.to_lowercase();
    CATEGORY_TABLE
        .iter()
        .find(|(_, extensions)| extensions.iter().any(|e| *e == extension))
        .map_or(CATEGORY_OTHER, |(category, _)| *category)
}

/// Parse a comma-separated list of extensions.
///
/// Each item is trimmed, lowercased and given a leading dot when missing.
/// Empty items are dropped; order is preserved.
#[must_use]
pub fn parse_extensions(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            let item = item.to_lowercase();
            if item.starts_with('.') {
                item
            } else {
                format!(".{item}")
            }
        })
        .collect()
}

/// Check whether an extension passes a (normalized) extension filter.
///
/// An empty filter accepts everything.
#[must_use]
pub fn extension_matches(extension: &str, filter: &[String]) -> bool {
    filter.is_empty() || filter.iter().any(|f| f.eq_ignore_ascii_case(extension))
}

/// Title-case a string word by word.
///
/// The first cased character of each word is upper-cased and every following
/// cased character lower-cased. A word starts after any uncased character
/// (whitespace, digits, punctuation), so `"o'neil"` becomes `"O'Neil"`.
/// Applying the function twice gives the same result as applying it once.
#[must_use]
pub fn title_case(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    let mut previous_cased = false;

    for c in segment.chars() {
        let cased = c.is_uppercase() || c.is_lowercase();
        if !cased {
            out.push(c);
            previous_cased = false;
            continue;
        }

        if previous_cased {
            out.extend(c.to_lowercase());
        } else {
            // Multi-char uppercase mappings (ß → SS) keep only their first
            // char upper so the result stays stable on a second pass.
            let mut upper = c.to_uppercase();
            if let Some(first) = upper.next() {
                out.push(first);
            }
            for rest in upper {
                out.extend(rest.to_lowercase());
            }
        }
        previous_cased = true;
    }

    out
}

/// Split a directory path into folder names relative to `base`.
///
/// The base prefix is removed component-wise, empty segments are dropped and
/// each segment is optionally title-cased. A directory outside `base` is
/// split as-is (root and prefix components are skipped).
#[must_use]
pub fn parse_folder_structure(directory: &Path, base: &Path, title: bool) -> Vec<String> {
    let relative = directory.strip_prefix(base).unwrap_or(directory);

    relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            _ => None,
        })
        .filter(|segment| !segment.is_empty())
        .map(|segment| if title { title_case(&segment) } else { segment })
        .collect()
}

/// Fit parsed segments into exactly `count` folder slots.
///
/// Segments beyond `count` are dropped; missing slots are `None`.
#[must_use]
pub fn folder_slots(segments: &[String], count: usize) -> Vec<Option<String>> {
    (0..count).map(|i| segments.get(i).cloned()).collect()
}

/// Name of the top-level folder of a directory path, used as the default
/// root label.
#[must_use]
pub fn root_folder_name(directory: &Path) -> String {
    let normalized = normalize_dir_key(directory);
    Path::new(&normalized)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or(normalized)
}
