//! Author resolution from folder structure.
//!
//! The author label is the name of the file's immediate parent directory.
//! A file sitting directly at the scan root has no author folder and gets
//! the [`UNKNOWN_AUTHOR`] sentinel instead of being skipped.

use std::path::Path;

/// Sentinel label for files with no enclosing author folder.
pub const UNKNOWN_AUTHOR: &str = "unknown";

/// Maximum length of the original-filename stem kept in output names.
const MAX_STEM_LEN: usize = 20;

/// Derive the author label for `path` relative to `scan_root`.
///
/// Case and spacing are preserved as-is; only the filename generator
/// sanitizes. Nested folders resolve to the immediate parent, not the
/// top-level author folder.
pub fn resolve_author(path: &Path, scan_root: &Path) -> String {
    match path.parent() {
        Some(parent) if parent != scan_root => parent
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(UNKNOWN_AUTHOR)
            .to_string(),
        _ => UNKNOWN_AUTHOR.to_string(),
    }
}

/// Sanitize a string for use as a filename component.
///
/// Keeps alphanumerics, `-` and `_`; spaces become `_`; everything else is
/// dropped.
pub fn sanitize_component(value: &str) -> String {
    value
        .trim()
        .chars()
        .filter_map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                Some(c)
            } else if c == ' ' {
                Some('_')
            } else {
                None
            }
        })
        .collect()
}

/// Sanitize and truncate an original-filename stem.
pub fn sanitize_stem(stem: &str) -> String {
    let sanitized = sanitize_component(stem);
    sanitized.chars().take(MAX_STEM_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_author_from_subfolder() {
        let root = PathBuf::from("/data/input-images");
        let path = root.join("author_name").join("image.jpg");
        assert_eq!(resolve_author(&path, &root), "author_name");
    }

    #[test]
    fn test_author_sentinel_at_root() {
        let root = PathBuf::from("/data/input-images");
        let path = root.join("image.jpg");
        assert_eq!(resolve_author(&path, &root), UNKNOWN_AUTHOR);
    }

    #[test]
    fn test_author_nested_uses_immediate_parent() {
        let root = PathBuf::from("/data/input-images");
        let path = root.join("test_author").join("subfolder").join("image.jpg");
        assert_eq!(resolve_author(&path, &root), "subfolder");
    }

    #[test]
    fn test_author_preserves_case_and_spacing() {
        let root = PathBuf::from("/data/input-images");
        let path = root.join("Jane Doe").join("image.jpg");
        assert_eq!(resolve_author(&path, &root), "Jane Doe");
    }

    #[test]
    fn test_sanitize_component() {
        assert_eq!(
            sanitize_component("author with spaces & symbols!"),
            "author_with_spaces__symbols"
        );
        assert_eq!(sanitize_component("ok-name_1"), "ok-name_1");
    }

    #[test]
    fn test_sanitize_stem_truncates() {
        let stem = "a_very_long_original_filename_stem";
        let sanitized = sanitize_stem(stem);
        assert_eq!(sanitized.chars().count(), 20);
        assert!(stem.starts_with(&sanitized));
    }
}
