//! Slash-delimited absolute paths.
//!
//! Paths are plain strings. There is no `.`/`..` handling: moving up is done
//! by the caller with [`parent`], never by the resolver.

use crate::{FsError, FsResult};

pub const SEPARATOR: char = '/';

/// Path of the root folder. Also the store key the root is kept under.
pub const ROOT_PATH: &str = "/";

/// Splits an absolute path into its non-empty segments.
///
/// `"/"` yields no segments; repeated or trailing separators are ignored.
pub fn segments(path: &str) -> FsResult<Vec<&str>> {
    if !path.starts_with(SEPARATOR) {
        return Err(FsError::InvalidPath {
            path: path.to_owned(),
            reason: "path must start with '/'",
        });
    }
    Ok(path
        .split(SEPARATOR)
        .filter(|segment| !segment.is_empty())
        .collect())
}

pub fn is_root(path: &str) -> bool {
    path.starts_with(SEPARATOR) && path.chars().all(|c| c == SEPARATOR)
}

/// Appends `name` to `parent` as a new final segment.
pub fn join(parent: &str, name: &str) -> String {
    if parent.ends_with(SEPARATOR) {
        format!("{parent}{name}")
    } else {
        format!("{parent}{SEPARATOR}{name}")
    }
}

/// Parent path of `path`, or `None` for the root.
pub fn parent(path: &str) -> Option<String> {
    let trimmed = path.trim_end_matches(SEPARATOR);
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.rfind(SEPARATOR) {
        Some(0) | None => Some(ROOT_PATH.to_owned()),
        Some(index) => Some(trimmed[..index].to_owned()),
    }
}

/// Final segment of `path`, or `None` for the root.
pub fn file_name(path: &str) -> Option<&str> {
    path.split(SEPARATOR).rev().find(|segment| !segment.is_empty())
}

/// Checks that `name` can be stored as a folder entry name.
///
/// Returns the reason on failure so callers can wrap it in their own error.
pub fn validate_name(name: &str) -> Result<(), &'static str> {
    if name.is_empty() {
        return Err("name is empty");
    }
    if name.contains(SEPARATOR) {
        return Err("name contains '/'");
    }
    if name == "." || name == ".." {
        return Err("name is reserved");
    }
    if name.chars().any(char::is_control) {
        return Err("name contains control characters");
    }
    Ok(())
}

pub(crate) fn check_name(name: &str) -> FsResult<()> {
    validate_name(name).map_err(|reason| FsError::InvalidName {
        name: name.to_owned(),
        reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_skip_empty_parts() {
        assert!(segments("/").unwrap().is_empty());
        assert_eq!(segments("/docs/readme").unwrap(), vec!["docs", "readme"]);
        assert_eq!(segments("//docs//readme/").unwrap(), vec!["docs", "readme"]);
    }

    #[test]
    fn segments_keep_names_verbatim() {
        assert_eq!(segments("/ a /B").unwrap(), vec![" a ", "B"]);
    }

    #[test]
    fn relative_paths_are_rejected() {
        assert!(matches!(
            segments("docs/readme"),
            Err(FsError::InvalidPath { .. })
        ));
        assert!(segments("").is_err());
    }

    #[test]
    fn join_never_collapses_parent() {
        assert_eq!(join("/", "docs"), "/docs");
        assert_eq!(join("/docs", "readme"), "/docs/readme");
        assert_eq!(join("/docs", ".."), "/docs/..");
    }

    #[test]
    fn parent_trims_last_segment() {
        assert_eq!(parent("/"), None);
        assert_eq!(parent("/docs").as_deref(), Some("/"));
        assert_eq!(parent("/docs/readme").as_deref(), Some("/docs"));
        assert_eq!(parent("/docs/readme/").as_deref(), Some("/docs"));
    }

    #[test]
    fn file_name_is_last_segment() {
        assert_eq!(file_name("/"), None);
        assert_eq!(file_name("/docs/readme"), Some("readme"));
        assert_eq!(file_name("/docs/"), Some("docs"));
    }

    #[test]
    fn root_detection() {
        assert!(is_root("/"));
        assert!(is_root("//"));
        assert!(!is_root("/docs"));
        assert!(!is_root(""));
    }

    #[test]
    fn names_are_validated() {
        assert!(validate_name("notes.txt").is_ok());
        assert!(validate_name("with space").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("a/b").is_err());
        assert!(validate_name("..").is_err());
        assert!(validate_name("tab\there").is_err());
    }
}
