//! Lexical path normalization and display helpers.
//!
//! Module identities must be canonical so that the dependency cache never
//! stores the same file under two spellings (`a/./b.ts` vs `a/b.ts`). The
//! normalization here is lexical only - symlinks are not resolved, and the
//! path does not need to exist.

use std::path::{Component, Path, PathBuf};

/// Normalizes a path by resolving `.` and `..` components lexically.
///
/// Unlike [`std::fs::canonicalize`], this works on paths that don't exist
/// and never hits the filesystem. A `..` at the root is dropped rather than
/// preserved.
///
/// # Examples
///
/// ```rust
/// use weft::utils::normalize_path;
/// use std::path::{Path, PathBuf};
///
/// assert_eq!(normalize_path(Path::new("/app/frontend/../common/util.ts")),
///            PathBuf::from("/app/common/util.ts"));
/// assert_eq!(normalize_path(Path::new("/app/./main.ts")),
///            PathBuf::from("/app/main.ts"));
/// ```
#[must_use]
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut components = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // keep leading RootDir/Prefix components intact
                match components.last() {
                    Some(Component::Normal(_)) => {
                        components.pop();
                    }
                    Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                    _ => {
                        components.pop();
                    }
                }
            }
            c => components.push(c),
        }
    }

    components.iter().collect()
}

/// Renders `path` relative to `root`, falling back to the absolute form when
/// the path lies outside the root.
///
/// Used by the dependency tree view to print local module identities as
/// root-relative strings instead of full absolute paths.
#[must_use]
pub fn relative_to(path: &Path, root: &Path) -> String {
    match path.strip_prefix(root) {
        Ok(rel) if rel.as_os_str().is_empty() => ".".to_string(),
        Ok(rel) => rel.to_string_lossy().replace('\\', "/"),
        Err(_) => path.to_string_lossy().replace('\\', "/"),
    }
}
