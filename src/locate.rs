//! Page location: mapping extensionless names to backing files.
//!
//! A page is a logical name without a forced extension. Location tries the
//! default extension, then the verbatim name, then any `<name>.*` sibling in
//! lexical order, and finally falls back to the default candidate as the
//! create target. All directory matching is literal string comparison, so
//! glob metacharacters in a name only ever match themselves.

use crate::error::Result;
use crate::exists::file_exists;
use crate::paths;
use std::fs;
use std::path::{Path, PathBuf};

/// Resolve a page name to its backing file path.
///
/// The returned path may not exist (step 4): it is then the target for a
/// subsequent create. Only the `<name>.*` fallback enumerates the directory.
pub fn page_file_path(
    root: &Path,
    default_ext: &str,
    name: &str,
    case_insensitive_fs: bool,
) -> Result<PathBuf> {
    let base = paths::resolve(root, name)?;
    let default_candidate = with_extension(&base, default_ext);
    if file_exists(&default_candidate, case_insensitive_fs) {
        return Ok(default_candidate);
    }
    if file_exists(&base, case_insensitive_fs) {
        return Ok(base);
    }
    if let Some(found) = first_extension_sibling(&base) {
        return Ok(found);
    }
    Ok(default_candidate)
}

/// Case-insensitive discovery of an existing relative path for a name.
///
/// An exact page or file hit returns the name with a leading slash. Queries
/// carrying glob or pattern metacharacters return `None` outright rather
/// than expanding into unintended matches. Otherwise a single-level
/// case-insensitive scan of the target directory decides; the match comes
/// back with its extension stripped unless the query itself carried one.
pub fn canonical_path(
    root: &Path,
    default_ext: &str,
    name: &str,
    case_insensitive_fs: bool,
) -> Result<Option<String>> {
    // Rejection comes before the exact-hit check: a metacharacter query
    // finds nothing even when a file of that literal name exists.
    if name.is_empty() || name.chars().any(|c| matches!(c, '*' | '?' | '[' | ']' | '\\')) {
        return Ok(None);
    }
    let located = page_file_path(root, default_ext, name, case_insensitive_fs)?;
    let resolved = paths::resolve(root, name)?;
    if file_exists(&located, case_insensitive_fs) || file_exists(&resolved, case_insensitive_fs) {
        let canonical = if name.starts_with('/') {
            name.to_string()
        } else {
            format!("/{name}")
        };
        return Ok(Some(canonical));
    }
    let name = name.strip_prefix('/').unwrap_or(name);
    if name.is_empty() {
        return Ok(None);
    }
    let (dir, dir_rel, base) = match name.rsplit_once('/') {
        Some((dir_rel, base)) => {
            // A directory part that normalizes to nothing ("./foo") scans
            // the root itself.
            let empty = paths::normalize(dir_rel).map(|s| s.is_empty()).unwrap_or(false);
            let dir = if empty {
                root.to_path_buf()
            } else {
                paths::resolve(root, dir_rel)?
            };
            (dir, Some(dir_rel), base)
        }
        None => (root.to_path_buf(), None, name),
    };
    if base.is_empty() {
        return Ok(None);
    }
    let has_extension = Path::new(base).extension().is_some();
    let base_lower = base.to_lowercase();
    let Ok(entries) = fs::read_dir(&dir) else {
        return Ok(None);
    };
    let mut candidates: Vec<String> = entries
        .flatten()
        .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
        .filter_map(|e| e.file_name().to_str().map(str::to_owned))
        .filter(|entry| {
            let entry_lower = entry.to_lowercase();
            if has_extension {
                entry_lower == base_lower
            } else {
                entry_lower
                    .strip_prefix(&base_lower)
                    .map(|rest| rest.starts_with('.'))
                    .unwrap_or(false)
            }
        })
        .collect();
    candidates.sort();
    let Some(matched) = candidates.into_iter().next() else {
        return Ok(None);
    };
    let matched = if has_extension {
        matched
    } else {
        Path::new(&matched)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&matched)
            .to_string()
    };
    Ok(Some(match dir_rel {
        Some(dir_rel) => format!("/{dir_rel}/{matched}"),
        None => format!("/{matched}"),
    }))
}

fn with_extension(base: &Path, ext: &str) -> PathBuf {
    let mut os = base.as_os_str().to_owned();
    os.push(".");
    os.push(ext);
    PathBuf::from(os)
}

/// First regular file named `<base>.<anything>` in lexical order.
fn first_extension_sibling(base: &Path) -> Option<PathBuf> {
    let parent = base.parent()?;
    let stem = base.file_name()?.to_str()?;
    let entries = fs::read_dir(parent).ok()?;
    let mut names: Vec<String> = entries
        .flatten()
        .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
        .filter_map(|e| e.file_name().to_str().map(str::to_owned))
        .filter(|n| n.len() > stem.len() && n.starts_with(stem) && n.as_bytes()[stem.len()] == b'.')
        .collect();
    names.sort();
    names.into_iter().next().map(|n| parent.join(n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn locate(root: &Path, name: &str) -> PathBuf {
        page_file_path(root, "md", name, false).unwrap()
    }

    #[test]
    fn test_default_extension_wins() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("foo.md"), "md").unwrap();
        fs::write(dir.path().join("foo.txt"), "txt").unwrap();
        assert_eq!(locate(dir.path(), "foo"), dir.path().join("foo.md"));
    }

    #[test]
    fn test_verbatim_name_is_second() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("foo"), "bare").unwrap();
        fs::write(dir.path().join("foo.txt"), "txt").unwrap();
        assert_eq!(locate(dir.path(), "foo"), dir.path().join("foo"));
    }

    #[test]
    fn test_lexical_glob_fallback() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("foo.txt"), "txt").unwrap();
        fs::write(dir.path().join("foo.adoc"), "adoc").unwrap();
        fs::write(dir.path().join("foobar.txt"), "other").unwrap();
        assert_eq!(locate(dir.path(), "foo"), dir.path().join("foo.adoc"));
    }

    #[test]
    fn test_missing_page_returns_create_target() {
        let dir = TempDir::new().unwrap();
        assert_eq!(locate(dir.path(), "new/page"), dir.path().join("new/page.md"));
    }

    #[test]
    fn test_metacharacters_in_names_stay_literal() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("who.md"), "who").unwrap();
        // A page literally named "who?" must not act as a wildcard.
        assert_eq!(locate(dir.path(), "who?"), dir.path().join("who?.md"));
    }

    #[test]
    fn test_canonical_path_exact_hit_keeps_name() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Home.md"), "h").unwrap();
        let hit = canonical_path(dir.path(), "md", "Home", false).unwrap();
        assert_eq!(hit.as_deref(), Some("/Home"));
    }

    #[test]
    fn test_canonical_path_case_insensitive_discovery() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("notes")).unwrap();
        fs::write(dir.path().join("notes/Weekly.md"), "w").unwrap();
        let hit = canonical_path(dir.path(), "md", "notes/weekly", false).unwrap();
        assert_eq!(hit.as_deref(), Some("/notes/Weekly"));
        let with_ext = canonical_path(dir.path(), "md", "notes/weekly.md", false).unwrap();
        assert_eq!(with_ext.as_deref(), Some("/notes/Weekly.md"));
    }

    #[test]
    fn test_canonical_path_rejects_metacharacters() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("star.md"), "s").unwrap();
        for query in ["st*r", "star?", "st[a]r", "s\\tar"] {
            assert_eq!(canonical_path(dir.path(), "md", query, false).unwrap(), None);
        }
        // Rejected even when a file of that literal name exists.
        fs::write(dir.path().join("who?.md"), "w").unwrap();
        assert_eq!(canonical_path(dir.path(), "md", "who?", false).unwrap(), None);
    }

    #[test]
    fn test_canonical_path_misses_cleanly() {
        let dir = TempDir::new().unwrap();
        assert_eq!(canonical_path(dir.path(), "md", "absent", false).unwrap(), None);
    }
}
