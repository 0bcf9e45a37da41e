//! Path normalization and root confinement.
//!
//! Every caller-supplied name routes through [`resolve`] before any
//! filesystem access. Normalization is purely textual (no `realpath`, no
//! symlink resolution) so it works for paths that do not exist yet.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Normalize a slash-separated path into its segments.
///
/// Empty and `.` segments are dropped; `..` pops the last accumulated
/// segment. Returns `None` when a `..` would pop past the start, which marks
/// the input as a traversal escape rather than clamping it to the root.
pub fn normalize(path: &str) -> Option<Vec<String>> {
    let mut segments: Vec<String> = Vec::new();
    for bit in path.split('/') {
        match bit {
            "" | "." => continue,
            ".." => {
                segments.pop()?;
            }
            _ => segments.push(bit.to_string()),
        }
    }
    Some(segments)
}

/// Re-join normalized segments into the canonical absolute string form.
pub fn join_absolute(segments: &[String]) -> String {
    format!("/{}", segments.join("/"))
}

/// Resolve a logical name to an absolute path confined to `root`.
///
/// The candidate is `root/name` normalized; it must extend the normalized
/// root by at least one segment. The comparison is segment-aligned, so a
/// name like `../tmpx/foo` under root `/tmp` is rejected even though the
/// flattened string happens to start with `/tmp`.
pub fn resolve(root: &Path, name: &str) -> Result<PathBuf> {
    let root_str = root.to_str().ok_or_else(|| Error::InvalidPath(name.to_string()))?;
    let candidate = if name == "/" {
        format!("{root_str}{name}")
    } else {
        format!("{root_str}/{name}")
    };
    let root_segments =
        normalize(root_str).ok_or_else(|| Error::InvalidPath(name.to_string()))?;
    let candidate_segments =
        normalize(&candidate).ok_or_else(|| Error::InvalidPath(name.to_string()))?;
    if candidate_segments.len() <= root_segments.len()
        || candidate_segments[..root_segments.len()] != root_segments[..]
    {
        return Err(Error::InvalidPath(name.to_string()));
    }
    Ok(PathBuf::from(join_absolute(&candidate_segments)))
}

/// Map an absolute path back to its location relative to `root`.
///
/// The root itself maps to `""`; anything outside the root is an
/// `InvalidPath`. The result carries no leading slash.
pub fn relative(root: &Path, path: &Path) -> Result<String> {
    let as_str = |p: &Path, label: &Path| {
        p.to_str()
            .map(str::to_owned)
            .ok_or_else(|| Error::InvalidPath(label.display().to_string()))
    };
    let path_str = as_str(path, path)?;
    let root_str = as_str(root, path)?;
    let path_segments =
        normalize(&path_str).ok_or_else(|| Error::InvalidPath(path_str.clone()))?;
    let root_segments =
        normalize(&root_str).ok_or_else(|| Error::InvalidPath(path_str.clone()))?;
    if path_segments.len() < root_segments.len()
        || path_segments[..root_segments.len()] != root_segments[..]
    {
        return Err(Error::InvalidPath(path_str));
    }
    Ok(path_segments[root_segments.len()..].join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_normalize_drops_empty_and_dot_segments() {
        assert_eq!(
            normalize("/a//b/./c").unwrap(),
            vec!["a".to_string(), "b".to_string(), "c".to_string()]
        );
        assert_eq!(normalize("/").unwrap(), Vec::<String>::new());
    }

    #[test]
    fn test_normalize_pops_parent_segments() {
        assert_eq!(
            normalize("/a/b/../c").unwrap(),
            vec!["a".to_string(), "c".to_string()]
        );
        assert!(normalize("/a/../..").is_none());
        assert!(normalize("../a").is_none());
    }

    #[test]
    fn test_resolve_accepts_nested_names() {
        let root = Path::new("/wiki");
        for name in ["foo", "foo/bar", "foo-bar", "foo.bar", "a/./b"] {
            let resolved = resolve(root, name).unwrap();
            assert!(resolved.starts_with("/wiki"), "{name} should stay under root");
        }
        assert_eq!(resolve(root, "foo/bar").unwrap(), PathBuf::from("/wiki/foo/bar"));
    }

    #[test]
    fn test_resolve_rejects_escapes_and_root_itself() {
        let root = Path::new("/wiki");
        for name in ["../foo", "./foo-bar/../../../foo/bar", "", ".", "a/.."] {
            assert!(
                matches!(resolve(root, name), Err(Error::InvalidPath(_))),
                "{name:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_resolve_rejects_sibling_prefix_escape() {
        // "/wikix/foo" starts with "/wiki" as a string but is not inside it.
        assert!(resolve(Path::new("/wiki"), "../wikix/foo").is_err());
    }

    #[test]
    fn test_relative_strips_root() {
        let root = Path::new("/wiki");
        assert_eq!(relative(root, Path::new("/wiki/a/b.md")).unwrap(), "a/b.md");
        assert_eq!(relative(root, Path::new("/wiki")).unwrap(), "");
        assert!(relative(root, Path::new("/etc/passwd")).is_err());
    }

    proptest! {
        #[test]
        fn resolved_names_never_escape_the_root(name in "[a-zA-Z0-9./]{0,32}") {
            let root = Path::new("/wiki/root");
            if let Ok(resolved) = resolve(root, &name) {
                let segments = normalize(resolved.to_str().unwrap()).unwrap();
                prop_assert!(segments.len() > 2);
                prop_assert_eq!(&segments[0], "wiki");
                prop_assert_eq!(&segments[1], "root");
            }
        }

        #[test]
        fn names_with_escaping_dotdot_are_rejected(tail in "[a-z]{1,8}") {
            let root = Path::new("/wiki");
            let direct = format!("../{tail}");
            let nested = format!("a/../../{tail}");
            prop_assert!(resolve(root, &direct).is_err());
            prop_assert!(resolve(root, &nested).is_err());
        }
    }
}
