//! Case-aware file existence checks.
//!
//! A plain metadata check lies on case-insensitive filesystems: with only
//! `foo.txt` on disk, `Foo.TXT` reports as existing. When the filesystem
//! folds case we re-check against a directory listing, matching the file
//! stem case-sensitively while letting extension case vary. Strict stem,
//! lenient extension is deliberate and load-bearing for page lookups.

use std::ffi::OsStr;
use std::fs;
use std::path::Path;

const PROBE_NAME: &str = ".tome-case-probe";
const PROBE_NAME_SWAPPED: &str = ".TOME-CASE-PROBE";

/// Whether `path` exists as a regular file.
///
/// Directories never qualify. With `case_insensitive_fs` set, a metadata hit
/// is confirmed by a case-sensitive scan of the parent directory.
pub fn file_exists(path: &Path, case_insensitive_fs: bool) -> bool {
    let Ok(metadata) = fs::metadata(path) else {
        return false;
    };
    if !metadata.is_file() {
        return false;
    }
    if case_insensitive_fs {
        casefold_scan(path)
    } else {
        true
    }
}

/// Case-sensitive confirmation scan for folding filesystems.
///
/// Lists the parent directory and accepts a regular file whose stem equals
/// the query stem exactly and whose extension, when the query carries one,
/// matches case-insensitively.
fn casefold_scan(path: &Path) -> bool {
    let (Some(parent), Some(stem)) = (path.parent(), path.file_stem()) else {
        return false;
    };
    let extension = path.extension();
    let Ok(entries) = fs::read_dir(parent) else {
        return false;
    };
    for entry in entries.flatten() {
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }
        let name = entry.file_name();
        let entry_path = Path::new(&name);
        if entry_path.file_stem() != Some(stem) {
            continue;
        }
        match extension {
            None => return true,
            Some(ext) => {
                if entry_path
                    .extension()
                    .map(|e| eq_ignore_ascii_case(e, ext))
                    .unwrap_or(false)
                {
                    return true;
                }
            }
        }
    }
    false
}

fn eq_ignore_ascii_case(a: &OsStr, b: &OsStr) -> bool {
    match (a.to_str(), b.to_str()) {
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
        _ => a == b,
    }
}

/// Probe whether the filesystem backing `root` folds case.
///
/// Writes a one-off probe file and stats it under the swapped-case name.
/// Any I/O failure degrades to "case-sensitive", which only disables the
/// extra directory scan in [`file_exists`].
pub fn detect_case_insensitive(root: &Path) -> bool {
    let probe = root.join(PROBE_NAME);
    let swapped = root.join(PROBE_NAME_SWAPPED);
    let created = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&probe);
    if let Err(err) = created {
        tracing::debug!("case probe in {} failed: {}", root.display(), err);
        return false;
    }
    let insensitive = fs::metadata(&swapped).is_ok();
    if let Err(err) = fs::remove_file(&probe) {
        tracing::warn!("failed to remove case probe {}: {}", probe.display(), err);
    }
    tracing::debug!(
        "filesystem at {} is case-{}",
        root.display(),
        if insensitive { "insensitive" } else { "sensitive" }
    );
    insensitive
}
