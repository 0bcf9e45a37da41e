//! Error types for wiki store operations.

use std::path::PathBuf;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by wiki store operations.
///
/// Path-safety violations (`InvalidPath`) are always fatal to the call and
/// never silently clamped. Read-only lookups that find nothing return empty
/// values instead of erroring.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A logical name escaped the wiki root (or resolved to the root itself).
    #[error("path {0:?} is not inside the wiki root")]
    InvalidPath(String),

    /// A write was attempted on a record that has no path assigned.
    #[error("file record has no path set")]
    MissingPath,

    /// A move target already resolves to an existing file.
    #[error("cannot move file to {0:?}: file already exists")]
    AlreadyExists(String),

    /// Invalid store configuration.
    #[error("invalid wiki configuration: {0}")]
    Config(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Front-matter metadata could not be parsed or serialized.
    #[error("front matter error: {0}")]
    Meta(#[from] serde_yaml::Error),

    /// An external command exited with a non-zero status.
    #[error("command {command:?} failed with status {status} in {dir:?}: {stderr}")]
    Command {
        command: String,
        status: i32,
        dir: PathBuf,
        stderr: String,
    },
}
