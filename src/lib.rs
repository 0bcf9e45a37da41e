//! Tome: Filesystem-Backed Wiki Content Store
//!
//! Maps logical page and file names to real files under a single root
//! directory, with safe path resolution, extensionless page lookup,
//! case-folding-aware existence checks, lazy front-matter records and
//! git-backed change tracking.

pub mod error;
pub mod exists;
pub mod frontmatter;
pub mod locate;
pub mod paths;
pub mod record;
pub mod shell;
pub mod vcs;
pub mod wiki;

pub use error::{Error, Result};
pub use record::{File, MARKDOWN_EXTENSIONS};
pub use vcs::{GitCli, StageSet, Vcs};
pub use wiki::{Wiki, WikiConfig};
