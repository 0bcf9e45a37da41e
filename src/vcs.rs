//! Version-control collaborator.
//!
//! The store only needs "record these paths as a committed change": stage a
//! set of paths, commit with a message. The default implementation shells
//! out to `git`, initializing a repository in the root on first use.

use crate::error::Result;
use crate::shell::{shell_quote, ShellRunner};
use std::path::{Path, PathBuf};

/// What to stage: everything, or an explicit list of absolute paths.
#[derive(Debug, Clone)]
pub enum StageSet {
    All,
    Paths(Vec<PathBuf>),
}

/// Change-tracking operations the store delegates.
pub trait Vcs {
    fn stage(&self, root: &Path, set: &StageSet) -> Result<String>;
    fn commit(&self, root: &Path, message: &str) -> Result<String>;
}

/// Git over the command line.
#[derive(Debug, Default)]
pub struct GitCli {
    shell: ShellRunner,
}

impl GitCli {
    pub fn new() -> Self {
        GitCli {
            shell: ShellRunner::new(),
        }
    }

    fn run_git(&self, root: &Path, args: &str) -> Result<String> {
        if !root.join(".git").is_dir() {
            tracing::debug!("initializing git repository in {}", root.display());
            self.shell.run("git init", root)?;
        }
        self.shell.run(&format!("git {args}"), root)
    }
}

impl Vcs for GitCli {
    fn stage(&self, root: &Path, set: &StageSet) -> Result<String> {
        let args = match set {
            StageSet::All => "add --all".to_string(),
            StageSet::Paths(paths) => {
                let quoted: Vec<String> = paths
                    .iter()
                    .map(|p| shell_quote(&p.display().to_string()))
                    .collect();
                format!("add {}", quoted.join(" "))
            }
        };
        self.run_git(root, &args)
    }

    fn commit(&self, root: &Path, message: &str) -> Result<String> {
        self.run_git(root, &format!("commit -m {}", shell_quote(message)))
    }
}
