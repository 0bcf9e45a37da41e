//! The wiki store: composes path resolution, page location and record
//! handling over a single root directory.
//!
//! All operations are synchronous blocking I/O. The store assumes exclusive
//! access to its root for the duration of any mutating call; concurrent
//! writers against the same root can race between the existence check and
//! the write.

use crate::error::{Error, Result};
use crate::exists;
use crate::frontmatter;
use crate::locate;
use crate::paths;
use crate::record::File;
use crate::shell::{self, ShellRunner};
use crate::vcs::{GitCli, StageSet, Vcs};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use walkdir::WalkDir;

fn default_extension() -> String {
    "md".to_string()
}

/// Wiki store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WikiConfig {
    /// Root directory all logical names resolve under.
    pub path: PathBuf,

    /// Extension tried first when resolving pages.
    #[serde(default = "default_extension")]
    pub default_extension: String,
}

impl WikiConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        WikiConfig {
            path: path.into(),
            default_extension: default_extension(),
        }
    }
}

/// Filesystem-backed content store rooted at a single directory.
pub struct Wiki {
    root: PathBuf,
    default_extension: String,
    vcs: Box<dyn Vcs>,
    shell: ShellRunner,
    case_insensitive: OnceLock<bool>,
}

impl Wiki {
    pub fn new(config: WikiConfig) -> Result<Self> {
        if config.path.as_os_str().is_empty() {
            return Err(Error::Config("wiki root path must not be empty".into()));
        }
        let root = if config.path.exists() {
            dunce::canonicalize(&config.path)?
        } else if config.path.is_absolute() {
            config.path
        } else {
            std::env::current_dir()?.join(config.path)
        };
        Ok(Wiki {
            root,
            default_extension: config.default_extension,
            vcs: Box::new(GitCli::new()),
            shell: ShellRunner::new(),
            case_insensitive: OnceLock::new(),
        })
    }

    /// Open a store with default configuration at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        Wiki::new(WikiConfig::new(path))
    }

    /// Replace the version-control collaborator.
    pub fn with_vcs(mut self, vcs: Box<dyn Vcs>) -> Self {
        self.vcs = vcs;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn default_extension(&self) -> &str {
        &self.default_extension
    }

    /// Whether the filesystem backing the root folds case. Probed once and
    /// cached for the store's lifetime; an absent root reads as sensitive
    /// without caching so a later-created root still gets probed.
    fn fs_case_insensitive(&self) -> bool {
        if let Some(cached) = self.case_insensitive.get() {
            return *cached;
        }
        if !self.root.is_dir() {
            return false;
        }
        *self
            .case_insensitive
            .get_or_init(|| exists::detect_case_insensitive(&self.root))
    }

    fn file_exists(&self, path: &Path) -> bool {
        exists::file_exists(path, self.fs_case_insensitive())
    }

    // ==files

    /// Resolve a logical name to its absolute path under the root.
    pub fn file_path(&self, name: &str) -> Result<PathBuf> {
        paths::resolve(&self.root, name)
    }

    /// Containing directory for a logical name.
    pub fn file_dir(&self, name: &str) -> Result<PathBuf> {
        let path = self.file_path(name)?;
        path.parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| Error::InvalidPath(name.to_string()))
    }

    pub fn has_file(&self, name: &str) -> Result<bool> {
        let path = self.file_path(name)?;
        Ok(self.file_exists(&path))
    }

    /// Fetch a file record for `name`.
    ///
    /// When the resolved path exists the record gets a lazy reader; markdown
    /// files get a single shared front-matter parse feeding both metadata
    /// and content. A missing path yields an empty record carrying only the
    /// relative path, ready to be filled in and written.
    pub fn get_file(&self, name: &str) -> Result<File> {
        let path = self.file_path(name)?;
        let mut file = File::with_path(paths::relative(&self.root, &path)?);
        if self.file_exists(&path) {
            if file.is_markdown() {
                file.set_parse_loader(Box::new(move || {
                    let raw = fs::read_to_string(&path)?;
                    frontmatter::split(&raw)
                }));
            } else {
                file.set_content_loader(Box::new(move || Ok(fs::read_to_string(&path)?)));
            }
        }
        Ok(file)
    }

    /// Write a record back to disk.
    ///
    /// Markdown records with non-empty metadata are serialized with a
    /// front-matter block. The write is idempotent: returns `true` only when
    /// bytes actually hit the disk.
    pub fn write_file(&self, file: &mut File) -> Result<bool> {
        let name = file.path().ok_or(Error::MissingPath)?.to_string();
        let path = self.file_path(&name)?;
        if let Some(dir) = path.parent() {
            if !dir.is_dir() {
                fs::create_dir_all(dir)?;
            }
        }
        let is_markdown = file.is_markdown();
        let meta = file.meta()?.clone();
        let body = file.content()?.to_string();
        let content = if is_markdown && !meta.is_empty() {
            frontmatter::join(&meta, &body)?
        } else {
            body
        };
        if !self.file_exists(&path) || fs::read_to_string(&path)? != content {
            fs::write(&path, &content)?;
            tracing::debug!("wrote {} ({} bytes)", path.display(), content.len());
            return Ok(true);
        }
        Ok(false)
    }

    /// Move a record to a new logical name.
    ///
    /// Fails with [`Error::AlreadyExists`] when the target already resolves
    /// to an existing file, leaving both files untouched. The record's path
    /// is updated after the rename succeeds.
    pub fn move_file(&self, file: &mut File, name: &str) -> Result<()> {
        if self.has_file(name)? {
            return Err(Error::AlreadyExists(name.to_string()));
        }
        let old_path = self.file_path(file.path().ok_or(Error::MissingPath)?)?;
        let new_path = self.file_path(name)?;
        if let Some(dir) = new_path.parent() {
            if !dir.is_dir() {
                fs::create_dir_all(dir)?;
            }
        }
        fs::rename(&old_path, &new_path)?;
        tracing::debug!("moved {} -> {}", old_path.display(), new_path.display());
        file.set_path(paths::relative(&self.root, &new_path)?);
        Ok(())
    }

    /// Delete the record's backing file. Returns `false` when there was
    /// nothing to remove.
    pub fn remove_file(&self, file: &File) -> Result<bool> {
        let name = file.path().ok_or(Error::MissingPath)?;
        if !self.has_file(name)? {
            return Ok(false);
        }
        let path = self.file_path(name)?;
        fs::remove_file(&path)?;
        tracing::debug!("removed {}", path.display());
        Ok(true)
    }

    /// Write the record, stage its path and commit.
    ///
    /// The default message is `content(<name>): <timestamp>`, with the
    /// default extension trimmed off the name.
    pub fn commit_file(&self, file: &mut File, message: Option<&str>) -> Result<String> {
        self.write_file(file)?;
        let name = file.path().ok_or(Error::MissingPath)?.to_string();
        let message = match message {
            Some(m) => m.to_string(),
            None => {
                let suffix = format!(".{}", self.default_extension);
                let trimmed = name.strip_suffix(&suffix).unwrap_or(&name);
                format!("content({trimmed}): {}", timestamp())
            }
        };
        let path = self.file_path(&name)?;
        self.stage(&StageSet::Paths(vec![path]))?;
        self.commit(Some(&message))
    }

    // ==pages

    /// Resolve a page name to its backing file path (which may not exist
    /// yet).
    pub fn page_file_path(&self, name: &str) -> Result<PathBuf> {
        locate::page_file_path(
            &self.root,
            &self.default_extension,
            name,
            self.fs_case_insensitive(),
        )
    }

    pub fn has_page(&self, name: &str) -> Result<bool> {
        let path = self.page_file_path(name)?;
        Ok(self.file_exists(&path))
    }

    /// Fetch the record backing a page name.
    pub fn get_page(&self, name: &str) -> Result<File> {
        let path = self.page_file_path(name)?;
        self.get_file(&paths::relative(&self.root, &path)?)
    }

    /// Canonical relative path for a possibly differently-cased name, or
    /// `None` when nothing matches.
    pub fn canonical_path(&self, name: &str) -> Result<Option<String>> {
        locate::canonical_path(
            &self.root,
            &self.default_extension,
            name,
            self.fs_case_insensitive(),
        )
    }

    /// All page names under the root: files carrying the default extension,
    /// relative, extension stripped, sorted. The `.git` directory is never
    /// enumerated.
    pub fn page_paths(&self) -> Result<Vec<String>> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }
        let suffix = format!(".{}", self.default_extension);
        let mut pages = Vec::new();
        let walker = WalkDir::new(&self.root)
            .into_iter()
            .filter_entry(|e| e.file_name() != ".git");
        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(err) => {
                    tracing::warn!("skipping unreadable entry under {}: {}", self.root.display(), err);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let rel = paths::relative(&self.root, entry.path())?;
            if let Some(page) = rel.strip_suffix(&suffix) {
                pages.push(page.to_string());
            }
        }
        pages.sort();
        Ok(pages)
    }

    // ==versioning

    /// Stage a set of paths with the version-control collaborator.
    pub fn stage(&self, set: &StageSet) -> Result<String> {
        self.vcs.stage(&self.root, set)
    }

    /// Commit staged changes. Without a message, `content: <timestamp>` is
    /// used.
    pub fn commit(&self, message: Option<&str>) -> Result<String> {
        let message = match message {
            Some(m) => m.to_string(),
            None => format!("content: {}", timestamp()),
        };
        self.vcs.commit(&self.root, &message)
    }

    // ==shell

    /// Run a shell command template, substituting `{{path}}`, `{{fileName}}`
    /// and `{{dir}}` from the given record. Runs in `dir`, defaulting to the
    /// root.
    pub fn run(&self, command: &str, file: Option<&File>, dir: Option<&Path>) -> Result<String> {
        let command = match file {
            Some(file) => {
                let name = file.path().ok_or(Error::MissingPath)?;
                let path = self.file_path(name)?;
                shell::substitute(command, &path)
            }
            None => command.to_string(),
        };
        self.shell.run(&command, dir.unwrap_or(&self.root))
    }
}

fn timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}
