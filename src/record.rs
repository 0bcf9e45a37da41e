//! File records: detached content snapshots with lazy loading.
//!
//! A [`File`] never holds an open handle; the store hands it a pending
//! loader when the backing path exists and the record realizes content and
//! metadata on first access. Markdown records use a single front-matter
//! parse to fill both fields, so reading either one never parses twice.

use crate::error::Result;
use serde_yaml::Mapping;
use std::fmt;
use std::path::Path;

/// Extensions classified as markdown for front-matter handling.
pub const MARKDOWN_EXTENSIONS: [&str; 6] = ["markdown", "md", "mdown", "mdwn", "mkd", "mkdn"];

type ContentThunk = Box<dyn FnOnce() -> Result<String> + Send>;
type ParseThunk = Box<dyn FnOnce() -> Result<(Mapping, String)> + Send>;

/// Pending producer for a record's unrealized fields.
///
/// Invoked at most once; errors consume it. `FrontMatter` yields metadata
/// and body from one parse pass.
enum Loader {
    None,
    Content(ContentThunk),
    FrontMatter(ParseThunk),
}

/// A wiki file or page: relative path, content, and optional metadata.
pub struct File {
    path: Option<String>,
    content: Option<String>,
    meta: Option<Mapping>,
    loader: Loader,
}

impl File {
    pub fn new() -> Self {
        File {
            path: None,
            content: None,
            meta: None,
            loader: Loader::None,
        }
    }

    pub fn with_path(path: impl Into<String>) -> Self {
        let mut file = File::new();
        file.path = Some(path.into());
        file
    }

    /// Location relative to the wiki root, if assigned.
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn set_path(&mut self, path: impl Into<String>) {
        self.path = Some(path.into());
    }

    /// File name component of the path.
    pub fn file_name(&self) -> Option<&str> {
        self.path
            .as_deref()
            .and_then(|p| Path::new(p).file_name())
            .and_then(|n| n.to_str())
    }

    /// Extension derived from the path.
    pub fn extension(&self) -> Option<&str> {
        self.path
            .as_deref()
            .and_then(|p| Path::new(p).extension())
            .and_then(|e| e.to_str())
    }

    pub fn is_markdown(&self) -> bool {
        self.extension()
            .map(|ext| MARKDOWN_EXTENSIONS.contains(&ext))
            .unwrap_or(false)
    }

    /// The record's content, realizing a pending loader on first access.
    pub fn content(&mut self) -> Result<&str> {
        self.realize()?;
        Ok(self.content.get_or_insert_with(String::new))
    }

    /// Replace the content, leaving any pending metadata loader intact.
    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = Some(content.into());
        if matches!(self.loader, Loader::Content(_)) {
            self.loader = Loader::None;
        }
    }

    /// The record's metadata, realizing a pending loader on first access.
    /// An absent mapping reads as empty.
    pub fn meta(&mut self) -> Result<&Mapping> {
        self.realize()?;
        Ok(self.meta.get_or_insert_with(Mapping::new))
    }

    pub fn set_meta(&mut self, meta: Mapping) {
        self.meta = Some(meta);
    }

    pub(crate) fn set_content_loader(&mut self, thunk: ContentThunk) {
        self.loader = Loader::Content(thunk);
    }

    pub(crate) fn set_parse_loader(&mut self, thunk: ParseThunk) {
        self.loader = Loader::FrontMatter(thunk);
    }

    /// Run the pending loader, memoizing into whichever fields are still
    /// unset. Explicitly assigned values are never overwritten.
    fn realize(&mut self) -> Result<()> {
        match std::mem::replace(&mut self.loader, Loader::None) {
            Loader::None => {}
            Loader::Content(thunk) => {
                let content = thunk()?;
                if self.content.is_none() {
                    self.content = Some(content);
                }
            }
            Loader::FrontMatter(thunk) => {
                let (meta, body) = thunk()?;
                if self.meta.is_none() {
                    self.meta = Some(meta);
                }
                if self.content.is_none() {
                    self.content = Some(body);
                }
            }
        }
        Ok(())
    }
}

impl Default for File {
    fn default() -> Self {
        File::new()
    }
}

impl fmt::Debug for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("File")
            .field("path", &self.path)
            .field("content", &self.content.as_ref().map(|c| c.len()))
            .field("meta", &self.meta.as_ref().map(|m| m.len()))
            .field("pending", &!matches!(self.loader, Loader::None))
            .finish()
    }
}
