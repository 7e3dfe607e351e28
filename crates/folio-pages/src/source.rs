//! Backing storage for page sources.
//!
//! A [`PageSource`] maps logical page paths (`"index"`, `"blog/post1"`) to the
//! markdown text behind them. [`FsSource`] reads a directory tree;
//! [`MemorySource`] keeps everything in memory.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use walkdir::WalkDir;

use crate::error::PageError;

/// Source text of one page plus its modification time.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile {
    /// Raw file contents (front matter included)
    pub text: String,
    /// Last modification time, when the backend knows it
    pub modified: Option<SystemTime>,
}

/// Key-value access to page sources.
pub trait PageSource: Send + Sync {
    /// Backend identifier used in log messages.
    fn name(&self) -> &'static str;

    /// List every logical path the backend holds.
    fn list(&self) -> Result<Vec<String>, PageError>;

    /// Read a page source. `Ok(None)` means the page does not exist.
    fn read(&self, key: &str) -> Result<Option<SourceFile>, PageError>;

    /// Modification time of a page, or `None` if it is gone or unknown.
    fn modified(&self, key: &str) -> Option<SystemTime>;
}

/// Check that a logical path is a plain relative key.
///
/// Keys are `/`-separated, have no empty, `.` or `..` segments and no
/// backslashes, so they can never escape the content root.
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && !key.contains('\\')
        && key
            .split('/')
            .all(|segment| !segment.is_empty() && segment != "." && segment != "..")
}

/// Page sources stored as files under a root directory.
///
/// `<root>/blog/post1.md` is the page `blog/post1`.
#[derive(Debug, Clone)]
pub struct FsSource {
    root: PathBuf,
    extension: String,
}

impl FsSource {
    /// Create a source reading `*.{extension}` files below `root`.
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        let extension = extension.into();
        Self {
            root: root.into(),
            extension: extension.trim_start_matches('.').to_string(),
        }
    }

    fn file_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.{}", key, self.extension))
    }

    /// Convert a file below the root into its logical path.
    fn key_for(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let without_ext = relative.with_extension("");

        let mut segments = Vec::new();
        for component in without_ext.components() {
            match component {
                Component::Normal(part) => segments.push(part.to_str()?),
                _ => return None,
            }
        }

        Some(segments.join("/"))
    }
}

impl PageSource for FsSource {
    fn name(&self) -> &'static str {
        "fs"
    }

    fn list(&self) -> Result<Vec<String>, PageError> {
        if !self.root.is_dir() {
            return Err(PageError::io(
                &self.root,
                std::io::Error::new(std::io::ErrorKind::NotFound, "content directory not found"),
            ));
        }

        let mut keys = Vec::new();

        for entry in WalkDir::new(&self.root)
            .follow_links(true)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'))
        {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(self.root.as_path()).to_path_buf();
                PageError::io(path, e.into())
            })?;
            let path = entry.path();

            if !entry.file_type().is_file() {
                continue;
            }

            let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
            if ext != self.extension {
                continue;
            }

            match self.key_for(path) {
                Some(key) => keys.push(key),
                None => tracing::warn!("Skipping page with non UTF-8 path: {}", path.display()),
            }
        }

        keys.sort();
        Ok(keys)
    }

    fn read(&self, key: &str) -> Result<Option<SourceFile>, PageError> {
        if !is_valid_key(key) {
            return Err(PageError::InvalidPath(key.to_string()));
        }

        let path = self.file_path(key);
        if !path.is_file() {
            return Ok(None);
        }

        let text = fs::read_to_string(&path).map_err(|e| PageError::io(&path, e))?;
        let modified = fs::metadata(&path).and_then(|m| m.modified()).ok();

        Ok(Some(SourceFile { text, modified }))
    }

    fn modified(&self, key: &str) -> Option<SystemTime> {
        if !is_valid_key(key) {
            return None;
        }
        fs::metadata(self.file_path(key))
            .and_then(|m| m.modified())
            .ok()
    }
}

/// In-memory page sources.
///
/// Every write bumps a revision counter that doubles as the modification
/// time, so reload behaviour can be exercised without touching the disk.
#[derive(Debug, Default)]
pub struct MemorySource {
    pages: RwLock<BTreeMap<String, SourceFile>>,
    revision: RwLock<u64>,
}

impl MemorySource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style helper to add a page.
    pub fn with_page(self, key: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(key, text);
        self
    }

    /// Add or replace a page.
    pub fn insert(&self, key: impl Into<String>, text: impl Into<String>) {
        let modified = self.bump();
        self.pages
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                key.into(),
                SourceFile {
                    text: text.into(),
                    modified: Some(modified),
                },
            );
    }

    /// Remove a page.
    pub fn remove(&self, key: &str) {
        self.pages
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }

    fn bump(&self) -> SystemTime {
        let mut revision = self.revision.write().unwrap_or_else(PoisonError::into_inner);
        *revision += 1;
        UNIX_EPOCH + Duration::from_secs(*revision)
    }
}

impl PageSource for MemorySource {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn list(&self) -> Result<Vec<String>, PageError> {
        let pages = self.pages.read().unwrap_or_else(PoisonError::into_inner);
        Ok(pages.keys().cloned().collect())
    }

    fn read(&self, key: &str) -> Result<Option<SourceFile>, PageError> {
        let pages = self.pages.read().unwrap_or_else(PoisonError::into_inner);
        Ok(pages.get(key).cloned())
    }

    fn modified(&self, key: &str) -> Option<SystemTime> {
        let pages = self.pages.read().unwrap_or_else(PoisonError::into_inner);
        pages.get(key).and_then(|f| f.modified)
    }
}
