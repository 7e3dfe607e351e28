//! Lazily populated page store.
//!
//! [`PageStore::get`] parses a page the first time it is asked for and keeps
//! it cached. [`PageStore::list_all`] is the one expensive operation: it walks
//! the whole source and forces every page into the cache, so its result is the
//! complete set of pages rather than only those seen so far.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::SystemTime;

use crate::error::PageError;
use crate::page::Page;
use crate::source::{is_valid_key, PageSource};

/// A cached page and the source modification time it was parsed from.
#[derive(Debug, Clone)]
struct CachedPage {
    page: Page,
    modified: Option<SystemTime>,
}

/// Page store backed by a [`PageSource`].
pub struct PageStore {
    source: Arc<dyn PageSource>,
    auto_reload: bool,
    cache: HashMap<String, CachedPage>,
}

impl PageStore {
    /// Create a store over `source`.
    ///
    /// With `auto_reload`, cached pages are re-parsed when their source
    /// changes and dropped when it disappears.
    pub fn new(source: Arc<dyn PageSource>, auto_reload: bool) -> Self {
        Self {
            source,
            auto_reload,
            cache: HashMap::new(),
        }
    }

    /// Look up a page by logical path.
    ///
    /// Returns `Ok(None)` when no such page exists, including for paths that
    /// are not valid keys.
    pub fn get(&mut self, path: &str) -> Result<Option<Page>, PageError> {
        if !is_valid_key(path) {
            return Ok(None);
        }

        if let Some(entry) = self.cache.get(path) {
            if !self.auto_reload {
                return Ok(Some(entry.page.clone()));
            }

            if let Some(modified) = self.source.modified(path) {
                if entry.modified == Some(modified) {
                    return Ok(Some(entry.page.clone()));
                }
            }

            tracing::debug!("Reloading page '{}'", path);
        }

        self.load(path)
    }

    /// Force every page into the cache and return the complete set of paths.
    ///
    /// Each call walks the source afresh. Pages that fail to parse are still
    /// listed so callers can report them; they are logged and left uncached.
    pub fn list_all(&mut self) -> Result<BTreeSet<String>, PageError> {
        let paths: BTreeSet<String> = self
            .source
            .list()?
            .into_iter()
            .filter(|key| {
                let valid = is_valid_key(key);
                if !valid {
                    tracing::warn!("Ignoring page with invalid path '{}'", key);
                }
                valid
            })
            .collect();

        self.cache.retain(|key, _| paths.contains(key));

        for path in &paths {
            if let Err(e) = self.get(path) {
                tracing::warn!("{}", e);
            }
        }

        tracing::debug!(
            "Listed {} pages from {} source",
            paths.len(),
            self.source.name()
        );

        Ok(paths)
    }

    /// Paths currently held in the cache.
    pub fn cached_paths(&self) -> BTreeSet<String> {
        self.cache.keys().cloned().collect()
    }

    fn load(&mut self, path: &str) -> Result<Option<Page>, PageError> {
        let Some(file) = self.source.read(path)? else {
            self.cache.remove(path);
            return Ok(None);
        };

        let page = match Page::from_source(path, &file.text) {
            Ok(page) => page,
            Err(source) => {
                self.cache.remove(path);
                return Err(PageError::FrontMatter {
                    path: path.to_string(),
                    source,
                });
            }
        };

        self.cache.insert(
            path.to_string(),
            CachedPage {
                page: page.clone(),
                modified: file.modified,
            },
        );

        Ok(Some(page))
    }
}

impl std::fmt::Debug for PageStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageStore")
            .field("source", &self.source.name())
            .field("auto_reload", &self.auto_reload)
            .field("cached", &self.cache.len())
            .finish()
    }
}
