//! Mapping between request paths and logical page paths.
//!
//! Request paths come in three shapes, all served by the same page:
//!
//! | request              | logical path   |
//! |----------------------|----------------|
//! | `/`, `/index.html`   | `index`        |
//! | `/about.html`        | `about`        |
//! | `/blog/`, `/blog`    | `blog/index`   |
//!
//! [`url_for`] is the inverse used by the freezer: it picks one canonical URL
//! per logical path.

use folio_pages::{Page, PageStore};

use crate::error::SiteError;

/// Logical path of the site root.
pub const INDEX: &str = "index";

/// Turn a request path into the first logical path to look up.
pub fn candidate_path(request_path: &str) -> String {
    let path = request_path.trim_start_matches('/');

    if path.is_empty() {
        return INDEX.to_string();
    }

    if let Some(dir) = path.strip_suffix('/') {
        return format!("{}/{}", dir.trim_end_matches('/'), INDEX);
    }

    path.strip_suffix(".html").unwrap_or(path).to_string()
}

fn is_index(path: &str) -> bool {
    path == INDEX || path.ends_with("/index")
}

/// Resolve a request path to a page.
///
/// Tries the path itself, then `path/index` for directory-style URLs.
pub fn resolve(store: &mut PageStore, request_path: &str) -> Result<Page, SiteError> {
    let candidate = candidate_path(request_path);

    if let Some(page) = store.get(&candidate)? {
        tracing::debug!("Resolved '{}' to '{}'", request_path, page.path);
        return Ok(page);
    }

    if !is_index(&candidate) {
        let index = format!("{}/{}", candidate, INDEX);
        if let Some(page) = store.get(&index)? {
            tracing::debug!("Resolved '{}' to '{}'", request_path, page.path);
            return Ok(page);
        }
    }

    Err(SiteError::ContentNotFound(request_path.to_string()))
}

/// Canonical URL for a logical path.
///
/// `index` becomes `/`, `x/index` becomes `/x/`, anything else gains `.html`.
pub fn url_for(logical_path: &str) -> String {
    if logical_path == INDEX {
        return "/".to_string();
    }

    match logical_path.strip_suffix("/index") {
        Some(dir) => format!("/{}/", dir),
        None => format!("/{}.html", logical_path),
    }
}
