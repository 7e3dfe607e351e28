//! Errors raised while loading pages.

use std::path::PathBuf;

use crate::frontmatter::FrontmatterError;

/// Errors that can occur when loading a page from its source.
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error("Invalid front matter in '{path}': {source}")]
    FrontMatter {
        path: String,
        #[source]
        source: FrontmatterError,
    },

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid page path: '{0}'")]
    InvalidPath(String),
}

impl PageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
