//! The rendered page value handed out by the store.

use serde::Serialize;

use crate::frontmatter::{FrontmatterError, PageMeta};
use crate::parser::{parse_markdown, TocEntry};

/// One rendered content unit.
///
/// Pages are created by the [`PageStore`](crate::PageStore) on lookup and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    /// Logical path (store key, no extension), e.g. `blog/post1`
    pub path: String,

    /// Front matter metadata
    pub meta: PageMeta,

    /// Rendered HTML body
    pub body: String,

    /// Markdown source without front matter
    pub source: String,

    /// Table of contents
    pub toc: Vec<TocEntry>,
}

impl Page {
    /// Parse and render a page from its source text.
    pub fn from_source(path: impl Into<String>, text: &str) -> Result<Self, FrontmatterError> {
        let doc = parse_markdown(text)?;

        Ok(Self {
            path: path.into(),
            meta: doc.meta,
            body: doc.html,
            source: doc.content,
            toc: doc.toc,
        })
    }

    /// Title from front matter, or the empty string.
    pub fn title(&self) -> &str {
        self.meta.title.as_deref().unwrap_or("")
    }

    /// Template requested by front matter, if any.
    pub fn template(&self) -> Option<&str> {
        self.meta.template.as_deref()
    }
}
