//! Markdown pages with front matter and a lazily populated page store.
//!
//! This crate turns markdown source files into [`Page`] values and keeps them
//! in a [`PageStore`] keyed by logical path (the file path below the content
//! root, without extension).

pub mod error;
pub mod frontmatter;
pub mod page;
pub mod parser;
pub mod source;
pub mod store;

pub use error::PageError;
pub use frontmatter::{FrontmatterError, PageMeta};
pub use page::Page;
pub use parser::{parse_markdown, ParsedDoc, TocEntry};
pub use source::{is_valid_key, FsSource, MemorySource, PageSource, SourceFile};
pub use store::PageStore;
