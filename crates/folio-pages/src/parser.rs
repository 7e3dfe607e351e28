//! Markdown page parser.

use pulldown_cmark::{html, Event, Options, Parser, Tag, TagEnd};
use serde::Serialize;

use crate::frontmatter::{extract_frontmatter, FrontmatterError, PageMeta};

/// A parsed markdown document.
#[derive(Debug, Clone)]
pub struct ParsedDoc {
    /// Front matter metadata (default when the file has none)
    pub meta: PageMeta,

    /// Markdown content (without front matter)
    pub content: String,

    /// Rendered HTML
    pub html: String,

    /// Table of contents entries
    pub toc: Vec<TocEntry>,
}

/// A table of contents entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TocEntry {
    /// Heading text
    pub title: String,
    /// Anchor ID
    pub id: String,
    /// Heading level (1-6)
    pub level: u8,
}

/// Parse a markdown document and render it to HTML.
///
/// Extracts front matter, renders the body, and builds a table of contents.
pub fn parse_markdown(source: &str) -> Result<ParsedDoc, FrontmatterError> {
    let (meta, content) = extract_frontmatter(source)?;

    let options = Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS;

    let events: Vec<Event<'_>> = Parser::new_ext(content, options).collect();

    let mut toc = Vec::new();
    let mut current_heading: Option<(u8, String)> = None; // (level, text)

    for event in &events {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                current_heading = Some((*level as u8, String::new()));
            }

            Event::Text(text) | Event::Code(text) => {
                if let Some((_, ref mut heading_text)) = current_heading {
                    heading_text.push_str(text);
                }
            }

            Event::End(TagEnd::Heading(_)) => {
                if let Some((level, title)) = current_heading.take() {
                    let id = slugify(&title);
                    toc.push(TocEntry { title, id, level });
                }
            }

            _ => {}
        }
    }

    let mut html_output = String::new();
    html::push_html(&mut html_output, events.into_iter());

    Ok(ParsedDoc {
        meta: meta.unwrap_or_default(),
        content: content.to_string(),
        html: html_output,
        toc,
    })
}

/// Convert a heading to a URL-safe slug.
fn slugify(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c
            } else if c.is_whitespace() || c == '-' || c == '_' {
                '-'
            } else {
                '\0'
            }
        })
        .filter(|c| *c != '\0')
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}
