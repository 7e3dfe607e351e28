//! Front matter extraction and parsing.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Metadata supplied by a page's front matter.
///
/// `title` and `template` are understood by the site; every other key is kept
/// in `extra`, in the order the author wrote it, so templates can use it.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct PageMeta {
    /// Page title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Template to render this page with, instead of the site default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,

    /// Any other author-supplied keys
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PageMeta {
    /// Look up an author-supplied key that is not a recognized field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }
}

/// Extract front matter from a markdown source.
///
/// Returns the parsed metadata and the remaining content after the front matter block.
pub fn extract_frontmatter(source: &str) -> Result<(Option<PageMeta>, &str), FrontmatterError> {
    let trimmed = source.trim_start();

    if !trimmed.starts_with("---") {
        return Ok((None, source));
    }

    // Find the closing ---
    let after_open = &trimmed[3..];
    let Some(close_pos) = after_open.find("\n---") else {
        return Err(FrontmatterError::Unclosed);
    };

    let yaml_content = after_open[..close_pos].trim();
    let remaining = &after_open[close_pos + 4..];

    if yaml_content.is_empty() {
        return Ok((Some(PageMeta::default()), remaining.trim_start()));
    }

    let meta: PageMeta = serde_yaml::from_str(yaml_content)
        .map_err(|e| FrontmatterError::InvalidYaml(e.to_string()))?;

    Ok((Some(meta), remaining.trim_start()))
}

/// Errors that can occur when parsing front matter.
#[derive(Debug, thiserror::Error)]
pub enum FrontmatterError {
    #[error("Unclosed front matter block - missing closing ---")]
    Unclosed,

    #[error("Invalid YAML in front matter: {0}")]
    InvalidYaml(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn extracts_recognized_fields() {
        let source = r#"---
title: About
template: custom.html
---

# About us
"#;

        let (meta, content) = extract_frontmatter(source).unwrap();
        let meta = meta.unwrap();

        assert_eq!(meta.title.as_deref(), Some("About"));
        assert_eq!(meta.template.as_deref(), Some("custom.html"));
        assert!(meta.extra.is_empty());
        assert!(content.starts_with("# About us"));
    }

    #[test]
    fn keeps_unknown_keys_in_order() {
        let source = "---\ntitle: Post\nzeta: 1\nalpha: [a, b]\ndraft: true\n---\nbody";

        let (meta, _) = extract_frontmatter(source).unwrap();
        let meta = meta.unwrap();

        let keys: Vec<&str> = meta.extra.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "draft"]);
        assert_eq!(meta.get("draft"), Some(&Value::Bool(true)));
        assert_eq!(meta.get("title"), None);
    }

    #[test]
    fn handles_no_frontmatter() {
        let source = "# Just Markdown\n\nNo front matter here.";

        let (meta, content) = extract_frontmatter(source).unwrap();

        assert!(meta.is_none());
        assert_eq!(content, source);
    }

    #[test]
    fn handles_empty_frontmatter() {
        let (meta, content) = extract_frontmatter("---\n---\nHello").unwrap();

        assert_eq!(meta, Some(PageMeta::default()));
        assert_eq!(content, "Hello");
    }

    #[test]
    fn errors_on_unclosed_frontmatter() {
        let source = "---\ntitle: Test\n# No closing";

        let result = extract_frontmatter(source);

        assert!(matches!(result, Err(FrontmatterError::Unclosed)));
    }

    #[test]
    fn errors_on_invalid_yaml() {
        let source = "---\ntitle: [invalid yaml\n---\n";

        let result = extract_frontmatter(source);

        assert!(matches!(result, Err(FrontmatterError::InvalidYaml(_))));
    }
}
