//! Site errors.

use folio_pages::PageError;

/// Errors that can occur while resolving or rendering a page.
#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    #[error("No page found for '{0}'")]
    ContentNotFound(String),

    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("Failed to render template {template}: {message}")]
    Render { template: String, message: String },

    #[error(transparent)]
    Page(#[from] PageError),

    #[error("Configuration missing: {0}")]
    ConfigurationMissing(String),
}

impl SiteError {
    /// Convert a template engine error raised while rendering `template`.
    pub(crate) fn from_template(template: &str, err: minijinja::Error) -> Self {
        if err.kind() == minijinja::ErrorKind::TemplateNotFound {
            Self::TemplateNotFound(template.to_string())
        } else {
            Self::Render {
                template: template.to_string(),
                message: err.to_string(),
            }
        }
    }

    /// Whether this error means the requested content does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ContentNotFound(_))
    }
}
