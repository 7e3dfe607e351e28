//! Error page synthesis.
//!
//! Looks for an `error_<code>` page, then a generic `error` page, and renders
//! whichever is found through the site's error template. Sites without an
//! error template get a built-in one, so an error response is always
//! produced.

use folio_pages::{Page, PageStore};
use http::StatusCode;
use minijinja::HtmlEscape;
use serde::Serialize;
use serde_json::Value;

use crate::render::PageRenderer;

/// Description used for missing pages.
pub const NOT_FOUND_DESCRIPTION: &str = "The requested URL was not found on the server.";

/// Description used for render failures.
pub const INTERNAL_ERROR_DESCRIPTION: &str =
    "The server encountered an internal error and was unable to complete your request.";

/// Details about a failed request, exposed to templates as `error`.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorContext {
    pub code: u16,
    pub description: String,
}

/// Find the author-supplied page for an error status, if any.
fn find_error_page(store: &mut PageStore, status: StatusCode) -> Option<Page> {
    let specific = format!("error_{}", status.as_u16());

    for name in [specific.as_str(), "error"] {
        match store.get(name) {
            Ok(Some(page)) => return Some(page),
            Ok(None) => {}
            Err(e) => tracing::warn!("Ignoring error page '{}': {}", name, e),
        }
    }

    None
}

/// Render an error response.
///
/// Never fails: if the site's error template is missing or broken the
/// built-in template is used, and if that fails too a plain document is
/// assembled by hand.
pub fn render_error(
    store: &mut PageStore,
    renderer: &PageRenderer<'_>,
    error_template: &str,
    status: StatusCode,
    description: &str,
) -> (String, StatusCode) {
    let page = find_error_page(store, status);
    let reason = status.canonical_reason().unwrap_or("Error");

    let title = page
        .as_ref()
        .and_then(|p| p.meta.title.clone())
        .unwrap_or_else(|| reason.to_string());

    let error = ErrorContext {
        code: status.as_u16(),
        description: description.to_string(),
    };

    let mut context = renderer.context(page.as_ref());
    context.insert("title".to_string(), Value::String(title.clone()));
    context.insert(
        "error".to_string(),
        serde_json::to_value(&error).unwrap_or(Value::Null),
    );

    match renderer.templates.render(error_template, &context) {
        Ok(html) => return (html, status),
        Err(e) if e.kind() == minijinja::ErrorKind::TemplateNotFound => {
            tracing::debug!("No error template '{}', using built-in", error_template);
        }
        Err(e) => {
            tracing::warn!(
                "Error template '{}' failed, using built-in: {}",
                error_template,
                e
            );
        }
    }

    match renderer.templates.render_builtin_error(&context) {
        Ok(html) => (html, status),
        Err(e) => {
            tracing::error!("Built-in error template failed: {}", e);
            let html = format!(
                "<!DOCTYPE html>\n<title>{code} {title}</title>\n<h1>{title}</h1>\n<p>{description}</p>\n",
                code = error.code,
                title = HtmlEscape(&title),
                description = HtmlEscape(&error.description),
            );
            (html, status)
        }
    }
}
