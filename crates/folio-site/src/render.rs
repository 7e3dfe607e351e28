//! Page rendering: template selection and context assembly.

use folio_pages::Page;
use serde_json::{Map, Value};

use crate::error::SiteError;
use crate::hooks::PageHook;
use crate::templates::TemplateEngine;

/// Renders pages through the template engine.
pub struct PageRenderer<'a> {
    pub templates: &'a TemplateEngine,
    pub default_template: &'a str,
    pub hooks: &'a [Box<dyn PageHook>],
}

impl<'a> PageRenderer<'a> {
    /// Pick the template for a page.
    ///
    /// The page's own `template` wins when the engine can find it; otherwise
    /// the default is used.
    pub fn select_template<'p>(&'p self, page: &'p Page) -> &'p str {
        match page.template() {
            Some(name) if self.templates.has_template(name) => name,
            Some(name) => {
                tracing::warn!(
                    "Template '{}' requested by '{}' not found, using '{}'",
                    name,
                    page.path,
                    self.default_template
                );
                self.default_template
            }
            None => self.default_template,
        }
    }

    /// Build the template context for a page.
    pub fn context(&self, page: Option<&Page>) -> Map<String, Value> {
        let mut context = Map::new();

        for hook in self.hooks {
            hook.extend_context(page, &mut context);
        }

        context.insert(
            "page".to_string(),
            page.and_then(|p| serde_json::to_value(p).ok())
                .unwrap_or(Value::Null),
        );
        context.insert(
            "title".to_string(),
            Value::String(page.map(Page::title).unwrap_or("").to_string()),
        );

        context
    }

    /// Render a page to its final HTML.
    pub fn render(&self, page: &Page) -> Result<String, SiteError> {
        let template = self.select_template(page);
        let context = self.context(Some(page));

        self.templates
            .render(template, &context)
            .map_err(|e| SiteError::from_template(template, e))
    }
}
