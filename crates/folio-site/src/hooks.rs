//! Page hooks: site-specific additions to the rendering context.

use folio_pages::Page;
use serde_json::{Map, Value};

/// A strategy object registered on a [`Site`](crate::Site) to customize
/// rendering.
///
/// Hooks run before every template render, including error pages (where
/// `page` may be `None`). Values they insert are visible to templates; the
/// `page`, `title` and `error` keys are always set by the site afterwards.
pub trait PageHook: Send + Sync {
    /// Hook identifier used in log messages.
    fn name(&self) -> &str;

    /// Add values to the template context.
    fn extend_context(&self, page: Option<&Page>, context: &mut Map<String, Value>);
}

/// Injects a fixed set of values into every template context.
#[derive(Debug, Clone, Default)]
pub struct ContextValues {
    values: Map<String, Value>,
}

impl ContextValues {
    pub fn new(values: Map<String, Value>) -> Self {
        Self { values }
    }
}

impl PageHook for ContextValues {
    fn name(&self) -> &str {
        "context-values"
    }

    fn extend_context(&self, _page: Option<&Page>, context: &mut Map<String, Value>) {
        for (key, value) in &self.values {
            context.insert(key.clone(), value.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn context_values_inserts_everything() {
        let mut values = Map::new();
        values.insert("site_name".to_string(), json!("My Site"));
        values.insert("year".to_string(), json!(2024));
        let hook = ContextValues::new(values);

        let mut context = Map::new();
        hook.extend_context(None, &mut context);

        assert_eq!(context["site_name"], json!("My Site"));
        assert_eq!(context["year"], json!(2024));
    }
}
