//! Template engine for rendering pages.

use std::path::Path;

use minijinja::{Environment, ErrorKind};
use serde::Serialize;

/// Name of the built-in error template.
const FALLBACK_ERROR_NAME: &str = "__folio_error.html";

/// Template engine using minijinja.
///
/// Templates are loaded on demand from a directory. A minimal error template
/// is always available so error pages can be produced for sites that ship
/// none of their own.
pub struct TemplateEngine {
    env: Environment<'static>,
    builtin: Environment<'static>,
}

impl TemplateEngine {
    /// Create an engine loading templates from `dir`.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        let mut env = Environment::new();
        env.set_loader(minijinja::path_loader(dir.as_ref().to_path_buf()));

        Self {
            env,
            builtin: builtin_environment(),
        }
    }

    /// Create an engine with no templates at all.
    pub fn empty() -> Self {
        Self {
            env: Environment::new(),
            builtin: builtin_environment(),
        }
    }

    /// Register a template from a string.
    ///
    /// Registered templates take precedence over files in the template
    /// directory.
    pub fn add_template(
        &mut self,
        name: impl Into<String>,
        source: impl Into<String>,
    ) -> Result<(), minijinja::Error> {
        self.env.add_template_owned(name.into(), source.into())
    }

    /// Builder-style variant of [`add_template`](Self::add_template).
    pub fn with_template(
        mut self,
        name: impl Into<String>,
        source: impl Into<String>,
    ) -> Result<Self, minijinja::Error> {
        self.add_template(name, source)?;
        Ok(self)
    }

    /// Check whether a template can be found.
    ///
    /// A template that exists but fails to compile counts as present so that
    /// its error surfaces when rendering.
    pub fn has_template(&self, name: &str) -> bool {
        match self.env.get_template(name) {
            Ok(_) => true,
            Err(e) => e.kind() != ErrorKind::TemplateNotFound,
        }
    }

    /// Render a template with the given context.
    pub fn render<S: Serialize>(&self, name: &str, context: S) -> Result<String, minijinja::Error> {
        let tmpl = self.env.get_template(name)?;
        tmpl.render(context)
    }

    /// Render the built-in error template.
    ///
    /// Expects `title` and `error.description` in the context.
    pub fn render_builtin_error<S: Serialize>(&self, context: S) -> Result<String, minijinja::Error> {
        let tmpl = self.builtin.get_template(FALLBACK_ERROR_NAME)?;
        tmpl.render(context)
    }

    /// Forget loaded templates so they are read again from disk.
    pub fn reload(&mut self) {
        self.env.clear_templates();
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::empty()
    }
}

fn builtin_environment() -> Environment<'static> {
    let mut env = Environment::new();
    env.add_template(FALLBACK_ERROR_NAME, FALLBACK_ERROR_TEMPLATE)
        .expect("Failed to add built-in error template");
    env
}

const FALLBACK_ERROR_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>{{ error.code }} {{ title }}</title>
  <style>
    body { font-family: system-ui, sans-serif; max-width: 40rem; margin: 4rem auto; padding: 0 1rem; }
  </style>
</head>
<body>
  <h1>{{ title }}</h1>
  <p>{{ error.description }}</p>
</body>
</html>"##;
