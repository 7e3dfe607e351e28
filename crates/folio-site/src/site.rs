//! The assembled site: store, templates and hooks behind one value.

use std::path::PathBuf;
use std::sync::Arc;

use folio_pages::{FsSource, Page, PageSource, PageStore};
use http::StatusCode;

use crate::error::SiteError;
use crate::error_page::{self, INTERNAL_ERROR_DESCRIPTION, NOT_FOUND_DESCRIPTION};
use crate::hooks::PageHook;
use crate::render::PageRenderer;
use crate::resolve;
use crate::templates::TemplateEngine;

/// Configuration for assembling a [`Site`].
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// Markdown content root
    pub content_dir: PathBuf,

    /// Extension of content files
    pub extension: String,

    /// Re-parse pages whose source changed since they were cached
    pub auto_reload: bool,

    /// Template directory
    pub templates_dir: PathBuf,

    /// Template used for pages that do not name one
    pub default_template: String,

    /// Template used for error pages
    pub error_template: String,

    /// Static files served under `/static`
    pub static_dir: PathBuf,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            content_dir: PathBuf::from("pages"),
            extension: "md".to_string(),
            auto_reload: true,
            templates_dir: PathBuf::from("templates"),
            default_template: "page.html".to_string(),
            error_template: "error.html".to_string(),
            static_dir: PathBuf::from("static"),
        }
    }
}

/// Outcome of a request: always a status and a body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: StatusCode,
    pub body: String,
}

/// A content site ready to answer requests.
pub struct Site {
    config: SiteConfig,
    store: PageStore,
    templates: TemplateEngine,
    hooks: Vec<Box<dyn PageHook>>,
}

impl Site {
    /// Assemble a site reading content and templates from disk.
    pub fn new(config: SiteConfig) -> Result<Self, SiteError> {
        if !config.content_dir.is_dir() {
            return Err(SiteError::ConfigurationMissing(format!(
                "content directory not found: {}",
                config.content_dir.display()
            )));
        }

        if !config.templates_dir.is_dir() {
            tracing::warn!(
                "Template directory not found: {}",
                config.templates_dir.display()
            );
        }

        let source = FsSource::new(&config.content_dir, &config.extension);
        let templates = TemplateEngine::new(&config.templates_dir);

        Ok(Self::with_source(config, Arc::new(source), templates))
    }

    /// Assemble a site from an arbitrary page source and template engine.
    pub fn with_source(
        config: SiteConfig,
        source: Arc<dyn PageSource>,
        templates: TemplateEngine,
    ) -> Self {
        let store = PageStore::new(source, config.auto_reload);
        Self {
            config,
            store,
            templates,
            hooks: Vec::new(),
        }
    }

    /// Register a page hook.
    pub fn with_hook(mut self, hook: impl PageHook + 'static) -> Self {
        tracing::debug!("Registered page hook '{}'", hook.name());
        self.hooks.push(Box::new(hook));
        self
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn store(&mut self) -> &mut PageStore {
        &mut self.store
    }

    /// Forget loaded templates so they are read again.
    pub fn reload_templates(&mut self) {
        self.templates.reload();
    }

    fn renderer(&self) -> PageRenderer<'_> {
        PageRenderer {
            templates: &self.templates,
            default_template: &self.config.default_template,
            hooks: &self.hooks,
        }
    }

    /// Resolve a request path to a page.
    pub fn resolve(&mut self, request_path: &str) -> Result<Page, SiteError> {
        resolve::resolve(&mut self.store, request_path)
    }

    /// Render a page with its template.
    pub fn render_page(&self, page: &Page) -> Result<String, SiteError> {
        self.renderer().render(page)
    }

    /// Resolve and render a request path, reporting any failure.
    pub fn render_url(&mut self, request_path: &str) -> Result<String, SiteError> {
        let page = self.resolve(request_path)?;
        self.render_page(&page)
    }

    /// Render an error page for `status`.
    pub fn render_error(&mut self, status: StatusCode, description: &str) -> Response {
        let renderer = PageRenderer {
            templates: &self.templates,
            default_template: &self.config.default_template,
            hooks: &self.hooks,
        };
        let (body, status) = error_page::render_error(
            &mut self.store,
            &renderer,
            &self.config.error_template,
            status,
            description,
        );
        Response { status, body }
    }

    /// Answer a request. Failures become error pages; this never fails.
    pub fn respond(&mut self, request_path: &str) -> Response {
        match self.render_url(request_path) {
            Ok(body) => Response {
                status: StatusCode::OK,
                body,
            },
            Err(e) if e.is_not_found() => {
                tracing::debug!("{}", e);
                self.render_error(StatusCode::NOT_FOUND, NOT_FOUND_DESCRIPTION)
            }
            Err(e) => {
                tracing::error!("Failed to render '{}': {}", request_path, e);
                self.render_error(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_DESCRIPTION)
            }
        }
    }
}

impl std::fmt::Debug for Site {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Site")
            .field("config", &self.config)
            .field("store", &self.store)
            .field("hooks", &self.hooks.iter().map(|h| h.name()).collect::<Vec<_>>())
            .finish()
    }
}
