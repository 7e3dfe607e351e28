//! Page resolution, rendering and freezing for folio sites.
//!
//! A [`Site`] ties a page store to a template engine. Requests are resolved
//! to pages, rendered through templates, and failures become error pages.
//! [`Freezer`] renders every page of a site to disk.

pub mod assets;
pub mod error;
pub mod error_page;
pub mod freeze;
pub mod hooks;
pub mod render;
pub mod resolve;
pub mod site;
pub mod templates;

pub use error::SiteError;
pub use error_page::{ErrorContext, INTERNAL_ERROR_DESCRIPTION, NOT_FOUND_DESCRIPTION};
pub use freeze::{
    enumerate, output_path, Artifact, BrokenLink, Crawl, FreezeConfig, FreezeError,
    FreezeFailure, FreezeReport, Freezer,
};
pub use hooks::{ContextValues, PageHook};
pub use render::PageRenderer;
pub use resolve::{candidate_path, url_for};
pub use site::{Response, Site, SiteConfig};
pub use templates::TemplateEngine;
