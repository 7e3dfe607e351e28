//! Freezing a site into static files.
//!
//! There is no route table to walk: the set of pages is whatever the content
//! store holds. [`enumerate`] forces the store to list everything, turns each
//! logical path into its canonical URL and renders that URL through the same
//! pipeline a live request would use. [`Freezer`] writes the result to disk.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Instant;

use regex::Regex;
use walkdir::WalkDir;

use crate::assets::AssetPipeline;
use crate::error::SiteError;
use crate::resolve::url_for;
use crate::site::Site;

/// Root-relative links and sources in rendered HTML.
static LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:href|src)\s*=\s*"([^"]*)""#).expect("link pattern is valid")
});

/// Configuration for freezing a site.
#[derive(Debug, Clone)]
pub struct FreezeConfig {
    /// Output directory
    pub destination: PathBuf,

    /// Delete files in the destination that this freeze did not produce
    pub remove_extra_files: bool,

    /// Minify CSS while copying static files
    pub minify_css: bool,

    /// Page to look up before listing the store
    pub warmup: Option<String>,
}

impl Default for FreezeConfig {
    fn default() -> Self {
        Self {
            destination: PathBuf::from("build"),
            remove_extra_files: true,
            minify_css: false,
            warmup: None,
        }
    }
}

/// One rendered page of the frozen site.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    /// Canonical URL (`/`, `/dir/` or `/name.html`)
    pub url: String,
    /// Logical path of the page behind it
    pub page: String,
    /// Rendered HTML
    pub body: String,
}

/// A page that could not be frozen.
#[derive(Debug, Clone, PartialEq)]
pub struct FreezeFailure {
    pub url: String,
    pub message: String,
}

/// Result of enumerating a site.
#[derive(Debug, Default)]
pub struct Crawl {
    pub artifacts: Vec<Artifact>,
    pub failures: Vec<FreezeFailure>,
}

impl Crawl {
    /// URLs of all successfully rendered pages.
    pub fn urls(&self) -> Vec<&str> {
        self.artifacts.iter().map(|a| a.url.as_str()).collect()
    }
}

/// A root-relative link in a frozen page that points at nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct BrokenLink {
    /// URL of the page containing the link
    pub page: String,
    /// The link target as written
    pub target: String,
}

/// Result of a freeze.
#[derive(Debug)]
pub struct FreezeReport {
    /// Number of pages written
    pub pages: usize,

    /// Number of static files copied
    pub static_files: usize,

    /// Number of stale files deleted
    pub removed: usize,

    /// Links that do not resolve within the frozen site
    pub broken_links: Vec<BrokenLink>,

    /// Pages that failed to render
    pub failures: Vec<FreezeFailure>,

    /// Total time in milliseconds
    pub duration_ms: u64,

    /// Output directory
    pub destination: PathBuf,
}

impl FreezeReport {
    /// Whether every page was frozen.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Errors that abort a freeze.
#[derive(Debug, thiserror::Error)]
pub enum FreezeError {
    #[error(transparent)]
    Site(#[from] SiteError),

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Refusing to clean {}: it contains the content directory", .0.display())]
    UnsafeDestination(PathBuf),
}

impl FreezeError {
    pub(crate) fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }
}

/// File a URL is written to, relative to the destination.
///
/// `/` and `/dir/` become `index.html` files; anything else keeps its name.
pub fn output_path(url: &str) -> PathBuf {
    let trimmed = url.trim_start_matches('/');

    if trimmed.is_empty() || trimmed.ends_with('/') {
        PathBuf::from(trimmed).join("index.html")
    } else {
        PathBuf::from(trimmed)
    }
}

/// Render every page of the site.
///
/// Each call is a fresh full pass. A page that fails to render is recorded
/// with its URL and the pass carries on; only failing to list the store at
/// all is an error.
pub fn enumerate(site: &mut Site, warmup: Option<&str>) -> Result<Crawl, SiteError> {
    if let Some(path) = warmup {
        match site.store().get(path) {
            Ok(found) => tracing::debug!("Warm-up lookup of '{}': found={}", path, found.is_some()),
            Err(e) => tracing::debug!("Warm-up lookup of '{}' failed: {}", path, e),
        }
    }

    let paths = site.store().list_all()?;
    tracing::info!("Freezing {} pages", paths.len());

    let mut crawl = Crawl::default();
    let mut seen: BTreeSet<String> = BTreeSet::new();

    for path in &paths {
        let url = url_for(path);

        // Unreachable while url_for stays injective over valid keys
        if !seen.insert(url.clone()) {
            tracing::error!("{} produced by more than one page", url);
            crawl.failures.push(FreezeFailure {
                url,
                message: format!("URL already produced by another page than '{}'", path),
            });
            continue;
        }

        match site.render_url(&url) {
            Ok(body) => {
                tracing::debug!("Rendered {}", url);
                crawl.artifacts.push(Artifact {
                    url,
                    page: path.clone(),
                    body,
                });
            }
            Err(e) => {
                tracing::error!("Failed to render {}: {}", url, e);
                crawl.failures.push(FreezeFailure {
                    url,
                    message: e.to_string(),
                });
            }
        }
    }

    Ok(crawl)
}

/// Writes a frozen site to disk.
pub struct Freezer {
    config: FreezeConfig,
}

impl Freezer {
    pub fn new(config: FreezeConfig) -> Self {
        Self { config }
    }

    /// Freeze the site into the destination directory.
    ///
    /// Pages that fail to render are listed in the report; everything else
    /// is still written.
    pub fn freeze(&self, site: &mut Site) -> Result<FreezeReport, FreezeError> {
        let start = Instant::now();
        let destination = &self.config.destination;

        if self.config.remove_extra_files && contains_path(destination, &site.config().content_dir)
        {
            return Err(FreezeError::UnsafeDestination(destination.clone()));
        }

        fs::create_dir_all(destination).map_err(|e| FreezeError::write(destination, e))?;

        let crawl = enumerate(site, self.config.warmup.as_deref())?;

        let mut written: BTreeSet<PathBuf> = BTreeSet::new();

        for artifact in &crawl.artifacts {
            let relative = output_path(&artifact.url);
            let target = destination.join(&relative);

            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|e| FreezeError::write(parent, e))?;
            }
            fs::write(&target, &artifact.body).map_err(|e| FreezeError::write(&target, e))?;

            written.insert(relative);
        }

        let static_files = AssetPipeline::copy_dir(
            &site.config().static_dir,
            &destination.join("static"),
            self.config.minify_css,
        )?;
        let static_count = static_files.len();
        written.extend(static_files.into_iter().map(|p| Path::new("static").join(p)));

        let removed = if self.config.remove_extra_files {
            remove_extra_files(destination, &written)?
        } else {
            0
        };

        let broken_links = find_broken_links(&crawl.artifacts, &written);
        for link in &broken_links {
            tracing::warn!("Broken link in {}: {}", link.page, link.target);
        }

        Ok(FreezeReport {
            pages: crawl.artifacts.len(),
            static_files: static_count,
            removed,
            broken_links,
            failures: crawl.failures,
            duration_ms: start.elapsed().as_millis() as u64,
            destination: destination.clone(),
        })
    }
}

/// Whether `inner` is `outer` or lies below it.
fn contains_path(outer: &Path, inner: &Path) -> bool {
    match (outer.canonicalize(), inner.canonicalize()) {
        (Ok(outer), Ok(inner)) => inner.starts_with(outer),
        _ => inner.starts_with(outer),
    }
}

/// Delete files below `destination` that are not in `keep`, then any
/// directories left empty.
fn remove_extra_files(destination: &Path, keep: &BTreeSet<PathBuf>) -> Result<usize, FreezeError> {
    let mut removed = 0;

    for entry in WalkDir::new(destination)
        .contents_first(true)
    {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(destination).to_path_buf();
            FreezeError::read(path, e.into())
        })?;
        let path = entry.path();
        let relative = path.strip_prefix(destination).unwrap_or(path);

        if entry.file_type().is_dir() {
            if entry.depth() > 0 && fs::read_dir(path).map(|mut d| d.next().is_none()).unwrap_or(false) {
                fs::remove_dir(path).map_err(|e| FreezeError::write(path, e))?;
            }
            continue;
        }

        if !keep.contains(relative) {
            tracing::debug!("Removing stale file {}", path.display());
            fs::remove_file(path).map_err(|e| FreezeError::write(path, e))?;
            removed += 1;
        }
    }

    Ok(removed)
}

/// Find root-relative links that match no written file.
fn find_broken_links(artifacts: &[Artifact], written: &BTreeSet<PathBuf>) -> Vec<BrokenLink> {
    let mut broken = Vec::new();

    for artifact in artifacts {
        for caps in LINK_RE.captures_iter(&artifact.body) {
            let link = &caps[1];
            if !link.starts_with('/') || link.starts_with("//") {
                continue;
            }

            let target = link.split(['#', '?']).next().unwrap_or(link);
            if !written.contains(&output_path(target)) {
                broken.push(BrokenLink {
                    page: artifact.url.clone(),
                    target: link.to_string(),
                });
            }
        }
    }

    broken
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site::SiteConfig;
    use crate::templates::TemplateEngine;
    use folio_pages::MemorySource;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn scenario_source() -> MemorySource {
        MemorySource::new()
            .with_page("index", "---\ntitle: Home\n---\n[About](/about.html)")
            .with_page(
                "about",
                "---\ntitle: About\ntemplate: custom.html\n---\nAbout us",
            )
            .with_page("blog/post1", "# First post\n\n[Home](/) [Gone](/gone.html)")
    }

    fn site_with(source: MemorySource, config: SiteConfig) -> Site {
        let templates = TemplateEngine::empty()
            .with_template(
                "page.html",
                "<title>{{ title }}</title>\n{{ page.body | safe }}",
            )
            .unwrap()
            .with_template(
                "custom.html",
                r#"<link href="/static/style.css">custom:{{ title }}"#,
            )
            .unwrap();
        Site::with_source(config, Arc::new(source), templates)
    }

    fn scenario_site() -> Site {
        site_with(scenario_source(), SiteConfig::default())
    }

    #[test]
    fn output_paths() {
        assert_eq!(output_path("/"), PathBuf::from("index.html"));
        assert_eq!(output_path("/blog/"), PathBuf::from("blog/index.html"));
        assert_eq!(output_path("/about.html"), PathBuf::from("about.html"));
        assert_eq!(
            output_path("/blog/post1.html"),
            PathBuf::from("blog/post1.html")
        );
    }

    #[test]
    fn enumerates_scenario_urls() {
        let mut site = scenario_site();

        let crawl = enumerate(&mut site, None).unwrap();

        let urls: BTreeSet<&str> = crawl.urls().into_iter().collect();
        let expected: BTreeSet<&str> = ["/", "/about.html", "/blog/post1.html"].into();
        assert_eq!(urls, expected);
        assert!(crawl.failures.is_empty());
    }

    #[test]
    fn enumeration_is_deterministic() {
        let mut site = scenario_site();

        let first = enumerate(&mut site, None).unwrap();
        let second = enumerate(&mut site, None).unwrap();

        assert_eq!(first.urls(), second.urls());
        assert_eq!(first.artifacts, second.artifacts);
    }

    #[test]
    fn artifact_urls_are_unique() {
        let source = scenario_source()
            .with_page("blog/index", "Blog")
            .with_page("blog", "Blog page");
        let mut site = site_with(source, SiteConfig::default());

        let crawl = enumerate(&mut site, None).unwrap();

        let urls = crawl.urls();
        let unique: BTreeSet<&str> = urls.iter().copied().collect();
        assert_eq!(urls.len(), unique.len());
        assert!(unique.contains("/blog/"));
        assert!(unique.contains("/blog.html"));
    }

    #[test]
    fn artifacts_match_live_responses() {
        let mut site = scenario_site();

        let crawl = enumerate(&mut site, None).unwrap();

        for artifact in &crawl.artifacts {
            let response = site.respond(&artifact.url);
            assert_eq!(response.status, http::StatusCode::OK);
            assert_eq!(response.body, artifact.body);
        }
        let about = crawl.artifacts.iter().find(|a| a.url == "/about.html").unwrap();
        assert!(about.body.contains("custom:About"));
    }

    #[test]
    fn failed_pages_are_reported_without_stopping() {
        let source = scenario_source().with_page("broken", "---\ntitle: [x\n---\n");
        let mut site = site_with(source, SiteConfig::default());

        let crawl = enumerate(&mut site, None).unwrap();

        assert_eq!(crawl.artifacts.len(), 3);
        assert_eq!(crawl.failures.len(), 1);
        assert_eq!(crawl.failures[0].url, "/broken.html");
    }

    #[test]
    fn warmup_of_missing_page_is_harmless() {
        let mut site = scenario_site();

        let crawl = enumerate(&mut site, Some("test")).unwrap();

        assert_eq!(crawl.artifacts.len(), 3);
    }

    #[test]
    fn freezes_to_disk() {
        let temp = tempdir().unwrap();
        let static_dir = temp.path().join("static");
        let dest = temp.path().join("build");
        fs::create_dir_all(&static_dir).unwrap();
        fs::write(static_dir.join("style.css"), "body { margin: 0; }").unwrap();
        fs::create_dir_all(dest.join("old")).unwrap();
        fs::write(dest.join("old/stale.html"), "stale").unwrap();

        let mut site = site_with(
            scenario_source(),
            SiteConfig {
                content_dir: temp.path().join("pages"),
                static_dir,
                ..Default::default()
            },
        );

        let report = Freezer::new(FreezeConfig {
            destination: dest.clone(),
            ..Default::default()
        })
        .freeze(&mut site)
        .unwrap();

        assert!(report.is_success());
        assert_eq!(report.pages, 3);
        assert_eq!(report.static_files, 1);
        assert_eq!(report.removed, 1);

        assert!(fs::read_to_string(dest.join("index.html"))
            .unwrap()
            .contains("<title>Home</title>"));
        assert_eq!(
            fs::read_to_string(dest.join("about.html")).unwrap(),
            r#"<link href="/static/style.css">custom:About"#
        );
        assert!(dest.join("blog/post1.html").exists());
        assert!(dest.join("static/style.css").exists());
        assert!(!dest.join("old").exists());

        assert_eq!(
            report.broken_links,
            vec![BrokenLink {
                page: "/blog/post1.html".to_string(),
                target: "/gone.html".to_string(),
            }]
        );
    }

    #[test]
    fn keeps_extra_files_when_asked() {
        let temp = tempdir().unwrap();
        let dest = temp.path().join("build");
        fs::create_dir_all(&dest).unwrap();
        fs::write(dest.join("CNAME"), "example.com").unwrap();

        let mut site = site_with(
            scenario_source(),
            SiteConfig {
                content_dir: temp.path().join("pages"),
                static_dir: temp.path().join("static"),
                ..Default::default()
            },
        );

        let report = Freezer::new(FreezeConfig {
            destination: dest.clone(),
            remove_extra_files: false,
            ..Default::default()
        })
        .freeze(&mut site)
        .unwrap();

        assert_eq!(report.removed, 0);
        assert!(dest.join("CNAME").exists());
    }

    #[test]
    fn refuses_to_clean_content_directory() {
        let temp = tempdir().unwrap();
        let mut site = site_with(
            scenario_source(),
            SiteConfig {
                content_dir: temp.path().join("pages"),
                ..Default::default()
            },
        );

        let result = Freezer::new(FreezeConfig {
            destination: temp.path().to_path_buf(),
            ..Default::default()
        })
        .freeze(&mut site);

        assert!(matches!(result, Err(FreezeError::UnsafeDestination(_))));
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_content_aborts_without_cleaning() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempdir().unwrap();
        let pages = temp.path().join("pages");
        let templates = temp.path().join("templates");
        let dest = temp.path().join("build");
        fs::create_dir_all(pages.join("blog")).unwrap();
        fs::create_dir_all(&templates).unwrap();
        fs::write(pages.join("index.md"), "# Home").unwrap();
        fs::write(pages.join("blog/post1.md"), "# Post").unwrap();
        fs::write(templates.join("page.html"), "<p>frozen</p>").unwrap();

        let mut site = Site::new(SiteConfig {
            content_dir: pages.clone(),
            templates_dir: templates,
            static_dir: temp.path().join("static"),
            ..Default::default()
        })
        .unwrap();
        let freezer = Freezer::new(FreezeConfig {
            destination: dest.clone(),
            ..Default::default()
        });

        freezer.freeze(&mut site).unwrap();
        assert!(dest.join("blog/post1.html").exists());

        let blog = pages.join("blog");
        fs::set_permissions(&blog, fs::Permissions::from_mode(0o000)).unwrap();
        let readable = fs::read_dir(&blog).is_ok();
        let result = freezer.freeze(&mut site);
        fs::set_permissions(&blog, fs::Permissions::from_mode(0o755)).unwrap();
        if readable {
            return;
        }

        assert!(matches!(result, Err(FreezeError::Site(_))));
        assert!(dest.join("blog/post1.html").exists());
    }

    #[test]
    fn freeze_reports_failures() {
        let temp = tempdir().unwrap();
        let source = scenario_source().with_page("broken", "---\ntitle: [x\n---\n");
        let mut site = site_with(
            source,
            SiteConfig {
                content_dir: temp.path().join("pages"),
                static_dir: temp.path().join("static"),
                ..Default::default()
            },
        );

        let report = Freezer::new(FreezeConfig {
            destination: temp.path().join("build"),
            ..Default::default()
        })
        .freeze(&mut site)
        .unwrap();

        assert!(!report.is_success());
        assert_eq!(report.pages, 3);
        assert_eq!(report.failures[0].url, "/broken.html");
    }
}
