//! Loading `folio.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use folio_server::DevServerConfig;
use folio_site::{ContextValues, FreezeConfig, Site, SiteConfig, SiteError};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Configuration file structure (folio.toml).
#[derive(Debug, Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    content: ContentSection,
    #[serde(default)]
    templates: TemplatesSection,
    #[serde(default, rename = "static")]
    static_files: StaticSection,
    #[serde(default)]
    freeze: FreezeSection,
    #[serde(default)]
    server: ServerSection,
    /// Values exposed to every template
    #[serde(default)]
    context: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct ContentSection {
    dir: String,
    extension: String,
    auto_reload: bool,
}

impl Default for ContentSection {
    fn default() -> Self {
        Self {
            dir: "pages".to_string(),
            extension: "md".to_string(),
            auto_reload: true,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct TemplatesSection {
    dir: String,
    default: String,
    error: String,
}

impl Default for TemplatesSection {
    fn default() -> Self {
        Self {
            dir: "templates".to_string(),
            default: "page.html".to_string(),
            error: "error.html".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct StaticSection {
    dir: String,
}

impl Default for StaticSection {
    fn default() -> Self {
        Self {
            dir: "static".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct FreezeSection {
    destination: String,
    remove_extra_files: bool,
    minify_css: bool,
    warmup: Option<String>,
}

impl Default for FreezeSection {
    fn default() -> Self {
        Self {
            destination: "build".to_string(),
            remove_extra_files: true,
            minify_css: false,
            warmup: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct ServerSection {
    host: String,
    port: u16,
    open: bool,
    live_reload: bool,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            open: true,
            live_reload: true,
        }
    }
}

/// A loaded configuration. Relative directories are resolved against the
/// directory holding the config file.
#[derive(Debug)]
pub struct Config {
    file: ConfigFile,
    base: PathBuf,
}

impl Config {
    /// Load the config file. A missing file is an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(SiteError::ConfigurationMissing(format!(
                "{} not found. Run 'folio init' first.",
                path.display()
            ))
            .into());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config = Self::parse(&content, path.parent().unwrap_or(Path::new("")))
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    fn parse(content: &str, base: &Path) -> Result<Self> {
        let file: ConfigFile = toml::from_str(content)?;
        Ok(Self {
            file,
            base: base.to_path_buf(),
        })
    }

    fn resolve(&self, dir: &str) -> PathBuf {
        self.base.join(dir)
    }

    pub fn site_config(&self) -> SiteConfig {
        SiteConfig {
            content_dir: self.resolve(&self.file.content.dir),
            extension: self.file.content.extension.clone(),
            auto_reload: self.file.content.auto_reload,
            templates_dir: self.resolve(&self.file.templates.dir),
            default_template: self.file.templates.default.clone(),
            error_template: self.file.templates.error.clone(),
            static_dir: self.resolve(&self.file.static_files.dir),
        }
    }

    pub fn freeze_config(&self) -> FreezeConfig {
        FreezeConfig {
            destination: self.resolve(&self.file.freeze.destination),
            remove_extra_files: self.file.freeze.remove_extra_files,
            minify_css: self.file.freeze.minify_css,
            warmup: self.file.freeze.warmup.clone(),
        }
    }

    pub fn server_config(&self) -> DevServerConfig {
        DevServerConfig {
            host: self.file.server.host.clone(),
            port: self.file.server.port,
            open: self.file.server.open,
            live_reload: self.file.server.live_reload,
            content_dir: self.resolve(&self.file.content.dir),
            templates_dir: self.resolve(&self.file.templates.dir),
            static_dir: self.resolve(&self.file.static_files.dir),
        }
    }

    /// Assemble the site, with the `[context]` table exposed to templates.
    pub fn build_site(&self) -> Result<Site> {
        let mut site = Site::new(self.site_config())?;

        if !self.file.context.is_empty() {
            site = site.with_hook(ContextValues::new(self.file.context.clone()));
        }

        Ok(site)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_file_uses_defaults() {
        let config = Config::parse("", Path::new("")).unwrap();

        let site = config.site_config();
        assert_eq!(site.content_dir, PathBuf::from("pages"));
        assert_eq!(site.extension, "md");
        assert!(site.auto_reload);
        assert_eq!(site.default_template, "page.html");
        assert_eq!(site.error_template, "error.html");

        let freeze = config.freeze_config();
        assert_eq!(freeze.destination, PathBuf::from("build"));
        assert!(freeze.remove_extra_files);
        assert!(!freeze.minify_css);
        assert_eq!(freeze.warmup, None);

        let server = config.server_config();
        assert_eq!(server.port, 5000);
        assert_eq!(server.host, "127.0.0.1");
    }

    #[test]
    fn reads_sections() {
        let config = Config::parse(
            r#"
[content]
dir = "content"
auto_reload = false

[static]
dir = "assets"

[freeze]
destination = "public"
warmup = "index"

[server]
port = 8080
live_reload = false

[context]
site_name = "Folio"
"#,
            Path::new("site"),
        )
        .unwrap();

        let site = config.site_config();
        assert_eq!(site.content_dir, PathBuf::from("site/content"));
        assert!(!site.auto_reload);
        assert_eq!(site.static_dir, PathBuf::from("site/assets"));
        assert_eq!(site.templates_dir, PathBuf::from("site/templates"));

        let freeze = config.freeze_config();
        assert_eq!(freeze.destination, PathBuf::from("site/public"));
        assert_eq!(freeze.warmup.as_deref(), Some("index"));

        let server = config.server_config();
        assert_eq!(server.port, 8080);
        assert!(!server.live_reload);

        assert_eq!(config.file.context["site_name"], "Folio");
    }

    #[test]
    fn missing_file_is_configuration_error() {
        let temp = tempfile::tempdir().unwrap();

        let err = Config::load(&temp.path().join("folio.toml")).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<SiteError>(),
            Some(SiteError::ConfigurationMissing(_))
        ));
    }

    #[test]
    fn malformed_file_is_an_error() {
        assert!(Config::parse("[server]\nport = \"eighty\"", Path::new("")).is_err());
    }

    #[test]
    fn builds_site_from_disk() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(temp.path().join("pages")).unwrap();
        std::fs::create_dir_all(temp.path().join("templates")).unwrap();
        std::fs::write(temp.path().join("pages/index.md"), "---\ntitle: Home\n---\n").unwrap();
        std::fs::write(
            temp.path().join("templates/page.html"),
            "{{ title }} | {{ site_name }}",
        )
        .unwrap();
        let config_path = temp.path().join("folio.toml");
        std::fs::write(&config_path, "[context]\nsite_name = \"Folio\"\n").unwrap();

        let mut site = Config::load(&config_path).unwrap().build_site().unwrap();

        assert_eq!(site.respond("/").body, "Home | Folio");
    }
}
