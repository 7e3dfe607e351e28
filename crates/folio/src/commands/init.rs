//! Scaffold a new site.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Run the init command.
///
/// Writes the config file and a starter site next to it. Existing files are
/// left alone unless `yes` is set.
pub async fn run(config_path: &Path, yes: bool) -> Result<()> {
    tracing::info!("Initializing folio site...");

    if config_path.exists() && !yes {
        tracing::warn!(
            "{} already exists. Use --yes to overwrite.",
            config_path.display()
        );
        return Ok(());
    }

    let root = config_path.parent().unwrap_or(Path::new(""));

    let files = [
        (config_path.to_path_buf(), DEFAULT_CONFIG),
        (root.join("pages/index.md"), DEFAULT_INDEX),
        (root.join("pages/about.md"), DEFAULT_ABOUT),
        (root.join("templates/page.html"), DEFAULT_PAGE_TEMPLATE),
        (root.join("templates/error.html"), DEFAULT_ERROR_TEMPLATE),
        (root.join("static/style.css"), DEFAULT_STYLE),
    ];

    for (path, content) in files {
        if path.exists() && !yes {
            tracing::debug!("Keeping existing {}", path.display());
            continue;
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::info!("Created {}", path.display());
    }

    tracing::info!("Initialization complete!");
    tracing::info!("Run 'folio serve' to start the development server.");

    Ok(())
}

const DEFAULT_CONFIG: &str = r#"# folio configuration

[content]
# Markdown pages
dir = "pages"
extension = "md"
# Re-read pages that changed on disk
auto_reload = true

[templates]
dir = "templates"
default = "page.html"
error = "error.html"

[static]
dir = "static"

[freeze]
# Output directory for the frozen site
destination = "build"
remove_extra_files = true
minify_css = false

[server]
host = "127.0.0.1"
port = 5000
open = true
live_reload = true

[context]
site_name = "My Site"
"#;

const DEFAULT_INDEX: &str = r#"---
title: Welcome
---

# Welcome

This site is built with **folio**. Edit `pages/index.md` to change this page,
or read [about](/about.html) this site.
"#;

const DEFAULT_ABOUT: &str = r#"---
title: About
---

# About

Every markdown file under `pages/` becomes a page. `pages/about.md` is served
at `/about.html`; `pages/docs/index.md` would be served at `/docs/`.

Pick a template per page with `template: name.html` in the front matter.
"#;

const DEFAULT_PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{{ title }} - {{ site_name }}</title>
  <link rel="stylesheet" href="/static/style.css">
</head>
<body>
  <nav><a href="/">{{ site_name }}</a></nav>
  <main>
    {{ page.body | safe }}
  </main>
</body>
</html>
"#;

const DEFAULT_ERROR_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>{{ error.code }} {{ title }}</title>
  <link rel="stylesheet" href="/static/style.css">
</head>
<body>
  <main>
    <h1>{{ title }}</h1>
    <p>{{ error.description }}</p>
    {% if page %}{{ page.body | safe }}{% endif %}
    <p><a href="/">Back to the home page</a></p>
  </main>
</body>
</html>
"#;

const DEFAULT_STYLE: &str = r#"body {
  font-family: system-ui, sans-serif;
  max-width: 48rem;
  margin: 2rem auto;
  padding: 0 1rem;
  line-height: 1.6;
}

nav {
  margin-bottom: 2rem;
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[tokio::test]
    async fn scaffolds_a_servable_site() {
        let temp = tempfile::tempdir().unwrap();
        let config_path = temp.path().join("folio.toml");

        run(&config_path, false).await.unwrap();

        assert!(temp.path().join("pages/index.md").exists());
        assert!(temp.path().join("templates/error.html").exists());
        assert!(temp.path().join("static/style.css").exists());

        let mut site = Config::load(&config_path).unwrap().build_site().unwrap();
        let home = site.respond("/");
        assert_eq!(home.status.as_u16(), 200);
        assert!(home.body.contains("<title>Welcome - My Site</title>"));

        let missing = site.respond("/missing.html");
        assert_eq!(missing.status.as_u16(), 404);
        assert!(missing.body.contains("<h1>Not Found</h1>"));
    }

    #[tokio::test]
    async fn keeps_existing_files_without_yes() {
        let temp = tempfile::tempdir().unwrap();
        let config_path = temp.path().join("folio.toml");
        fs::write(&config_path, "# mine\n").unwrap();

        run(&config_path, false).await.unwrap();

        assert_eq!(fs::read_to_string(&config_path).unwrap(), "# mine\n");
        assert!(!temp.path().join("pages").exists());
    }
}
