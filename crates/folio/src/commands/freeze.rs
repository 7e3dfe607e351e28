//! Freeze command.

use std::path::{Path, PathBuf};

use anyhow::Result;
use folio_site::{FreezeReport, Freezer};

use crate::config::Config;

/// Run the freeze command. Fails if any page could not be frozen.
pub async fn run(config_path: &Path, output: Option<PathBuf>) -> Result<()> {
    tracing::info!("Freezing site...");

    let config = Config::load(config_path)?;

    let mut freeze_config = config.freeze_config();
    if let Some(output) = output {
        freeze_config.destination = output;
    }

    let mut site = config.build_site()?;
    let report = Freezer::new(freeze_config).freeze(&mut site)?;

    check(&report)
}

fn check(report: &FreezeReport) -> Result<()> {
    tracing::info!(
        "Froze {} pages and {} static files in {}ms",
        report.pages,
        report.static_files,
        report.duration_ms
    );
    if report.removed > 0 {
        tracing::info!("Removed {} stale files", report.removed);
    }
    if !report.broken_links.is_empty() {
        tracing::warn!("{} broken links", report.broken_links.len());
    }
    tracing::info!("Output: {}", report.destination.display());

    if !report.is_success() {
        for failure in &report.failures {
            tracing::error!("{}: {}", failure.url, failure.message);
        }
        anyhow::bail!("{} pages failed to freeze", report.failures.len());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn scaffold(root: &Path, extra_page: Option<(&str, &str)>) -> PathBuf {
        fs::create_dir_all(root.join("pages/blog")).unwrap();
        fs::create_dir_all(root.join("templates")).unwrap();
        fs::write(root.join("pages/index.md"), "---\ntitle: Home\n---\nHi").unwrap();
        fs::write(root.join("pages/blog/post1.md"), "# Post").unwrap();
        if let Some((name, text)) = extra_page {
            fs::write(root.join("pages").join(name), text).unwrap();
        }
        fs::write(root.join("templates/page.html"), "<h1>{{ title }}</h1>").unwrap();
        let config = root.join("folio.toml");
        fs::write(&config, "").unwrap();
        config
    }

    #[tokio::test]
    async fn freezes_site() {
        let temp = tempfile::tempdir().unwrap();
        let config = scaffold(temp.path(), None);

        run(&config, None).await.unwrap();

        assert_eq!(
            fs::read_to_string(temp.path().join("build/index.html")).unwrap(),
            "<h1>Home</h1>"
        );
        assert!(temp.path().join("build/blog/post1.html").exists());
    }

    #[tokio::test]
    async fn output_flag_overrides_destination() {
        let temp = tempfile::tempdir().unwrap();
        let config = scaffold(temp.path(), None);
        let output = temp.path().join("public");

        run(&config, Some(output.clone())).await.unwrap();

        assert!(output.join("index.html").exists());
        assert!(!temp.path().join("build").exists());
    }

    #[tokio::test]
    async fn fails_when_a_page_fails() {
        let temp = tempfile::tempdir().unwrap();
        let config = scaffold(temp.path(), Some(("broken.md", "---\ntitle: [x\n---\n")));

        let result = run(&config, None).await;

        assert!(result.is_err());
        assert!(temp.path().join("build/index.html").exists());
    }
}
