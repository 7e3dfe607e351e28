//! Static asset copying for frozen sites.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::freeze::FreezeError;

/// Asset pipeline utilities.
pub struct AssetPipeline;

impl AssetPipeline {
    /// Minify CSS using lightningcss.
    pub fn minify_css(css: &str) -> Result<String, String> {
        use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};

        let stylesheet = StyleSheet::parse(css, ParserOptions::default())
            .map_err(|e| format!("CSS parse error: {}", e))?;

        let minified = stylesheet
            .to_css(PrinterOptions {
                minify: true,
                ..Default::default()
            })
            .map_err(|e| format!("CSS minify error: {}", e))?;

        Ok(minified.code)
    }

    /// Copy every file below `source` into `dest`.
    ///
    /// Returns the copied files relative to `dest`. A missing `source` copies
    /// nothing.
    pub fn copy_dir(source: &Path, dest: &Path, minify_css: bool) -> Result<Vec<PathBuf>, FreezeError> {
        let mut copied = Vec::new();

        if !source.is_dir() {
            tracing::debug!("No static directory at {}", source.display());
            return Ok(copied);
        }

        for entry in WalkDir::new(source)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(source).to_path_buf();
                FreezeError::read(path, e.into())
            })?;
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let relative = path.strip_prefix(source).unwrap_or(path);
            let target = dest.join(relative);

            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|e| FreezeError::write(parent, e))?;
            }

            let is_css = path.extension().and_then(|e| e.to_str()) == Some("css");

            if minify_css && is_css {
                let css = fs::read_to_string(path).map_err(|e| FreezeError::read(path, e))?;
                let css = match Self::minify_css(&css) {
                    Ok(minified) => minified,
                    Err(e) => {
                        tracing::warn!("Copying {} unminified: {}", path.display(), e);
                        css
                    }
                };
                fs::write(&target, css).map_err(|e| FreezeError::write(&target, e))?;
            } else {
                fs::copy(path, &target).map_err(|e| FreezeError::write(&target, e))?;
            }

            copied.push(relative.to_path_buf());
        }

        Ok(copied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn minifies_css() {
        let css = "body {\n  color: red;\n}\n";

        let minified = AssetPipeline::minify_css(css).unwrap();

        assert_eq!(minified, "body{color:red}");
    }

    #[test]
    fn copies_nested_files() {
        let temp = tempdir().unwrap();
        let source = temp.path().join("static");
        let dest = temp.path().join("out");
        fs::create_dir_all(source.join("img")).unwrap();
        fs::write(source.join("style.css"), "a {\n  color: blue;\n}\n").unwrap();
        fs::write(source.join("img/logo.svg"), "<svg/>").unwrap();

        let copied = AssetPipeline::copy_dir(&source, &dest, true).unwrap();

        assert_eq!(
            copied,
            vec![PathBuf::from("img/logo.svg"), PathBuf::from("style.css")]
        );
        let css = fs::read_to_string(dest.join("style.css")).unwrap();
        assert!(css.starts_with("a{color:"));
        assert!(!css.contains('\n'));
        assert_eq!(fs::read_to_string(dest.join("img/logo.svg")).unwrap(), "<svg/>");
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_directories_are_errors() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempdir().unwrap();
        let source = temp.path().join("static");
        let img = source.join("img");
        fs::create_dir_all(&img).unwrap();
        fs::write(img.join("logo.svg"), "<svg/>").unwrap();
        fs::set_permissions(&img, fs::Permissions::from_mode(0o000)).unwrap();

        let readable = fs::read_dir(&img).is_ok();
        let result = AssetPipeline::copy_dir(&source, &temp.path().join("out"), false);
        fs::set_permissions(&img, fs::Permissions::from_mode(0o755)).unwrap();
        if readable {
            return;
        }

        assert!(matches!(result, Err(FreezeError::Read { .. })));
    }

    #[test]
    fn missing_source_copies_nothing() {
        let temp = tempdir().unwrap();

        let copied =
            AssetPipeline::copy_dir(&temp.path().join("nope"), &temp.path().join("out"), false)
                .unwrap();

        assert!(copied.is_empty());
    }
}
