// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deployflow contributors

//! Top-level landing document

use std::path::{Path, PathBuf};

use crate::config::{DeployConfig, ENTRY_DOCUMENT};
use crate::errors::DeployResult;
use crate::utils::{escape_html, write_file};

/// Redirect target of the landing document
///
/// The configured `redirect_to`, or the first target's base path.
pub fn landing_redirect(config: &DeployConfig) -> String {
    config
        .landing
        .redirect_to
        .clone()
        .or_else(|| config.targets.first().map(|t| t.base_path()))
        .unwrap_or_else(|| "/".to_string())
}

/// Render the landing document
pub fn render_landing(title: &str, redirect_to: &str) -> String {
    let title = escape_html(title);
    let url = escape_html(redirect_to);

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta http-equiv="refresh" content="0; url={url}">
  <link rel="canonical" href="{url}">
  <title>{title}</title>
</head>
<body>
  <p><a href="{url}">Continue to {title}</a></p>
</body>
</html>
"#
    )
}

/// Write `<output_root>/index.html`, returning its path
pub fn write_landing(config: &DeployConfig, output_root: &Path) -> DeployResult<PathBuf> {
    let path = output_root.join(ENTRY_DOCUMENT);
    let redirect = landing_redirect(config);

    write_file(&path, render_landing(&config.landing.title, &redirect).as_bytes())?;
    tracing::debug!("Landing document redirects to {}", redirect);

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_redirect_defaults_to_first_target() {
        let mut config = DeployConfig::default();
        assert_eq!(landing_redirect(&config), "/public/");

        config.landing.redirect_to = Some("/blog/".into());
        assert_eq!(landing_redirect(&config), "/blog/");

        config.landing.redirect_to = None;
        config.targets.clear();
        assert_eq!(landing_redirect(&config), "/");
    }

    #[test]
    fn test_write_landing() {
        let dir = TempDir::new().unwrap();
        let path = write_landing(&DeployConfig::default(), dir.path()).unwrap();

        let html = std::fs::read_to_string(path).unwrap();
        assert!(html.contains(r#"content="0; url=/public/""#));
        assert!(html.contains("<title>Portfolio</title>"));
    }
}
