// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deployflow contributors

//! Asset path rewriting
//!
//! Bundlers emit entry documents that reference `/assets/...` from the site
//! root. Once a target is served under a prefix such as `/blog/`, those
//! references break. The rewriter patches them textually and strips any
//! `<base>` tag, which would otherwise re-root every relative URL.
//!
//! This is a plain text transform, not an HTML parser. It only recognizes
//! `src`/`href` attributes whose value starts with `/assets/`, which is what
//! Vite emits.

use regex::Regex;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::config::ASSETS_DIR;
use crate::errors::{DeployError, DeployResult};
use crate::utils::write_file;

fn asset_ref_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(r#"(?P<lead>\s)(?P<attr>src|href)=(?P<quote>["'])/{}/"#, ASSETS_DIR))
            .expect("Invalid asset reference pattern")
    })
}

fn base_tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)[ \t]*<base\b[^>]*>[ \t]*(\r?\n)?").expect("Invalid base tag pattern")
    })
}

/// Substitutions applied to one entry document
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct RewriteReport {
    /// Rewritten document
    pub path: PathBuf,
    /// Asset references moved under the target prefix
    pub asset_refs: usize,
    /// `<base>` tags removed
    pub base_tags: usize,
}

impl RewriteReport {
    /// Total number of substitutions
    pub fn substitutions(&self) -> usize {
        self.asset_refs + self.base_tags
    }
}

/// Rewriter for one deployment prefix
#[derive(Debug, Clone)]
pub struct AssetPathRewriter {
    base_path: String,
}

impl AssetPathRewriter {
    /// Create a rewriter for targets served under `base_path` (e.g. `/blog/`)
    pub fn new(base_path: &str) -> Self {
        let trimmed = base_path.trim_matches('/');
        let base_path = if trimmed.is_empty() {
            "/".to_string()
        } else {
            format!("/{}/", trimmed)
        };

        Self { base_path }
    }

    /// Prefix asset references are moved under
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Rewrite a document in memory
    pub fn rewrite_str(&self, text: &str) -> (String, RewriteReport) {
        let mut report = RewriteReport::default();

        let base_tags = base_tag_regex().find_iter(text).count();
        let text = if base_tags > 0 {
            report.base_tags = base_tags;
            base_tag_regex().replace_all(text, "").into_owned()
        } else {
            text.to_string()
        };

        // Served from the root: references are already right
        if self.base_path == "/" {
            return (text, report);
        }

        let asset_refs = asset_ref_regex().find_iter(&text).count();
        if asset_refs == 0 {
            return (text, report);
        }

        report.asset_refs = asset_refs;
        let replacement = format!(
            "${{lead}}${{attr}}=${{quote}}{}{}/",
            self.base_path.replace('$', "$$"),
            ASSETS_DIR
        );
        let text = asset_ref_regex()
            .replace_all(&text, replacement.as_str())
            .into_owned();

        (text, report)
    }

    /// Rewrite an entry document in place
    ///
    /// The file is only written back when something changed. A missing file
    /// is reported as [`DeployError::RewriteFailure`].
    pub fn rewrite_file(&self, path: &Path) -> DeployResult<RewriteReport> {
        if !path.is_file() {
            return Err(DeployError::RewriteFailure {
                path: path.to_path_buf(),
            });
        }

        let original = std::fs::read_to_string(path)
            .map_err(|e| DeployError::filesystem("read", path, e))?;

        let (rewritten, mut report) = self.rewrite_str(&original);
        report.path = path.to_path_buf();

        if report.substitutions() > 0 {
            write_file(path, rewritten.as_bytes())?;
            tracing::debug!(
                "Rewrote {} asset references and {} base tags in {}",
                report.asset_refs,
                report.base_tags,
                path.display()
            );
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const VITE_OUTPUT: &str = r#"<!doctype html>
<html lang="en">
  <head>
    <base href="/">
    <script type="module" crossorigin src="/assets/index-4f2a.js"></script>
    <link rel="stylesheet" crossorigin href='/assets/index-91c0.css'>
    <link rel="icon" href="/favicon.svg">
  </head>
  <body><div id="root"></div></body>
</html>
"#;

    #[test]
    fn test_rewrite_prefixes_assets_and_strips_base() {
        let rewriter = AssetPathRewriter::new("blog");
        let (text, report) = rewriter.rewrite_str(VITE_OUTPUT);

        assert_eq!(report.asset_refs, 2);
        assert_eq!(report.base_tags, 1);
        assert!(text.contains(r#"src="/blog/assets/index-4f2a.js""#));
        assert!(text.contains("href='/blog/assets/index-91c0.css'"));
        assert!(text.contains(r#"href="/favicon.svg""#));
        assert!(!text.contains("<base"));
        assert!(text.contains("<head>\n    <script"));
    }

    #[test]
    fn test_rewrite_is_idempotent() {
        let rewriter = AssetPathRewriter::new("/blog/");
        let (once, _) = rewriter.rewrite_str(VITE_OUTPUT);
        let (twice, report) = rewriter.rewrite_str(&once);

        assert_eq!(report.substitutions(), 0);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_root_base_path_only_strips_base() {
        let rewriter = AssetPathRewriter::new("/");
        let (text, report) = rewriter.rewrite_str(VITE_OUTPUT);

        assert_eq!(report.asset_refs, 0);
        assert_eq!(report.base_tags, 1);
        assert!(text.contains(r#"src="/assets/index-4f2a.js""#));
    }

    #[test]
    fn test_rewrite_ignores_lookalikes() {
        let rewriter = AssetPathRewriter::new("/blog/");
        let text = r#"<img data-src="/assets/a.png"><a href="/assetsmanager/">x</a><img src="assets/b.png">"#;
        let (out, report) = rewriter.rewrite_str(text);

        assert_eq!(report.asset_refs, 0);
        assert_eq!(out, text);
    }

    #[test]
    fn test_rewrite_file_in_place() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("index.html");
        std::fs::write(&path, VITE_OUTPUT).unwrap();

        let rewriter = AssetPathRewriter::new("/public/");
        let report = rewriter.rewrite_file(&path).unwrap();
        assert_eq!(report.path, path);
        assert_eq!(report.substitutions(), 3);

        let on_disk = std::fs::read_to_string(&path).unwrap();
        assert!(on_disk.contains("/public/assets/index-4f2a.js"));

        let report = rewriter.rewrite_file(&path).unwrap();
        assert_eq!(report.substitutions(), 0);
    }

    #[test]
    fn test_rewrite_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("blog/index.html");

        let err = AssetPathRewriter::new("/blog/").rewrite_file(&path).unwrap_err();
        assert!(matches!(err, DeployError::RewriteFailure { .. }));
        assert!(err.to_string().contains("file not found"));
        assert!(!path.exists());
    }
}
