// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deployflow contributors

//! Fallback generator
//!
//! Writes a minimal placeholder site for a target so the artifact tree is
//! structurally complete even when the real build failed.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Instant;

use super::{BuildContext, BuildOutcome, Builder};
use crate::config::{BuildTarget, BuilderStrategy, ASSETS_DIR, ENTRY_DOCUMENT};
use crate::errors::{DeployError, DeployResult};
use crate::utils::{escape_html, write_file};

/// File name of the placeholder stylesheet inside `assets/`
pub const PLACEHOLDER_STYLESHEET: &str = "placeholder.css";

/// Meta tag name marking a placeholder document
pub const PLACEHOLDER_MARKER: &str = "deployflow-placeholder";

const PLACEHOLDER_CSS: &str = "\
body {
  margin: 0;
  min-height: 100vh;
  display: grid;
  place-items: center;
  font-family: system-ui, -apple-system, sans-serif;
  background: #0f172a;
  color: #e2e8f0;
}

main {
  text-align: center;
  padding: 2rem;
}
";

/// Placeholder writer
pub struct FallbackGenerator;

impl FallbackGenerator {
    /// Placeholder entry document for a target served under `base_path`
    ///
    /// The stylesheet link is prefix-absolute so it resolves the same with
    /// or without a trailing slash on the page URL.
    pub fn placeholder_document(target_name: &str, base_path: &str) -> String {
        let name = escape_html(target_name);
        let title = escape_html(&title_case(target_name));
        let base = escape_html(base_path);

        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <meta name="{marker}" content="{name}">
  <title>{title} - coming soon</title>
  <link rel="stylesheet" href="{base}{assets}/{css}">
</head>
<body>
  <main>
    <h1>{title}</h1>
    <p>This section is being rebuilt. Please check back soon.</p>
  </main>
</body>
</html>
"#,
            marker = PLACEHOLDER_MARKER,
            assets = ASSETS_DIR,
            css = PLACEHOLDER_STYLESHEET,
        )
    }

    /// Digest of the placeholder document for a target
    pub fn placeholder_digest(target_name: &str, base_path: &str) -> blake3::Hash {
        blake3::hash(Self::placeholder_document(target_name, base_path).as_bytes())
    }

    /// Write the placeholder into `output_dir`
    ///
    /// Creates the directory tree if needed and overwrites any previous
    /// placeholder, so repeated calls leave identical bytes behind. Returns
    /// the entry document path.
    pub fn generate(target_name: &str, base_path: &str, output_dir: &Path) -> DeployResult<PathBuf> {
        let entry = output_dir.join(ENTRY_DOCUMENT);
        let stylesheet = output_dir.join(ASSETS_DIR).join(PLACEHOLDER_STYLESHEET);

        write_file(&entry, Self::placeholder_document(target_name, base_path).as_bytes())?;
        write_file(&stylesheet, PLACEHOLDER_CSS.as_bytes())?;

        tracing::info!("Wrote placeholder for '{}' to {}", target_name, entry.display());
        Ok(entry)
    }

    /// Whether `content` is exactly the placeholder for `target_name`
    pub fn is_placeholder(target_name: &str, base_path: &str, content: &[u8]) -> bool {
        blake3::hash(content) == Self::placeholder_digest(target_name, base_path)
    }
}

fn title_case(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Builder that never runs a bundler
pub struct FallbackBuilder;

impl FallbackBuilder {
    /// Create a new fallback builder
    pub fn new() -> Self {
        Self
    }
}

impl Default for FallbackBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Builder for FallbackBuilder {
    async fn build(&self, target: &BuildTarget, ctx: &BuildContext) -> Result<BuildOutcome, DeployError> {
        let start = Instant::now();
        let output_dir = target.output_dir(&ctx.output_root);

        FallbackGenerator::generate(&target.name, &target.base_path(), &output_dir)?;

        Ok(BuildOutcome::placeholder(&target.name, output_dir, start.elapsed()))
    }

    fn strategy(&self) -> BuilderStrategy {
        BuilderStrategy::Fallback
    }
}
