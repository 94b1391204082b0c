// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deployflow contributors

//! Debug builder
//!
//! Wraps the real builder with environment and file tree diagnostics.

use async_trait::async_trait;
use std::path::Path;
use walkdir::WalkDir;

use super::{BuildContext, BuildOutcome, Builder, RealBuilder};
use crate::config::{BuildTarget, BuilderStrategy};
use crate::errors::DeployError;

/// How many entries of a tree listing are logged
const LISTING_LIMIT: usize = 50;

/// Builder that logs what the bundler sees and what it produced
pub struct DebugBuilder {
    inner: RealBuilder,
}

impl DebugBuilder {
    /// Create a new debug builder
    pub fn new() -> Self {
        Self {
            inner: RealBuilder::new(),
        }
    }

    fn log_environment(target: &BuildTarget, ctx: &BuildContext) {
        tracing::info!(
            "[{}] platform: {}",
            target.name,
            ctx.snapshot.platform(&ctx.platform_vars)
        );

        for (name, present) in ctx.snapshot.credential_presence(&ctx.credential_vars) {
            tracing::info!(
                "[{}] {}: {}",
                target.name,
                name,
                if present { "set" } else { "not set" }
            );
        }

        let mut passed: Vec<_> = ctx.env_for(target).into_keys().collect();
        passed.sort();
        if !passed.is_empty() {
            tracing::info!("[{}] passing to bundler: {}", target.name, passed.join(", "));
        }
    }

    fn log_tree(target: &str, label: &str, root: &Path, max_depth: usize) {
        if !root.exists() {
            tracing::info!("[{}] {} {} does not exist", target, label, root.display());
            return;
        }

        let entries: Vec<_> = WalkDir::new(root)
            .min_depth(1)
            .max_depth(max_depth)
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok)
            .collect();

        tracing::info!("[{}] {} {} ({} entries)", target, label, root.display(), entries.len());
        for entry in entries.iter().take(LISTING_LIMIT) {
            let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
            let suffix = if entry.file_type().is_dir() { "/" } else { "" };
            tracing::info!("[{}]   {}{}", target, relative.display(), suffix);
        }
        if entries.len() > LISTING_LIMIT {
            tracing::info!("[{}]   ... {} more", target, entries.len() - LISTING_LIMIT);
        }
    }
}

impl Default for DebugBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Builder for DebugBuilder {
    async fn build(&self, target: &BuildTarget, ctx: &BuildContext) -> Result<BuildOutcome, DeployError> {
        Self::log_environment(target, ctx);
        Self::log_tree(&target.name, "source", &target.source_dir(&ctx.base_dir), 1);

        let result = self.inner.build(target, ctx).await;

        match &result {
            Ok(outcome) => {
                tracing::info!(
                    "[{}] bundler finished in {:.2}s",
                    target.name,
                    outcome.duration.as_secs_f64()
                );
                Self::log_tree(&target.name, "output", &outcome.output_dir, usize::MAX);
            }
            Err(e) => tracing::error!("[{}] {}", target.name, e),
        }

        result
    }

    fn strategy(&self) -> BuilderStrategy {
        BuilderStrategy::Debug
    }
}
