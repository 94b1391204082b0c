// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deployflow contributors

//! Per-target builders
//!
//! This module provides the builder trait and one implementation per
//! [`BuilderStrategy`]: the real bundler invocation, a diagnostic wrapper
//! around it, and the placeholder writer.

mod debug;
mod fallback;
mod real;

pub use debug::DebugBuilder;
pub use fallback::{FallbackBuilder, FallbackGenerator};
pub use real::RealBuilder;

use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::{BuildTarget, BuilderStrategy, DeployConfig, EnvSnapshot};
use crate::errors::DeployError;

/// What produced a target's output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputKind {
    /// The bundler ran and exited 0
    Bundled,
    /// The fallback placeholder was written
    Placeholder,
}

/// Result of building one target
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    /// Target name
    pub target: String,

    /// What produced the output
    pub kind: OutputKind,

    /// Target directory inside the artifact tree
    pub output_dir: PathBuf,

    /// Files copied from the bundle directory (0 when the bundler wrote in place)
    pub files_copied: usize,

    /// Build duration
    pub duration: Duration,
}

impl BuildOutcome {
    /// Create a bundled outcome
    pub fn bundled(target: &str, output_dir: PathBuf, files_copied: usize, duration: Duration) -> Self {
        Self {
            target: target.to_string(),
            kind: OutputKind::Bundled,
            output_dir,
            files_copied,
            duration,
        }
    }

    /// Create a placeholder outcome
    pub fn placeholder(target: &str, output_dir: PathBuf, duration: Duration) -> Self {
        Self {
            target: target.to_string(),
            kind: OutputKind::Placeholder,
            output_dir,
            files_copied: 0,
            duration,
        }
    }
}

/// Inputs shared by every builder invocation in a run
#[derive(Debug, Clone)]
pub struct BuildContext {
    /// Directory source roots are resolved against
    pub base_dir: PathBuf,

    /// Artifact tree root
    pub output_root: PathBuf,

    /// Environment passed to every bundler
    pub env: HashMap<String, String>,

    /// Captured process environment
    pub snapshot: EnvSnapshot,

    /// Variables identifying the hosting platform
    pub platform_vars: Vec<String>,

    /// Credential variables to report on
    pub credential_vars: Vec<String>,
}

impl BuildContext {
    /// Build a context from the configuration
    pub fn new(config: &DeployConfig, base_dir: PathBuf, snapshot: EnvSnapshot) -> Self {
        let output_root = base_dir.join(&config.output_root);

        Self {
            base_dir,
            output_root,
            env: config.env.clone(),
            snapshot,
            platform_vars: config.platform_vars.clone(),
            credential_vars: config.credential_vars.clone(),
        }
    }

    /// Global environment merged with the target's (target wins)
    pub fn env_for(&self, target: &BuildTarget) -> HashMap<String, String> {
        let mut env = self.env.clone();
        env.extend(target.env.clone());
        env
    }
}

/// Trait for per-target builders
#[async_trait]
pub trait Builder: Send + Sync {
    /// Build one target into the artifact tree
    ///
    /// Returns `BuildFailure` or `BuildSpawnFailed` when the bundler could not
    /// produce output; recovery is up to the caller.
    async fn build(&self, target: &BuildTarget, ctx: &BuildContext) -> Result<BuildOutcome, DeployError>;

    /// Strategy this builder implements
    fn strategy(&self) -> BuilderStrategy;
}

/// Create the builder for a strategy
pub fn create_builder(strategy: BuilderStrategy) -> Box<dyn Builder> {
    match strategy {
        BuilderStrategy::Real => Box::new(RealBuilder::new()),
        BuilderStrategy::Debug => Box::new(DebugBuilder::new()),
        BuilderStrategy::Fallback => Box::new(FallbackBuilder::new()),
    }
}
