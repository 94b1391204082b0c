// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deployflow contributors

//! CLI command definitions and handlers
//!
//! Defines the command-line interface for deployflow.

pub mod build;
pub mod fallback;
pub mod init;
pub mod rewrite;
pub mod validate;
pub mod verify;

use clap::{Args, Parser, Subcommand};
use miette::Result;
use std::path::{Path, PathBuf};

use crate::config::{BuilderStrategy, DeployConfig, EnvSnapshot, VerifyMode};

/// Portfolio and blog deployment builder
///
/// Builds every target, substitutes placeholders for failed builds, fixes
/// asset paths and verifies the resulting artifact tree.
#[derive(Parser, Debug)]
#[clap(
    name = "deployflow",
    version,
    about = "Assemble the portfolio and blog bundles into one verified artifact tree",
    long_about = None,
    after_help = "Examples:\n\
        deployflow                      Build, rewrite and verify (same as 'build')\n\
        deployflow build --strict       Fail if any target falls back to a placeholder\n\
        deployflow verify --format json Check an existing artifact tree\n\
        deployflow init                 Write a default .deployflow.yaml\n\n\
        See 'deployflow <command> --help' for more information on a specific command."
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output
    #[clap(short, long, global = true)]
    pub verbose: bool,

    /// Change to directory before executing
    #[clap(short = 'C', long, global = true, value_name = "DIR")]
    pub directory: Option<PathBuf>,

    /// Config file (default: .deployflow.yaml if present, else built-in targets)
    #[clap(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build every target and verify the artifact tree
    Build(BuildArgs),

    /// Verify an existing artifact tree
    Verify {
        /// Output format
        #[clap(short, long, default_value = "text")]
        format: OutputFormat,

        #[clap(flatten)]
        tree: TreeArgs,
    },

    /// Rewrite root-relative asset paths in an entry document
    Rewrite {
        /// Entry document (defaults to the target's entry document)
        file: Option<PathBuf>,

        /// Take the prefix and default file from this target
        #[clap(short, long)]
        target: Option<String>,

        /// URL prefix the document is served under
        #[clap(short, long)]
        base_path: Option<String>,
    },

    /// Write the placeholder site for one target
    Fallback {
        /// Target name
        target: String,

        /// Artifact tree root
        #[clap(short, long, value_name = "DIR")]
        output: Option<PathBuf>,
    },

    /// Validate the configuration
    Validate,

    /// Write a default .deployflow.yaml
    Init {
        /// Overwrite an existing file
        #[clap(short, long)]
        force: bool,
    },
}

/// Options of the build command
#[derive(Args, Debug, Clone, Default)]
pub struct BuildArgs {
    /// Override the builder strategy of every target (real, debug, fallback)
    #[clap(long)]
    pub strategy: Option<BuilderStrategy>,

    /// Keep the existing artifact tree instead of starting fresh
    #[clap(long)]
    pub no_clean: bool,

    #[clap(flatten)]
    pub tree: TreeArgs,
}

/// Options shared by commands that inspect the artifact tree
#[derive(Args, Debug, Clone, Default)]
pub struct TreeArgs {
    /// Fail when any target ships placeholder content
    #[clap(long)]
    pub strict: bool,

    /// Artifact tree root
    #[clap(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,
}

impl TreeArgs {
    /// Apply to a loaded configuration
    pub fn apply(&self, config: &mut DeployConfig) {
        if self.strict {
            config.mode = VerifyMode::Strict;
        }
        if let Some(ref output) = self.output {
            config.output_root = output.clone();
        }
    }
}

/// Output format for the verify command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

/// Load the configuration for the current directory with env overrides applied
pub fn load_config(config_path: Option<&Path>, env: &EnvSnapshot) -> Result<(DeployConfig, PathBuf)> {
    let base_dir = std::env::current_dir()
        .map_err(|e| miette::miette!("Failed to get current directory: {}", e))?;

    let mut config = DeployConfig::load(config_path, &base_dir)?;
    config.apply_env(env)?;

    Ok((config, base_dir))
}
