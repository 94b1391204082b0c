// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deployflow contributors

//! Build command - run the full deployment pipeline

use colored::Colorize;
use miette::Result;
use std::path::PathBuf;

use crate::cli::{load_config, BuildArgs};
use crate::config::{ConfigValidator, EnvSnapshot};
use crate::errors::DeployError;
use crate::pipeline::{Orchestrator, RunStatus};

/// Run the build command
pub async fn run(
    args: BuildArgs,
    config_path: Option<PathBuf>,
    env: EnvSnapshot,
    verbose: bool,
) -> Result<()> {
    let (mut config, base_dir) = load_config(config_path.as_deref(), &env)?;

    args.tree.apply(&mut config);
    if let Some(strategy) = args.strategy {
        config.override_strategy(strategy);
    }
    if args.no_clean {
        config.clean = false;
    }

    // Validate configuration
    let validation = ConfigValidator::validate(&config);

    if !validation.is_valid() {
        eprintln!("{}", "Configuration is invalid:".red().bold());
        for error in &validation.errors {
            eprintln!("  {} {}", "✗".red(), error);
        }
        return Err(miette::miette!(
            "Configuration is invalid\n\nRun 'deployflow validate' for details."
        ));
    }

    if validation.has_warnings() && verbose {
        eprintln!("{}", "Configuration warnings:".yellow().bold());
        for warning in &validation.warnings {
            eprintln!("  {} {}", "⚠".yellow(), warning);
        }
        eprintln!();
    }

    // Missing bundlers are not fatal, their targets fall back
    for program in ConfigValidator::missing_tools(&config) {
        tracing::warn!("Bundler '{}' not found in PATH", program);
    }

    let orchestrator = Orchestrator::new(config, base_dir, env).with_verbose(verbose);
    let summary = orchestrator.run().await;

    if summary.status() == RunStatus::Success {
        return Ok(());
    }

    let error = summary.error.unwrap_or_else(|| DeployError::VerificationFailure {
        problems: summary
            .verification
            .as_ref()
            .map(|report| report.problems())
            .unwrap_or_default(),
    });

    Err(error.into())
}
