// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deployflow contributors

//! Validate command - check deployment configuration

use colored::Colorize;
use miette::Result;
use std::path::PathBuf;

use crate::cli::load_config;
use crate::config::{ConfigValidator, EnvSnapshot};
use crate::errors::{DeployError, RecoverySuggestion};

/// Run the validate command
pub async fn run(config_path: Option<PathBuf>, env: EnvSnapshot, verbose: bool) -> Result<()> {
    println!("{}", "Validating configuration...".bold());
    println!();

    let (config, base_dir) = match load_config(config_path.as_deref(), &env) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("  {} Failed to load configuration", "✗".red());
            eprintln!();
            return Err(e);
        }
    };

    println!("  {} Configuration parsed", "✓".green());

    let validation = ConfigValidator::validate(&config);
    let missing_sources = ConfigValidator::validate_sources(&config, &base_dir);
    let missing_tools = ConfigValidator::missing_tools(&config);

    if !validation.errors.is_empty() {
        println!();
        println!("{}:", "Errors".red().bold());
        for error in &validation.errors {
            println!("  {} {}", "✗".red(), error);
        }
    }

    if !missing_sources.is_empty() || !missing_tools.is_empty() {
        println!();
        println!("{}:", "Will fall back".yellow().bold());
        for missing in &missing_sources {
            println!("  {} {}", "⚠".yellow(), missing);
        }
        for program in &missing_tools {
            let error = DeployError::tool_not_found(program);
            println!("  {} {}", "⚠".yellow(), error);
            if let Some(suggestion) = RecoverySuggestion::for_error(&error, None) {
                for step in &suggestion.steps {
                    println!("      {}", step.dimmed());
                }
            }
        }
    }

    if !validation.warnings.is_empty() {
        println!();
        println!("{}:", "Warnings".yellow().bold());
        for warning in &validation.warnings {
            println!("  {} {}", "⚠".yellow(), warning);
        }
    }

    if verbose {
        println!();
        println!("{}:", "Deployment summary".bold());
        println!("  Output: {}", config.output_root.display());
        println!("  Mode: {}", config.mode);
        println!("  Targets: {}", config.targets.len());
        for target in &config.targets {
            println!(
                "    - {} ({}) → {}{}",
                target.name,
                target.strategy,
                target.base_path(),
                format!(" [{}]", target.command).dimmed()
            );
        }
    }

    println!();

    if !validation.is_valid() {
        Err(miette::miette!("Configuration validation failed"))
    } else if validation.has_warnings() || !missing_sources.is_empty() || !missing_tools.is_empty() {
        println!("{}", "Configuration is valid but has warnings.".yellow().bold());
        Ok(())
    } else {
        println!("{}", "Configuration is valid!".green().bold());
        Ok(())
    }
}
