// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deployflow contributors

//! Fallback command - write one target's placeholder site

use colored::Colorize;
use miette::Result;
use std::path::PathBuf;

use crate::builders::FallbackGenerator;
use crate::cli::load_config;
use crate::config::EnvSnapshot;

/// Run the fallback command
pub async fn run(
    target: String,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
    env: EnvSnapshot,
    verbose: bool,
) -> Result<()> {
    let (mut config, base_dir) = load_config(config_path.as_deref(), &env)?;
    if let Some(output) = output {
        config.output_root = output;
    }

    let target = config.require_target(&target)?;
    let output_dir = target.output_dir(&base_dir.join(&config.output_root));

    let entry = FallbackGenerator::generate(&target.name, &target.base_path(), &output_dir)?;

    println!(
        "  {} Placeholder for '{}' written to {}",
        "✓".green(),
        target.name,
        entry.display()
    );

    if verbose {
        println!();
        let document = FallbackGenerator::placeholder_document(&target.name, &target.base_path());
        println!("{}", document.dimmed());
    }

    Ok(())
}
