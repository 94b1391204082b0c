// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deployflow contributors

//! Verify command - check an existing artifact tree

use colored::Colorize;
use miette::Result;
use std::path::PathBuf;

use crate::cli::{load_config, OutputFormat, TreeArgs};
use crate::config::EnvSnapshot;
use crate::errors::DeployError;
use crate::verifier::{ArtifactVerifier, VerificationReport};

/// Run the verify command
pub async fn run(
    format: OutputFormat,
    tree: TreeArgs,
    config_path: Option<PathBuf>,
    env: EnvSnapshot,
    verbose: bool,
) -> Result<()> {
    let (mut config, base_dir) = load_config(config_path.as_deref(), &env)?;
    tree.apply(&mut config);

    let root = base_dir.join(&config.output_root);
    let report = ArtifactVerifier::from_config(&config).verify(&root);

    match format {
        OutputFormat::Text => print_text(&report, verbose),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&report).map_err(DeployError::from)?;
            println!("{}", json);
        }
    }

    if report.passed() {
        Ok(())
    } else {
        Err(DeployError::VerificationFailure {
            problems: report.problems(),
        }
        .into())
    }
}

fn print_text(report: &VerificationReport, verbose: bool) {
    println!("{} {} ({})", "Verifying".bold(), report.root.display(), report.mode);
    println!();

    for checked in &report.checked {
        if checked.ok && !verbose {
            continue;
        }
        let mark = if checked.ok { "✓".green() } else { "✗".red() };
        println!(
            "  {} {} {}",
            mark,
            checked.path.display(),
            format!("[{}: {}]", checked.role, checked.status).dimmed()
        );
    }

    for target in &report.targets {
        if target.structurally_ok() {
            let note = if target.placeholder { " (placeholder)" } else { "" };
            println!("  {} {}{}", "✓".green(), target.target, note.yellow());
        } else {
            println!("  {} {}", "✗".red(), target.target);
        }
    }

    println!();
    if report.passed() {
        println!("{}", "Artifact tree is complete!".green().bold());
    } else {
        println!("{}", "Artifact tree is incomplete".red().bold());
    }
}
