// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deployflow contributors

//! Rewrite command - fix asset paths in a single entry document

use colored::Colorize;
use miette::Result;
use std::path::PathBuf;

use crate::cli::load_config;
use crate::config::EnvSnapshot;
use crate::rewriter::AssetPathRewriter;

/// Run the rewrite command
pub async fn run(
    file: Option<PathBuf>,
    target: Option<String>,
    base_path: Option<String>,
    config_path: Option<PathBuf>,
    env: EnvSnapshot,
    verbose: bool,
) -> Result<()> {
    let (config, base_dir) = load_config(config_path.as_deref(), &env)?;

    let target = target
        .as_deref()
        .map(|name| config.require_target(name))
        .transpose()?;

    let base_path = match (base_path, target) {
        (Some(base), _) => base,
        (None, Some(target)) => target.base_path(),
        (None, None) => {
            return Err(miette::miette!(
                "Nothing to rewrite against\n\n\
                 Pass --target <NAME> or --base-path <PREFIX>."
            ))
        }
    };

    let path = match (file, target) {
        (Some(file), _) => base_dir.join(file),
        (None, Some(target)) => target.entry_document(&base_dir.join(&config.output_root)),
        (None, None) => {
            return Err(miette::miette!(
                "No entry document given\n\n\
                 Pass a file or --target <NAME>."
            ))
        }
    };

    let rewriter = AssetPathRewriter::new(&base_path);
    let report = rewriter.rewrite_file(&path)?;

    if report.substitutions() == 0 {
        println!("  {} {} already uses {}", "✓".green(), path.display(), rewriter.base_path());
    } else {
        println!(
            "  {} {} rewritten under {}",
            "✓".green(),
            path.display(),
            rewriter.base_path().cyan()
        );
    }

    if verbose {
        println!("    asset references: {}", report.asset_refs);
        println!("    base tags removed: {}", report.base_tags);
    }

    Ok(())
}
