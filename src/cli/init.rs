// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deployflow contributors

//! Init command - write a default deployment configuration

use colored::Colorize;
use miette::Result;
use std::path::Path;

use crate::config::{DeployConfig, CONFIG_FILE_NAMES};
use crate::errors::DeployError;

const HEADER: &str = "# deployflow configuration\n\
# Targets are built in order into <output_root>/<output_subdir>.\n\
# A target whose build fails ships a placeholder page instead.\n\n";

/// Run the init command
pub async fn run(force: bool, verbose: bool) -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAMES[0]);

    println!("{}", "Initializing deployflow configuration...".bold());
    println!();

    if path.exists() && !force {
        return Err(miette::miette!(
            "{} already exists. Use --force to overwrite.",
            path.display()
        ));
    }

    let content = render_default()?;

    std::fs::write(path, &content).map_err(|e| DeployError::filesystem("write", path, e))?;

    println!("  {} Created {}", "✓".green(), path.display());
    println!();
    println!("Next steps:");
    println!("  1. Edit {} to point at your front-end projects", path.display().to_string().cyan());
    println!("  2. Run {} to check it", "deployflow validate".cyan());
    println!("  3. Run {} to produce the artifact tree", "deployflow build".cyan());
    println!();

    if verbose {
        println!("{}", "Generated configuration:".dimmed());
        println!("{}", "─".repeat(50).dimmed());
        println!("{}", content.dimmed());
    }

    Ok(())
}

/// Default configuration with a short explanatory header
pub fn render_default() -> Result<String> {
    let yaml = DeployConfig::default().to_yaml()?;
    Ok(format!("{}{}", HEADER, yaml))
}
