// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deployflow contributors

//! deployflow - portfolio and blog deployment builder
//!
//! Builds each front-end bundle, substitutes placeholders for failed builds
//! and verifies the artifact tree a static host will serve.

use clap::Parser;
use miette::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use deployflow::cli::{BuildArgs, Cli, Commands};
use deployflow::config::EnvSnapshot;
use deployflow::utils::should_use_colors;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "deployflow=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();

    // Change to specified directory if provided
    if let Some(ref dir) = cli.directory {
        std::env::set_current_dir(dir).map_err(|e| {
            miette::miette!("Failed to change to directory '{}': {}", dir.display(), e)
        })?;
    }

    // Read the process environment once
    let env = EnvSnapshot::capture();
    if !should_use_colors(&env) {
        colored::control::set_override(false);
    }

    // Dispatch to command handlers
    match cli.command {
        None => deployflow::cli::build::run(BuildArgs::default(), cli.config, env, cli.verbose).await,
        Some(Commands::Build(args)) => {
            deployflow::cli::build::run(args, cli.config, env, cli.verbose).await
        }
        Some(Commands::Verify { format, tree }) => {
            deployflow::cli::verify::run(format, tree, cli.config, env, cli.verbose).await
        }
        Some(Commands::Rewrite {
            file,
            target,
            base_path,
        }) => deployflow::cli::rewrite::run(file, target, base_path, cli.config, env, cli.verbose).await,
        Some(Commands::Fallback { target, output }) => {
            deployflow::cli::fallback::run(target, output, cli.config, env, cli.verbose).await
        }
        Some(Commands::Validate) => deployflow::cli::validate::run(cli.config, env, cli.verbose).await,
        Some(Commands::Init { force }) => deployflow::cli::init::run(force, cli.verbose).await,
    }
}
