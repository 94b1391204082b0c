// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deployflow contributors

//! # deployflow - Portfolio and Blog Deployment Builder
//!
//! `deployflow` assembles independently bundled front-end applications into a
//! single artifact tree for a static host.
//!
//! ## Features
//!
//! - **Per-target builds** - Each bundle is built in its own source root
//! - **Graceful fallback** - A failed build ships a placeholder page instead
//! - **Asset path rewriting** - Root-relative asset URLs follow the target's prefix
//! - **Structural verification** - The tree is checked before it is handed off
//!
//! ## Quick Start
//!
//! ```bash
//! # Write a default configuration
//! deployflow init
//!
//! # Build, rewrite and verify
//! deployflow
//!
//! # Fail when anything falls back to a placeholder
//! deployflow build --strict
//! ```

pub mod builders;
pub mod cli;
pub mod config;
pub mod errors;
pub mod pipeline;
pub mod rewriter;
pub mod utils;
pub mod verifier;

// Re-export commonly used types
pub use builders::FallbackGenerator;
pub use config::{BuildTarget, DeployConfig};
pub use errors::{DeployError, DeployResult};
pub use pipeline::{Orchestrator, RunSummary};
pub use rewriter::AssetPathRewriter;
pub use verifier::{ArtifactVerifier, VerificationReport};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
