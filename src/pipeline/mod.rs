// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deployflow contributors

//! Deployment pipeline
//!
//! The orchestrator, the states it moves through and the summary it hands
//! back to the CLI.

mod landing;
mod orchestrator;
mod state;

pub use landing::{landing_redirect, render_landing, write_landing};
pub use orchestrator::Orchestrator;
pub use state::{RewriteOutcome, RunState, RunStatus, RunSummary, TargetResult};
