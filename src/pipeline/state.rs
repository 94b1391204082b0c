// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deployflow contributors

//! Run states and the summary of a finished run

use serde::Serialize;
use std::time::Duration;

use crate::builders::OutputKind;
use crate::errors::DeployError;
use crate::rewriter::RewriteReport;
use crate::verifier::VerificationReport;

/// States the orchestrator passes through, in order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "target", rename_all = "snake_case")]
pub enum RunState {
    Start,
    Build(String),
    Fallback(String),
    Landing,
    RewritePaths,
    Verify,
    Success,
    Failure,
}

impl RunState {
    /// Whether this state ends a run
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Failure)
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Start => write!(f, "START"),
            Self::Build(target) => write!(f, "BUILD({})", target),
            Self::Fallback(target) => write!(f, "FALLBACK({})", target),
            Self::Landing => write!(f, "LANDING"),
            Self::RewritePaths => write!(f, "REWRITE_PATHS"),
            Self::Verify => write!(f, "VERIFY"),
            Self::Success => write!(f, "SUCCESS"),
            Self::Failure => write!(f, "FAILURE"),
        }
    }
}

/// Terminal status of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Success,
    Failure,
}

impl RunStatus {
    /// Process exit code for this status
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Success => 0,
            Self::Failure => 1,
        }
    }
}

/// What happened to one target
#[derive(Debug, Clone, Serialize)]
pub struct TargetResult {
    pub target: String,
    pub output: OutputKind,
    /// Build error that caused a fallback
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_error: Option<String>,
    pub duration: Duration,
}

impl TargetResult {
    /// The real build failed and the placeholder took its place
    pub fn fell_back(&self) -> bool {
        self.build_error.is_some()
    }
}

/// What happened when rewriting one target's entry document
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum RewriteOutcome {
    Rewritten { target: String, report: RewriteReport },
    Skipped { target: String },
    Failed { target: String, error: String },
}

/// Everything a run did, consumed by the CLI for output and exit code
#[derive(Debug)]
pub struct RunSummary {
    /// Visited states, ending in a terminal one
    pub states: Vec<RunState>,
    pub targets: Vec<TargetResult>,
    pub rewrites: Vec<RewriteOutcome>,
    /// Absent when the run stopped before VERIFY
    pub verification: Option<VerificationReport>,
    /// Fatal error that cut the run short
    pub error: Option<DeployError>,
    pub duration: Duration,
}

impl RunSummary {
    /// Terminal status (the last recorded state)
    pub fn status(&self) -> RunStatus {
        match self.states.last() {
            Some(RunState::Success) => RunStatus::Success,
            _ => RunStatus::Failure,
        }
    }

    /// Process exit code
    pub fn exit_code(&self) -> i32 {
        self.status().exit_code()
    }

    /// Targets that shipped placeholder content after a failed build
    pub fn fallback_targets(&self) -> Vec<&str> {
        self.targets
            .iter()
            .filter(|t| t.fell_back())
            .map(|t| t.target.as_str())
            .collect()
    }

    /// Targets whose output is a placeholder, for any reason
    pub fn placeholder_targets(&self) -> Vec<&str> {
        self.targets
            .iter()
            .filter(|t| t.output == OutputKind::Placeholder)
            .map(|t| t.target.as_str())
            .collect()
    }

    /// Result of a target, if it was reached
    pub fn target(&self, name: &str) -> Option<&TargetResult> {
        self.targets.iter().find(|t| t.target == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_display() {
        assert_eq!(RunState::Build("blog".into()).to_string(), "BUILD(blog)");
        assert_eq!(RunState::RewritePaths.to_string(), "REWRITE_PATHS");
        assert!(RunState::Failure.is_terminal());
        assert!(!RunState::Verify.is_terminal());
    }

    #[test]
    fn test_status_follows_last_state() {
        let mut summary = RunSummary {
            states: vec![RunState::Start, RunState::Verify, RunState::Success],
            targets: vec![],
            rewrites: vec![],
            verification: None,
            error: None,
            duration: Duration::ZERO,
        };
        assert_eq!(summary.exit_code(), 0);

        summary.states.push(RunState::Failure);
        assert_eq!(summary.status(), RunStatus::Failure);
        assert_eq!(summary.exit_code(), 1);

        summary.states.clear();
        assert_eq!(summary.exit_code(), 1);
    }
}
