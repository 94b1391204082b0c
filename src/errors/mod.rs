// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deployflow contributors

//! Error types with actionable messages
//!
//! Build failures are recoverable (the orchestrator substitutes a placeholder),
//! everything touching the filesystem or the final verdict is not. The
//! [`DeployError::is_recoverable`] helper encodes that split.

mod recovery;

pub use recovery::RecoverySuggestion;

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for deployflow operations
pub type DeployResult<T> = Result<T, DeployError>;

/// Main error type for deployflow
#[derive(Error, Debug, Diagnostic)]
pub enum DeployError {
    // ─────────────────────────────────────────────────────────────────────────
    // Build Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Build for target '{target}' failed{}", exit_suffix(.exit_code))]
    #[diagnostic(
        code(deployflow::build_failure),
        help("Run the bundler by hand in the target's source root to see the full error")
    )]
    BuildFailure {
        target: String,
        exit_code: Option<i32>,
    },

    #[error("Could not start bundler '{program}' for target '{target}': {error}")]
    #[diagnostic(code(deployflow::build_spawn_failed))]
    BuildSpawnFailed {
        target: String,
        program: String,
        error: String,
        #[help]
        help: Option<String>,
    },

    #[error("Bundler '{program}' not found in PATH")]
    #[diagnostic(code(deployflow::tool_not_found), help("{suggestion}"))]
    ToolNotFound { program: String, suggestion: String },

    // ─────────────────────────────────────────────────────────────────────────
    // Post-processing Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Cannot rewrite asset paths: file not found: {path}")]
    #[diagnostic(
        code(deployflow::rewrite_failure),
        help("The bundler did not emit an entry document here; verification will report it too")
    )]
    RewriteFailure { path: PathBuf },

    #[error("Artifact tree failed verification: {}", .problems.join("; "))]
    #[diagnostic(
        code(deployflow::verification_failure),
        help("Run 'deployflow verify' to list every checked path")
    )]
    VerificationFailure { problems: Vec<String> },

    // ─────────────────────────────────────────────────────────────────────────
    // Filesystem Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Filesystem operation '{operation}' failed for '{path}': {error}")]
    #[diagnostic(
        code(deployflow::filesystem),
        help("Check that the output directory is writable")
    )]
    Filesystem {
        operation: &'static str,
        path: PathBuf,
        error: String,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Config file not found: {path}")]
    #[diagnostic(
        code(deployflow::config_not_found),
        help("Create one with 'deployflow init' or run without --config to use the defaults")
    )]
    ConfigNotFound { path: PathBuf },

    #[error("Invalid configuration: {reason}")]
    #[diagnostic(code(deployflow::invalid_config))]
    InvalidConfig {
        reason: String,
        #[help]
        help: Option<String>,
    },

    #[error("Unknown build target: {target}")]
    #[diagnostic(code(deployflow::unknown_target))]
    UnknownTarget {
        target: String,
        #[help]
        help: Option<String>,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Run Control
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Interrupted while running stage '{stage}'")]
    #[diagnostic(code(deployflow::interrupted))]
    Interrupted { stage: String },

    // ─────────────────────────────────────────────────────────────────────────
    // IO/Parsing Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("IO error: {message}")]
    #[diagnostic(code(deployflow::io_error))]
    Io { message: String },

    #[error("YAML parsing error: {message}")]
    #[diagnostic(code(deployflow::yaml_error))]
    Yaml { message: String },

    #[error("JSON error: {message}")]
    #[diagnostic(code(deployflow::json_error))]
    Json { message: String },

    #[error("TOML parsing error: {message}")]
    #[diagnostic(code(deployflow::toml_error))]
    Toml { message: String },
}

fn exit_suffix(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!(" with exit code {}", c),
        None => String::new(),
    }
}

impl From<std::io::Error> for DeployError {
    fn from(e: std::io::Error) -> Self {
        Self::Io { message: e.to_string() }
    }
}

impl From<serde_yaml::Error> for DeployError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Yaml { message: e.to_string() }
    }
}

impl From<serde_json::Error> for DeployError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json { message: e.to_string() }
    }
}

impl From<toml::de::Error> for DeployError {
    fn from(e: toml::de::Error) -> Self {
        Self::Toml { message: e.to_string() }
    }
}

impl DeployError {
    /// Wrap an io error raised while touching `path`
    pub fn filesystem(operation: &'static str, path: impl Into<PathBuf>, error: std::io::Error) -> Self {
        Self::Filesystem {
            operation,
            path: path.into(),
            error: error.to_string(),
        }
    }

    /// Create a tool not found error with an installation hint
    pub fn tool_not_found(program: &str) -> Self {
        let suggestion = match program {
            "npm" | "npx" => "Install Node.js (which ships npm): https://nodejs.org/".to_string(),
            "pnpm" => "Install pnpm: npm install -g pnpm".to_string(),
            "yarn" => "Install yarn: npm install -g yarn".to_string(),
            "bun" => "Install bun: https://bun.sh/".to_string(),
            _ => format!("Install {} and ensure it's in your PATH", program),
        };

        Self::ToolNotFound {
            program: program.to_string(),
            suggestion,
        }
    }

    /// Create a spawn failure with a hint derived from the io error
    pub fn spawn_failed(target: &str, program: &str, error: &std::io::Error) -> Self {
        let help = match error.kind() {
            std::io::ErrorKind::NotFound => {
                Some(format!("'{}' is not installed or the source root does not exist", program))
            }
            std::io::ErrorKind::PermissionDenied => {
                Some(format!("'{}' is not executable", program))
            }
            _ => None,
        };

        Self::BuildSpawnFailed {
            target: target.to_string(),
            program: program.to_string(),
            error: error.to_string(),
            help,
        }
    }

    /// Whether the orchestrator may compensate for this error with a fallback
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::BuildFailure { .. } | Self::BuildSpawnFailed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_failures_are_recoverable() {
        let err = DeployError::BuildFailure {
            target: "blog".into(),
            exit_code: Some(1),
        };
        assert!(err.is_recoverable());
        assert_eq!(err.to_string(), "Build for target 'blog' failed with exit code 1");

        let err = DeployError::BuildFailure {
            target: "blog".into(),
            exit_code: None,
        };
        assert_eq!(err.to_string(), "Build for target 'blog' failed");
    }

    #[test]
    fn test_filesystem_is_fatal() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = DeployError::filesystem("create_dir", "/dist/blog", io);
        assert!(!err.is_recoverable());
        assert!(err.to_string().contains("/dist/blog"));
    }

    #[test]
    fn test_spawn_failed_hint() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        match DeployError::spawn_failed("portfolio", "vite", &io) {
            DeployError::BuildSpawnFailed { help, .. } => {
                assert!(help.unwrap().contains("vite"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
