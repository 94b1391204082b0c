// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deployflow contributors

//! Error recovery suggestions
//!
//! Concrete next steps printed after a run that fell back or failed.

use std::path::Path;

use super::DeployError;

/// A recovery suggestion with concrete steps
#[derive(Debug, Clone)]
pub struct RecoverySuggestion {
    /// Brief description of what to do
    pub action: String,
    /// Detailed steps
    pub steps: Vec<String>,
    /// Commands to run
    pub commands: Vec<String>,
}

impl RecoverySuggestion {
    /// Pick a suggestion for an error, if one applies
    pub fn for_error(error: &DeployError, source_root: Option<&Path>) -> Option<Self> {
        match error {
            DeployError::ToolNotFound { program, .. } => Some(Self::install_bundler(program)),
            DeployError::BuildSpawnFailed { program, .. } => Some(Self::install_bundler(program)),
            DeployError::BuildFailure { target, .. } => {
                Some(Self::inspect_build(target, source_root.unwrap_or(Path::new("."))))
            }
            DeployError::Filesystem { path, .. } => Some(Self::fix_permissions(path)),
            DeployError::ConfigNotFound { .. } => Some(Self::create_config()),
            _ => None,
        }
    }

    /// Suggest installing a missing bundler
    pub fn install_bundler(program: &str) -> Self {
        match program {
            "npm" | "npx" => Self {
                action: "Install Node.js".into(),
                steps: vec![
                    "The bundlers are driven through npm scripts".into(),
                    "Install Node.js 18 or newer, which ships npm".into(),
                ],
                commands: vec![
                    "# Using nvm:".into(),
                    "nvm install --lts".into(),
                    "".into(),
                    "# Using Homebrew (macOS/Linux):".into(),
                    "brew install node".into(),
                ],
            },
            _ => Self {
                action: format!("Install {}", program),
                steps: vec![format!("Install {} and ensure it's in your PATH", program)],
                commands: vec![],
            },
        }
    }

    /// Suggest reproducing a failed build by hand
    pub fn inspect_build(target: &str, source_root: &Path) -> Self {
        Self {
            action: format!("Fix the '{}' build", target),
            steps: vec![
                format!("The '{}' target was replaced by a placeholder page", target),
                "Dependencies are the most common cause; reinstall them and rebuild".into(),
            ],
            commands: vec![
                format!("cd {}", source_root.display()),
                "npm ci".into(),
                "npm run build".into(),
            ],
        }
    }

    /// Suggest fixing output directory permissions
    pub fn fix_permissions(path: &Path) -> Self {
        Self {
            action: "Make the output directory writable".into(),
            steps: vec![
                format!("deployflow could not write to {}", path.display()),
                "Remove stale files owned by another user or pick another --output".into(),
            ],
            commands: vec![format!("ls -ld {}", path.display())],
        }
    }

    /// Suggest creating a config file
    pub fn create_config() -> Self {
        Self {
            action: "Create a deployflow configuration".into(),
            steps: vec![
                "No .deployflow.yaml found in current directory".into(),
                "Generate the default portfolio + blog layout and edit it".into(),
            ],
            commands: vec!["deployflow init".into()],
        }
    }
}

impl std::fmt::Display for RecoverySuggestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "→ {}", self.action)?;

        for step in &self.steps {
            writeln!(f, "  {}", step)?;
        }

        if !self.commands.is_empty() {
            writeln!(f)?;
            for cmd in &self.commands {
                writeln!(f, "  {}", cmd)?;
            }
        }

        Ok(())
    }
}
