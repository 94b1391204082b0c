// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deployflow contributors

//! Configuration validation
//!
//! Validates a deployment configuration before anything is built.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use crate::config::{BuildTarget, BuilderStrategy, DeployConfig, VerifyMode};

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate a deployment configuration
    pub fn validate(config: &DeployConfig) -> ValidationResult {
        let mut result = ValidationResult::new();

        if config.targets.is_empty() {
            result.add_error("Configuration has no build targets defined");
        }

        if config.output_root.as_os_str().is_empty() {
            result.add_error("output_root is empty");
        }

        // Check for duplicate target names
        let mut seen_names = HashSet::new();
        for target in &config.targets {
            if !seen_names.insert(&target.name) {
                result.add_error(&format!("Duplicate target name: '{}'", target.name));
            }
        }

        for target in &config.targets {
            Self::validate_target(target, config, &mut result);
        }

        Self::validate_disjoint_outputs(&config.targets, &mut result);
        Self::validate_bundles_outside_tree(config, &mut result);

        result
    }

    /// Validate a single target
    fn validate_target(target: &BuildTarget, config: &DeployConfig, result: &mut ValidationResult) {
        if target.name.is_empty() {
            result.add_error("A target has an empty name");
        }

        if target.command.program.trim().is_empty() && target.strategy != BuilderStrategy::Fallback {
            result.add_error(&format!("Target '{}': Build command is empty", target.name));
        }

        let subdir = &target.output_subdir;
        if subdir.as_os_str().is_empty() || subdir == Path::new(".") {
            result.add_error(&format!(
                "Target '{}': output_subdir must name a subdirectory of the artifact tree",
                target.name
            ));
        } else if !is_contained(subdir) {
            result.add_error(&format!(
                "Target '{}': output_subdir '{}' escapes the artifact tree",
                target.name,
                subdir.display()
            ));
        }

        if let Some(ref bundle_dir) = target.bundle_dir {
            if !is_contained(bundle_dir) {
                result.add_warning(&format!(
                    "Target '{}': bundle_dir '{}' is outside the source root",
                    target.name,
                    bundle_dir.display()
                ));
            }
        }

        if let Some(ref base) = target.base_path {
            if base.contains(char::is_whitespace) || base.contains('"') || base.contains('\'') {
                result.add_error(&format!(
                    "Target '{}': base_path '{}' cannot be used in an HTML attribute",
                    target.name, base
                ));
            }
        }

        if target.strategy == BuilderStrategy::Fallback {
            let message = format!(
                "Target '{}': Uses the fallback strategy and will always ship a placeholder",
                target.name
            );
            if config.mode == VerifyMode::Strict {
                result.add_error(&format!("{} (strict mode rejects placeholders)", message));
            } else {
                result.add_warning(&message);
            }
        }
    }

    /// Target subdirectories must not nest inside each other
    fn validate_disjoint_outputs(targets: &[BuildTarget], result: &mut ValidationResult) {
        for (i, a) in targets.iter().enumerate() {
            for b in &targets[i + 1..] {
                if a.output_subdir.starts_with(&b.output_subdir)
                    || b.output_subdir.starts_with(&a.output_subdir)
                {
                    result.add_error(&format!(
                        "Targets '{}' and '{}' share output directory '{}'",
                        a.name,
                        b.name,
                        a.output_subdir.display()
                    ));
                }
            }
        }
    }

    /// A bundle directory must neither live in nor contain the artifact tree
    fn validate_bundles_outside_tree(config: &DeployConfig, result: &mut ValidationResult) {
        let output_root = normalize(&config.output_root);

        for target in &config.targets {
            let Some(ref bundle_dir) = target.bundle_dir else {
                continue;
            };
            let bundle = normalize(&target.source_root.join(bundle_dir));

            if bundle.starts_with(&output_root) || output_root.starts_with(&bundle) {
                result.add_error(&format!(
                    "Target '{}': bundle directory '{}' overlaps the artifact tree '{}'",
                    target.name,
                    bundle.display(),
                    output_root.display()
                ));
            }
        }
    }

    /// Check that each target's source root exists (runtime validation)
    pub fn validate_sources(config: &DeployConfig, base_dir: &Path) -> Vec<String> {
        config
            .targets
            .iter()
            .filter(|t| t.strategy != BuilderStrategy::Fallback)
            .filter(|t| !t.source_dir(base_dir).is_dir())
            .map(|t| {
                format!(
                    "Target '{}': Source root not found: {}",
                    t.name,
                    t.source_root.display()
                )
            })
            .collect()
    }

    /// Bundler programs that cannot be found on PATH
    pub fn missing_tools(config: &DeployConfig) -> Vec<String> {
        let mut missing: Vec<String> = config
            .targets
            .iter()
            .filter(|t| t.strategy != BuilderStrategy::Fallback)
            .map(|t| t.command.program.clone())
            .filter(|program| which::which(program).is_err())
            .collect();

        missing.sort();
        missing.dedup();
        missing
    }
}

/// Lexically resolve `.` and `..` components
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                } else {
                    out.push("..");
                }
            }
            other => out.push(other),
        }
    }
    out
}

fn is_contained(path: &Path) -> bool {
    path.components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// Result of configuration validation
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }

    pub fn add_warning(&mut self, message: &str) {
        self.warnings.push(message.to_string());
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_is_valid() {
        let result = ConfigValidator::validate(&DeployConfig::default());
        assert!(result.is_valid(), "{:?}", result.errors);
        assert!(!result.has_warnings());
    }

    #[test]
    fn test_validate_empty_targets() {
        let config = DeployConfig {
            targets: vec![],
            ..DeployConfig::default()
        };

        let result = ConfigValidator::validate(&config);
        assert!(!result.is_valid());
        assert!(result.errors[0].contains("no build targets"));
    }

    #[test]
    fn test_validate_duplicate_names() {
        let config = DeployConfig {
            targets: vec![
                BuildTarget::vite("blog", "blog", "blog"),
                BuildTarget::vite("blog", "blog2", "blog2"),
            ],
            ..DeployConfig::default()
        };

        let result = ConfigValidator::validate(&config);
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.contains("Duplicate")));
    }

    #[test]
    fn test_validate_overlapping_outputs() {
        let config = DeployConfig {
            targets: vec![
                BuildTarget::vite("portfolio", "client", "public"),
                BuildTarget::vite("blog", "blog", "public/blog"),
            ],
            ..DeployConfig::default()
        };

        let result = ConfigValidator::validate(&config);
        assert!(result.errors.iter().any(|e| e.contains("share output directory")));
    }

    #[test]
    fn test_validate_escaping_output() {
        let mut target = BuildTarget::vite("blog", "blog", "blog");
        target.output_subdir = PathBuf::from("../blog");
        let config = DeployConfig {
            targets: vec![target],
            ..DeployConfig::default()
        };

        let result = ConfigValidator::validate(&config);
        assert!(result.errors.iter().any(|e| e.contains("escapes")));
    }

    #[test]
    fn test_fallback_strategy_depends_on_mode() {
        let mut target = BuildTarget::vite("blog", "blog", "blog");
        target.strategy = BuilderStrategy::Fallback;
        let mut config = DeployConfig {
            targets: vec![target],
            ..DeployConfig::default()
        };

        let result = ConfigValidator::validate(&config);
        assert!(result.is_valid());
        assert!(result.has_warnings());

        config.mode = VerifyMode::Strict;
        let result = ConfigValidator::validate(&config);
        assert!(!result.is_valid());
    }

    #[test]
    fn test_rejects_bundle_inside_artifact_tree() {
        let config = DeployConfig {
            targets: vec![BuildTarget::vite("portfolio", ".", "public")],
            ..DeployConfig::default()
        };

        let result = ConfigValidator::validate(&config);
        assert!(!result.is_valid());
        assert!(result.errors[0].contains("overlaps the artifact tree"));

        let config = DeployConfig {
            output_root: PathBuf::from("./client/dist/../dist/site"),
            ..DeployConfig::default()
        };
        assert!(!ConfigValidator::validate(&config).is_valid());

        let config = DeployConfig {
            output_root: PathBuf::from("client"),
            ..DeployConfig::default()
        };
        assert!(!ConfigValidator::validate(&config).is_valid());
    }

    #[test]
    fn test_default_bundles_are_outside_artifact_tree() {
        let mut config = DeployConfig {
            targets: vec![BuildTarget::vite("portfolio", ".", "public")],
            ..DeployConfig::default()
        };
        config.targets[0].bundle_dir = Some(PathBuf::from("build"));
        assert!(ConfigValidator::validate(&config).is_valid());

        assert!(ConfigValidator::validate(&DeployConfig::default()).is_valid());
    }

    #[test]
    fn test_validate_sources() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("client")).unwrap();

        let missing = ConfigValidator::validate_sources(&DeployConfig::default(), dir.path());
        assert_eq!(missing.len(), 1);
        assert!(missing[0].contains("'blog'"));
    }

    #[test]
    fn test_missing_tools() {
        let mut target = BuildTarget::vite("blog", "blog", "blog");
        target.command.program = "deployflow-no-such-bundler".into();
        let config = DeployConfig {
            targets: vec![target],
            ..DeployConfig::default()
        };

        assert_eq!(
            ConfigValidator::missing_tools(&config),
            vec!["deployflow-no-such-bundler".to_string()]
        );
    }
}
