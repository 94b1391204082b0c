// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deployflow contributors

//! Real builder
//!
//! Runs the target's bundler and moves its output into the artifact tree.

use async_trait::async_trait;
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;

use super::{BuildContext, BuildOutcome, Builder};
use crate::config::{BuildTarget, BuilderStrategy};
use crate::errors::DeployError;
use crate::utils::{copy_dir_contents, remove_dir_if_exists};

/// Builder that spawns the external bundler
pub struct RealBuilder;

impl RealBuilder {
    /// Create a new real builder
    pub fn new() -> Self {
        Self
    }
}

impl Default for RealBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Builder for RealBuilder {
    async fn build(&self, target: &BuildTarget, ctx: &BuildContext) -> Result<BuildOutcome, DeployError> {
        let start = Instant::now();
        let source_dir = target.source_dir(&ctx.base_dir);
        let output_dir = target.output_dir(&ctx.output_root);

        tracing::info!("Building '{}': {} (in {})", target.name, target.command, source_dir.display());

        // Leftovers from an earlier run must not pass for fresh output
        if let Some(ref bundle_dir) = target.bundle_dir {
            remove_dir_if_exists(&source_dir.join(bundle_dir))?;
        }

        let mut cmd = Command::new(&target.command.program);
        cmd.args(&target.command.args);
        cmd.current_dir(&source_dir);
        cmd.envs(ctx.env_for(target));
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::inherit());
        cmd.stderr(Stdio::inherit());
        // Dropping the build future (Ctrl-C) must not leave the bundler running
        cmd.kill_on_drop(true);

        let mut child = cmd
            .spawn()
            .map_err(|e| DeployError::spawn_failed(&target.name, &target.command.program, &e))?;

        let status = child.wait().await.map_err(|e| {
            tracing::error!("Lost track of bundler for '{}': {}", target.name, e);
            DeployError::BuildFailure {
                target: target.name.clone(),
                exit_code: None,
            }
        })?;

        if !status.success() {
            return Err(DeployError::BuildFailure {
                target: target.name.clone(),
                exit_code: status.code(),
            });
        }

        let mut files_copied = 0;
        if let Some(ref bundle_dir) = target.bundle_dir {
            let bundle_dir = source_dir.join(bundle_dir);
            if bundle_dir.is_dir() {
                files_copied = copy_dir_contents(&bundle_dir, &output_dir)?;
                tracing::debug!(
                    "Copied {} files from {} to {}",
                    files_copied,
                    bundle_dir.display(),
                    output_dir.display()
                );
            } else {
                // Left for the verifier to report
                tracing::warn!(
                    "Bundler for '{}' exited 0 but {} does not exist",
                    target.name,
                    bundle_dir.display()
                );
            }
        }

        Ok(BuildOutcome::bundled(&target.name, output_dir, files_copied, start.elapsed()))
    }

    fn strategy(&self) -> BuilderStrategy {
        BuilderStrategy::Real
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::builders::OutputKind;
    use crate::config::{BuildCommand, DeployConfig, EnvSnapshot};
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    fn make_shell_target(name: &str, script: &str) -> BuildTarget {
        let mut target = crate::config::BuildTarget::vite(name, name, name);
        target.command = BuildCommand {
            program: "sh".into(),
            args: vec!["-c".into(), script.into()],
        };
        target
    }

    fn make_context(base: &Path) -> BuildContext {
        BuildContext::new(&DeployConfig::default(), base.to_path_buf(), EnvSnapshot::default())
    }

    #[tokio::test]
    async fn test_build_copies_bundle() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("blog")).unwrap();
        let target = make_shell_target(
            "blog",
            "mkdir -p dist/assets && echo '<html></html>' > dist/index.html && echo 'x' > dist/assets/app.js",
        );

        let outcome = RealBuilder::new()
            .build(&target, &make_context(dir.path()))
            .await
            .unwrap();

        assert_eq!(outcome.kind, OutputKind::Bundled);
        assert_eq!(outcome.files_copied, 2);
        assert!(dir.path().join("dist/blog/index.html").is_file());
        assert!(dir.path().join("dist/blog/assets/app.js").is_file());
    }

    #[tokio::test]
    async fn test_build_passes_env() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("blog")).unwrap();
        let mut target = make_shell_target(
            "blog",
            "mkdir -p dist && printf '%s' \"$SITE_FLAVOR\" > dist/index.html",
        );
        target.env.insert("SITE_FLAVOR".into(), "minimal".into());

        RealBuilder::new()
            .build(&target, &make_context(dir.path()))
            .await
            .unwrap();

        let written = std::fs::read_to_string(dir.path().join("dist/blog/index.html")).unwrap();
        assert_eq!(written, "minimal");
    }

    #[tokio::test]
    async fn test_build_failure_carries_exit_code() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("blog")).unwrap();
        let target = make_shell_target("blog", "exit 3");

        let err = RealBuilder::new()
            .build(&target, &make_context(dir.path()))
            .await
            .unwrap_err();

        match err {
            DeployError::BuildFailure { target, exit_code } => {
                assert_eq!(target, "blog");
                assert_eq!(exit_code, Some(3));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_failure() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("blog")).unwrap();
        let mut target = make_shell_target("blog", "");
        target.command.program = "deployflow-no-such-bundler".into();

        let err = RealBuilder::new()
            .build(&target, &make_context(dir.path()))
            .await
            .unwrap_err();

        assert!(matches!(err, DeployError::BuildSpawnFailed { .. }));
        assert!(err.is_recoverable());
    }

    #[tokio::test]
    async fn test_stale_bundle_is_not_copied() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("blog/dist")).unwrap();
        std::fs::write(dir.path().join("blog/dist/index.html"), "<html>last week</html>").unwrap();
        let target = make_shell_target("blog", "true");

        let outcome = RealBuilder::new()
            .build(&target, &make_context(dir.path()))
            .await
            .unwrap();

        assert_eq!(outcome.files_copied, 0);
        assert!(!dir.path().join("blog/dist").exists());
        assert!(!dir.path().join("dist/blog/index.html").exists());
    }

    #[tokio::test]
    async fn test_success_without_bundle_leaves_tree_alone() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("blog")).unwrap();
        let target = make_shell_target("blog", "true");

        let outcome = RealBuilder::new()
            .build(&target, &make_context(dir.path()))
            .await
            .unwrap();

        assert_eq!(outcome.files_copied, 0);
        assert_eq!(outcome.output_dir, PathBuf::from(dir.path()).join("dist/blog"));
        assert!(!outcome.output_dir.exists());
    }
}
