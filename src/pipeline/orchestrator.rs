// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deployflow contributors

//! Pipeline orchestrator
//!
//! Runs the stages of a deployment in a fixed order:
//!
//! ```text
//! START → BUILD(t) … → LANDING → REWRITE_PATHS → VERIFY → SUCCESS | FAILURE
//! ```
//!
//! A failed build moves through `FALLBACK(t)` and the run continues with the
//! next target. Filesystem errors and interrupts end the run at once.

use std::future::Future;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use colored::Colorize;

use crate::builders::{create_builder, BuildContext, BuildOutcome, FallbackGenerator, OutputKind};
use crate::config::{BuildTarget, DeployConfig, EnvSnapshot, VerifyMode};
use crate::errors::{DeployError, DeployResult, RecoverySuggestion};
use crate::pipeline::landing::write_landing;
use crate::pipeline::{RewriteOutcome, RunState, RunSummary, TargetResult};
use crate::rewriter::AssetPathRewriter;
use crate::utils::{ensure_dir, remove_dir_if_exists};
use crate::verifier::{ArtifactVerifier, VerificationReport};

/// Sequential deployment pipeline
pub struct Orchestrator {
    config: DeployConfig,
    ctx: BuildContext,
    verbose: bool,
}

/// Mutable state of a run in progress
struct Run {
    start: Instant,
    states: Vec<RunState>,
    targets: Vec<TargetResult>,
    rewrites: Vec<RewriteOutcome>,
}

impl Run {
    fn enter(&mut self, state: RunState) {
        tracing::debug!("→ {}", state);
        self.states.push(state);
    }

    fn finish(
        mut self,
        state: RunState,
        verification: Option<VerificationReport>,
        error: Option<DeployError>,
    ) -> RunSummary {
        debug_assert!(state.is_terminal());
        self.enter(state);
        RunSummary {
            states: self.states,
            targets: self.targets,
            rewrites: self.rewrites,
            verification,
            error,
            duration: self.start.elapsed(),
        }
    }
}

impl Orchestrator {
    /// Create an orchestrator; source roots and the output root resolve against `base_dir`
    pub fn new(config: DeployConfig, base_dir: PathBuf, snapshot: EnvSnapshot) -> Self {
        let ctx = BuildContext::new(&config, base_dir, snapshot);
        Self {
            config,
            ctx,
            verbose: false,
        }
    }

    /// Print recovery suggestions for fallbacks
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Configuration this orchestrator runs
    pub fn config(&self) -> &DeployConfig {
        &self.config
    }

    /// Absolute artifact tree root
    pub fn output_root(&self) -> &Path {
        &self.ctx.output_root
    }

    /// Run the pipeline, stopping early on Ctrl-C or SIGTERM
    pub async fn run(&self) -> RunSummary {
        self.run_until(interrupt_signal()).await
    }

    /// Run the pipeline, stopping early when `shutdown` completes
    ///
    /// Only a running build is raced against `shutdown`; dropping the build
    /// future kills the bundler process.
    pub async fn run_until<F>(&self, shutdown: F) -> RunSummary
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        let mut run = Run {
            start: Instant::now(),
            states: Vec::new(),
            targets: Vec::new(),
            rewrites: Vec::new(),
        };

        self.print_plan();

        run.enter(RunState::Start);
        if let Err(e) = self.prepare_output() {
            return self.fail(run, e);
        }

        for target in &self.config.targets {
            run.enter(RunState::Build(target.name.clone()));
            print!("  {} {}...", "→".blue(), target.name);
            io::stdout().flush().ok();

            let builder = create_builder(target.strategy);
            let result = tokio::select! {
                result = builder.build(target, &self.ctx) => result,
                _ = &mut shutdown => Err(DeployError::Interrupted {
                    stage: RunState::Build(target.name.clone()).to_string(),
                }),
            };

            match result {
                Ok(outcome) => {
                    self.print_built(&outcome);
                    run.targets.push(TargetResult {
                        target: target.name.clone(),
                        output: outcome.kind,
                        build_error: None,
                        duration: outcome.duration,
                    });
                }
                Err(e) if e.is_recoverable() => {
                    println!("\r  {} {} failed, using placeholder", "⚠".yellow(), target.name.bold());
                    tracing::warn!("{}", e);
                    if self.verbose {
                        let source_dir = target.source_dir(&self.ctx.base_dir);
                        if let Some(suggestion) = RecoverySuggestion::for_error(&e, Some(source_dir.as_path())) {
                            eprintln!("{}", suggestion.to_string().dimmed());
                        }
                    }

                    run.enter(RunState::Fallback(target.name.clone()));
                    let started = Instant::now();
                    let output_dir = target.output_dir(&self.ctx.output_root);
                    let generated =
                        FallbackGenerator::generate(&target.name, &target.base_path(), &output_dir);
                    if let Err(fatal) = generated {
                        return self.fail(run, fatal);
                    }

                    run.targets.push(TargetResult {
                        target: target.name.clone(),
                        output: OutputKind::Placeholder,
                        build_error: Some(e.to_string()),
                        duration: started.elapsed(),
                    });
                }
                Err(e) => {
                    println!("\r  {} {} aborted", "✗".red(), target.name.bold());
                    return self.fail(run, e);
                }
            }
        }

        if self.config.landing.enabled {
            run.enter(RunState::Landing);
            if let Err(e) = write_landing(&self.config, &self.ctx.output_root) {
                return self.fail(run, e);
            }
        }

        run.enter(RunState::RewritePaths);
        for target in &self.config.targets {
            match self.rewrite_target(target) {
                Ok(outcome) => run.rewrites.push(outcome),
                Err(e) => return self.fail(run, e),
            }
        }

        run.enter(RunState::Verify);
        let report = ArtifactVerifier::from_config(&self.config).verify(&self.ctx.output_root);
        self.print_verification(&report);

        let strict_fallback = self.config.mode == VerifyMode::Strict
            && run.targets.iter().any(|t| t.output == OutputKind::Placeholder);

        if report.passed() && !strict_fallback {
            let summary = run.finish(RunState::Success, Some(report), None);
            self.print_footer(&summary);
            summary
        } else {
            let mut problems = report.problems();
            if strict_fallback && problems.is_empty() {
                problems.push("strict mode rejects placeholder output".to_string());
            }
            let summary = run.finish(
                RunState::Failure,
                Some(report),
                Some(DeployError::VerificationFailure { problems }),
            );
            self.print_footer(&summary);
            summary
        }
    }

    /// Remove and recreate the artifact tree root
    fn prepare_output(&self) -> DeployResult<()> {
        let root = &self.ctx.output_root;
        if self.config.clean {
            tracing::debug!("Cleaning {}", root.display());
            remove_dir_if_exists(root)?;
        }
        ensure_dir(root)
    }

    /// Rewrite one target's entry document; only filesystem errors are returned
    fn rewrite_target(&self, target: &BuildTarget) -> DeployResult<RewriteOutcome> {
        if !target.rewrite_assets {
            return Ok(RewriteOutcome::Skipped {
                target: target.name.clone(),
            });
        }

        let rewriter = AssetPathRewriter::new(&target.base_path());
        match rewriter.rewrite_file(&target.entry_document(&self.ctx.output_root)) {
            Ok(report) => {
                if report.substitutions() > 0 {
                    tracing::info!(
                        "Rewrote {} paths in '{}' under {}",
                        report.substitutions(),
                        target.name,
                        rewriter.base_path()
                    );
                }
                Ok(RewriteOutcome::Rewritten {
                    target: target.name.clone(),
                    report,
                })
            }
            Err(e @ DeployError::RewriteFailure { .. }) => {
                tracing::error!("{}", e);
                println!("  {} {}", "✗".red(), e);
                Ok(RewriteOutcome::Failed {
                    target: target.name.clone(),
                    error: e.to_string(),
                })
            }
            Err(e) => Err(e),
        }
    }

    fn fail(&self, run: Run, error: DeployError) -> RunSummary {
        tracing::error!("{}", error);
        let summary = run.finish(RunState::Failure, None, Some(error));
        self.print_footer(&summary);
        summary
    }

    fn print_plan(&self) {
        println!();
        println!(
            "{}: {} → {}",
            "Deploy".bold(),
            self.config.target_names().join(", "),
            self.ctx.output_root.display()
        );
        println!("{}", "═".repeat(50));
        println!(
            "Platform: {}   Mode: {}",
            self.ctx.snapshot.platform(&self.config.platform_vars),
            self.config.mode
        );
        for (name, present) in self.ctx.snapshot.credential_presence(&self.config.credential_vars) {
            tracing::info!("{}: {}", name, if present { "set" } else { "not set" });
        }
        println!();
    }

    fn print_built(&self, outcome: &BuildOutcome) {
        match outcome.kind {
            OutputKind::Bundled => println!(
                "\r  {} {} ({:.2}s)",
                "✓".green(),
                outcome.target.bold(),
                outcome.duration.as_secs_f64()
            ),
            OutputKind::Placeholder => println!(
                "\r  {} {} {}",
                "○".dimmed(),
                outcome.target.bold(),
                "(placeholder)".dimmed()
            ),
        }
    }

    fn print_verification(&self, report: &VerificationReport) {
        for target in &report.targets {
            if target.structurally_ok() {
                let note = if target.placeholder { " (placeholder)" } else { "" };
                println!("  {} {} verified{}", "✓".green(), target.target, note.dimmed());
            } else {
                println!(
                    "  {} {} incomplete: directories_ok={} entry_file_ok={} asset_dirs_ok={}",
                    "✗".red(),
                    target.target,
                    target.directories_ok,
                    target.entry_file_ok,
                    target.asset_dirs_ok
                );
            }
        }
    }

    fn print_footer(&self, summary: &RunSummary) {
        println!();
        let secs = summary.duration.as_secs_f64();
        let fallbacks = summary.fallback_targets();
        if summary.exit_code() == 0 {
            if fallbacks.is_empty() {
                println!("{}", format!("Deploy verified in {:.2}s", secs).green());
            } else {
                println!(
                    "{}",
                    format!(
                        "Deploy verified in {:.2}s ({} fell back to placeholder)",
                        secs,
                        fallbacks.join(", ")
                    )
                    .yellow()
                );
            }
        } else {
            println!("{}", format!("Deploy failed after {:.2}s", secs).red());
        }
    }
}

/// Completes on SIGINT or SIGTERM (Ctrl-C elsewhere); never completes if no
/// handler can be installed
async fn interrupt_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => {}
                    _ = sigint.recv() => {}
                }
            }
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!("Cannot listen for interrupts: {}", e);
                std::future::pending::<()>().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Cannot listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    }
    tracing::warn!("Interrupt received, stopping");
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::config::{BuildCommand, BuilderStrategy};
    use std::time::Duration;
    use tempfile::TempDir;

    const GOOD_BUILD: &str = "mkdir -p dist/assets \
        && printf '<script type=\"module\" src=\"/assets/app.js\"></script>' > dist/index.html \
        && echo 'x' > dist/assets/app.js";

    fn shell_target(name: &str, script: &str) -> BuildTarget {
        let mut target = BuildTarget::vite(name, name, name);
        target.command = BuildCommand {
            program: "sh".into(),
            args: vec!["-c".into(), script.into()],
        };
        target
    }

    fn setup(dir: &Path, targets: Vec<BuildTarget>) -> DeployConfig {
        for target in &targets {
            std::fs::create_dir_all(dir.join(&target.source_root)).unwrap();
        }
        DeployConfig {
            targets,
            ..DeployConfig::default()
        }
    }

    fn orchestrator(dir: &Path, config: DeployConfig) -> Orchestrator {
        Orchestrator::new(config, dir.to_path_buf(), EnvSnapshot::default())
    }

    async fn run(orchestrator: &Orchestrator) -> RunSummary {
        orchestrator.run_until(std::future::pending()).await
    }

    #[tokio::test]
    async fn test_all_targets_build() {
        let dir = TempDir::new().unwrap();
        let config = setup(
            dir.path(),
            vec![shell_target("portfolio", GOOD_BUILD), shell_target("blog", GOOD_BUILD)],
        );

        let summary = run(&orchestrator(dir.path(), config)).await;

        assert_eq!(summary.exit_code(), 0, "{:?}", summary.error);
        assert_eq!(
            summary.states,
            vec![
                RunState::Start,
                RunState::Build("portfolio".into()),
                RunState::Build("blog".into()),
                RunState::Landing,
                RunState::RewritePaths,
                RunState::Verify,
                RunState::Success,
            ]
        );
        assert!(summary.fallback_targets().is_empty());

        let html = std::fs::read_to_string(dir.path().join("dist/blog/index.html")).unwrap();
        assert!(html.contains(r#"src="/blog/assets/app.js""#));
        assert!(dir.path().join("dist/index.html").is_file());
    }

    #[tokio::test]
    async fn test_failed_blog_falls_back_and_passes() {
        let dir = TempDir::new().unwrap();
        let config = setup(
            dir.path(),
            vec![shell_target("portfolio", GOOD_BUILD), shell_target("blog", "exit 1")],
        );

        let summary = run(&orchestrator(dir.path(), config)).await;

        assert_eq!(summary.exit_code(), 0, "{:?}", summary.error);
        assert!(summary.states.contains(&RunState::Fallback("blog".into())));
        assert_eq!(summary.fallback_targets(), vec!["blog"]);
        assert!(summary.target("blog").unwrap().build_error.as_deref().unwrap().contains("exit code 1"));

        let html = std::fs::read_to_string(dir.path().join("dist/blog/index.html")).unwrap();
        assert!(html.contains("check back soon"));
        assert!(summary.verification.unwrap().placeholder_targets() == vec!["blog"]);
    }

    #[tokio::test]
    async fn test_strict_mode_rejects_fallback() {
        let dir = TempDir::new().unwrap();
        let mut config = setup(
            dir.path(),
            vec![shell_target("portfolio", GOOD_BUILD), shell_target("blog", "exit 1")],
        );
        config.mode = VerifyMode::Strict;

        let summary = run(&orchestrator(dir.path(), config)).await;

        assert_eq!(summary.exit_code(), 1);
        assert!(matches!(summary.error, Some(DeployError::VerificationFailure { .. })));
        // The placeholder is still written
        assert!(dir.path().join("dist/blog/index.html").is_file());
    }

    #[tokio::test]
    async fn test_silent_bundler_fails_verification() {
        let dir = TempDir::new().unwrap();
        let config = setup(
            dir.path(),
            vec![shell_target("portfolio", GOOD_BUILD), shell_target("blog", "true")],
        );

        let summary = run(&orchestrator(dir.path(), config)).await;

        assert_eq!(summary.exit_code(), 1);
        assert!(summary.fallback_targets().is_empty());
        assert!(summary.rewrites.iter().any(|r| matches!(
            r,
            RewriteOutcome::Failed { target, error } if target == "blog" && error.contains("file not found")
        )));

        let report = summary.verification.as_ref().unwrap();
        let blog = report.targets.iter().find(|t| t.target == "blog").unwrap();
        assert!(!blog.entry_file_ok);
        assert!(matches!(summary.error, Some(DeployError::VerificationFailure { .. })));
        assert_eq!(summary.states.last(), Some(&RunState::Failure));
    }

    #[tokio::test]
    async fn test_silent_bundler_over_previous_bundle_fails_verification() {
        let dir = TempDir::new().unwrap();
        let config = setup(
            dir.path(),
            vec![shell_target("portfolio", "true"), shell_target("blog", "true")],
        );
        for name in ["portfolio", "blog"] {
            let stale = dir.path().join(name).join("dist/assets");
            std::fs::create_dir_all(&stale).unwrap();
            std::fs::write(stale.join("app.js"), "x").unwrap();
            std::fs::write(dir.path().join(name).join("dist/index.html"), "<html>last week</html>").unwrap();
        }

        let summary = run(&orchestrator(dir.path(), config)).await;

        assert_eq!(summary.exit_code(), 1);
        assert!(!dir.path().join("dist/blog/index.html").exists());
        assert!(matches!(summary.error, Some(DeployError::VerificationFailure { .. })));
    }

    #[tokio::test]
    async fn test_every_target_has_entry_document_after_failures() {
        let dir = TempDir::new().unwrap();
        let mut portfolio = shell_target("portfolio", "");
        portfolio.command.program = "deployflow-no-such-bundler".into();
        let config = setup(dir.path(), vec![portfolio, shell_target("blog", "exit 7")]);

        let summary = run(&orchestrator(dir.path(), config.clone())).await;

        assert_eq!(summary.exit_code(), 0);
        for target in &config.targets {
            let entry = target.entry_document(&dir.path().join("dist"));
            let bytes = std::fs::read(&entry).unwrap();
            assert!(!bytes.is_empty());
            assert!(FallbackGenerator::is_placeholder(&target.name, &target.base_path(), &bytes));
        }
    }

    #[tokio::test]
    async fn test_fallback_strategy_skips_bundler() {
        let dir = TempDir::new().unwrap();
        let mut blog = shell_target("blog", "exit 1");
        blog.strategy = BuilderStrategy::Fallback;
        let config = setup(dir.path(), vec![shell_target("portfolio", GOOD_BUILD), blog]);

        let summary = run(&orchestrator(dir.path(), config)).await;

        assert_eq!(summary.exit_code(), 0);
        assert!(!summary.states.contains(&RunState::Fallback("blog".into())));
        assert_eq!(summary.placeholder_targets(), vec!["blog"]);
        assert!(summary.fallback_targets().is_empty());
    }

    #[tokio::test]
    async fn test_clean_removes_stale_output() {
        let dir = TempDir::new().unwrap();
        let config = setup(
            dir.path(),
            vec![shell_target("portfolio", GOOD_BUILD), shell_target("blog", GOOD_BUILD)],
        );
        std::fs::create_dir_all(dir.path().join("dist/old")).unwrap();
        std::fs::write(dir.path().join("dist/old/stale.html"), "old").unwrap();

        run(&orchestrator(dir.path(), config)).await;

        assert!(!dir.path().join("dist/old").exists());
    }

    #[tokio::test]
    async fn test_unwritable_output_is_fatal() {
        let dir = TempDir::new().unwrap();
        let mut config = setup(dir.path(), vec![shell_target("blog", GOOD_BUILD)]);
        config.clean = false;
        std::fs::write(dir.path().join("dist"), "a file where the tree should be").unwrap();

        let summary = run(&orchestrator(dir.path(), config)).await;

        assert_eq!(summary.exit_code(), 1);
        assert_eq!(summary.states, vec![RunState::Start, RunState::Failure]);
        assert!(matches!(summary.error, Some(DeployError::Filesystem { .. })));
    }

    #[tokio::test]
    async fn test_interrupt_stops_running_build() {
        let dir = TempDir::new().unwrap();
        let config = setup(
            dir.path(),
            vec![shell_target("portfolio", "sleep 30"), shell_target("blog", GOOD_BUILD)],
        );

        let orchestrator = orchestrator(dir.path(), config);
        let started = Instant::now();
        let summary = orchestrator
            .run_until(tokio::time::sleep(Duration::from_millis(200)))
            .await;

        assert!(started.elapsed() < Duration::from_secs(10));
        assert_eq!(summary.exit_code(), 1);
        assert!(matches!(summary.error, Some(DeployError::Interrupted { .. })));
        assert_eq!(summary.states.last(), Some(&RunState::Failure));
        assert!(!summary.states.contains(&RunState::Build("blog".into())));
    }
}
