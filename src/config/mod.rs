// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deployflow contributors

//! Deployment configuration
//!
//! Everything the pipeline needs to know lives in [`DeployConfig`]: the build
//! targets, the artifact tree layout and the verification policy. It is read
//! from `.deployflow.yaml` (or `.deployflow.toml`) when present and falls back
//! to the built-in portfolio + blog layout otherwise. Process environment is
//! captured once into an [`EnvSnapshot`] and applied on top.

mod env;
mod validation;

pub use env::EnvSnapshot;
pub use validation::{ConfigValidator, ValidationResult};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::errors::{DeployError, DeployResult};

/// Name of every entry document in the artifact tree
pub const ENTRY_DOCUMENT: &str = "index.html";

/// Name of each target's asset subdirectory
pub const ASSETS_DIR: &str = "assets";

/// Config file names probed in order when no explicit path is given
pub const CONFIG_FILE_NAMES: &[&str] = &[".deployflow.yaml", ".deployflow.yml", ".deployflow.toml"];

/// Overrides `output_root`
pub const ENV_OUTPUT: &str = "DEPLOYFLOW_OUTPUT";

/// Overrides `mode` (`strict` or `lenient`)
pub const ENV_MODE: &str = "DEPLOYFLOW_MODE";

/// Top-level deployment configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployConfig {
    /// Config version (for future compatibility)
    #[serde(default = "default_version")]
    pub version: String,

    /// Root of the artifact tree
    #[serde(default = "default_output_root")]
    pub output_root: PathBuf,

    /// Remove the artifact tree before building
    #[serde(default = "default_true")]
    pub clean: bool,

    /// Whether placeholder output fails the run
    #[serde(default)]
    pub mode: VerifyMode,

    /// Targets in build order
    #[serde(default = "default_targets")]
    pub targets: Vec<BuildTarget>,

    /// Top-level landing document
    #[serde(default)]
    pub landing: LandingConfig,

    /// Environment passed to every bundler
    #[serde(default)]
    pub env: HashMap<String, String>,

    /// Variables whose presence identifies the hosting platform
    #[serde(default = "default_platform_vars")]
    pub platform_vars: Vec<String>,

    /// Service credentials; only their presence is ever logged
    #[serde(default = "default_credential_vars")]
    pub credential_vars: Vec<String>,
}

fn default_version() -> String {
    "1".to_string()
}

fn default_output_root() -> PathBuf {
    PathBuf::from("dist")
}

fn default_true() -> bool {
    true
}

fn default_platform_vars() -> Vec<String> {
    vec!["VERCEL".into(), "NETLIFY".into(), "CI".into()]
}

fn default_credential_vars() -> Vec<String> {
    vec![
        "SUPABASE_URL".into(),
        "SUPABASE_ANON_KEY".into(),
        "EMAILJS_SERVICE_ID".into(),
    ]
}

fn default_targets() -> Vec<BuildTarget> {
    vec![
        BuildTarget::vite("portfolio", "client", "public"),
        BuildTarget::vite("blog", "blog", "blog"),
    ]
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            output_root: default_output_root(),
            clean: true,
            mode: VerifyMode::default(),
            targets: default_targets(),
            landing: LandingConfig::default(),
            env: HashMap::new(),
            platform_vars: default_platform_vars(),
            credential_vars: default_credential_vars(),
        }
    }
}

impl DeployConfig {
    /// Load configuration
    ///
    /// An explicit path must exist. Without one, the `CONFIG_FILE_NAMES` are
    /// probed in `base_dir` and the built-in defaults are used if none exists.
    pub fn load(explicit: Option<&Path>, base_dir: &Path) -> DeployResult<Self> {
        if let Some(path) = explicit {
            let path = base_dir.join(path);
            if !path.exists() {
                return Err(DeployError::ConfigNotFound { path });
            }
            return Self::from_file(&path);
        }

        for name in CONFIG_FILE_NAMES {
            let candidate = base_dir.join(name);
            if candidate.is_file() {
                tracing::debug!("Using config file {}", candidate.display());
                return Self::from_file(&candidate);
            }
        }

        tracing::debug!("No config file found, using built-in targets");
        Ok(Self::default())
    }

    /// Load configuration from a YAML or TOML file (chosen by extension)
    pub fn from_file(path: &Path) -> DeployResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| DeployError::filesystem("read", path, e))?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml(&content),
            _ => Self::from_yaml(&content),
        }
    }

    /// Parse configuration from YAML
    pub fn from_yaml(yaml: &str) -> DeployResult<Self> {
        serde_yaml::from_str(yaml).map_err(Into::into)
    }

    /// Parse configuration from TOML
    pub fn from_toml(text: &str) -> DeployResult<Self> {
        toml::from_str(text).map_err(Into::into)
    }

    /// Serialize configuration to YAML
    pub fn to_yaml(&self) -> DeployResult<String> {
        serde_yaml::to_string(self).map_err(Into::into)
    }

    /// Apply `DEPLOYFLOW_*` overrides from the captured environment
    pub fn apply_env(&mut self, env: &EnvSnapshot) -> DeployResult<()> {
        if let Some(output) = env.get(ENV_OUTPUT).filter(|v| !v.is_empty()) {
            self.output_root = PathBuf::from(output);
        }

        if let Some(mode) = env.get(ENV_MODE).filter(|v| !v.is_empty()) {
            self.mode = mode.parse().map_err(|reason| DeployError::InvalidConfig {
                reason,
                help: Some(format!("{} accepts 'strict' or 'lenient'", ENV_MODE)),
            })?;
        }

        Ok(())
    }

    /// Get a target by name
    pub fn get_target(&self, name: &str) -> Option<&BuildTarget> {
        self.targets.iter().find(|t| t.name == name)
    }

    /// Get a target by name or fail with the list of known ones
    pub fn require_target(&self, name: &str) -> DeployResult<&BuildTarget> {
        self.get_target(name).ok_or_else(|| DeployError::UnknownTarget {
            target: name.to_string(),
            help: Some(format!("Known targets: {}", self.target_names().join(", "))),
        })
    }

    /// Get all target names
    pub fn target_names(&self) -> Vec<&str> {
        self.targets.iter().map(|t| t.name.as_str()).collect()
    }

    /// Force every target onto one builder strategy
    pub fn override_strategy(&mut self, strategy: BuilderStrategy) {
        for target in &mut self.targets {
            target.strategy = strategy;
        }
    }
}

/// One independently bundled front-end application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildTarget {
    /// Target name (must be unique)
    pub name: String,

    /// Target description
    #[serde(default)]
    pub description: Option<String>,

    /// Working directory for the bundler
    #[serde(default = "default_source_root")]
    pub source_root: PathBuf,

    /// Subdirectory of the artifact tree this target owns
    pub output_subdir: PathBuf,

    /// Bundler invocation
    pub command: BuildCommand,

    /// Where the bundler writes, relative to `source_root`
    ///
    /// When set, its contents are copied into the target's output directory
    /// after a successful build. When unset, the bundler is expected to write
    /// into the artifact tree itself.
    #[serde(default)]
    pub bundle_dir: Option<PathBuf>,

    /// URL prefix this target is served under (defaults to `/<output_subdir>/`)
    #[serde(default)]
    pub base_path: Option<String>,

    /// Rewrite root-relative asset references in the entry document
    #[serde(default = "default_true")]
    pub rewrite_assets: bool,

    /// How this target is built
    #[serde(default)]
    pub strategy: BuilderStrategy,

    /// Extra environment for this target's bundler
    #[serde(default)]
    pub env: HashMap<String, String>,
}

fn default_source_root() -> PathBuf {
    PathBuf::from(".")
}

impl BuildTarget {
    /// A target built with `npx vite build` into `<source_root>/dist`
    pub fn vite(name: &str, source_root: &str, output_subdir: &str) -> Self {
        Self {
            name: name.to_string(),
            description: None,
            source_root: PathBuf::from(source_root),
            output_subdir: PathBuf::from(output_subdir),
            command: BuildCommand {
                program: "npx".into(),
                args: vec!["vite".into(), "build".into()],
            },
            bundle_dir: Some(PathBuf::from("dist")),
            base_path: None,
            rewrite_assets: true,
            strategy: BuilderStrategy::Real,
            env: HashMap::new(),
        }
    }

    /// URL prefix, always with leading and trailing slash
    pub fn base_path(&self) -> String {
        let raw = match &self.base_path {
            Some(p) => p.clone(),
            None => self.output_subdir.to_string_lossy().replace('\\', "/"),
        };

        let trimmed = raw.trim_matches('/');
        if trimmed.is_empty() {
            "/".to_string()
        } else {
            format!("/{}/", trimmed)
        }
    }

    /// Directory this target owns inside the artifact tree
    pub fn output_dir(&self, output_root: &Path) -> PathBuf {
        output_root.join(&self.output_subdir)
    }

    /// Entry document of this target inside the artifact tree
    pub fn entry_document(&self, output_root: &Path) -> PathBuf {
        self.output_dir(output_root).join(ENTRY_DOCUMENT)
    }

    /// Asset directory of this target inside the artifact tree
    pub fn assets_dir(&self, output_root: &Path) -> PathBuf {
        self.output_dir(output_root).join(ASSETS_DIR)
    }

    /// Absolute source root
    pub fn source_dir(&self, base_dir: &Path) -> PathBuf {
        base_dir.join(&self.source_root)
    }
}

/// External bundler invocation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BuildCommand {
    /// Program looked up on PATH
    pub program: String,

    /// Fixed argument list
    #[serde(default)]
    pub args: Vec<String>,
}

impl std::fmt::Display for BuildCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Builder strategy per target
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BuilderStrategy {
    /// Spawn the bundler
    #[default]
    Real,
    /// Log diagnostics around a real build
    Debug,
    /// Skip the bundler and write the placeholder
    Fallback,
}

impl std::fmt::Display for BuilderStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Real => write!(f, "real"),
            Self::Debug => write!(f, "debug"),
            Self::Fallback => write!(f, "fallback"),
        }
    }
}

impl std::str::FromStr for BuilderStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "real" => Ok(Self::Real),
            "debug" => Ok(Self::Debug),
            "fallback" => Ok(Self::Fallback),
            _ => Err(format!("Unknown builder strategy: {}", s)),
        }
    }
}

/// How placeholder output affects the verdict
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VerifyMode {
    /// A fallback target is a structural pass
    #[default]
    Lenient,
    /// Any fallback target fails the run
    Strict,
}

impl std::fmt::Display for VerifyMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lenient => write!(f, "lenient"),
            Self::Strict => write!(f, "strict"),
        }
    }
}

impl std::str::FromStr for VerifyMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lenient" => Ok(Self::Lenient),
            "strict" => Ok(Self::Strict),
            _ => Err(format!("Unknown verification mode: {}", s)),
        }
    }
}

/// Top-level landing document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LandingConfig {
    /// Write and require the top-level landing document
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Redirect target (defaults to the first target's base path)
    #[serde(default)]
    pub redirect_to: Option<String>,

    /// Document title
    #[serde(default = "default_landing_title")]
    pub title: String,
}

fn default_landing_title() -> String {
    "Portfolio".to_string()
}

impl Default for LandingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            redirect_to: None,
            title: default_landing_title(),
        }
    }
}
