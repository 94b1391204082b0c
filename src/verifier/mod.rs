// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deployflow contributors

//! Artifact verification
//!
//! Structural check of a finished artifact tree: every required path exists,
//! every required directory has something in it and every entry document is a
//! non-empty file. Content is not inspected beyond recognizing the fallback
//! placeholder. Verification only reads; running it twice on the same tree
//! yields the same report.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::builders::FallbackGenerator;
use crate::config::{BuildTarget, DeployConfig, VerifyMode, ENTRY_DOCUMENT};

/// What was found at a required path
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PathStatus {
    Missing,
    EmptyFile,
    File { bytes: u64 },
    EmptyDirectory,
    Directory { entries: usize },
}

impl PathStatus {
    /// Inspect a path (symlinks are followed)
    pub fn probe(path: &Path) -> Self {
        let Ok(metadata) = std::fs::metadata(path) else {
            return Self::Missing;
        };

        if metadata.is_dir() {
            match std::fs::read_dir(path) {
                Ok(entries) => match entries.count() {
                    0 => Self::EmptyDirectory,
                    entries => Self::Directory { entries },
                },
                Err(e) => {
                    tracing::warn!("Cannot list {}: {}", path.display(), e);
                    Self::Missing
                }
            }
        } else {
            match metadata.len() {
                0 => Self::EmptyFile,
                bytes => Self::File { bytes },
            }
        }
    }

    /// Something exists at the path
    pub fn is_present(&self) -> bool {
        !matches!(self, Self::Missing)
    }

    /// A directory with at least one entry
    pub fn is_populated_dir(&self) -> bool {
        matches!(self, Self::Directory { .. })
    }

    /// A file with at least one byte
    pub fn is_populated_file(&self) -> bool {
        matches!(self, Self::File { .. })
    }
}

impl std::fmt::Display for PathStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing => write!(f, "missing"),
            Self::EmptyFile => write!(f, "empty file"),
            Self::File { bytes } => write!(f, "file, {} bytes", bytes),
            Self::EmptyDirectory => write!(f, "empty directory"),
            Self::Directory { entries } => write!(f, "directory, {} entries", entries),
        }
    }
}

/// Why a path is required
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PathRole {
    Root,
    Landing,
    TargetDir,
    EntryDocument,
    AssetsDir,
}

impl std::fmt::Display for PathRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Root => write!(f, "artifact root"),
            Self::Landing => write!(f, "landing document"),
            Self::TargetDir => write!(f, "target directory"),
            Self::EntryDocument => write!(f, "entry document"),
            Self::AssetsDir => write!(f, "assets directory"),
        }
    }
}

impl PathRole {
    fn accepts(&self, status: &PathStatus) -> bool {
        match self {
            Self::Root | Self::TargetDir | Self::AssetsDir => status.is_populated_dir(),
            Self::Landing | Self::EntryDocument => status.is_populated_file(),
        }
    }
}

/// One required path and what was found there
#[derive(Debug, Clone, Serialize)]
pub struct CheckedPath {
    pub path: PathBuf,
    pub role: PathRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    pub status: PathStatus,
    pub ok: bool,
}

/// Verdict for one build target
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TargetReport {
    pub target: String,
    pub directories_ok: bool,
    pub entry_file_ok: bool,
    pub asset_dirs_ok: bool,
    /// Entry document is the fallback placeholder
    pub placeholder: bool,
}

impl TargetReport {
    /// All required paths of this target are in place
    pub fn structurally_ok(&self) -> bool {
        self.directories_ok && self.entry_file_ok && self.asset_dirs_ok
    }
}

/// Result of verifying an artifact tree
#[derive(Debug, Clone, Serialize)]
pub struct VerificationReport {
    pub root: PathBuf,
    pub mode: VerifyMode,
    pub root_ok: bool,
    /// `None` when no landing document is required
    pub landing_ok: Option<bool>,
    pub targets: Vec<TargetReport>,
    pub checked: Vec<CheckedPath>,
}

impl VerificationReport {
    /// Every required path is present and populated
    pub fn structurally_ok(&self) -> bool {
        self.root_ok
            && self.landing_ok.unwrap_or(true)
            && self.targets.iter().all(TargetReport::structurally_ok)
    }

    /// Targets whose entry document is the placeholder
    pub fn placeholder_targets(&self) -> Vec<&str> {
        self.targets
            .iter()
            .filter(|t| t.placeholder)
            .map(|t| t.target.as_str())
            .collect()
    }

    /// Final verdict under the report's mode
    pub fn passed(&self) -> bool {
        match self.mode {
            VerifyMode::Lenient => self.structurally_ok(),
            VerifyMode::Strict => self.structurally_ok() && self.placeholder_targets().is_empty(),
        }
    }

    /// Human-readable list of everything that makes the verdict fail
    pub fn problems(&self) -> Vec<String> {
        let mut problems: Vec<String> = self
            .checked
            .iter()
            .filter(|c| !c.ok)
            .map(|c| format!("{} ({})", c.path.display(), c.status))
            .collect();

        if self.mode == VerifyMode::Strict {
            problems.extend(
                self.placeholder_targets()
                    .into_iter()
                    .map(|t| format!("target '{}' ships placeholder content", t)),
            );
        }

        problems
    }
}

/// Structural verifier for an artifact tree
#[derive(Debug, Clone)]
pub struct ArtifactVerifier {
    targets: Vec<BuildTarget>,
    mode: VerifyMode,
    require_landing: bool,
}

impl ArtifactVerifier {
    /// Verifier for a set of targets (lenient, landing required)
    pub fn new(targets: Vec<BuildTarget>) -> Self {
        Self {
            targets,
            mode: VerifyMode::Lenient,
            require_landing: true,
        }
    }

    /// Verifier matching a deployment configuration
    pub fn from_config(config: &DeployConfig) -> Self {
        Self::new(config.targets.clone())
            .with_mode(config.mode)
            .with_landing(config.landing.enabled)
    }

    /// Set the verification mode
    pub fn with_mode(mut self, mode: VerifyMode) -> Self {
        self.mode = mode;
        self
    }

    /// Require the top-level landing document
    pub fn with_landing(mut self, required: bool) -> Self {
        self.require_landing = required;
        self
    }

    /// Verify the tree rooted at `root`
    pub fn verify(&self, root: &Path) -> VerificationReport {
        let mut checked = Vec::new();

        let root_ok = Self::check(&mut checked, root, PathRole::Root, None);
        let landing_ok = self
            .require_landing
            .then(|| Self::check(&mut checked, &root.join(ENTRY_DOCUMENT), PathRole::Landing, None));

        let targets = self
            .targets
            .iter()
            .map(|target| self.verify_target(target, root, &mut checked))
            .collect();

        let report = VerificationReport {
            root: root.to_path_buf(),
            mode: self.mode,
            root_ok,
            landing_ok,
            targets,
            checked,
        };

        tracing::debug!(
            "Verified {}: {} paths checked, passed={}",
            root.display(),
            report.checked.len(),
            report.passed()
        );

        report
    }

    fn verify_target(&self, target: &BuildTarget, root: &Path, checked: &mut Vec<CheckedPath>) -> TargetReport {
        let name = Some(target.name.as_str());
        let entry = target.entry_document(root);

        let directories_ok = Self::check(checked, &target.output_dir(root), PathRole::TargetDir, name);
        let entry_file_ok = Self::check(checked, &entry, PathRole::EntryDocument, name);
        let asset_dirs_ok = Self::check(checked, &target.assets_dir(root), PathRole::AssetsDir, name);

        let placeholder = entry_file_ok
            && std::fs::read(&entry)
                .map(|bytes| FallbackGenerator::is_placeholder(&target.name, &target.base_path(), &bytes))
                .unwrap_or(false);

        TargetReport {
            target: target.name.clone(),
            directories_ok,
            entry_file_ok,
            asset_dirs_ok,
            placeholder,
        }
    }

    fn check(checked: &mut Vec<CheckedPath>, path: &Path, role: PathRole, target: Option<&str>) -> bool {
        let status = PathStatus::probe(path);
        let ok = role.accepts(&status);

        checked.push(CheckedPath {
            path: path.to_path_buf(),
            role,
            target: target.map(str::to_string),
            status,
            ok,
        });

        ok
    }
}
