// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deployflow contributors

//! Filesystem helpers
//!
//! Every failure here is mapped to [`DeployError::Filesystem`], which the
//! orchestrator treats as fatal.

use std::path::Path;
use walkdir::WalkDir;

use crate::errors::{DeployError, DeployResult};

/// Create a directory and its parents
pub fn ensure_dir(path: &Path) -> DeployResult<()> {
    std::fs::create_dir_all(path).map_err(|e| DeployError::filesystem("create_dir", path, e))
}

/// Write a file, creating its parent directories
pub fn write_file(path: &Path, contents: &[u8]) -> DeployResult<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    std::fs::write(path, contents).map_err(|e| DeployError::filesystem("write", path, e))
}

/// Remove a directory tree if it exists
pub fn remove_dir_if_exists(path: &Path) -> DeployResult<()> {
    match std::fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(DeployError::filesystem("remove_dir", path, e)),
    }
}

/// Copy everything under `from` into `to`, returning the number of files copied
pub fn copy_dir_contents(from: &Path, to: &Path) -> DeployResult<usize> {
    ensure_dir(to)?;
    let mut copied = 0;

    for entry in WalkDir::new(from).min_depth(1) {
        let entry = entry.map_err(|e| DeployError::Filesystem {
            operation: "walk",
            path: from.to_path_buf(),
            error: e.to_string(),
        })?;

        let relative = entry
            .path()
            .strip_prefix(from)
            .map_err(|e| DeployError::Filesystem {
                operation: "walk",
                path: entry.path().to_path_buf(),
                error: e.to_string(),
            })?;
        let dest = to.join(relative);

        if entry.file_type().is_dir() {
            ensure_dir(&dest)?;
        } else {
            std::fs::copy(entry.path(), &dest)
                .map_err(|e| DeployError::filesystem("copy", &dest, e))?;
            copied += 1;
        }
    }

    Ok(copied)
}

/// Escape text for use in HTML content and attribute values
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_copy_dir_contents() {
        let dir = TempDir::new().unwrap();
        let from = dir.path().join("from");
        std::fs::create_dir_all(from.join("assets/fonts")).unwrap();
        std::fs::write(from.join("index.html"), "<html>").unwrap();
        std::fs::write(from.join("assets/app.js"), "js").unwrap();
        std::fs::write(from.join("assets/fonts/a.woff2"), "font").unwrap();

        let to = dir.path().join("out/site");
        let copied = copy_dir_contents(&from, &to).unwrap();

        assert_eq!(copied, 3);
        assert_eq!(std::fs::read_to_string(to.join("assets/fonts/a.woff2")).unwrap(), "font");
    }

    #[test]
    fn test_remove_missing_dir_is_ok() {
        let dir = TempDir::new().unwrap();
        assert!(remove_dir_if_exists(&dir.path().join("missing")).is_ok());
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }
}
