// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deployflow contributors

//! Captured process environment

use std::collections::HashMap;

/// Read-only copy of the environment taken once at startup
///
/// Stages never call `std::env::var` themselves; they get what they need from
/// this snapshot, which tests build by hand.
#[derive(Debug, Clone, Default)]
pub struct EnvSnapshot {
    vars: HashMap<String, String>,
}

impl EnvSnapshot {
    /// Capture the current process environment
    pub fn capture() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    /// Build a snapshot from explicit pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Get a variable
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// A variable counts as set when it is present and non-empty
    pub fn is_set(&self, name: &str) -> bool {
        self.get(name).is_some_and(|v| !v.is_empty())
    }

    /// Hosting platform, named after the first set platform variable
    pub fn platform(&self, platform_vars: &[String]) -> String {
        platform_vars
            .iter()
            .find(|name| self.is_set(name))
            .map(|name| name.to_lowercase())
            .unwrap_or_else(|| "local".to_string())
    }

    /// Presence of each credential variable; values are never exposed
    pub fn credential_presence<'a>(&self, names: &'a [String]) -> Vec<(&'a str, bool)> {
        names
            .iter()
            .map(|name| (name.as_str(), self.is_set(name)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_detection() {
        let vars = vec!["VERCEL".to_string(), "CI".to_string()];

        let env = EnvSnapshot::from_pairs([("CI", "true")]);
        assert_eq!(env.platform(&vars), "ci");

        let env = EnvSnapshot::from_pairs([("CI", "true"), ("VERCEL", "1")]);
        assert_eq!(env.platform(&vars), "vercel");

        let env = EnvSnapshot::from_pairs([("VERCEL", "")]);
        assert_eq!(env.platform(&vars), "local");
    }

    #[test]
    fn test_credential_presence() {
        let names = vec!["SUPABASE_URL".to_string(), "SUPABASE_ANON_KEY".to_string()];
        let env = EnvSnapshot::from_pairs([("SUPABASE_URL", "https://example.supabase.co")]);

        let presence = env.credential_presence(&names);
        assert_eq!(presence, vec![("SUPABASE_URL", true), ("SUPABASE_ANON_KEY", false)]);
    }
}
