// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deployflow contributors

//! Terminal color utilities
//!
//! Decides whether output is colored at all.

use crate::config::EnvSnapshot;

/// Check if colors should be disabled
pub fn should_use_colors(env: &EnvSnapshot) -> bool {
    // Respect NO_COLOR environment variable
    if env.get("NO_COLOR").is_some() {
        return false;
    }

    env.get("TERM").is_some_and(|term| term != "dumb")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_color_wins() {
        let env = EnvSnapshot::from_pairs([("TERM", "xterm-256color"), ("NO_COLOR", "")]);
        assert!(!should_use_colors(&env));

        let env = EnvSnapshot::from_pairs([("TERM", "xterm-256color")]);
        assert!(should_use_colors(&env));

        let env = EnvSnapshot::from_pairs([("TERM", "dumb")]);
        assert!(!should_use_colors(&env));
    }
}
