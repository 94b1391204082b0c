// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deployflow contributors

//! Utility modules
//!
//! Terminal output and filesystem helpers shared by the pipeline stages.

pub mod colors;
pub mod fs;

pub use colors::*;
pub use fs::*;
