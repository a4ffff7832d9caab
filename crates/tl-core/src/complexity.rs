// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the turnloop authors

//! The 1–3 complexity rating used for routing.

use serde::{Deserialize, Serialize};

/// Routing complexity: `1` = local-only, `3` = hosted-only, `2` = either
/// with overflow from local to hosted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Complexity(u8);

impl Complexity {
    pub const LOCAL_ONLY: Complexity = Complexity(1);
    pub const EITHER: Complexity = Complexity(2);
    pub const HOSTED_ONLY: Complexity = Complexity(3);

    /// Default complexity used when a task declares none and no cached
    /// value exists, per the data model.
    pub const DEFAULT: Complexity = Complexity(3);

    /// Parse a raw integer into a valid complexity (1..=3), returning
    /// `None` for out-of-range values so the caller can fall back.
    pub fn from_raw(n: i64) -> Option<Self> {
        match n {
            1..=3 => Some(Complexity(n as u8)),
            _ => None,
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Complexity {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl std::fmt::Display for Complexity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[path = "complexity_tests.rs"]
mod tests;
