//! The three phases of a test-first development cycle.

use serde::{Deserialize, Serialize};

/// One stage of a red/green/refactor cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    /// Write a test that fails before any implementation exists.
    Red,
    /// Make the test pass with the minimal implementation.
    Green,
    /// Improve the code without changing behaviour.
    Refactor,
}

impl Phase {
    /// All phases in cycle order.
    pub const ALL: [Phase; 3] = [Phase::Red, Phase::Green, Phase::Refactor];

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Red => "RED",
            Phase::Green => "GREEN",
            Phase::Refactor => "REFACTOR",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
