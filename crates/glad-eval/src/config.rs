//! Evaluation limits.

use serde::{Deserialize, Serialize};

/// Default maximum call depth.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 250;

/// Instruction budget used when running untrusted scripts.
pub const SCRIPT_INSTRUCTION_BUDGET: u64 = 100_000;

/// Resource limits for one interpreter.
///
/// The instruction budget counts node visits and is re-armed at the start
/// of every run; `None` means unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub instruction_budget: Option<u64>,
    pub max_call_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            instruction_budget: None,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }
}

impl Limits {
    /// Limits for running a script under a fixed instruction budget.
    pub fn script() -> Self {
        Self {
            instruction_budget: Some(SCRIPT_INSTRUCTION_BUDGET),
            ..Self::default()
        }
    }

    pub fn with_budget(mut self, budget: u64) -> Self {
        self.instruction_budget = Some(budget);
        self
    }

    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    /// Parse limits from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
