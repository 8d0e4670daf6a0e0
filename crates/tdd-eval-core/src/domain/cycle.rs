//! The development cycle under evaluation.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::error::ValidationError;
use super::validation::{require_non_blank, Validate};

/// Result of running one test, as reported by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseOutcome {
    /// Name of the test that was run.
    pub test_name: String,
    /// Whether the test passed.
    pub passed: bool,
    /// Reason for failure, if the test failed.
    #[serde(default)]
    pub failure_reason: Option<String>,
    /// Wall-clock execution time in milliseconds.
    #[serde(default)]
    pub execution_time_ms: Option<f64>,
}

impl PhaseOutcome {
    pub fn passed(test_name: impl Into<String>) -> Self {
        Self {
            test_name: test_name.into(),
            passed: true,
            failure_reason: None,
            execution_time_ms: None,
        }
    }

    pub fn failed(test_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            test_name: test_name.into(),
            passed: false,
            failure_reason: Some(reason.into()),
            execution_time_ms: None,
        }
    }

    pub fn with_execution_time_ms(mut self, millis: f64) -> Self {
        self.execution_time_ms = Some(millis);
        self
    }
}

/// One red/green/refactor cycle.
///
/// # Invariants
///
/// `feature_description` is non-blank. `red_test_result.passed` is normally
/// `false` and `green_test_result.passed` normally `true`, but the schema
/// leaves that judgment to the red and green assessments.
///
/// `refactor_changes` and `refactor_test_results` are meant to line up
/// index-for-index; their lengths are not enforced. An empty
/// `refactor_changes` means no refactor phase took place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DevelopmentCycle {
    /// What the cycle set out to build.
    pub feature_description: String,

    /// Test written before any implementation existed.
    pub red_test_code: String,
    /// Result of running that test against no implementation.
    pub red_test_result: PhaseOutcome,

    /// Minimal implementation written to make the test pass.
    pub green_implementation: String,
    /// Result of the same test after the implementation.
    pub green_test_result: PhaseOutcome,

    /// Ordered refactoring steps.
    #[serde(default)]
    pub refactor_changes: Vec<String>,
    /// Test results after each refactoring step.
    #[serde(default)]
    pub refactor_test_results: Vec<PhaseOutcome>,
}

impl DevelopmentCycle {
    /// Create a cycle with no refactor phase.
    pub fn new(
        feature_description: impl Into<String>,
        red_test_code: impl Into<String>,
        red_test_result: PhaseOutcome,
        green_implementation: impl Into<String>,
        green_test_result: PhaseOutcome,
    ) -> Result<Self, ValidationError> {
        let cycle = Self {
            feature_description: feature_description.into(),
            red_test_code: red_test_code.into(),
            red_test_result,
            green_implementation: green_implementation.into(),
            green_test_result,
            refactor_changes: Vec::new(),
            refactor_test_results: Vec::new(),
        };
        cycle.validate()?;
        Ok(cycle)
    }

    /// Append a refactoring step together with the test result it produced.
    pub fn with_refactor_step(mut self, change: impl Into<String>, outcome: PhaseOutcome) -> Self {
        self.refactor_changes.push(change.into());
        self.refactor_test_results.push(outcome);
        self
    }

    /// Whether the refactor phase applies to this cycle.
    pub fn has_refactor_phase(&self) -> bool {
        !self.refactor_changes.is_empty()
    }

    /// Whether every refactoring step has exactly one recorded result.
    pub fn refactor_steps_aligned(&self) -> bool {
        self.refactor_changes.len() == self.refactor_test_results.len()
    }

    /// SHA-256 hex digest over every field of the cycle.
    ///
    /// Each field is length-prefixed so that moving text between adjacent
    /// fields changes the digest.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        hash_str(&mut hasher, &self.feature_description);
        hash_str(&mut hasher, &self.red_test_code);
        hash_outcome(&mut hasher, &self.red_test_result);
        hash_str(&mut hasher, &self.green_implementation);
        hash_outcome(&mut hasher, &self.green_test_result);
        hasher.update((self.refactor_changes.len() as u64).to_le_bytes());
        for change in &self.refactor_changes {
            hash_str(&mut hasher, change);
        }
        hasher.update((self.refactor_test_results.len() as u64).to_le_bytes());
        for outcome in &self.refactor_test_results {
            hash_outcome(&mut hasher, outcome);
        }
        hex::encode(hasher.finalize())
    }
}

impl Validate for DevelopmentCycle {
    fn validate(&self) -> Result<(), ValidationError> {
        require_non_blank("feature_description", &self.feature_description)
    }
}

fn hash_str(hasher: &mut Sha256, value: &str) {
    hasher.update((value.len() as u64).to_le_bytes());
    hasher.update(value.as_bytes());
}

fn hash_outcome(hasher: &mut Sha256, outcome: &PhaseOutcome) {
    hash_str(hasher, &outcome.test_name);
    hasher.update([u8::from(outcome.passed)]);
    match &outcome.failure_reason {
        Some(reason) => {
            hasher.update([1u8]);
            hash_str(hasher, reason);
        }
        None => hasher.update([0u8]),
    }
    match outcome.execution_time_ms {
        Some(millis) => {
            hasher.update([1u8]);
            hasher.update(millis.to_bits().to_le_bytes());
        }
        None => hasher.update([0u8]),
    }
}
