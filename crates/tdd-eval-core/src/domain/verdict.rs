//! Aggregate verdicts and the persisted evaluation record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::assessment::{GreenAssessment, PhaseAssessment, RedAssessment, RefactorAssessment};
use super::cycle::DevelopmentCycle;
use super::error::ValidationError;
use super::validation::Validate;

/// Version tag written into every persisted [`EvaluationRecord`].
pub const RECORD_SCHEMA_VERSION: &str = "1";

/// Final judgment of one development cycle.
///
/// # Invariants
///
/// `refactor` is `None` exactly when the evaluated cycle had no refactor
/// changes. `overall_score` is derived from the present assessments' scores
/// and `passed_discipline` from their discipline-critical flags; the two are
/// computed independently. `summary` is for humans only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleVerdict {
    pub red: RedAssessment,
    pub green: GreenAssessment,
    #[serde(default)]
    pub refactor: Option<RefactorAssessment>,
    pub overall_score: f64,
    pub passed_discipline: bool,
    pub summary: String,
}

impl CycleVerdict {
    /// Present assessments in phase order.
    pub fn assessments(&self) -> Vec<PhaseAssessment> {
        let mut out = vec![
            PhaseAssessment::Red(self.red.clone()),
            PhaseAssessment::Green(self.green.clone()),
        ];
        if let Some(refactor) = &self.refactor {
            out.push(PhaseAssessment::Refactor(refactor.clone()));
        }
        out
    }
}

impl Validate for CycleVerdict {
    fn validate(&self) -> Result<(), ValidationError> {
        if !self.overall_score.is_finite() || !(0.0..=1.0).contains(&self.overall_score) {
            return Err(ValidationError::ScoreOutOfRange {
                value: self.overall_score,
            });
        }
        Ok(())
    }
}

/// A cycle paired with its verdict, ready for persistence or reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    /// Unique identifier for this evaluation.
    pub record_id: Uuid,

    /// Format version of this document.
    pub schema_version: String,

    /// SHA-256 hex digest of the evaluated cycle.
    pub cycle_digest: String,

    /// When the verdict was produced.
    pub evaluated_at: DateTime<Utc>,

    pub cycle: DevelopmentCycle,

    pub verdict: CycleVerdict,
}

impl EvaluationRecord {
    /// Pair a cycle with the verdict produced for it.
    pub fn new(cycle: DevelopmentCycle, verdict: CycleVerdict) -> Self {
        Self {
            record_id: Uuid::new_v4(),
            schema_version: RECORD_SCHEMA_VERSION.to_string(),
            cycle_digest: cycle.digest(),
            evaluated_at: Utc::now(),
            cycle,
            verdict,
        }
    }

    /// Whether `cycle_digest` still matches the embedded cycle.
    pub fn digest_matches(&self) -> bool {
        self.cycle.digest() == self.cycle_digest
    }
}

impl Validate for EvaluationRecord {
    fn validate(&self) -> Result<(), ValidationError> {
        self.cycle.validate()?;
        self.verdict.validate()?;
        if self.verdict.refactor.is_some() != self.cycle.has_refactor_phase() {
            return Err(ValidationError::Document {
                detail: "refactor assessment presence does not match refactor changes".to_string(),
            });
        }
        if !self.digest_matches() {
            return Err(ValidationError::Document {
                detail: format!(
                    "cycle_digest {} does not match embedded cycle",
                    self.cycle_digest
                ),
            });
        }
        Ok(())
    }
}
