//! Domain models for TDD cycle evaluation.
//!
//! Canonical definitions for the record schema:
//! - `DevelopmentCycle`: the red/green/refactor artifacts under evaluation
//! - `RedAssessment` / `GreenAssessment` / `RefactorAssessment`: per-phase judgments
//! - `CycleVerdict`: the aggregate score and discipline gate
//! - `EvaluationRecord`: cycle + verdict, for persistence

pub mod assessment;
pub mod cycle;
pub mod error;
pub mod phase;
pub mod validation;
pub mod verdict;

// Re-export main types and errors
pub use assessment::{
    Assessment, GreenAssessment, PhaseAssessment, RedAssessment, RefactorAssessment,
};
pub use cycle::{DevelopmentCycle, PhaseOutcome};
pub use error::{CapabilityError, ValidationError};
pub use phase::Phase;
pub use validation::{from_document, Rationale, Score, Validate};
pub use verdict::{CycleVerdict, EvaluationRecord, RECORD_SCHEMA_VERSION};
