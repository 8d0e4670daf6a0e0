//! Domain-level error taxonomy for TDD cycle evaluation.
//!
//! Only two kinds originate in the core: [`ValidationError`] for input that
//! does not satisfy the record schema, and [`CapabilityError`] for anything
//! that goes wrong while talking to the judgment capability.

use super::phase::Phase;

/// Raw input (or a judgment response) does not satisfy the record schema.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("malformed document: {detail}")]
    Document { detail: String },

    #[error("field `{field}` must not be empty")]
    EmptyField { field: String },

    #[error("score {value} is outside [0.0, 1.0]")]
    ScoreOutOfRange { value: f64 },

    #[error("rationale must not be empty")]
    EmptyRationale,

    #[error("invalid scoring policy: {reason}")]
    InvalidPolicy { reason: String },
}

impl From<serde_json::Error> for ValidationError {
    fn from(err: serde_json::Error) -> Self {
        ValidationError::Document {
            detail: err.to_string(),
        }
    }
}

/// The judgment capability could not be reached or returned unusable data.
///
/// Transport-specific failures are mapped into these variants at the adapter
/// boundary so callers never depend on the transport's error vocabulary.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CapabilityError {
    #[error("judgment capability unavailable for {phase} phase: {reason}")]
    Unavailable { phase: Phase, reason: String },

    #[error("judgment capability timed out for {phase} phase after {after_ms}ms")]
    Timeout { phase: Phase, after_ms: u64 },

    #[error("malformed judgment response for {phase} phase: {detail}")]
    MalformedResponse { phase: Phase, detail: String },

    #[error("judgment response for {phase} phase failed schema validation: {source}")]
    SchemaMismatch {
        phase: Phase,
        #[source]
        source: ValidationError,
    },
}

impl CapabilityError {
    /// Phase whose judgment failed.
    pub fn phase(&self) -> Phase {
        match self {
            CapabilityError::Unavailable { phase, .. }
            | CapabilityError::Timeout { phase, .. }
            | CapabilityError::MalformedResponse { phase, .. }
            | CapabilityError::SchemaMismatch { phase, .. } => *phase,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::EmptyField {
            field: "feature_description".to_string(),
        };
        assert!(err.to_string().contains("feature_description"));

        let err = ValidationError::ScoreOutOfRange { value: 1.5 };
        assert!(err.to_string().contains("1.5"));
    }

    #[test]
    fn test_serde_error_becomes_document_error() {
        let err = serde_json::from_str::<u32>("\"nope\"").unwrap_err();
        let validation: ValidationError = err.into();
        assert!(matches!(validation, ValidationError::Document { .. }));
    }

    #[test]
    fn test_capability_error_reports_phase() {
        let err = CapabilityError::Timeout {
            phase: Phase::Green,
            after_ms: 5000,
        };
        assert_eq!(err.phase(), Phase::Green);
        assert!(err.to_string().contains("GREEN"));
        assert!(err.to_string().contains("5000ms"));
    }

    #[test]
    fn test_schema_mismatch_keeps_source() {
        use std::error::Error as _;

        let err = CapabilityError::SchemaMismatch {
            phase: Phase::Red,
            source: ValidationError::EmptyRationale,
        };
        let source = err.source().expect("source");
        assert_eq!(source.to_string(), "rationale must not be empty");
    }
}
