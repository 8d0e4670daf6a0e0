//! TDD Eval Core Library
//!
//! Record schema, judgment gateways and verdict aggregation for scoring
//! red/green/refactor development cycles.

pub mod aggregator;
pub mod domain;
pub mod judgment;
pub mod metrics;
pub mod obs;
pub mod reporting;
pub mod telemetry;

pub use aggregator::{
    aggregate, overall_score, passed_discipline, render_summary, CycleEvaluator, PhaseWeights,
    ScoringPolicy, DEFAULT_PASS_THRESHOLD,
};

pub use domain::{
    from_document, Assessment, CapabilityError, CycleVerdict, DevelopmentCycle, EvaluationRecord,
    GreenAssessment, Phase, PhaseAssessment, PhaseOutcome, Rationale, RedAssessment,
    RefactorAssessment, Score, Validate, ValidationError, RECORD_SCHEMA_VERSION,
};

pub use judgment::fakes::ScriptedProvider;
pub use judgment::{
    brief_for, Brief, CapabilityProvider, GreenGateway, JudgmentCapability, PhaseGateway,
    RedGateway, RefactorGateway,
};

pub use metrics::METRICS;
pub use obs::{
    emit_capability_failed, emit_cycle_evaluated, emit_handle_connected, emit_phase_assessed,
};
pub use reporting::{read_cycle, read_record, render_report, write_record_json};
pub use telemetry::init_tracing;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
