//! Structured observability hooks for cycle evaluations.
//!
//! This module provides:
//! - A short cycle tag for evaluation spans
//! - Emission functions for key lifecycle events: handle connected, phase
//!   assessed, capability failure, cycle evaluated
//!
//! Events are emitted at `info!` level (failures at `warn!`). Filtering
//! follows `RUST_LOG`; see [`crate::telemetry::init_tracing`].

use tracing::{info, warn};

use crate::domain::{CapabilityError, Phase};

/// First twelve hex characters of a cycle digest, used as a span field.
pub fn short_digest(cycle_digest: &str) -> &str {
    cycle_digest.get(..12).unwrap_or(cycle_digest)
}

/// Emit event: a capability handle was created for a phase.
pub fn emit_handle_connected(phase: Phase) {
    info!(event = "handle.connected", phase = %phase);
}

/// Emit event: a phase assessment was received and validated.
pub fn emit_phase_assessed(phase: Phase, score: f64) {
    info!(event = "phase.assessed", phase = %phase, score = score);
}

/// Emit event: a judgment failed (warning level).
pub fn emit_capability_failed(error: &CapabilityError) {
    warn!(event = "capability.failed", phase = %error.phase(), error = %error);
}

/// Emit event: a full cycle verdict was produced.
pub fn emit_cycle_evaluated(overall_score: f64, passed_discipline: bool, phases: usize) {
    info!(
        event = "cycle.evaluated",
        overall_score = overall_score,
        passed_discipline = passed_discipline,
        phases = phases,
    );
}
