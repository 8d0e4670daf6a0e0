//! Judgment capability port and the per-phase gateways built on it.
//!
//! The capability is an external service that reads a natural-language
//! [`Brief`] of one phase and answers with a structured assessment document.
//! Two traits describe it:
//! - `CapabilityProvider`: creates a reusable handle for a phase
//! - `JudgmentCapability`: one call-and-wait round trip on that handle
//!
//! Both are async and transport-agnostic. An in-memory fake lives in
//! [`fakes`]; the HTTP adapter lives in the `tdd-eval-judge` crate.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{CapabilityError, Phase};

pub mod brief;
pub mod fakes;
pub mod gateway;

pub use brief::{brief_for, green_brief, red_brief, refactor_brief, Brief};
pub use gateway::{GreenGateway, PhaseGateway, RedGateway, RefactorGateway};

/// A connected handle to the judgment capability for one phase.
#[async_trait]
pub trait JudgmentCapability: Send + Sync {
    /// Ask for a judgment of `brief`.
    ///
    /// Returns the raw assessment document; the gateway validates it against
    /// the phase's schema.
    async fn assess(
        &self,
        phase: Phase,
        brief: &Brief,
    ) -> Result<serde_json::Value, CapabilityError>;
}

/// Creates judgment handles. Called at most once per gateway.
#[async_trait]
pub trait CapabilityProvider: Send + Sync {
    async fn connect(&self, phase: Phase) -> Result<Arc<dyn JudgmentCapability>, CapabilityError>;
}
