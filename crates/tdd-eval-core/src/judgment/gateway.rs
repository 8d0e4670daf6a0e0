//! Per-phase gateway to the judgment capability.
//!
//! A gateway turns a [`DevelopmentCycle`] into its phase's [`Brief`], makes
//! exactly one round trip to the capability and validates the answer into the
//! phase's assessment type. The capability handle is created lazily on first
//! use behind a `OnceCell`, so concurrent first calls connect only once; the
//! handle is read-only afterwards. Tests get a fresh cache by building a new
//! gateway around their own provider.

use std::marker::PhantomData;
use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{debug, instrument};

use crate::domain::{
    from_document, Assessment, CapabilityError, DevelopmentCycle, GreenAssessment, Phase,
    RedAssessment, RefactorAssessment,
};
use crate::judgment::brief::{brief_for, Brief};
use crate::judgment::{CapabilityProvider, JudgmentCapability};
use crate::metrics::METRICS;
use crate::obs;

/// Gateway for the red phase.
pub type RedGateway = PhaseGateway<RedAssessment>;
/// Gateway for the green phase.
pub type GreenGateway = PhaseGateway<GreenAssessment>;
/// Gateway for the refactor phase. Only call it for cycles with refactor changes.
pub type RefactorGateway = PhaseGateway<RefactorAssessment>;

/// Stateless apart from the cached capability handle.
pub struct PhaseGateway<A> {
    provider: Arc<dyn CapabilityProvider>,
    handle: OnceCell<Arc<dyn JudgmentCapability>>,
    _assessment: PhantomData<fn() -> A>,
}

impl<A: Assessment> PhaseGateway<A> {
    pub fn new(provider: Arc<dyn CapabilityProvider>) -> Self {
        Self {
            provider,
            handle: OnceCell::new(),
            _assessment: PhantomData,
        }
    }

    pub fn phase(&self) -> Phase {
        A::PHASE
    }

    /// Whether the capability handle has been created yet.
    pub fn is_connected(&self) -> bool {
        self.handle.initialized()
    }

    /// Judge this gateway's phase of `cycle`.
    ///
    /// # Errors
    ///
    /// Any [`CapabilityError`] from connecting or from the round trip, and
    /// `CapabilityError::SchemaMismatch` when the response does not validate.
    /// Nothing is retried.
    #[instrument(skip_all, fields(phase = %A::PHASE))]
    pub async fn assess(&self, cycle: &DevelopmentCycle) -> Result<A, CapabilityError> {
        let brief = brief_for(A::PHASE, cycle);
        match self.judge(&brief).await {
            Ok(assessment) => {
                obs::emit_phase_assessed(A::PHASE, assessment.score().value());
                Ok(assessment)
            }
            Err(err) => {
                METRICS.inc_judgments_failed();
                obs::emit_capability_failed(&err);
                Err(err)
            }
        }
    }

    async fn judge(&self, brief: &Brief) -> Result<A, CapabilityError> {
        let handle = self.handle().await?;
        METRICS.inc_judgments_requested();
        debug!(brief_len = brief.text.len(), "requesting judgment");
        let document = handle.assess(A::PHASE, brief).await?;
        from_document::<A>(document).map_err(|source| CapabilityError::SchemaMismatch {
            phase: A::PHASE,
            source,
        })
    }

    async fn handle(&self) -> Result<&Arc<dyn JudgmentCapability>, CapabilityError> {
        self.handle
            .get_or_try_init(|| async {
                let handle = self.provider.connect(A::PHASE).await?;
                METRICS.inc_handles_connected();
                obs::emit_handle_connected(A::PHASE);
                Ok::<_, CapabilityError>(handle)
            })
            .await
    }
}
