//! Cycle aggregation: runs the phase gateways and folds their assessments
//! into one [`CycleVerdict`].
//!
//! The overall score and the discipline gate are independent computations
//! over the same assessments. The score is a mean of the present phases'
//! scores; the gate is a conjunction of a few discipline-critical flags. A
//! cycle can therefore score well and still fail discipline.

use std::sync::Arc;

use tracing::{instrument, warn};

use crate::domain::{
    CapabilityError, CycleVerdict, DevelopmentCycle, EvaluationRecord, GreenAssessment,
    RedAssessment, RefactorAssessment, ValidationError, Validate,
};
use crate::judgment::{CapabilityProvider, GreenGateway, RedGateway, RefactorGateway};
use crate::metrics::METRICS;
use crate::obs;

/// Phase score at or above which the summary marks a phase as good.
pub const DEFAULT_PASS_THRESHOLD: f64 = 0.8;

/// Relative weight of each phase in the overall score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseWeights {
    pub red: f64,
    pub green: f64,
    pub refactor: f64,
}

impl Default for PhaseWeights {
    /// Equal weights: the overall score is the plain arithmetic mean.
    fn default() -> Self {
        Self {
            red: 1.0,
            green: 1.0,
            refactor: 1.0,
        }
    }
}

/// How present phase scores are combined and displayed.
///
/// Construct with [`ScoringPolicy::new`]; the default policy is unweighted
/// with a `0.8` summary threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringPolicy {
    weights: PhaseWeights,
    pass_threshold: f64,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            weights: PhaseWeights::default(),
            pass_threshold: DEFAULT_PASS_THRESHOLD,
        }
    }
}

impl ScoringPolicy {
    /// # Errors
    ///
    /// `ValidationError::InvalidPolicy` when a weight is negative or not
    /// finite, when red and green weights are both zero, or when the
    /// threshold is outside `[0.0, 1.0]`.
    pub fn new(weights: PhaseWeights, pass_threshold: f64) -> Result<Self, ValidationError> {
        let policy = Self {
            weights,
            pass_threshold,
        };
        policy.validate()?;
        Ok(policy)
    }

    pub fn weights(&self) -> PhaseWeights {
        self.weights
    }

    pub fn pass_threshold(&self) -> f64 {
        self.pass_threshold
    }
}

impl Validate for ScoringPolicy {
    fn validate(&self) -> Result<(), ValidationError> {
        let w = &self.weights;
        for (name, weight) in [("red", w.red), ("green", w.green), ("refactor", w.refactor)] {
            if !weight.is_finite() || weight < 0.0 {
                return Err(ValidationError::InvalidPolicy {
                    reason: format!("{name} weight must be a finite non-negative number, got {weight}"),
                });
            }
        }
        if w.red + w.green <= 0.0 {
            return Err(ValidationError::InvalidPolicy {
                reason: "red and green weights must not both be zero".to_string(),
            });
        }
        // inf / inf would turn the overall score into NaN
        if !(w.red + w.green + w.refactor).is_finite() {
            return Err(ValidationError::InvalidPolicy {
                reason: "sum of phase weights overflows".to_string(),
            });
        }
        if !self.pass_threshold.is_finite() || !(0.0..=1.0).contains(&self.pass_threshold) {
            return Err(ValidationError::InvalidPolicy {
                reason: format!(
                    "pass threshold must be within [0.0, 1.0], got {}",
                    self.pass_threshold
                ),
            });
        }
        Ok(())
    }
}

/// Weighted mean of the present phase scores.
///
/// With the default weights this is exactly `(red + green) / 2` or
/// `(red + green + refactor) / 3`.
pub fn overall_score(
    red: &RedAssessment,
    green: &GreenAssessment,
    refactor: Option<&RefactorAssessment>,
    weights: &PhaseWeights,
) -> f64 {
    let mut weighted = weights.red * red.score.value() + weights.green * green.score.value();
    let mut total = weights.red + weights.green;
    if let Some(refactor) = refactor {
        weighted += weights.refactor * refactor.score.value();
        total += weights.refactor;
    }
    weighted / total
}

/// The discipline gate.
///
/// Holds iff the red test failed for the right reason, the green test now
/// passes without having been altered, and (when there was a refactor
/// phase) the tests still pass after refactoring. Scores play no part.
pub fn passed_discipline(
    red: &RedAssessment,
    green: &GreenAssessment,
    refactor: Option<&RefactorAssessment>,
) -> bool {
    red.fails_for_right_reason
        && green.now_passes
        && green.test_not_altered_to_pass
        && refactor.map_or(true, |r| r.tests_still_pass)
}

/// One-line human summary, e.g.
/// `RED phase: ✅ (score: 0.90) | GREEN phase: ⚠️ (score: 0.70) | Overall: NEEDS IMPROVEMENT`.
///
/// Display only; nothing downstream parses it.
pub fn render_summary(
    red: &RedAssessment,
    green: &GreenAssessment,
    refactor: Option<&RefactorAssessment>,
    passed_discipline: bool,
    pass_threshold: f64,
) -> String {
    let mut parts = vec![
        phase_part("RED", red.score.value(), pass_threshold),
        phase_part("GREEN", green.score.value(), pass_threshold),
    ];
    if let Some(refactor) = refactor {
        parts.push(phase_part("REFACTOR", refactor.score.value(), pass_threshold));
    }
    let overall = if passed_discipline {
        "PASSED"
    } else {
        "NEEDS IMPROVEMENT"
    };
    parts.push(format!("Overall: {}", overall));
    parts.join(" | ")
}

fn phase_part(label: &str, score: f64, pass_threshold: f64) -> String {
    let marker = if score >= pass_threshold {
        "✅"
    } else {
        "⚠️"
    };
    format!("{} phase: {} (score: {:.2})", label, marker, score)
}

/// Fold the present assessments into a verdict.
pub fn aggregate(
    red: RedAssessment,
    green: GreenAssessment,
    refactor: Option<RefactorAssessment>,
    policy: &ScoringPolicy,
) -> CycleVerdict {
    let overall_score = overall_score(&red, &green, refactor.as_ref(), &policy.weights);
    let passed_discipline = passed_discipline(&red, &green, refactor.as_ref());
    let summary = render_summary(
        &red,
        &green,
        refactor.as_ref(),
        passed_discipline,
        policy.pass_threshold,
    );
    CycleVerdict {
        red,
        green,
        refactor,
        overall_score,
        passed_discipline,
        summary,
    }
}

/// Runs the three phase gateways for a cycle and aggregates the result.
///
/// Share one evaluator (behind an `Arc`) across concurrent evaluations to
/// reuse its capability handles.
pub struct CycleEvaluator {
    red: RedGateway,
    green: GreenGateway,
    refactor: RefactorGateway,
    policy: ScoringPolicy,
    concurrent_phases: bool,
}

impl CycleEvaluator {
    pub fn new(provider: Arc<dyn CapabilityProvider>) -> Self {
        Self {
            red: RedGateway::new(Arc::clone(&provider)),
            green: GreenGateway::new(Arc::clone(&provider)),
            refactor: RefactorGateway::new(provider),
            policy: ScoringPolicy::default(),
            concurrent_phases: false,
        }
    }

    pub fn with_policy(mut self, policy: ScoringPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Judge red and green together instead of one after the other.
    ///
    /// The two judgments do not depend on each other, so the verdict is the
    /// same either way.
    pub fn with_concurrent_phases(mut self, enabled: bool) -> Self {
        self.concurrent_phases = enabled;
        self
    }

    pub fn policy(&self) -> &ScoringPolicy {
        &self.policy
    }

    /// Evaluate one cycle.
    ///
    /// The refactor gateway is only called when `refactor_changes` is
    /// non-empty.
    ///
    /// # Errors
    ///
    /// The first [`CapabilityError`] from any gateway in scope. No partial
    /// verdict is produced.
    #[instrument(
        skip_all,
        fields(
            cycle = %obs::short_digest(&cycle.digest()),
            feature = %cycle.feature_description,
            refactor_steps = cycle.refactor_changes.len(),
        )
    )]
    pub async fn evaluate(&self, cycle: &DevelopmentCycle) -> Result<CycleVerdict, CapabilityError> {
        if !cycle.refactor_steps_aligned() {
            warn!(
                changes = cycle.refactor_changes.len(),
                results = cycle.refactor_test_results.len(),
                "refactor changes and test results differ in length"
            );
        }

        let (red, green) = if self.concurrent_phases {
            tokio::try_join!(self.red.assess(cycle), self.green.assess(cycle))?
        } else {
            let red = self.red.assess(cycle).await?;
            let green = self.green.assess(cycle).await?;
            (red, green)
        };

        let refactor = if cycle.has_refactor_phase() {
            Some(self.refactor.assess(cycle).await?)
        } else {
            None
        };

        let verdict = aggregate(red, green, refactor, &self.policy);
        METRICS.inc_cycles_evaluated();
        obs::emit_cycle_evaluated(
            verdict.overall_score,
            verdict.passed_discipline,
            verdict.assessments().len(),
        );
        Ok(verdict)
    }

    /// Evaluate `cycle` and pair it with its verdict.
    pub async fn evaluate_record(
        &self,
        cycle: DevelopmentCycle,
    ) -> Result<EvaluationRecord, CapabilityError> {
        let verdict = self.evaluate(&cycle).await?;
        Ok(EvaluationRecord::new(cycle, verdict))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn red(fails_for_right_reason: bool, score: f64) -> RedAssessment {
        RedAssessment::new(fails_for_right_reason, true, true, true, score, "red").unwrap()
    }

    fn green(now_passes: bool, not_altered: bool, score: f64) -> GreenAssessment {
        GreenAssessment::new(now_passes, true, not_altered, true, score, "green").unwrap()
    }

    fn refactor(tests_still_pass: bool, score: f64) -> RefactorAssessment {
        RefactorAssessment::new(tests_still_pass, true, true, true, true, score, "refactor")
            .unwrap()
    }

    #[test]
    fn test_overall_score_is_plain_mean_by_default() {
        let w = PhaseWeights::default();
        let two = overall_score(&red(true, 0.9), &green(true, true, 0.95), None, &w);
        assert_eq!(two, (0.9 + 0.95) / 2.0);

        let three = overall_score(
            &red(true, 0.9),
            &green(true, true, 0.95),
            Some(&refactor(true, 0.85)),
            &w,
        );
        assert_eq!(three, (0.9 + 0.95 + 0.85) / 3.0);
    }

    #[test]
    fn test_weights_shift_score_not_discipline() {
        let policy = ScoringPolicy::new(
            PhaseWeights {
                red: 1.0,
                green: 3.0,
                refactor: 1.0,
            },
            DEFAULT_PASS_THRESHOLD,
        )
        .unwrap();
        let weighted = aggregate(red(true, 0.5), green(true, false, 1.0), None, &policy);
        assert!((weighted.overall_score - 0.875).abs() < 1e-12);
        assert!(!weighted.passed_discipline);
    }

    #[test]
    fn test_discipline_requires_each_critical_flag() {
        assert!(passed_discipline(&red(true, 0.1), &green(true, true, 0.1), None));
        assert!(!passed_discipline(&red(false, 1.0), &green(true, true, 1.0), None));
        assert!(!passed_discipline(&red(true, 1.0), &green(false, true, 1.0), None));
        assert!(!passed_discipline(&red(true, 1.0), &green(true, false, 1.0), None));
        assert!(!passed_discipline(
            &red(true, 1.0),
            &green(true, true, 1.0),
            Some(&refactor(false, 1.0))
        ));
        assert!(passed_discipline(
            &red(true, 1.0),
            &green(true, true, 1.0),
            Some(&refactor(true, 0.0))
        ));
    }

    #[test]
    fn test_non_critical_flags_do_not_affect_discipline() {
        let red = RedAssessment::new(true, false, false, false, 0.3, "sloppy").unwrap();
        let green = GreenAssessment::new(true, false, true, false, 0.3, "bloated").unwrap();
        let refactor =
            RefactorAssessment::new(true, false, false, false, false, 0.3, "messy").unwrap();
        assert!(passed_discipline(&red, &green, Some(&refactor)));
    }

    #[test]
    fn test_summary_format_and_threshold() {
        let summary = render_summary(
            &red(true, 0.9),
            &green(true, true, 0.7),
            None,
            false,
            DEFAULT_PASS_THRESHOLD,
        );
        assert_eq!(
            summary,
            "RED phase: ✅ (score: 0.90) | GREEN phase: ⚠️ (score: 0.70) | Overall: NEEDS IMPROVEMENT"
        );
    }

    #[test]
    fn test_summary_threshold_is_inclusive_and_lists_refactor() {
        let summary = render_summary(
            &red(true, 0.8),
            &green(true, true, 0.8),
            Some(&refactor(true, 0.79)),
            true,
            DEFAULT_PASS_THRESHOLD,
        );
        assert_eq!(
            summary,
            "RED phase: ✅ (score: 0.80) | GREEN phase: ✅ (score: 0.80) | REFACTOR phase: ⚠️ (score: 0.79) | Overall: PASSED"
        );
    }

    #[test]
    fn test_policy_rejects_bad_values() {
        let negative = PhaseWeights {
            red: -1.0,
            ..PhaseWeights::default()
        };
        assert!(matches!(
            ScoringPolicy::new(negative, 0.8),
            Err(ValidationError::InvalidPolicy { .. })
        ));

        let zero = PhaseWeights {
            red: 0.0,
            green: 0.0,
            refactor: 1.0,
        };
        assert!(ScoringPolicy::new(zero, 0.8).is_err());

        let nan = PhaseWeights {
            refactor: f64::NAN,
            ..PhaseWeights::default()
        };
        assert!(ScoringPolicy::new(nan, 0.8).is_err());

        let huge = PhaseWeights {
            red: f64::MAX,
            green: f64::MAX,
            refactor: 1.0,
        };
        assert!(matches!(
            ScoringPolicy::new(huge, 0.8),
            Err(ValidationError::InvalidPolicy { .. })
        ));

        assert!(ScoringPolicy::new(PhaseWeights::default(), 1.2).is_err());
        assert!(ScoringPolicy::new(PhaseWeights::default(), 0.0).is_ok());
    }

    #[test]
    fn test_zero_refactor_weight_ignores_refactor_score() {
        let policy = ScoringPolicy::new(
            PhaseWeights {
                refactor: 0.0,
                ..PhaseWeights::default()
            },
            DEFAULT_PASS_THRESHOLD,
        )
        .unwrap();
        let verdict = aggregate(
            red(true, 0.6),
            green(true, true, 0.8),
            Some(refactor(true, 0.0)),
            &policy,
        );
        assert!((verdict.overall_score - 0.7).abs() < 1e-12);
        assert!(verdict.refactor.is_some());
    }
}
