//! Per-phase assessments returned by the judgment capability.
//!
//! Every assessment carries a fixed set of boolean criteria, a [`Score`] and
//! a [`Rationale`]. The newtypes enforce the shared invariants (score in
//! `[0.0, 1.0]`, non-blank rationale) at construction and deserialization.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::error::ValidationError;
use super::phase::Phase;
use super::validation::{Rationale, Score, Validate};

/// Behaviour shared by the three assessment shapes.
pub trait Assessment:
    DeserializeOwned + Serialize + Validate + Clone + Send + Sync + 'static
{
    /// Phase this assessment judges.
    const PHASE: Phase;

    fn score(&self) -> Score;

    fn rationale(&self) -> &Rationale;

    /// `(criterion, value)` pairs in display order.
    fn criteria(&self) -> Vec<(&'static str, bool)>;
}

/// Judgment of the red phase: is the failing test a good one?
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedAssessment {
    /// Fails because the behaviour is missing, not because of a syntax or import error.
    pub fails_for_right_reason: bool,
    /// Exercises one behaviour with one clear assertion.
    pub is_focused: bool,
    /// Name describes the expected behaviour.
    pub name_is_descriptive: bool,
    /// Failure message makes the missing behaviour obvious.
    pub failure_message_clear: bool,
    pub score: Score,
    pub rationale: Rationale,
}

/// Judgment of the green phase: did the minimal change make the test pass honestly?
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GreenAssessment {
    /// The red test now passes.
    pub now_passes: bool,
    /// Implementation does just enough to pass.
    pub implementation_minimal: bool,
    /// The test was not edited to make it pass.
    pub test_not_altered_to_pass: bool,
    /// Other tests still pass.
    pub no_other_regressions: bool,
    pub score: Score,
    pub rationale: Rationale,
}

/// Judgment of the refactor phase: was the code improved without changing behaviour?
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefactorAssessment {
    pub tests_still_pass: bool,
    pub behavior_unchanged: bool,
    /// Readability or maintainability improved.
    pub quality_improved: bool,
    /// One improvement per change.
    pub changes_atomic: bool,
    /// No speculative generality or premature optimisation.
    pub stopped_at_right_point: bool,
    pub score: Score,
    pub rationale: Rationale,
}

impl RedAssessment {
    pub fn new(
        fails_for_right_reason: bool,
        is_focused: bool,
        name_is_descriptive: bool,
        failure_message_clear: bool,
        score: f64,
        rationale: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            fails_for_right_reason,
            is_focused,
            name_is_descriptive,
            failure_message_clear,
            score: Score::new(score)?,
            rationale: Rationale::new(rationale)?,
        })
    }
}

impl GreenAssessment {
    pub fn new(
        now_passes: bool,
        implementation_minimal: bool,
        test_not_altered_to_pass: bool,
        no_other_regressions: bool,
        score: f64,
        rationale: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            now_passes,
            implementation_minimal,
            test_not_altered_to_pass,
            no_other_regressions,
            score: Score::new(score)?,
            rationale: Rationale::new(rationale)?,
        })
    }
}

impl RefactorAssessment {
    pub fn new(
        tests_still_pass: bool,
        behavior_unchanged: bool,
        quality_improved: bool,
        changes_atomic: bool,
        stopped_at_right_point: bool,
        score: f64,
        rationale: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            tests_still_pass,
            behavior_unchanged,
            quality_improved,
            changes_atomic,
            stopped_at_right_point,
            score: Score::new(score)?,
            rationale: Rationale::new(rationale)?,
        })
    }
}

// The newtypes already hold the field-level invariants; there are no
// cross-field rules for assessments.
impl Validate for RedAssessment {
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

impl Validate for GreenAssessment {
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

impl Validate for RefactorAssessment {
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

impl Assessment for RedAssessment {
    const PHASE: Phase = Phase::Red;

    fn score(&self) -> Score {
        self.score
    }

    fn rationale(&self) -> &Rationale {
        &self.rationale
    }

    fn criteria(&self) -> Vec<(&'static str, bool)> {
        vec![
            ("Fails for the right reason", self.fails_for_right_reason),
            ("Test is focused", self.is_focused),
            ("Test name descriptive", self.name_is_descriptive),
            ("Failure message clear", self.failure_message_clear),
        ]
    }
}

impl Assessment for GreenAssessment {
    const PHASE: Phase = Phase::Green;

    fn score(&self) -> Score {
        self.score
    }

    fn rationale(&self) -> &Rationale {
        &self.rationale
    }

    fn criteria(&self) -> Vec<(&'static str, bool)> {
        vec![
            ("Test now passes", self.now_passes),
            ("Implementation minimal", self.implementation_minimal),
            ("Test not altered to pass", self.test_not_altered_to_pass),
            ("No other regressions", self.no_other_regressions),
        ]
    }
}

impl Assessment for RefactorAssessment {
    const PHASE: Phase = Phase::Refactor;

    fn score(&self) -> Score {
        self.score
    }

    fn rationale(&self) -> &Rationale {
        &self.rationale
    }

    fn criteria(&self) -> Vec<(&'static str, bool)> {
        vec![
            ("Tests still pass", self.tests_still_pass),
            ("Behavior unchanged", self.behavior_unchanged),
            ("Code quality improved", self.quality_improved),
            ("Changes atomic", self.changes_atomic),
            ("Stopped at the right point", self.stopped_at_right_point),
        ]
    }
}

/// Any one of the three assessments, tagged by phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PhaseAssessment {
    Red(RedAssessment),
    Green(GreenAssessment),
    Refactor(RefactorAssessment),
}

impl PhaseAssessment {
    pub fn phase(&self) -> Phase {
        match self {
            PhaseAssessment::Red(_) => Phase::Red,
            PhaseAssessment::Green(_) => Phase::Green,
            PhaseAssessment::Refactor(_) => Phase::Refactor,
        }
    }

    pub fn score(&self) -> Score {
        match self {
            PhaseAssessment::Red(a) => a.score,
            PhaseAssessment::Green(a) => a.score,
            PhaseAssessment::Refactor(a) => a.score,
        }
    }

    pub fn rationale(&self) -> &Rationale {
        match self {
            PhaseAssessment::Red(a) => &a.rationale,
            PhaseAssessment::Green(a) => &a.rationale,
            PhaseAssessment::Refactor(a) => &a.rationale,
        }
    }

    pub fn criteria(&self) -> Vec<(&'static str, bool)> {
        match self {
            PhaseAssessment::Red(a) => a.criteria(),
            PhaseAssessment::Green(a) => a.criteria(),
            PhaseAssessment::Refactor(a) => a.criteria(),
        }
    }
}

impl From<RedAssessment> for PhaseAssessment {
    fn from(a: RedAssessment) -> Self {
        PhaseAssessment::Red(a)
    }
}

impl From<GreenAssessment> for PhaseAssessment {
    fn from(a: GreenAssessment) -> Self {
        PhaseAssessment::Green(a)
    }
}

impl From<RefactorAssessment> for PhaseAssessment {
    fn from(a: RefactorAssessment) -> Self {
        PhaseAssessment::Refactor(a)
    }
}
