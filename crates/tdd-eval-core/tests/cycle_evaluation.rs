//! End-to-end evaluation of development cycles against a scripted judgment
//! capability.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tdd_eval_core::{
    from_document, CapabilityError, CycleEvaluator, DevelopmentCycle, EvaluationRecord, Phase,
    PhaseOutcome, PhaseWeights, ScoringPolicy, ScriptedProvider, DEFAULT_PASS_THRESHOLD,
};

fn multiply_cycle() -> DevelopmentCycle {
    DevelopmentCycle::new(
        "Add a function to multiply two numbers",
        "def test_multiply():\n    assert multiply(3, 4) == 12",
        PhaseOutcome::failed("test_multiply", "NameError: name 'multiply' is not defined")
            .with_execution_time_ms(1.5),
        "def multiply(a, b):\n    return a * b",
        PhaseOutcome::passed("test_multiply").with_execution_time_ms(0.8),
    )
    .expect("valid cycle")
}

fn red_doc(fails_for_right_reason: bool, score: f64) -> Value {
    json!({
        "fails_for_right_reason": fails_for_right_reason,
        "is_focused": true,
        "name_is_descriptive": true,
        "failure_message_clear": true,
        "score": score,
        "rationale": "Fails because multiply does not exist yet",
    })
}

fn green_doc(test_not_altered_to_pass: bool, score: f64) -> Value {
    json!({
        "now_passes": true,
        "implementation_minimal": true,
        "test_not_altered_to_pass": test_not_altered_to_pass,
        "no_other_regressions": true,
        "score": score,
        "rationale": "One-line implementation",
    })
}

fn refactor_doc(tests_still_pass: bool, score: f64) -> Value {
    json!({
        "tests_still_pass": tests_still_pass,
        "behavior_unchanged": true,
        "quality_improved": true,
        "changes_atomic": true,
        "stopped_at_right_point": true,
        "score": score,
        "rationale": "Type hints clarify the contract",
    })
}

fn evaluator(provider: &ScriptedProvider) -> CycleEvaluator {
    CycleEvaluator::new(Arc::new(provider.clone()))
}

#[tokio::test]
async fn test_disciplined_cycle_without_refactor() {
    let provider = ScriptedProvider::new()
        .respond(Phase::Red, red_doc(true, 0.9))
        .respond(Phase::Green, green_doc(true, 0.95));

    let verdict = evaluator(&provider)
        .evaluate(&multiply_cycle())
        .await
        .expect("verdict");

    assert!((verdict.overall_score - 0.925).abs() < 1e-12);
    assert!(verdict.passed_discipline);
    assert!(verdict.refactor.is_none());
    assert_eq!(
        verdict.summary,
        "RED phase: ✅ (score: 0.90) | GREEN phase: ✅ (score: 0.95) | Overall: PASSED"
    );
    assert_eq!(provider.calls(Phase::Refactor), 0);
    assert_eq!(provider.connects(Phase::Refactor), 0);
}

#[tokio::test]
async fn test_altered_test_fails_discipline_despite_high_score() {
    let provider = ScriptedProvider::new()
        .respond(Phase::Red, red_doc(true, 0.9))
        .respond(Phase::Green, green_doc(false, 0.95));

    let verdict = evaluator(&provider)
        .evaluate(&multiply_cycle())
        .await
        .expect("verdict");

    assert!((verdict.overall_score - 0.925).abs() < 1e-12);
    assert!(!verdict.passed_discipline);
    assert!(verdict.summary.ends_with("Overall: NEEDS IMPROVEMENT"));
}

#[tokio::test]
async fn test_refactor_phase_is_averaged_in() {
    let provider = ScriptedProvider::new()
        .respond(Phase::Red, red_doc(true, 0.9))
        .respond(Phase::Green, green_doc(true, 0.95))
        .respond(Phase::Refactor, refactor_doc(true, 0.85));
    let cycle = multiply_cycle()
        .with_refactor_step("Add type hints", PhaseOutcome::passed("test_multiply"));

    let verdict = evaluator(&provider).evaluate(&cycle).await.expect("verdict");

    assert_eq!(verdict.overall_score, (0.9 + 0.95 + 0.85) / 3.0);
    assert!(verdict.passed_discipline);
    assert_eq!(
        verdict.refactor.as_ref().map(|r| r.score.value()),
        Some(0.85)
    );
    assert_eq!(provider.calls(Phase::Refactor), 1);
    assert!(provider.briefs(Phase::Refactor)[0]
        .as_str()
        .contains("Add type hints"));
}

#[tokio::test]
async fn test_broken_refactor_fails_discipline() {
    let provider = ScriptedProvider::new()
        .respond(Phase::Red, red_doc(true, 1.0))
        .respond(Phase::Green, green_doc(true, 1.0))
        .respond(Phase::Refactor, refactor_doc(false, 0.9));
    let cycle = multiply_cycle().with_refactor_step(
        "Inline multiply",
        PhaseOutcome::failed("test_multiply", "AssertionError"),
    );

    let verdict = evaluator(&provider).evaluate(&cycle).await.expect("verdict");
    assert!(!verdict.passed_discipline);
}

#[tokio::test]
async fn test_green_failure_aborts_evaluation() {
    let provider = ScriptedProvider::new()
        .respond(Phase::Red, red_doc(true, 0.9))
        .fail(
            Phase::Green,
            CapabilityError::Unavailable {
                phase: Phase::Green,
                reason: "service down".to_string(),
            },
        )
        .respond(Phase::Refactor, refactor_doc(true, 0.85));
    let cycle = multiply_cycle()
        .with_refactor_step("Add type hints", PhaseOutcome::passed("test_multiply"));

    let err = evaluator(&provider).evaluate(&cycle).await.unwrap_err();

    assert!(matches!(
        err,
        CapabilityError::Unavailable {
            phase: Phase::Green,
            ..
        }
    ));
    assert_eq!(provider.calls(Phase::Refactor), 0);
}

#[tokio::test]
async fn test_invalid_assessment_is_schema_mismatch() {
    let provider = ScriptedProvider::new()
        .respond(Phase::Red, red_doc(true, 1.5))
        .respond(Phase::Green, green_doc(true, 0.95));

    let err = evaluator(&provider)
        .evaluate(&multiply_cycle())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CapabilityError::SchemaMismatch {
            phase: Phase::Red,
            ..
        }
    ));
    assert_eq!(provider.calls(Phase::Green), 0);
}

#[tokio::test]
async fn test_repeated_evaluation_is_identical_and_connects_once() {
    let provider = ScriptedProvider::new()
        .respond(Phase::Red, red_doc(true, 0.9))
        .respond(Phase::Green, green_doc(true, 0.95));
    let evaluator = evaluator(&provider);
    let cycle = multiply_cycle();

    let first = evaluator.evaluate(&cycle).await.expect("first");
    let second = evaluator.evaluate(&cycle).await.expect("second");

    assert_eq!(first, second);
    assert_eq!(provider.connects(Phase::Red), 1);
    assert_eq!(provider.connects(Phase::Green), 1);
    assert_eq!(provider.calls(Phase::Red), 2);
}

#[tokio::test]
async fn test_concurrent_phases_match_sequential() {
    let provider = ScriptedProvider::new()
        .respond(Phase::Red, red_doc(true, 0.9))
        .respond(Phase::Green, green_doc(false, 0.7));
    let cycle = multiply_cycle();

    let sequential = evaluator(&provider).evaluate(&cycle).await.expect("seq");
    let concurrent = evaluator(&provider)
        .with_concurrent_phases(true)
        .evaluate(&cycle)
        .await
        .expect("concurrent");

    assert_eq!(sequential, concurrent);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_first_calls_share_one_handle() {
    let provider = ScriptedProvider::new()
        .respond(Phase::Red, red_doc(true, 0.9))
        .respond(Phase::Green, green_doc(true, 0.95))
        .with_connect_delay(Duration::from_secs(2));
    let evaluator = Arc::new(evaluator(&provider));
    let cycle = multiply_cycle();

    let (a, b, c) = tokio::join!(
        evaluator.evaluate(&cycle),
        evaluator.evaluate(&cycle),
        evaluator.evaluate(&cycle),
    );

    assert!(a.is_ok() && b.is_ok() && c.is_ok());
    assert_eq!(provider.connects(Phase::Red), 1);
    assert_eq!(provider.connects(Phase::Green), 1);
    assert_eq!(provider.calls(Phase::Red), 3);
}

#[tokio::test]
async fn test_weights_change_score_but_not_discipline() {
    let provider = ScriptedProvider::new()
        .respond(Phase::Red, red_doc(false, 0.4))
        .respond(Phase::Green, green_doc(true, 1.0));
    let policy = ScoringPolicy::new(
        PhaseWeights {
            red: 1.0,
            green: 4.0,
            refactor: 1.0,
        },
        DEFAULT_PASS_THRESHOLD,
    )
    .expect("policy");

    let plain = evaluator(&provider)
        .evaluate(&multiply_cycle())
        .await
        .expect("plain");
    let weighted = evaluator(&provider)
        .with_policy(policy)
        .evaluate(&multiply_cycle())
        .await
        .expect("weighted");

    assert!((plain.overall_score - 0.7).abs() < 1e-12);
    assert!((weighted.overall_score - 0.88).abs() < 1e-12);
    assert!(!plain.passed_discipline);
    assert_eq!(plain.passed_discipline, weighted.passed_discipline);
}

#[tokio::test]
async fn test_record_round_trips_through_json() {
    let provider = ScriptedProvider::new()
        .respond(Phase::Red, red_doc(true, 0.9))
        .respond(Phase::Green, green_doc(true, 0.95))
        .respond(Phase::Refactor, refactor_doc(true, 0.85));
    let cycle = multiply_cycle()
        .with_refactor_step("Add type hints", PhaseOutcome::passed("test_multiply"));

    let record = evaluator(&provider)
        .evaluate_record(cycle)
        .await
        .expect("record");
    assert!(record.digest_matches());

    let document = serde_json::to_value(&record).expect("serialize");
    assert!(document["verdict"]["refactor"].is_object());
    assert!(document["cycle"]["refactor_changes"].is_array());

    let restored: EvaluationRecord = from_document(document).expect("deserialize");
    assert_eq!(restored, record);
}

#[tokio::test]
async fn test_brief_carries_recorded_results() {
    let provider = ScriptedProvider::new()
        .respond(Phase::Red, red_doc(true, 0.9))
        .respond(Phase::Green, green_doc(true, 0.95));

    evaluator(&provider)
        .evaluate(&multiply_cycle())
        .await
        .expect("verdict");

    let red = provider.briefs(Phase::Red);
    assert_eq!(red.len(), 1);
    assert!(red[0].as_str().contains("NameError: name 'multiply' is not defined"));
    let green = provider.briefs(Phase::Green);
    assert!(green[0].as_str().contains("return a * b"));
    assert!(green[0].as_str().contains("assert multiply(3, 4) == 12"));
}

#[tokio::test]
async fn test_record_with_large_weights_round_trips() {
    let provider = ScriptedProvider::new()
        .respond(Phase::Red, red_doc(true, 0.9))
        .respond(Phase::Green, green_doc(true, 0.95))
        .respond(Phase::Refactor, refactor_doc(true, 0.85));
    let policy = ScoringPolicy::new(
        PhaseWeights {
            red: f64::MAX / 4.0,
            green: f64::MAX / 4.0,
            refactor: f64::MAX / 4.0,
        },
        DEFAULT_PASS_THRESHOLD,
    )
    .expect("policy");
    let cycle = multiply_cycle()
        .with_refactor_step("Add type hints", PhaseOutcome::passed("test_multiply"));

    let record = evaluator(&provider)
        .with_policy(policy)
        .evaluate_record(cycle)
        .await
        .expect("record");
    assert!(record.verdict.overall_score.is_finite());

    let document = serde_json::to_value(&record).expect("serialize");
    let restored: EvaluationRecord = from_document(document).expect("deserialize");
    assert_eq!(restored, record);
}
