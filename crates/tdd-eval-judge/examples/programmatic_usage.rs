//! Evaluate one cycle against the configured judge.
//!
//! ```sh
//! OPENAI_API_KEY=sk-... cargo run -p tdd-eval-judge --example programmatic_usage
//! ```

use std::sync::Arc;

use tdd_eval_core::{init_tracing, CycleEvaluator, DevelopmentCycle, PhaseOutcome};
use tdd_eval_judge::{ChatJudgeProvider, JudgeConfig};
use tracing::Level;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing(false, Level::INFO);

    let config = JudgeConfig::from_env();
    if config.api_key().is_none() {
        eprintln!("OPENAI_API_KEY is not set; skipping");
        return Ok(());
    }

    let cycle = DevelopmentCycle::new(
        "Add a function to multiply two numbers",
        "def test_multiply():\n    assert multiply(3, 4) == 12",
        PhaseOutcome::failed("test_multiply", "NameError: name 'multiply' is not defined")
            .with_execution_time_ms(1.2),
        "def multiply(a, b):\n    return a * b",
        PhaseOutcome::passed("test_multiply").with_execution_time_ms(0.9),
    )?
    .with_refactor_step(
        "Add type hints: def multiply(a: int, b: int) -> int",
        PhaseOutcome::passed("test_multiply"),
    );

    let evaluator = CycleEvaluator::new(Arc::new(ChatJudgeProvider::new(config)));
    let verdict = evaluator.evaluate(&cycle).await?;

    println!("{}", verdict.summary);
    println!("overall score: {:.2}", verdict.overall_score);
    for assessment in verdict.assessments() {
        println!("{}: {}", assessment.phase(), assessment.rationale());
    }
    Ok(())
}
