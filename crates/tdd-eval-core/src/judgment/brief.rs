//! Natural-language briefs handed to the judgment capability.
//!
//! Each brief carries every cycle field its phase's criteria depend on, so no
//! criterion is judged on missing information.

use serde::{Deserialize, Serialize};

use crate::domain::{DevelopmentCycle, Phase, PhaseOutcome};

/// Description of one phase's artifacts, addressed to the judgment capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brief {
    pub phase: Phase,
    pub text: String,
}

impl Brief {
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

/// Build the brief for `phase`.
pub fn brief_for(phase: Phase, cycle: &DevelopmentCycle) -> Brief {
    match phase {
        Phase::Red => red_brief(cycle),
        Phase::Green => green_brief(cycle),
        Phase::Refactor => refactor_brief(cycle),
    }
}

/// Feature, failing test and how it failed.
pub fn red_brief(cycle: &DevelopmentCycle) -> Brief {
    let mut out = String::new();
    out.push_str("Evaluate this RED phase:\n\n");
    push_feature(&mut out, cycle);
    push_code_block(&mut out, "Test Code", &cycle.red_test_code);
    out.push_str("Test Result:\n");
    push_outcome(&mut out, &cycle.red_test_result);
    out.push_str("\nProvide your evaluation.");
    Brief {
        phase: Phase::Red,
        text: out,
    }
}

/// Feature, the original red test, the implementation and the result after it.
pub fn green_brief(cycle: &DevelopmentCycle) -> Brief {
    let mut out = String::new();
    out.push_str("Evaluate this GREEN phase:\n\n");
    push_feature(&mut out, cycle);
    push_code_block(&mut out, "Original RED Test Code", &cycle.red_test_code);
    push_code_block(&mut out, "GREEN Implementation", &cycle.green_implementation);
    out.push_str("Test Result After Implementation:\n");
    push_outcome(&mut out, &cycle.green_test_result);
    out.push_str("\nProvide your evaluation.");
    Brief {
        phase: Phase::Green,
        text: out,
    }
}

/// Feature, numbered changes, per-change results and the green implementation.
///
/// Changes and results are listed separately; when their counts differ the
/// brief says so rather than pairing them up.
pub fn refactor_brief(cycle: &DevelopmentCycle) -> Brief {
    let mut out = String::new();
    out.push_str("Evaluate this REFACTOR phase:\n\n");
    push_feature(&mut out, cycle);

    out.push_str("Refactoring Changes Made:\n");
    for (i, change) in cycle.refactor_changes.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, change));
    }
    out.push('\n');

    out.push_str("Test Results After Each Change:\n");
    if cycle.refactor_test_results.is_empty() {
        out.push_str("(no test results recorded)\n");
    }
    for (i, result) in cycle.refactor_test_results.iter().enumerate() {
        let status = if result.passed { "PASSED" } else { "FAILED" };
        out.push_str(&format!(
            "After change {}: {} - {}",
            i + 1,
            result.test_name,
            status
        ));
        if let Some(reason) = &result.failure_reason {
            out.push_str(&format!(" ({})", reason));
        }
        out.push('\n');
    }
    if !cycle.refactor_steps_aligned() {
        out.push_str(&format!(
            "Note: {} change(s) but {} test result(s) were recorded.\n",
            cycle.refactor_changes.len(),
            cycle.refactor_test_results.len()
        ));
    }
    out.push('\n');

    push_code_block(
        &mut out,
        "Original GREEN Implementation",
        &cycle.green_implementation,
    );
    out.push_str("Provide your evaluation.");
    Brief {
        phase: Phase::Refactor,
        text: out,
    }
}

fn push_feature(out: &mut String, cycle: &DevelopmentCycle) {
    out.push_str(&format!("Feature: {}\n\n", cycle.feature_description));
}

fn push_code_block(out: &mut String, title: &str, code: &str) {
    out.push_str(&format!("{}:\n```\n{}\n```\n\n", title, code));
}

fn push_outcome(out: &mut String, outcome: &PhaseOutcome) {
    out.push_str(&format!("- Test Name: {}\n", outcome.test_name));
    out.push_str(&format!("- Passed: {}\n", outcome.passed));
    out.push_str(&format!(
        "- Failure Reason: {}\n",
        outcome.failure_reason.as_deref().unwrap_or("N/A")
    ));
    if let Some(millis) = outcome.execution_time_ms {
        out.push_str(&format!("- Execution Time: {:.1}ms\n", millis));
    }
}
