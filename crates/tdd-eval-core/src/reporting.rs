use anyhow::{Context, Result};
use std::path::Path;

use crate::domain::{
    from_document, DevelopmentCycle, EvaluationRecord, PhaseAssessment, ValidationError,
};

/// Read and validate a cycle document.
///
/// Parse and schema failures surface as [`ValidationError`] underneath the
/// file context, so callers can downcast to tell bad input from I/O.
pub fn read_cycle(path: &Path) -> Result<DevelopmentCycle> {
    let document = read_document(path)?;
    let cycle = from_document(document).with_context(|| format!("invalid cycle in {:?}", path))?;
    Ok(cycle)
}

/// Read and validate a persisted evaluation record.
pub fn read_record(path: &Path) -> Result<EvaluationRecord> {
    let document = read_document(path)?;
    let record =
        from_document(document).with_context(|| format!("invalid record in {:?}", path))?;
    Ok(record)
}

fn read_document(path: &Path) -> Result<serde_json::Value> {
    let content = std::fs::read_to_string(path).with_context(|| format!("read {:?}", path))?;
    let document = serde_json::from_str(&content)
        .map_err(ValidationError::from)
        .with_context(|| format!("parse {:?}", path))?;
    Ok(document)
}

/// Write an evaluation record in pretty JSON format.
pub fn write_record_json(path: &Path, record: &EvaluationRecord) -> Result<()> {
    let content = serde_json::to_string_pretty(record).context("serialize evaluation record")?;
    std::fs::write(path, content).with_context(|| format!("write {:?}", path))?;
    Ok(())
}

/// Render a markdown report for terminal or PR output.
pub fn render_report(record: &EvaluationRecord) -> String {
    let verdict = &record.verdict;
    let mut out = String::new();
    out.push_str("# TDD Cycle Evaluation\n\n");
    out.push_str(&format!(
        "- feature: {}\n- overall score: {:.2}\n- discipline: {}\n- evaluated at: {}\n- record: {}\n\n",
        record.cycle.feature_description,
        verdict.overall_score,
        if verdict.passed_discipline {
            "PASSED"
        } else {
            "NEEDS IMPROVEMENT"
        },
        record.evaluated_at.to_rfc3339(),
        record.record_id,
    ));
    out.push_str(&format!("{}\n", verdict.summary));

    for assessment in verdict.assessments() {
        out.push('\n');
        render_phase(&mut out, &assessment);
    }

    if !record.cycle.refactor_steps_aligned() {
        out.push_str(&format!(
            "\n> note: {} refactor change(s) but {} test result(s) recorded\n",
            record.cycle.refactor_changes.len(),
            record.cycle.refactor_test_results.len()
        ));
    }
    out
}

fn render_phase(out: &mut String, assessment: &PhaseAssessment) {
    out.push_str(&format!(
        "## {} ({:.2})\n",
        assessment.phase(),
        assessment.score().value()
    ));
    for (criterion, met) in assessment.criteria() {
        let mark = if met { "x" } else { " " };
        out.push_str(&format!("- [{}] {}\n", mark, criterion));
    }
    out.push_str(&format!("\n{}\n", assessment.rationale()));
}
