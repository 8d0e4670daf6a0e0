//! TDD Eval - score red/green/refactor development cycles
//!
//! The `tdd-eval` command asks a judge model to assess each phase of a
//! recorded TDD cycle and reports an overall score and discipline verdict.
//!
//! ## Commands
//!
//! - `evaluate`: judge a cycle file and print or save the evaluation record
//! - `validate`: schema-check a cycle file without calling the judge
//! - `report`: render a saved evaluation record
//!
//! ## Exit codes
//!
//! `0` ok, `1` unexpected failure or `--timeout-secs` exceeded, `2` invalid
//! input, `3` judge failure, `4` discipline not followed (with `--strict`).

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn, Level};

use tdd_eval_core::{
    read_cycle, read_record, render_report, write_record_json, CapabilityError,
    CapabilityProvider, CycleEvaluator, EvaluationRecord, PhaseWeights, ScoringPolicy,
    ValidationError, DEFAULT_PASS_THRESHOLD, METRICS,
};
use tdd_eval_judge::{ChatJudgeProvider, JudgeConfig};

const EXIT_FAILURE: u8 = 1;
const EXIT_INVALID_INPUT: u8 = 2;
const EXIT_JUDGE_FAILED: u8 = 3;
const EXIT_DISCIPLINE_FAILED: u8 = 4;

/// The whole evaluation exceeded `--timeout-secs`.
#[derive(Debug, thiserror::Error)]
#[error("evaluation timed out after {after_secs}s")]
struct EvaluationTimedOut {
    after_secs: u64,
}

#[derive(Parser)]
#[command(name = "tdd-eval")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Evaluate TDD red/green/refactor cycles with a judge model", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Judge a cycle file and report the verdict
    Evaluate(EvaluateArgs),

    /// Check a cycle file against the schema without calling the judge
    Validate {
        /// Path to the cycle file (JSON)
        input: PathBuf,
    },

    /// Render a saved evaluation record
    Report {
        /// Path to the evaluation record (JSON)
        record: PathBuf,
    },
}

#[derive(Args)]
struct EvaluateArgs {
    /// Path to the cycle file (JSON)
    input: PathBuf,

    /// Also write the evaluation record to this path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Stdout format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Give up on the whole evaluation after this many seconds
    #[arg(long, env = "TDD_EVAL_TIMEOUT_SECS", default_value_t = 300)]
    timeout_secs: u64,

    /// Judge the red and green phases concurrently
    #[arg(long)]
    concurrent: bool,

    /// Judge model (overrides TDD_EVAL_JUDGE_MODEL)
    #[arg(long)]
    model: Option<String>,

    /// Chat-completions endpoint (overrides TDD_EVAL_JUDGE_URL)
    #[arg(long)]
    endpoint: Option<String>,

    /// Weight of the red phase score in the overall score
    #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
    red_weight: f64,

    #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
    green_weight: f64,

    #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
    refactor_weight: f64,

    /// Phase score at or above which the summary marks a phase as good
    #[arg(long, default_value_t = DEFAULT_PASS_THRESHOLD, allow_negative_numbers = true)]
    pass_threshold: f64,

    /// Exit with status 4 when the cycle did not follow TDD discipline
    #[arg(long)]
    strict: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

impl EvaluateArgs {
    fn policy(&self) -> Result<ScoringPolicy, ValidationError> {
        ScoringPolicy::new(
            PhaseWeights {
                red: self.red_weight,
                green: self.green_weight,
                refactor: self.refactor_weight,
            },
            self.pass_threshold,
        )
    }

    fn judge_config(&self) -> JudgeConfig {
        let mut config = JudgeConfig::from_env();
        if let Some(model) = &self.model {
            config = config.with_model(model);
        }
        if let Some(endpoint) = &self.endpoint {
            config = config.with_endpoint(endpoint);
        }
        config
    }
}

/// How a successful run ended.
#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    Completed,
    DisciplineFailed,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    tdd_eval_core::init_tracing(cli.json_logs, level);

    let result = run(cli.command).await;
    METRICS.flush();

    match result {
        Ok(Outcome::Completed) => ExitCode::SUCCESS,
        Ok(Outcome::DisciplineFailed) => ExitCode::from(EXIT_DISCIPLINE_FAILED),
        Err(err) => {
            error!(error = %format!("{:#}", err), "tdd-eval failed");
            eprintln!("Error: {:#}", err);
            ExitCode::from(exit_code_for(&err))
        }
    }
}

async fn run(command: Commands) -> Result<Outcome> {
    match command {
        Commands::Evaluate(args) => {
            let provider = Arc::new(ChatJudgeProvider::new(args.judge_config()));
            let record = cmd_evaluate(provider, &args).await?;
            if args.strict && !record.verdict.passed_discipline {
                return Ok(Outcome::DisciplineFailed);
            }
            Ok(Outcome::Completed)
        }
        Commands::Validate { input } => {
            println!("{}", cmd_validate(&input)?);
            Ok(Outcome::Completed)
        }
        Commands::Report { record } => {
            print!("{}", cmd_report(&record)?);
            Ok(Outcome::Completed)
        }
    }
}

/// Map an error chain to the process exit status.
fn exit_code_for(err: &anyhow::Error) -> u8 {
    if err.downcast_ref::<CapabilityError>().is_some() {
        EXIT_JUDGE_FAILED
    } else if err.downcast_ref::<ValidationError>().is_some() {
        EXIT_INVALID_INPUT
    } else if err.downcast_ref::<EvaluationTimedOut>().is_some() {
        EXIT_FAILURE
    } else {
        EXIT_FAILURE
    }
}

async fn cmd_evaluate(
    provider: Arc<dyn CapabilityProvider>,
    args: &EvaluateArgs,
) -> Result<EvaluationRecord> {
    let policy = args.policy()?;
    let cycle = read_cycle(&args.input)?;
    info!(
        feature = %cycle.feature_description,
        refactor_steps = cycle.refactor_changes.len(),
        "evaluating cycle"
    );

    let evaluator = CycleEvaluator::new(provider)
        .with_policy(policy)
        .with_concurrent_phases(args.concurrent);

    let record = tokio::time::timeout(
        Duration::from_secs(args.timeout_secs),
        evaluator.evaluate_record(cycle),
    )
    .await
    .map_err(|_| EvaluationTimedOut {
        after_secs: args.timeout_secs,
    })??;

    if let Some(output) = &args.output {
        write_record_json(output, &record)?;
        info!(path = %output.display(), "evaluation record written");
    }

    match args.format {
        OutputFormat::Text => print!("{}", render_report(&record)),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&record).context("serialize evaluation record")?
        ),
    }
    Ok(record)
}

fn cmd_validate(input: &Path) -> Result<String> {
    let cycle = read_cycle(input)?;
    if !cycle.refactor_steps_aligned() {
        warn!(
            changes = cycle.refactor_changes.len(),
            results = cycle.refactor_test_results.len(),
            "refactor changes and test results differ in length"
        );
    }
    Ok(format!(
        "✅ {} is a valid cycle ({} refactor step(s), digest {})",
        input.display(),
        cycle.refactor_changes.len(),
        cycle.digest()
    ))
}

fn cmd_report(path: &Path) -> Result<String> {
    let record = read_record(path)?;
    Ok(render_report(&record))
}
