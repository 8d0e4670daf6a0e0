//! Tracing setup for the `tdd-eval` binary and embedding programs.
//!
//! Logs always go to stderr. Stdout carries the markdown report or the JSON
//! evaluation record, so it has to stay clean for piping.
//!
//! Without `RUST_LOG` the requested level applies to the evaluator crates
//! only; the HTTP stack used by the judge stays at `warn` so `--verbose`
//! shows phase judgments rather than connection pool chatter.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Crates whose events follow the requested level.
const EVALUATOR_TARGETS: &[&str] = &["tdd_eval", "tdd_eval_core", "tdd_eval_judge"];

/// Filter directives used when `RUST_LOG` is not set.
pub fn default_directives(level: Level) -> String {
    let level = level.as_str().to_ascii_lowercase();
    let mut directives = vec!["warn".to_string()];
    directives.extend(
        EVALUATOR_TARGETS
            .iter()
            .map(|target| format!("{}={}", target, level)),
    );
    directives.join(",")
}

/// Initialise the global tracing subscriber.
///
/// `json` switches to newline-delimited JSON lines. `level` is the evaluator
/// verbosity when `RUST_LOG` is not set. Only the first call in a process
/// takes effect.
pub fn init_tracing(json: bool, level: Level) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level)));

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .json(),
            )
            .try_init()
            .ok();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()
            .ok();
    }
}
