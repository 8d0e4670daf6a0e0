//! TDD Eval Judge: chat-completions judgment capability
//!
//! Implements the `tdd-eval-core` capability port over an OpenAI-compatible
//! chat-completions endpoint. Configuration comes from the environment
//! (`OPENAI_API_KEY`, `TDD_EVAL_JUDGE_*`) or from [`JudgeConfig`] builders.

pub mod client;
pub mod config;
pub mod instructions;
pub mod parse;

pub use client::{ChatJudge, ChatJudgeProvider};
pub use config::JudgeConfig;
pub use instructions::instructions_for;
pub use parse::{extract_json_object, ExtractError};
