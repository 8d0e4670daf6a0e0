//! Judge endpoint configuration
//!
//! Defaults come from the environment; builders override them.

use std::time::Duration;

use tracing::warn;

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_TEMPERATURE: f32 = 0.0;

/// Chat-completions judge configuration
#[derive(Clone)]
pub struct JudgeConfig {
    /// Chat-completions URL
    pub endpoint: String,
    /// Model name sent with every request
    pub model: String,
    /// Bearer token; connecting fails without one
    pub api_key: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
    pub temperature: f32,
}

impl Default for JudgeConfig {
    fn default() -> Self {
        JudgeConfig {
            endpoint: std::env::var("TDD_EVAL_JUDGE_URL")
                .unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string()),
            model: std::env::var("TDD_EVAL_JUDGE_MODEL")
                .unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            api_key: std::env::var("OPENAI_API_KEY").ok(),
            timeout: env_parsed::<u64>("TDD_EVAL_JUDGE_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_TIMEOUT),
            temperature: env_parsed("TDD_EVAL_JUDGE_TEMPERATURE").unwrap_or(DEFAULT_TEMPERATURE),
        }
    }
}

impl std::fmt::Debug for JudgeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JudgeConfig")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl JudgeConfig {
    /// Create config from environment variables
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Create config for a specific endpoint and model, ignoring the environment
    pub fn new(endpoint: &str, model: &str) -> Self {
        JudgeConfig {
            endpoint: endpoint.to_string(),
            model: model.to_string(),
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn with_api_key(mut self, api_key: &str) -> Self {
        self.api_key = Some(api_key.to_string());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// The API key, if one is set and not blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

fn env_parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(variable = name, value = %raw, "ignoring unparseable environment value");
            None
        }
    }
}
