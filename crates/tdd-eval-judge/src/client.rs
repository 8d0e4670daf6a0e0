//! Chat-completions judge client
//!
//! `ChatJudgeProvider` connects one `ChatJudge` per phase. Each judge posts
//! the phase instructions as the system message and the brief as the user
//! message, and returns the first JSON object found in the reply.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tdd_eval_core::{Brief, CapabilityError, CapabilityProvider, JudgmentCapability, Phase};
use tracing::{debug, instrument};

use crate::config::JudgeConfig;
use crate::instructions::instructions_for;
use crate::parse::{extract_json_object, ChatCompletion};

/// Longest slice of an error body kept in an error message.
const ERROR_BODY_LIMIT: usize = 512;

/// Judgment capability backed by a chat-completions endpoint.
#[derive(Debug, Clone)]
pub struct ChatJudgeProvider {
    config: JudgeConfig,
}

impl ChatJudgeProvider {
    pub fn new(config: JudgeConfig) -> Self {
        Self { config }
    }

    /// Create from environment variables
    pub fn from_env() -> Self {
        Self::new(JudgeConfig::from_env())
    }

    pub fn config(&self) -> &JudgeConfig {
        &self.config
    }
}

#[async_trait]
impl CapabilityProvider for ChatJudgeProvider {
    async fn connect(&self, phase: Phase) -> Result<Arc<dyn JudgmentCapability>, CapabilityError> {
        let api_key = self
            .config
            .api_key()
            .ok_or_else(|| CapabilityError::Unavailable {
                phase,
                reason: "OPENAI_API_KEY is not set".to_string(),
            })?
            .to_string();

        let client = reqwest::Client::builder()
            .timeout(self.config.timeout)
            .build()
            .map_err(|e| CapabilityError::Unavailable {
                phase,
                reason: format!("failed to build HTTP client: {}", e),
            })?;

        debug!(phase = %phase, endpoint = %self.config.endpoint, model = %self.config.model, "judge connected");
        Ok(Arc::new(ChatJudge {
            endpoint: self.config.endpoint.clone(),
            model: self.config.model.clone(),
            api_key,
            temperature: self.config.temperature,
            timeout: self.config.timeout,
            instructions: instructions_for(phase),
            client,
        }))
    }
}

/// Connected judge for one phase.
pub struct ChatJudge {
    endpoint: String,
    model: String,
    api_key: String,
    temperature: f32,
    timeout: Duration,
    instructions: String,
    client: reqwest::Client,
}

impl ChatJudge {
    fn request_body(&self, brief: &Brief) -> serde_json::Value {
        json!({
            "model": self.model,
            "temperature": self.temperature,
            "response_format": { "type": "json_object" },
            "messages": [
                { "role": "system", "content": self.instructions },
                { "role": "user", "content": brief.as_str() },
            ],
        })
    }

    fn transport_error(&self, phase: Phase, err: reqwest::Error) -> CapabilityError {
        if err.is_timeout() {
            CapabilityError::Timeout {
                phase,
                after_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
            }
        } else {
            CapabilityError::Unavailable {
                phase,
                reason: format!("request to {} failed: {}", self.endpoint, err),
            }
        }
    }
}

#[async_trait]
impl JudgmentCapability for ChatJudge {
    #[instrument(skip_all, fields(phase = %phase, model = %self.model))]
    async fn assess(
        &self,
        phase: Phase,
        brief: &Brief,
    ) -> Result<serde_json::Value, CapabilityError> {
        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(brief))
            .send()
            .await
            .map_err(|e| self.transport_error(phase, e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let body: String = body.chars().take(ERROR_BODY_LIMIT).collect();
            return Err(CapabilityError::Unavailable {
                phase,
                reason: format!("judge returned {}: {}", status, body.trim()),
            });
        }

        let raw = resp
            .bytes()
            .await
            .map_err(|e| self.transport_error(phase, e))?;
        let completion: ChatCompletion =
            serde_json::from_slice(&raw).map_err(|e| CapabilityError::MalformedResponse {
                phase,
                detail: format!("response is not a chat completion: {}", e),
            })?;

        let content = completion
            .content()
            .map_err(|e| CapabilityError::MalformedResponse {
                phase,
                detail: e.to_string(),
            })?;
        debug!(bytes = content.len(), "judge replied");

        extract_json_object(content).map_err(|e| CapabilityError::MalformedResponse {
            phase,
            detail: e.to_string(),
        })
    }
}
