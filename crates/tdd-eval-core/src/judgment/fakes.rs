//! In-memory fake judgment capability (testing and demos)
//!
//! `ScriptedProvider` answers each phase with a canned document or a canned
//! failure, and records every connect and every brief it receives so tests
//! can assert on round-trip counts.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{CapabilityError, Phase};
use crate::judgment::brief::Brief;
use crate::judgment::{CapabilityProvider, JudgmentCapability};

type Reply = Result<serde_json::Value, CapabilityError>;

#[derive(Debug, Default)]
struct Script {
    replies: HashMap<Phase, Reply>,
    refused_connects: HashMap<Phase, usize>,
    connects: HashMap<Phase, usize>,
    briefs: HashMap<Phase, Vec<Brief>>,
}

fn lock(script: &Mutex<Script>) -> MutexGuard<'_, Script> {
    script.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Provider whose handles replay scripted replies.
#[derive(Debug, Default, Clone)]
pub struct ScriptedProvider {
    script: Arc<Mutex<Script>>,
    connect_delay: Option<Duration>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every `phase` judgment with `document`.
    pub fn respond(self, phase: Phase, document: serde_json::Value) -> Self {
        lock(&self.script).replies.insert(phase, Ok(document));
        self
    }

    /// Fail every `phase` judgment with `error`.
    pub fn fail(self, phase: Phase, error: CapabilityError) -> Self {
        lock(&self.script).replies.insert(phase, Err(error));
        self
    }

    /// Refuse the first `times` connect attempts for `phase`.
    pub fn refuse_connect(self, phase: Phase, times: usize) -> Self {
        lock(&self.script).refused_connects.insert(phase, times);
        self
    }

    /// Sleep this long inside every connect, widening the window for racing
    /// first calls.
    pub fn with_connect_delay(mut self, delay: Duration) -> Self {
        self.connect_delay = Some(delay);
        self
    }

    /// Connect attempts made for `phase`, refused ones included.
    pub fn connects(&self, phase: Phase) -> usize {
        lock(&self.script).connects.get(&phase).copied().unwrap_or(0)
    }

    /// Judgment round trips made for `phase`.
    pub fn calls(&self, phase: Phase) -> usize {
        lock(&self.script).briefs.get(&phase).map_or(0, Vec::len)
    }

    /// Briefs received for `phase`, in call order.
    pub fn briefs(&self, phase: Phase) -> Vec<Brief> {
        lock(&self.script)
            .briefs
            .get(&phase)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl CapabilityProvider for ScriptedProvider {
    async fn connect(&self, phase: Phase) -> Result<Arc<dyn JudgmentCapability>, CapabilityError> {
        if let Some(delay) = self.connect_delay {
            tokio::time::sleep(delay).await;
        }

        let mut script = lock(&self.script);
        *script.connects.entry(phase).or_insert(0) += 1;
        if let Some(remaining) = script.refused_connects.get_mut(&phase) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(CapabilityError::Unavailable {
                    phase,
                    reason: "scripted connect refusal".to_string(),
                });
            }
        }

        Ok(Arc::new(ScriptedCapability {
            script: Arc::clone(&self.script),
        }))
    }
}

/// Handle returned by [`ScriptedProvider::connect`].
#[derive(Debug)]
pub struct ScriptedCapability {
    script: Arc<Mutex<Script>>,
}

#[async_trait]
impl JudgmentCapability for ScriptedCapability {
    async fn assess(
        &self,
        phase: Phase,
        brief: &Brief,
    ) -> Result<serde_json::Value, CapabilityError> {
        let mut script = lock(&self.script);
        script.briefs.entry(phase).or_default().push(brief.clone());
        script
            .replies
            .get(&phase)
            .cloned()
            .unwrap_or_else(|| {
                Err(CapabilityError::Unavailable {
                    phase,
                    reason: "no scripted reply".to_string(),
                })
            })
    }
}
