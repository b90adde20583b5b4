//! Scripted model for tests and offline runs

use crate::{ExternalServiceError, GenerativeModel, StructuredPrompt};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use tracing::debug;

struct ScriptedReply {
    delay: Option<Duration>,
    result: Result<Value, ExternalServiceError>,
}

/// In-process model that replays queued replies in order.
///
/// Every prompt it receives is recorded. Once the queue is drained it
/// answers with `EmptyResponse`.
#[derive(Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<ScriptedReply>>,
    prompts: Mutex<Vec<StructuredPrompt>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful reply
    pub fn push_response(&self, value: Value) {
        self.push(None, Ok(value));
    }

    /// Queue a successful reply that resolves after `delay`
    pub fn push_delayed_response(&self, delay: Duration, value: Value) {
        self.push(Some(delay), Ok(value));
    }

    /// Queue a failure
    pub fn push_error(&self, error: ExternalServiceError) {
        self.push(None, Err(error));
    }

    fn push(&self, delay: Option<Duration>, result: Result<Value, ExternalServiceError>) {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(ScriptedReply { delay, result });
        }
    }

    /// Prompts received so far
    pub fn prompts(&self) -> Vec<StructuredPrompt> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    /// Number of calls received
    pub fn call_count(&self) -> usize {
        self.prompts.lock().map(|p| p.len()).unwrap_or(0)
    }

    /// Number of replies still queued
    pub fn remaining(&self) -> usize {
        self.replies.lock().map(|r| r.len()).unwrap_or(0)
    }
}

#[async_trait]
impl GenerativeModel for ScriptedModel {
    async fn generate(&self, prompt: &StructuredPrompt) -> Result<Value, ExternalServiceError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.clone());
        }

        let reply = self.replies.lock().ok().and_then(|mut r| r.pop_front());
        let Some(reply) = reply else {
            debug!(prompt = prompt.name, "Scripted model exhausted");
            return Err(ExternalServiceError::EmptyResponse);
        };

        if let Some(delay) = reply.delay {
            tokio::time::sleep(delay).await;
        }
        reply.result
    }
}
