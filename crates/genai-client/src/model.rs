//! Generative model trait and structured generation helper

use crate::ExternalServiceError;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// A prompt together with the JSON schema its answer must follow
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructuredPrompt {
    /// Stable prompt name, used for logging and metric labels
    pub name: &'static str,
    /// Rendered prompt text
    pub text: String,
    /// Response schema (OpenAPI subset, as accepted by the model API)
    pub response_schema: Value,
}

impl StructuredPrompt {
    pub fn new(name: &'static str, text: impl Into<String>, response_schema: Value) -> Self {
        Self {
            name,
            text: text.into(),
            response_schema,
        }
    }
}

/// A hosted language model that answers with JSON
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Send the prompt and return the model's JSON answer
    async fn generate(&self, prompt: &StructuredPrompt) -> Result<Value, ExternalServiceError>;
}

#[async_trait]
impl<M: GenerativeModel + ?Sized> GenerativeModel for Arc<M> {
    async fn generate(&self, prompt: &StructuredPrompt) -> Result<Value, ExternalServiceError> {
        (**self).generate(prompt).await
    }
}

#[async_trait]
impl<M: GenerativeModel + ?Sized> GenerativeModel for Box<M> {
    async fn generate(&self, prompt: &StructuredPrompt) -> Result<Value, ExternalServiceError> {
        (**self).generate(prompt).await
    }
}

/// Run a prompt and deserialize the answer into `T`.
///
/// Deserialization failures are reported as `SchemaViolation`.
pub async fn generate_structured<T, M>(
    model: &M,
    prompt: &StructuredPrompt,
) -> Result<T, ExternalServiceError>
where
    T: DeserializeOwned,
    M: GenerativeModel + ?Sized,
{
    metrics::counter!("genai_requests_total", "prompt" => prompt.name).increment(1);
    debug!(prompt = prompt.name, "Running structured prompt");

    let result = model.generate(prompt).await.and_then(|value| {
        serde_json::from_value::<T>(value)
            .map_err(|e| ExternalServiceError::SchemaViolation(e.to_string()))
    });

    if let Err(e) = &result {
        metrics::counter!("genai_failures_total", "prompt" => prompt.name).increment(1);
        warn!(prompt = prompt.name, error = %e, "Structured prompt failed");
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ScriptedModel;
    use metrics_util::debugging::{DebugValue, DebuggingRecorder, Snapshotter};
    use serde::Deserialize;
    use serde_json::json;

    fn counter(snapshotter: &Snapshotter, name: &str) -> u64 {
        snapshotter
            .snapshot()
            .into_vec()
            .into_iter()
            .filter(|(key, _, _, _)| key.key().name() == name)
            .map(|(_, _, _, value)| match value {
                DebugValue::Counter(n) => n,
                _ => 0,
            })
            .sum()
    }

    fn block_on<F: std::future::Future>(future: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
            .block_on(future)
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Answer {
        value: u32,
    }

    fn prompt() -> StructuredPrompt {
        StructuredPrompt::new("testPrompt", "Say a number", json!({"type": "OBJECT"}))
    }

    #[tokio::test]
    async fn test_structured_success() {
        let model = ScriptedModel::new();
        model.push_response(json!({"value": 7}));

        let answer: Answer = generate_structured(&model, &prompt()).await.unwrap();
        assert_eq!(answer, Answer { value: 7 });
    }

    #[tokio::test]
    async fn test_structured_schema_violation() {
        let model = ScriptedModel::new();
        model.push_response(json!({"value": "seven"}));

        let err = generate_structured::<Answer, _>(&model, &prompt()).await.unwrap_err();
        assert!(matches!(err, ExternalServiceError::SchemaViolation(_)));
    }

    #[tokio::test]
    async fn test_structured_propagates_model_error() {
        let model = ScriptedModel::new();
        model.push_error(ExternalServiceError::Status {
            status: 503,
            body: "overloaded".to_string(),
        });

        let err = generate_structured::<Answer, _>(&model, &prompt()).await.unwrap_err();
        assert!(matches!(err, ExternalServiceError::Status { status: 503, .. }));
    }

    #[test]
    fn test_counters_track_requests_and_failures() {
        let recorder = DebuggingRecorder::new();
        let snapshotter = recorder.snapshotter();

        let model = ScriptedModel::new();
        model.push_response(json!({"value": 3}));
        model.push_response(json!({"value": -3}));

        metrics::with_local_recorder(&recorder, || {
            assert!(block_on(generate_structured::<Answer, _>(&model, &prompt())).is_ok());
            assert!(block_on(generate_structured::<Answer, _>(&model, &prompt())).is_err());
            assert!(block_on(generate_structured::<Answer, _>(&model, &prompt())).is_err());
        });

        assert_eq!(counter(&snapshotter, "genai_requests_total"), 3);
        assert_eq!(counter(&snapshotter, "genai_failures_total"), 2);
    }

    #[tokio::test]
    async fn test_arc_model_delegates() {
        let model = Arc::new(ScriptedModel::new());
        model.push_response(json!({"value": 1}));

        let answer: Answer = generate_structured(&model, &prompt()).await.unwrap();
        assert_eq!(answer.value, 1);
        assert_eq!(model.call_count(), 1);
    }
}
