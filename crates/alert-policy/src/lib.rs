//! Alert Policy Evaluation
//!
//! Maps vehicle speed to an alert distance and level:
//! - `ThresholdPolicy`: deterministic three-band table
//! - `ModelPolicy`: delegates the decision to a hosted generative model
//! - `AlertDisplay`: keeps the last good decision across failed or stale calls

mod display;
mod model;
mod threshold;

pub use display::{AlertDisplay, Outcome, Ticket};
pub use model::{adaptive_alert_distance_prompt, ModelPolicy, ADAPTIVE_ALERT_DISTANCE_PROMPT};
pub use threshold::{ThresholdPolicy, ThresholdTable};

pub use genai_client::ExternalServiceError;
pub use hazard_model::{AlertDecision, AlertLevel};

use async_trait::async_trait;
use std::sync::Arc;

/// Speed-to-alert policy
#[async_trait]
pub trait AlertPolicy: Send + Sync {
    /// Short name for logging
    fn name(&self) -> &'static str;

    /// Evaluate the alert decision for a speed in km/h
    async fn evaluate(&self, speed_kmh: f64) -> Result<AlertDecision, ExternalServiceError>;
}

#[async_trait]
impl<P: AlertPolicy + ?Sized> AlertPolicy for Arc<P> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    async fn evaluate(&self, speed_kmh: f64) -> Result<AlertDecision, ExternalServiceError> {
        (**self).evaluate(speed_kmh).await
    }
}
