//! Model-backed alert policy

use crate::{AlertPolicy, ExternalServiceError};
use async_trait::async_trait;
use genai_client::{generate_structured, schema, GenerativeModel, StructuredPrompt};
use hazard_model::AlertDecision;
use tracing::{debug, info};

/// Prompt name sent with every adaptive alert distance request
pub const ADAPTIVE_ALERT_DISTANCE_PROMPT: &str = "adaptiveAlertDistancePrompt";

/// Render the adaptive alert distance prompt for a speed
pub fn adaptive_alert_distance_prompt(speed_kmh: f64) -> StructuredPrompt {
    let text = format!(
        "You are an expert in road safety and driver assistance systems.\n\
         \n\
         Based on the driver's current speed (in kilometers per hour), you will calculate \
         an appropriate alert distance (in meters) for potential road hazards.\n\
         Also, determine the alert level (LOW, MEDIUM, or HIGH) based on the speed.\n\
         \n\
         Consider the following factors:\n\
         - Higher speeds require greater alert distances to allow sufficient reaction time.\n\
         - Lower speeds require shorter alert distances to avoid unnecessary alerts.\n\
         \n\
         Speed: {speed_kmh} km/h\n\
         \n\
         Respond with the alert distance in meters and the alert level.\n"
    );

    let response_schema = schema::object(&[
        (
            "alertDistanceMeters",
            schema::number("The recommended alert distance in meters, adjusted based on the vehicle speed."),
        ),
        (
            "alertLevel",
            schema::string_enum("The alert level based on the vehicle speed.", &["LOW", "MEDIUM", "HIGH"]),
        ),
    ]);

    StructuredPrompt::new(ADAPTIVE_ALERT_DISTANCE_PROMPT, text, response_schema)
}

/// Alert policy that asks a generative model for the decision
pub struct ModelPolicy<M> {
    model: M,
}

impl<M: GenerativeModel> ModelPolicy<M> {
    pub fn new(model: M) -> Self {
        info!("Creating model-backed alert policy");
        Self { model }
    }

    pub fn model(&self) -> &M {
        &self.model
    }
}

#[async_trait]
impl<M: GenerativeModel> AlertPolicy for ModelPolicy<M> {
    fn name(&self) -> &'static str {
        "model"
    }

    async fn evaluate(&self, speed_kmh: f64) -> Result<AlertDecision, ExternalServiceError> {
        if !speed_kmh.is_finite() {
            return Err(ExternalServiceError::InvalidInput(format!(
                "speedKmH must be a finite number, got {speed_kmh}"
            )));
        }

        let prompt = adaptive_alert_distance_prompt(speed_kmh);
        let decision: AlertDecision = generate_structured(&self.model, &prompt).await?;

        debug!(speed_kmh, level = %decision.level, distance_m = decision.distance_m, "Model decision");
        Ok(decision)
    }
}
