//! Road conditions summarizer

use async_trait::async_trait;
use genai_client::{generate_structured, schema, ExternalServiceError, GenerativeModel, StructuredPrompt};
use hazard_model::{AlertLevel, GeoPoint, HazardRecord};
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use tracing::{debug, info};

/// Prompt name sent with every summary request
pub const SUMMARIZE_ROAD_CONDITIONS_PROMPT: &str = "summarizeRoadConditionsPrompt";

/// Input to a road conditions summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadConditionsRequest {
    /// Detected hazards, passed through unfiltered
    pub hazards: Vec<HazardRecord>,
    /// Driver's current position
    pub current_location: GeoPoint,
    /// Alert radius (m)
    #[serde(rename = "alertDistance")]
    pub alert_distance_m: f64,
    /// Driver's current speed (km/h)
    #[serde(rename = "speed")]
    pub speed_kmh: f64,
}

impl RoadConditionsRequest {
    fn validate(&self) -> Result<(), ExternalServiceError> {
        if !self.alert_distance_m.is_finite() {
            return Err(ExternalServiceError::InvalidInput(format!(
                "alertDistance must be a finite number, got {}",
                self.alert_distance_m
            )));
        }
        if !self.speed_kmh.is_finite() {
            return Err(ExternalServiceError::InvalidInput(format!(
                "speed must be a finite number, got {}",
                self.speed_kmh
            )));
        }
        Ok(())
    }
}

/// Model answer: free-text summary and alert level label.
///
/// Deserializing rejects a blank summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawRoadConditionsSummary")]
pub struct RoadConditionsSummary {
    pub summary: String,
    pub alert_level: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRoadConditionsSummary {
    summary: String,
    alert_level: String,
}

impl TryFrom<RawRoadConditionsSummary> for RoadConditionsSummary {
    type Error = String;

    fn try_from(raw: RawRoadConditionsSummary) -> Result<Self, Self::Error> {
        if raw.summary.trim().is_empty() {
            return Err("summary must not be empty".to_string());
        }
        Ok(Self {
            summary: raw.summary,
            alert_level: raw.alert_level,
        })
    }
}

impl RoadConditionsSummary {
    /// The alert level label as a tier, if it names one
    pub fn level(&self) -> Option<AlertLevel> {
        self.alert_level.parse().ok()
    }
}

/// Render the summary prompt
pub fn summarize_road_conditions_prompt(request: &RoadConditionsRequest) -> StructuredPrompt {
    let mut text = format!(
        "You are a road safety assistant that provides drivers with summarized reports of \
         potential road hazards ahead.\n\
         \n\
         Based on the following detected hazards within a {} meter radius of the driver's \
         current location at {}, and the driver's current speed of {} km/h, create a summary \
         of the road conditions ahead and determine the appropriate alert level.\n\
         \n\
         Hazards:\n",
        request.alert_distance_m, request.current_location, request.speed_kmh
    );

    for hazard in &request.hazards {
        // Writing to a String cannot fail
        let _ = writeln!(
            text,
            "- Type: {}, Location: {}, Severity: {}, Time Detected: {}",
            hazard.hazard_type, hazard.location, hazard.severity, hazard.detected_at
        );
    }
    text.push_str("\nSummary:\nAlert Level:");

    let response_schema = schema::object(&[
        (
            "summary",
            schema::string(
                "A summary of the road conditions ahead, including potential hazards and their severity.",
            ),
        ),
        (
            "alertLevel",
            schema::string("The level of alert needed (e.g., low, medium, high) based on the hazards ahead."),
        ),
    ]);

    StructuredPrompt::new(SUMMARIZE_ROAD_CONDITIONS_PROMPT, text, response_schema)
}

/// Produces road condition summaries
#[async_trait]
pub trait HazardSummarizer: Send + Sync {
    async fn summarize(
        &self,
        request: &RoadConditionsRequest,
    ) -> Result<RoadConditionsSummary, ExternalServiceError>;
}

/// Summarizer backed by a generative model
pub struct ModelSummarizer<M> {
    model: M,
}

impl<M: GenerativeModel> ModelSummarizer<M> {
    pub fn new(model: M) -> Self {
        info!("Creating model-backed road summarizer");
        Self { model }
    }

    pub fn model(&self) -> &M {
        &self.model
    }
}

#[async_trait]
impl<M: GenerativeModel> HazardSummarizer for ModelSummarizer<M> {
    async fn summarize(
        &self,
        request: &RoadConditionsRequest,
    ) -> Result<RoadConditionsSummary, ExternalServiceError> {
        request.validate()?;

        let prompt = summarize_road_conditions_prompt(request);
        let summary: RoadConditionsSummary = generate_structured(&self.model, &prompt).await?;

        debug!(
            hazards = request.hazards.len(),
            alert_level = %summary.alert_level,
            "Road conditions summarized"
        );
        Ok(summary)
    }
}
