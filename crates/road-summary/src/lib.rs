//! Road Condition Summaries
//!
//! Turns a list of hazard records plus the driver's location, speed, and
//! alert radius into a short natural-language report and an alert level.
//! The hazards are passed through as given; no local filtering or ranking.

mod summarizer;

pub use summarizer::{
    summarize_road_conditions_prompt, HazardSummarizer, ModelSummarizer, RoadConditionsRequest,
    RoadConditionsSummary, SUMMARIZE_ROAD_CONDITIONS_PROMPT,
};

pub use genai_client::ExternalServiceError;
