//! Road hazard records

use crate::{GeoPoint, HazardModelError};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of road anomaly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HazardType {
    Pothole,
    #[serde(rename = "Speed Breaker")]
    SpeedBreaker,
    Debris,
}

impl HazardType {
    /// All hazard types, in display order
    pub const ALL: [HazardType; 3] = [HazardType::Pothole, HazardType::SpeedBreaker, HazardType::Debris];

    /// Human readable name
    pub fn as_str(&self) -> &'static str {
        match self {
            HazardType::Pothole => "Pothole",
            HazardType::SpeedBreaker => "Speed Breaker",
            HazardType::Debris => "Debris",
        }
    }
}

impl fmt::Display for HazardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HazardType {
    type Err = HazardModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "pothole" => Ok(HazardType::Pothole),
            "speedbreaker" => Ok(HazardType::SpeedBreaker),
            "debris" => Ok(HazardType::Debris),
            _ => Err(HazardModelError::UnknownHazardType(s.to_string())),
        }
    }
}

/// Hazard severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = HazardModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            _ => Err(HazardModelError::UnknownSeverity(s.to_string())),
        }
    }
}

/// When a hazard was detected: an absolute timestamp or free text ("2 mins ago")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DetectedAt {
    Timestamp(DateTime<Utc>),
    Relative(String),
}

impl fmt::Display for DetectedAt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetectedAt::Timestamp(ts) => f.write_str(&ts.to_rfc3339_opts(SecondsFormat::Secs, true)),
            DetectedAt::Relative(text) => f.write_str(text),
        }
    }
}

/// A single reported road anomaly
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HazardRecord {
    pub id: u32,
    #[serde(rename = "type")]
    pub hazard_type: HazardType,
    pub location: GeoPoint,
    pub severity: Severity,
    #[serde(rename = "timeDetected")]
    pub detected_at: DetectedAt,
}

impl HazardRecord {
    pub fn new(
        id: u32,
        hazard_type: HazardType,
        location: GeoPoint,
        severity: Severity,
        detected_at: DetectedAt,
    ) -> Self {
        Self {
            id,
            hazard_type,
            location,
            severity,
            detected_at,
        }
    }
}
