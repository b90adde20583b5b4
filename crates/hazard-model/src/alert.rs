//! Speed samples and alert decisions

use crate::HazardModelError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Upper bound the dashboard simulation clamps speed to (km/h)
pub const MAX_SIMULATED_SPEED_KMH: f64 = 120.0;

/// Alert level communicated to the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertLevel {
    Low,
    Medium,
    High,
}

impl AlertLevel {
    /// Wire representation (`LOW`, `MEDIUM`, `HIGH`)
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertLevel::Low => "LOW",
            AlertLevel::Medium => "MEDIUM",
            AlertLevel::High => "HIGH",
        }
    }
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertLevel {
    type Err = HazardModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LOW" => Ok(AlertLevel::Low),
            "MEDIUM" => Ok(AlertLevel::Medium),
            "HIGH" => Ok(AlertLevel::High),
            _ => Err(HazardModelError::UnknownAlertLevel(s.to_string())),
        }
    }
}

/// Recommended alert radius and level for the current speed.
///
/// Deserializing applies the same checks as [`AlertDecision::new`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawAlertDecision")]
pub struct AlertDecision {
    /// Alert distance in meters (always positive)
    #[serde(rename = "alertDistanceMeters")]
    pub distance_m: f64,
    /// Alert level
    #[serde(rename = "alertLevel")]
    pub level: AlertLevel,
}

impl AlertDecision {
    /// Create a decision, rejecting non-positive or non-finite distances
    pub fn new(distance_m: f64, level: AlertLevel) -> Result<Self, HazardModelError> {
        if !distance_m.is_finite() || distance_m <= 0.0 {
            return Err(HazardModelError::InvalidDistance(distance_m));
        }
        Ok(Self { distance_m, level })
    }

    /// Distance rounded to whole meters, as shown on the dashboard.
    /// Distances beyond `u32::MAX` meters saturate at `u32::MAX`.
    pub fn rounded_distance_m(&self) -> u32 {
        let rounded = self.distance_m.round();
        if rounded >= f64::from(u32::MAX) {
            u32::MAX
        } else {
            rounded as u32
        }
    }
}

#[derive(Deserialize)]
struct RawAlertDecision {
    #[serde(rename = "alertDistanceMeters")]
    distance_m: f64,
    #[serde(rename = "alertLevel")]
    level: AlertLevel,
}

impl TryFrom<RawAlertDecision> for AlertDecision {
    type Error = HazardModelError;

    fn try_from(raw: RawAlertDecision) -> Result<Self, Self::Error> {
        Self::new(raw.distance_m, raw.level)
    }
}

/// Vehicle speed in km/h (non-negative, finite)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct SpeedSample(f64);

impl SpeedSample {
    /// Create a speed sample, rejecting negative or non-finite values
    pub fn new(kmh: f64) -> Result<Self, HazardModelError> {
        if !kmh.is_finite() || kmh < 0.0 {
            return Err(HazardModelError::InvalidSpeed(kmh));
        }
        Ok(Self(kmh))
    }

    /// Clamp an arbitrary value into `[0, max_kmh]`; NaN maps to zero
    pub fn clamped(kmh: f64, max_kmh: f64) -> Self {
        if kmh.is_nan() {
            return Self(0.0);
        }
        Self(kmh.clamp(0.0, max_kmh.max(0.0)))
    }

    /// Speed in km/h
    pub fn kmh(&self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for SpeedSample {
    type Error = HazardModelError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SpeedSample> for f64 {
    fn from(sample: SpeedSample) -> Self {
        sample.0
    }
}

impl fmt::Display for SpeedSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} km/h", self.0)
    }
}
