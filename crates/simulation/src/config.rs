//! Simulation configuration

use crate::SimulationError;
use hazard_model::{GeoPoint, MAX_SIMULATED_SPEED_KMH};
use serde::{Deserialize, Serialize};

/// Simulation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// RNG seed; None seeds from OS entropy
    pub seed: Option<u64>,

    /// Speed update interval (ms)
    pub speed_interval_ms: u64,

    /// GPS update interval (ms)
    pub gps_interval_ms: u64,

    /// Detection rotation interval (ms)
    pub detection_interval_ms: u64,

    /// How long a voice alert stays active (ms)
    pub voice_alert_ms: u64,

    /// Starting speed (km/h)
    pub initial_speed_kmh: f64,

    /// Upper speed clamp (km/h)
    pub max_speed_kmh: f64,

    /// Max speed change per update, either direction (km/h)
    pub max_speed_step_kmh: f64,

    /// Starting GPS position
    pub initial_location: GeoPoint,

    /// Full width of the per-update GPS jitter (degrees)
    pub gps_jitter_deg: f64,

    /// Chance an existing detection survives a rotation
    pub detection_keep_probability: f64,

    /// Chance a new detection appears on a rotation
    pub detection_spawn_probability: f64,

    /// Max detections on screen
    pub max_detections: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: None,
            speed_interval_ms: 2000,
            gps_interval_ms: 5000,
            detection_interval_ms: 1500,
            voice_alert_ms: 3000,
            initial_speed_kmh: 60.0,
            max_speed_kmh: MAX_SIMULATED_SPEED_KMH,
            max_speed_step_kmh: 5.0,
            initial_location: GeoPoint {
                lat: 12.9716,
                lon: 77.5946,
            },
            gps_jitter_deg: 0.001,
            detection_keep_probability: 0.7,
            detection_spawn_probability: 0.5,
            max_detections: 3,
        }
    }
}

impl SimulationConfig {
    /// Reject configs that would stall or panic the simulator
    pub fn validate(&self) -> Result<(), SimulationError> {
        let intervals = [
            ("speed_interval_ms", self.speed_interval_ms),
            ("gps_interval_ms", self.gps_interval_ms),
            ("detection_interval_ms", self.detection_interval_ms),
        ];
        for (name, value) in intervals {
            if value == 0 {
                return Err(SimulationError::InvalidConfig(format!("{name} must be > 0")));
            }
        }

        for (name, p) in [
            ("detection_keep_probability", self.detection_keep_probability),
            ("detection_spawn_probability", self.detection_spawn_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(SimulationError::InvalidConfig(format!(
                    "{name} must be within [0, 1], got {p}"
                )));
            }
        }

        if !self.max_speed_kmh.is_finite() || self.max_speed_kmh <= 0.0 {
            return Err(SimulationError::InvalidConfig(format!(
                "max_speed_kmh must be positive, got {}",
                self.max_speed_kmh
            )));
        }
        if !self.max_speed_step_kmh.is_finite() || self.max_speed_step_kmh < 0.0 {
            return Err(SimulationError::InvalidConfig(format!(
                "max_speed_step_kmh must be non-negative, got {}",
                self.max_speed_step_kmh
            )));
        }
        if !self.gps_jitter_deg.is_finite() || self.gps_jitter_deg < 0.0 {
            return Err(SimulationError::InvalidConfig(format!(
                "gps_jitter_deg must be non-negative, got {}",
                self.gps_jitter_deg
            )));
        }

        GeoPoint::new(self.initial_location.lat, self.initial_location.lon)
            .map_err(|e| SimulationError::InvalidConfig(e.to_string()))?;

        Ok(())
    }
}
