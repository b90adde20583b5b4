//! Mock hazard map

use hazard_model::{DetectedAt, GeoPoint, HazardRecord, HazardType, Severity};
use serde::{Deserialize, Serialize};

/// Hazard markers plus the initial map view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HazardMap {
    pub center: GeoPoint,
    pub zoom: u8,
    pub hazards: Vec<HazardRecord>,
}

impl HazardMap {
    /// The fixed demo map over Madhya Pradesh and Rajasthan
    pub fn demo() -> Self {
        let hazard = |id, hazard_type, lat, lon, severity, ago: &str| {
            HazardRecord::new(
                id,
                hazard_type,
                GeoPoint { lat, lon },
                severity,
                DetectedAt::Relative(ago.to_string()),
            )
        };

        Self {
            center: GeoPoint { lat: 23.8, lon: 78.5 },
            zoom: 7,
            hazards: vec![
                hazard(1, HazardType::Pothole, 23.2599, 77.4126, Severity::High, "2 mins ago"),
                hazard(2, HazardType::SpeedBreaker, 23.1793, 75.7849, Severity::Medium, "5 mins ago"),
                hazard(3, HazardType::Debris, 22.7196, 75.8577, Severity::Low, "10 mins ago"),
                hazard(4, HazardType::Pothole, 24.5854, 73.7125, Severity::Medium, "1 hour ago"),
            ],
        }
    }

    /// Look up a marker by id
    pub fn get(&self, id: u32) -> Option<&HazardRecord> {
        self.hazards.iter().find(|h| h.id == id)
    }

    /// Markers at or above a severity
    pub fn at_least(&self, severity: Severity) -> impl Iterator<Item = &HazardRecord> {
        self.hazards.iter().filter(move |h| h.severity >= severity)
    }
}

impl Default for HazardMap {
    fn default() -> Self {
        Self::demo()
    }
}
