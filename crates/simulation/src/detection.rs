//! Mock camera-feed detections

use hazard_model::HazardType;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Box position and size, as percentages of the frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub top_pct: f64,
    pub left_pct: f64,
    pub width_pct: f64,
    pub height_pct: f64,
}

/// A simulated hazard hit on the camera feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub id: Uuid,
    pub hazard_type: HazardType,
    /// Detector confidence in [0.7, 0.99)
    pub confidence: f64,
    pub bbox: BoundingBox,
}

impl Detection {
    /// Random detection somewhere in the central part of the frame
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let hazard_type = HazardType::ALL[rng.gen_range(0..HazardType::ALL.len())];
        Self {
            id: uuid::Builder::from_random_bytes(rng.gen()).into_uuid(),
            hazard_type,
            confidence: rng.gen_range(0.7..0.99),
            bbox: BoundingBox {
                top_pct: rng.gen_range(20.0..80.0),
                left_pct: rng.gen_range(20.0..80.0),
                width_pct: rng.gen_range(10.0..25.0),
                height_pct: rng.gen_range(5.0..15.0),
            },
        }
    }
}

impl fmt::Display for Detection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:.1}%", self.hazard_type, self.confidence * 100.0)
    }
}
