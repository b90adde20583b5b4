//! GPS coordinates

use crate::HazardModelError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A latitude/longitude pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    /// Create a point, checking both axes are finite and in range
    pub fn new(lat: f64, lon: f64) -> Result<Self, HazardModelError> {
        check_axis("latitude", lat, 90.0)?;
        check_axis("longitude", lon, 180.0)?;
        Ok(Self { lat, lon })
    }

    /// Shift the point by the given deltas, keeping it inside valid bounds
    pub fn offset(&self, dlat: f64, dlon: f64) -> Self {
        Self {
            lat: (self.lat + dlat).clamp(-90.0, 90.0),
            lon: (self.lon + dlon).clamp(-180.0, 180.0),
        }
    }
}

fn check_axis(axis: &'static str, value: f64, bound: f64) -> Result<(), HazardModelError> {
    if !value.is_finite() || value < -bound || value > bound {
        return Err(HazardModelError::CoordinateOutOfRange {
            axis,
            value,
            min: -bound,
            max: bound,
        });
    }
    Ok(())
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.lat, self.lon)
    }
}
