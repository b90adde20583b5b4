//! Validation Error Types

use thiserror::Error;

/// Errors raised when constructing domain values
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HazardModelError {
    /// Speed is negative or not a finite number
    #[error("Invalid speed: {0} km/h")]
    InvalidSpeed(f64),

    /// Coordinate component out of range
    #[error("{axis} value {value} is out of range [{min}, {max}]")]
    CoordinateOutOfRange {
        axis: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// Alert distance is not a positive finite number
    #[error("Invalid alert distance: {0} m")]
    InvalidDistance(f64),

    /// Unrecognized hazard type name
    #[error("Unknown hazard type: {0}")]
    UnknownHazardType(String),

    /// Unrecognized severity name
    #[error("Unknown severity: {0}")]
    UnknownSeverity(String),

    /// Unrecognized alert level name
    #[error("Unknown alert level: {0}")]
    UnknownAlertLevel(String),
}
