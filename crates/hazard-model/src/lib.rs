//! Hazard Model
//!
//! Shared domain types for the RoadWise crates:
//! - Speed samples and alert decisions
//! - Hazard records (type, location, severity, detection time)
//! - GPS coordinates

mod alert;
mod error;
mod geo;
mod hazard;

pub use alert::{AlertDecision, AlertLevel, SpeedSample, MAX_SIMULATED_SPEED_KMH};
pub use error::HazardModelError;
pub use geo::GeoPoint;
pub use hazard::{DetectedAt, HazardRecord, HazardType, Severity};
