//! Drive Simulation
//!
//! Simulated inputs for the live detection dashboard:
//! - Speed drift every 2 s, clamped to [0, 120] km/h
//! - GPS jitter every 5 s
//! - Rotating mock hazard detections every 1.5 s
//! - Voice alert window raised when detections appear
//!
//! All timers advance from a single `Simulator::tick`, so a seeded run is
//! fully reproducible.

pub mod config;
pub mod detection;
pub mod map;
mod simulator;

pub use config::SimulationConfig;
pub use detection::{BoundingBox, Detection};
pub use map::HazardMap;
pub use simulator::{SimulationState, Simulator, TickReport};

use thiserror::Error;

/// Simulation error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulationError {
    #[error("Invalid simulation config: {0}")]
    InvalidConfig(String),
}
