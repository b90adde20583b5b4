//! RoadWise Dashboard
//!
//! Drives the simulated live-detection dashboard: advances the drive
//! simulation, re-evaluates the alert policy on every speed change, and
//! optionally requests periodic road condition summaries.

pub mod config;
pub mod logging;
mod runner;

pub use crate::config::{DashboardConfig, LogFormat, PolicyKind, PolicySettings};
pub use logging::init_logging;
pub use runner::{shutdown_on, Dashboard, DashboardReport};

use thiserror::Error;

/// Dashboard error types
#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Simulation(#[from] simulation::SimulationError),

    #[error(transparent)]
    Model(#[from] genai_client::ExternalServiceError),

    #[error("Logging setup failed: {0}")]
    Logging(String),
}
