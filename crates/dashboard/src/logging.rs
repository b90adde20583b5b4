//! Tracing subscriber setup

use crate::{DashboardError, LogFormat};
use tracing_subscriber::EnvFilter;

/// Initialize logging. `RUST_LOG` overrides `default_level` when set.
pub fn init_logging(format: LogFormat, default_level: &str) -> Result<(), DashboardError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| DashboardError::Logging(e.to_string()))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let result = match format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    result.map_err(|e| DashboardError::Logging(e.to_string()))
}
