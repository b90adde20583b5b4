//! Dashboard configuration
//!
//! Layered from an optional config file (`roadwise.toml` by default, or the
//! path in `ROADWISE_CONFIG_FILE`) and `ROADWISE_*` environment variables,
//! with `__` separating nested keys (`ROADWISE_POLICY__KIND=model`).

use crate::DashboardError;
use ::config::builder::DefaultState;
use ::config::{Config, ConfigBuilder, Environment, File};
use alert_policy::ThresholdTable;
use genai_client::GenAiConfig;
use serde::{Deserialize, Serialize};
use simulation::SimulationConfig;

/// Config file looked up when `ROADWISE_CONFIG_FILE` is unset (any supported extension)
const DEFAULT_CONFIG_FILE: &str = "roadwise";

/// Which alert policy drives the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    /// Deterministic threshold table
    #[default]
    Threshold,
    /// Hosted generative model
    Model,
}

/// Alert policy settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicySettings {
    pub kind: PolicyKind,
    pub thresholds: ThresholdTable,
    /// Ignore results from evaluations older than the last applied one.
    /// Off by default: results apply in the order they resolve.
    pub drop_stale_results: bool,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Top-level dashboard configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Simulation step per loop iteration (ms)
    pub tick_ms: u64,
    /// Stop after this much simulated time (ms); None runs until Ctrl-C
    pub run_for_ms: Option<u64>,
    /// Road conditions summary period (ms); None disables summaries
    pub summary_interval_ms: Option<u64>,
    /// How long to wait for in-flight calls once the run time elapses (ms)
    pub drain_timeout_ms: u64,
    /// Log format
    pub log_format: LogFormat,
    /// Default log filter when `RUST_LOG` is unset
    pub log_level: String,
    pub simulation: SimulationConfig,
    pub policy: PolicySettings,
    pub genai: GenAiConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            tick_ms: 250,
            run_for_ms: None,
            summary_interval_ms: None,
            drain_timeout_ms: 10_000,
            log_format: LogFormat::Pretty,
            log_level: "info".to_string(),
            simulation: SimulationConfig::default(),
            policy: PolicySettings::default(),
            genai: GenAiConfig::default(),
        }
    }
}

impl DashboardConfig {
    /// Load from the config file and environment, then validate
    pub fn load() -> Result<Self, DashboardError> {
        let path = std::env::var("ROADWISE_CONFIG_FILE")
            .unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());

        let builder = Config::builder()
            .add_source(File::with_name(&path).required(false))
            .add_source(
                Environment::with_prefix("ROADWISE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let mut config = Self::from_builder(builder)?;

        if !config.genai.has_api_key() {
            config.genai.api_key = std::env::var("GEMINI_API_KEY")
                .or_else(|_| std::env::var("GOOGLE_API_KEY"))
                .ok();
        }

        config.validate()?;
        Ok(config)
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, DashboardError> {
        Ok(builder.build()?.try_deserialize()?)
    }

    /// Whether any component needs the hosted model
    pub fn needs_model(&self) -> bool {
        self.policy.kind == PolicyKind::Model || self.summary_interval_ms.is_some()
    }

    /// Check values the loop depends on
    pub fn validate(&self) -> Result<(), DashboardError> {
        if self.tick_ms == 0 {
            return Err(DashboardError::InvalidConfig("tick_ms must be > 0".to_string()));
        }
        if self.summary_interval_ms == Some(0) {
            return Err(DashboardError::InvalidConfig(
                "summary_interval_ms must be > 0".to_string(),
            ));
        }
        self.policy
            .thresholds
            .validate()
            .map_err(|e| DashboardError::InvalidConfig(format!("policy.thresholds: {e}")))?;
        self.simulation.validate()?;
        Ok(())
    }
}
