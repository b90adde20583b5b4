//! Dashboard loop

use crate::{DashboardConfig, DashboardError, PolicyKind};
use alert_policy::{AlertDisplay, AlertPolicy, ModelPolicy, Outcome, ThresholdPolicy, Ticket};
use genai_client::{ExternalServiceError, HttpModel};
use hazard_model::AlertDecision;
use road_summary::{HazardSummarizer, ModelSummarizer, RoadConditionsRequest, RoadConditionsSummary};
use serde::Serialize;
use simulation::{HazardMap, SimulationState, Simulator};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Result of an asynchronous call, sent back to the loop
enum Completion {
    Alert(Ticket, Result<AlertDecision, ExternalServiceError>),
    Summary(Result<RoadConditionsSummary, ExternalServiceError>),
}

/// Resolve when `signal` fires. If the signal cannot be installed, the
/// error is logged and the returned future never resolves.
pub async fn shutdown_on<F, E>(signal: F)
where
    F: Future<Output = Result<(), E>>,
    E: std::fmt::Display,
{
    if let Err(e) = signal.await {
        warn!(error = %e, "Unable to listen for shutdown signal; running until the configured run time");
        std::future::pending::<()>().await;
    }
}

/// Counters and final state of a dashboard run
#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport {
    pub ticks: u64,
    pub evaluations_started: u64,
    pub evaluations_applied: u64,
    pub evaluations_retained: u64,
    pub evaluations_stale: u64,
    pub summaries: u64,
    pub summary_failures: u64,
    pub display: AlertDisplay,
    pub final_state: SimulationState,
    pub last_summary: Option<RoadConditionsSummary>,
}

/// Simulated live-detection dashboard
pub struct Dashboard {
    tick_ms: u64,
    run_for_ms: Option<u64>,
    summary_interval_ms: Option<u64>,
    drain_timeout_ms: u64,
    simulator: Simulator,
    policy: Arc<dyn AlertPolicy>,
    summarizer: Option<Arc<dyn HazardSummarizer>>,
    map: HazardMap,
    display: AlertDisplay,
}

impl Dashboard {
    /// Create a dashboard with explicit policy and summarizer
    pub fn new(
        config: &DashboardConfig,
        policy: Arc<dyn AlertPolicy>,
        summarizer: Option<Arc<dyn HazardSummarizer>>,
    ) -> Result<Self, DashboardError> {
        config.validate()?;
        if config.summary_interval_ms.is_some() && summarizer.is_none() {
            return Err(DashboardError::InvalidConfig(
                "summary_interval_ms is set but no summarizer was provided".to_string(),
            ));
        }

        info!(policy = policy.name(), "Creating dashboard");
        Ok(Self {
            tick_ms: config.tick_ms,
            run_for_ms: config.run_for_ms,
            summary_interval_ms: config.summary_interval_ms,
            drain_timeout_ms: config.drain_timeout_ms,
            simulator: Simulator::new(config.simulation.clone())?,
            policy,
            summarizer,
            map: HazardMap::demo(),
            display: AlertDisplay::default().with_stale_drop(config.policy.drop_stale_results),
        })
    }

    /// Create a dashboard wired to the configured policy and model
    pub fn from_config(config: &DashboardConfig) -> Result<Self, DashboardError> {
        let model = if config.needs_model() {
            Some(Arc::new(HttpModel::new(config.genai.clone())?))
        } else {
            None
        };

        let policy: Arc<dyn AlertPolicy> = match (config.policy.kind, &model) {
            (PolicyKind::Model, Some(model)) => Arc::new(ModelPolicy::new(Arc::clone(model))),
            _ => Arc::new(ThresholdPolicy::new(config.policy.thresholds.clone())),
        };

        let summarizer: Option<Arc<dyn HazardSummarizer>> = match (config.summary_interval_ms, model) {
            (Some(_), Some(model)) => Some(Arc::new(ModelSummarizer::new(model))),
            _ => None,
        };

        Self::new(config, policy, summarizer)
    }

    /// Run until `shutdown` resolves or the configured run time elapses.
    ///
    /// When the run time elapses, in-flight calls are awaited and applied
    /// for up to `drain_timeout_ms`; anything still pending after that is
    /// abandoned. On shutdown they are abandoned immediately.
    pub async fn run<F>(mut self, shutdown: F) -> Result<DashboardReport, DashboardError>
    where
        F: Future<Output = ()>,
    {
        let (tx, mut rx) = mpsc::channel::<Completion>(64);
        let mut report = DashboardReport {
            ticks: 0,
            evaluations_started: 0,
            evaluations_applied: 0,
            evaluations_retained: 0,
            evaluations_stale: 0,
            summaries: 0,
            summary_failures: 0,
            display: self.display.clone(),
            final_state: self.simulator.state().clone(),
            last_summary: None,
        };

        let mut ticker = tokio::time::interval(Duration::from_millis(self.tick_ms));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut next_summary_ms = self.summary_interval_ms;

        info!(tick_ms = self.tick_ms, run_for_ms = ?self.run_for_ms, "Dashboard started");

        // Evaluate the starting speed before the first change
        self.spawn_evaluation(&tx, &mut report);

        tokio::pin!(shutdown);
        let drain = loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested");
                    break false;
                }
                _ = ticker.tick() => {
                    let changes = self.simulator.tick(self.tick_ms);
                    report.ticks += 1;

                    if changes.speed_changed {
                        self.spawn_evaluation(&tx, &mut report);
                    }
                    if changes.voice_alert_started {
                        info!("Voice alert: hazard detected ahead!");
                    }

                    let elapsed = self.simulator.state().elapsed_ms;
                    if let Some(due) = next_summary_ms {
                        if elapsed >= due {
                            self.spawn_summary(&tx);
                            next_summary_ms = self.summary_interval_ms.map(|i| due + i);
                        }
                    }

                    if changes.any() {
                        self.log_state();
                    }

                    if self.run_for_ms.map_or(false, |limit| elapsed >= limit) {
                        info!(elapsed_ms = elapsed, "Run time elapsed");
                        break true;
                    }
                }
                Some(done) = rx.recv() => self.apply(done, &mut report),
            }
        };

        if drain {
            drop(tx);
            let drained = tokio::time::timeout(Duration::from_millis(self.drain_timeout_ms), async {
                while let Some(done) = rx.recv().await {
                    self.apply(done, &mut report);
                }
            })
            .await;
            if drained.is_err() {
                warn!(timeout_ms = self.drain_timeout_ms, "Abandoning in-flight calls");
            }
        }

        report.display = self.display.clone();
        report.final_state = self.simulator.state().clone();
        info!(
            ticks = report.ticks,
            applied = report.evaluations_applied,
            retained = report.evaluations_retained,
            stale = report.evaluations_stale,
            "Dashboard stopped"
        );
        Ok(report)
    }

    fn spawn_evaluation(&mut self, tx: &mpsc::Sender<Completion>, report: &mut DashboardReport) {
        let ticket = self.display.begin();
        let speed_kmh = self.simulator.state().speed.kmh();
        let policy = Arc::clone(&self.policy);
        let tx = tx.clone();
        report.evaluations_started += 1;

        debug!(ticket = ticket.id(), speed_kmh, "Evaluating alert policy");
        tokio::spawn(async move {
            let result = policy.evaluate(speed_kmh).await;
            let _ = tx.send(Completion::Alert(ticket, result)).await;
        });
    }

    fn spawn_summary(&self, tx: &mpsc::Sender<Completion>) {
        let Some(summarizer) = self.summarizer.as_ref().map(Arc::clone) else {
            return;
        };

        let state = self.simulator.state();
        let request = RoadConditionsRequest {
            hazards: self.map.hazards.clone(),
            current_location: state.location,
            alert_distance_m: f64::from(self.display.distance_m()),
            speed_kmh: state.speed.kmh(),
        };
        let tx = tx.clone();

        debug!(hazards = request.hazards.len(), "Requesting road conditions summary");
        tokio::spawn(async move {
            let result = summarizer.summarize(&request).await;
            let _ = tx.send(Completion::Summary(result)).await;
        });
    }

    fn apply(&mut self, done: Completion, report: &mut DashboardReport) {
        match done {
            Completion::Alert(ticket, result) => match self.display.complete(ticket, result) {
                Outcome::Applied => {
                    report.evaluations_applied += 1;
                    info!(
                        alert_distance_m = self.display.distance_m(),
                        alert_level = %self.display.level(),
                        "Alert settings updated"
                    );
                }
                Outcome::Retained => report.evaluations_retained += 1,
                Outcome::Stale => report.evaluations_stale += 1,
            },
            Completion::Summary(Ok(summary)) => {
                report.summaries += 1;
                info!(alert_level = %summary.alert_level, summary = %summary.summary, "Road conditions");
                report.last_summary = Some(summary);
            }
            Completion::Summary(Err(e)) => {
                report.summary_failures += 1;
                warn!(error = %e, "Failed to summarize road conditions");
            }
        }
    }

    fn log_state(&self) {
        let state = self.simulator.state();
        info!(
            elapsed_ms = state.elapsed_ms,
            speed = %state.speed,
            gps = %state.location,
            detections = state.detections.len(),
            alert_distance_m = self.display.distance_m(),
            alert_level = %self.display.level(),
            voice_alert = state.voice_alert_active(),
            "Dashboard"
        );
        for detection in &state.detections {
            debug!(id = %detection.id, "{}", detection);
        }
    }
}
