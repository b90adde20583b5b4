//! Displayed alert state

use crate::ExternalServiceError;
use hazard_model::{AlertDecision, AlertLevel};
use serde::Serialize;
use tracing::debug;

/// Identifies one evaluation request, in issue order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// What happened to a completed evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// New values are now displayed
    Applied,
    /// Evaluation failed; previous values kept
    Retained,
    /// A newer request already landed; result dropped (only with stale drop enabled)
    Stale,
}

/// The alert distance and level currently shown to the driver.
///
/// Starts at 150 m / MEDIUM. Failed evaluations leave the values alone.
/// Successful results are applied in the order they resolve, so a slow
/// older request can overwrite a newer one. With stale drop enabled, a
/// result is only applied if no later-issued request has been applied.
#[derive(Debug, Clone, Serialize)]
pub struct AlertDisplay {
    distance_m: u32,
    level: AlertLevel,
    #[serde(skip)]
    drop_stale: bool,
    #[serde(skip)]
    next_ticket: u64,
    #[serde(skip)]
    last_applied: Option<Ticket>,
}

impl Default for AlertDisplay {
    fn default() -> Self {
        Self::new(150, AlertLevel::Medium)
    }
}

impl AlertDisplay {
    pub fn new(distance_m: u32, level: AlertLevel) -> Self {
        Self {
            distance_m,
            level,
            drop_stale: false,
            next_ticket: 0,
            last_applied: None,
        }
    }

    /// Discard results from requests older than the last applied one
    pub fn with_stale_drop(mut self, enabled: bool) -> Self {
        self.drop_stale = enabled;
        self
    }

    /// Displayed distance (whole meters)
    pub fn distance_m(&self) -> u32 {
        self.distance_m
    }

    /// Displayed level
    pub fn level(&self) -> AlertLevel {
        self.level
    }

    /// Register a new request
    pub fn begin(&mut self) -> Ticket {
        let ticket = Ticket(self.next_ticket);
        self.next_ticket += 1;
        ticket
    }

    /// Record the result of a request issued with `ticket`
    pub fn complete(
        &mut self,
        ticket: Ticket,
        result: Result<AlertDecision, ExternalServiceError>,
    ) -> Outcome {
        let decision = match result {
            Ok(decision) => decision,
            Err(e) => {
                debug!(ticket = ticket.id(), error = %e, "Keeping previous alert settings");
                return Outcome::Retained;
            }
        };

        if self.drop_stale && self.last_applied.map_or(false, |last| ticket < last) {
            debug!(ticket = ticket.id(), "Dropping stale alert decision");
            return Outcome::Stale;
        }

        self.distance_m = decision.rounded_distance_m();
        self.level = decision.level;
        self.last_applied = Some(ticket);
        Outcome::Applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AlertPolicy, ModelPolicy};
    use genai_client::ScriptedModel;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tracing::span::{Attributes, Id, Record};
    use tracing::{Event, Level, Metadata};

    /// Counts WARN events
    struct WarnCounter(Arc<AtomicUsize>);

    impl tracing::Subscriber for WarnCounter {
        fn enabled(&self, _: &Metadata<'_>) -> bool {
            true
        }
        fn new_span(&self, _: &Attributes<'_>) -> Id {
            Id::from_u64(1)
        }
        fn record(&self, _: &Id, _: &Record<'_>) {}
        fn record_follows_from(&self, _: &Id, _: &Id) {}
        fn event(&self, event: &Event<'_>) {
            if *event.metadata().level() == Level::WARN {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
        fn enter(&self, _: &Id) {}
        fn exit(&self, _: &Id) {}
    }

    fn decision(distance_m: f64, level: AlertLevel) -> AlertDecision {
        AlertDecision::new(distance_m, level).unwrap()
    }

    #[test]
    fn test_initial_values() {
        let display = AlertDisplay::default();
        assert_eq!(display.distance_m(), 150);
        assert_eq!(display.level(), AlertLevel::Medium);
    }

    #[test]
    fn test_apply_rounds_distance() {
        let mut display = AlertDisplay::default();
        let t = display.begin();
        assert_eq!(display.complete(t, Ok(decision(249.7, AlertLevel::High))), Outcome::Applied);
        assert_eq!(display.distance_m(), 250);
        assert_eq!(display.level(), AlertLevel::High);
    }

    #[test]
    fn test_failure_retains_previous() {
        let mut display = AlertDisplay::default();
        let t1 = display.begin();
        display.complete(t1, Ok(decision(75.0, AlertLevel::Low)));

        let t2 = display.begin();
        let outcome = display.complete(t2, Err(ExternalServiceError::EmptyResponse));
        assert_eq!(outcome, Outcome::Retained);
        assert_eq!(display.distance_m(), 75);
        assert_eq!(display.level(), AlertLevel::Low);
    }

    #[test]
    fn test_model_failure_warns_once() {
        let warnings = Arc::new(AtomicUsize::new(0));
        let subscriber = WarnCounter(Arc::clone(&warnings));
        let policy = ModelPolicy::new(ScriptedModel::new());
        let mut display = AlertDisplay::default();

        let outcome = tracing::subscriber::with_default(subscriber, || {
            let ticket = display.begin();
            let result = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap()
                .block_on(policy.evaluate(55.0));
            display.complete(ticket, result)
        });

        assert_eq!(outcome, Outcome::Retained);
        assert_eq!(warnings.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_last_resolved_wins_by_default() {
        let mut display = AlertDisplay::default();
        let older = display.begin();
        let newer = display.begin();

        assert_eq!(display.complete(newer, Ok(decision(250.0, AlertLevel::High))), Outcome::Applied);
        assert_eq!(display.complete(older, Ok(decision(75.0, AlertLevel::Low))), Outcome::Applied);
        assert_eq!(display.distance_m(), 75);
        assert_eq!(display.level(), AlertLevel::Low);
    }

    #[test]
    fn test_stale_result_dropped_when_enabled() {
        let mut display = AlertDisplay::default().with_stale_drop(true);
        let older = display.begin();
        let newer = display.begin();

        assert_eq!(display.complete(newer, Ok(decision(250.0, AlertLevel::High))), Outcome::Applied);
        assert_eq!(display.complete(older, Ok(decision(75.0, AlertLevel::Low))), Outcome::Stale);
        assert_eq!(display.level(), AlertLevel::High);
    }

    #[test]
    fn test_older_result_applies_if_newer_failed() {
        let mut display = AlertDisplay::default().with_stale_drop(true);
        let older = display.begin();
        let newer = display.begin();

        assert_eq!(
            display.complete(newer, Err(ExternalServiceError::EmptyResponse)),
            Outcome::Retained
        );
        assert_eq!(display.complete(older, Ok(decision(75.0, AlertLevel::Low))), Outcome::Applied);
        assert_eq!(display.level(), AlertLevel::Low);
    }
}
