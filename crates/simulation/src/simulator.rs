//! Simulator Implementation

use crate::{Detection, SimulationConfig, SimulationError};
use hazard_model::{GeoPoint, SpeedSample};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info};

/// Observable dashboard state
#[derive(Debug, Clone, Serialize)]
pub struct SimulationState {
    /// Simulated time since start (ms)
    pub elapsed_ms: u64,
    /// Current speed
    pub speed: SpeedSample,
    /// Current GPS position
    pub location: GeoPoint,
    /// Detections on the camera feed
    pub detections: Vec<Detection>,
    /// Voice alert end time, while one is active
    pub voice_alert_until_ms: Option<u64>,
}

impl SimulationState {
    pub fn voice_alert_active(&self) -> bool {
        self.voice_alert_until_ms.is_some()
    }
}

/// What changed during a tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub speed_changed: bool,
    pub location_changed: bool,
    pub detections_changed: bool,
    pub voice_alert_started: bool,
    pub voice_alert_ended: bool,
}

impl TickReport {
    pub fn any(&self) -> bool {
        self.speed_changed
            || self.location_changed
            || self.detections_changed
            || self.voice_alert_started
            || self.voice_alert_ended
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerKind {
    Speed,
    Gps,
    Detections,
}

#[derive(Debug, Clone)]
struct Timer {
    kind: TimerKind,
    interval_ms: u64,
    next_due_ms: u64,
}

impl Timer {
    fn new(kind: TimerKind, interval_ms: u64) -> Self {
        Self {
            kind,
            interval_ms,
            next_due_ms: interval_ms,
        }
    }
}

/// Drive simulator advanced by explicit ticks.
///
/// Timers due within one tick fire in time order; timers due at the same
/// instant fire in the order speed, GPS, detections.
pub struct Simulator {
    config: SimulationConfig,
    state: SimulationState,
    timers: [Timer; 3],
    rng: StdRng,
}

impl Simulator {
    /// Create a new simulator
    pub fn new(config: SimulationConfig) -> Result<Self, SimulationError> {
        config.validate()?;

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        info!("Creating simulator with config: {:?}", config);

        let state = SimulationState {
            elapsed_ms: 0,
            speed: SpeedSample::clamped(config.initial_speed_kmh, config.max_speed_kmh),
            location: config.initial_location,
            detections: Vec::new(),
            voice_alert_until_ms: None,
        };

        let timers = [
            Timer::new(TimerKind::Speed, config.speed_interval_ms),
            Timer::new(TimerKind::Gps, config.gps_interval_ms),
            Timer::new(TimerKind::Detections, config.detection_interval_ms),
        ];

        Ok(Self {
            config,
            state,
            timers,
            rng,
        })
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Advance simulated time by `dt_ms`
    pub fn tick(&mut self, dt_ms: u64) -> TickReport {
        let mut report = TickReport::default();
        let target = self.state.elapsed_ms.saturating_add(dt_ms);

        loop {
            let next = self
                .timers
                .iter()
                .enumerate()
                .filter(|(_, t)| t.next_due_ms <= target)
                .min_by_key(|(i, t)| (t.next_due_ms, *i))
                .map(|(i, _)| i);

            let Some(index) = next else { break };

            let due = self.timers[index].next_due_ms;
            self.state.elapsed_ms = due;
            self.expire_voice_alert(&mut report);

            let kind = self.timers[index].kind;
            match kind {
                TimerKind::Speed => report.speed_changed |= self.update_speed(),
                TimerKind::Gps => report.location_changed |= self.update_location(),
                TimerKind::Detections => {
                    report.detections_changed |= self.rotate_detections();
                    if !self.state.detections.is_empty() && !self.state.voice_alert_active() {
                        self.state.voice_alert_until_ms = Some(due + self.config.voice_alert_ms);
                        report.voice_alert_started = true;
                        debug!(until_ms = due + self.config.voice_alert_ms, "Voice alert active");
                    }
                }
            }

            let timer = &mut self.timers[index];
            timer.next_due_ms = timer.next_due_ms.saturating_add(timer.interval_ms);
        }

        self.state.elapsed_ms = target;
        self.expire_voice_alert(&mut report);
        report
    }

    fn expire_voice_alert(&mut self, report: &mut TickReport) {
        if let Some(until) = self.state.voice_alert_until_ms {
            if self.state.elapsed_ms >= until {
                self.state.voice_alert_until_ms = None;
                report.voice_alert_ended = true;
            }
        }
    }

    fn update_speed(&mut self) -> bool {
        let step = self.config.max_speed_step_kmh;
        let change = if step > 0.0 {
            self.rng.gen_range(-step..step)
        } else {
            0.0
        };

        let previous = self.state.speed;
        self.state.speed = SpeedSample::clamped(previous.kmh() + change, self.config.max_speed_kmh);
        debug!(speed_kmh = self.state.speed.kmh(), "Speed updated");
        self.state.speed != previous
    }

    fn update_location(&mut self) -> bool {
        let jitter = self.config.gps_jitter_deg;
        let dlat = (self.rng.gen::<f64>() - 0.5) * jitter;
        let dlon = (self.rng.gen::<f64>() - 0.5) * jitter;

        let previous = self.state.location;
        self.state.location = previous.offset(dlat, dlon);
        self.state.location != previous
    }

    fn rotate_detections(&mut self) -> bool {
        let keep = self.config.detection_keep_probability;
        let spawn = self.config.detection_spawn_probability;
        let rng = &mut self.rng;

        let before: Vec<_> = self.state.detections.iter().map(|d| d.id).collect();

        self.state.detections.retain(|_| rng.gen::<f64>() < keep);
        if rng.gen::<f64>() < spawn {
            self.state.detections.push(Detection::random(rng));
        }
        self.state.detections.truncate(self.config.max_detections);

        let changed = self.state.detections.len() != before.len()
            || self.state.detections.iter().zip(&before).any(|(d, id)| d.id != *id);
        if changed {
            debug!(count = self.state.detections.len(), "Detections rotated");
        }
        changed
    }
}
