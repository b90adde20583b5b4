//! Deterministic threshold policy

use crate::{AlertPolicy, ExternalServiceError};
use async_trait::async_trait;
use hazard_model::{AlertDecision, AlertLevel, HazardModelError};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Speed bands and the alert distance for each
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdTable {
    /// Speeds strictly above this are HIGH (km/h)
    pub high_above_kmh: f64,
    /// Speeds strictly above this (and not HIGH) are MEDIUM (km/h)
    pub medium_above_kmh: f64,
    /// Alert distance for HIGH (m)
    pub high_distance_m: f64,
    /// Alert distance for MEDIUM (m)
    pub medium_distance_m: f64,
    /// Alert distance for LOW (m)
    pub low_distance_m: f64,
}

impl Default for ThresholdTable {
    fn default() -> Self {
        Self {
            high_above_kmh: 80.0,
            medium_above_kmh: 40.0,
            high_distance_m: 250.0,
            medium_distance_m: 150.0,
            low_distance_m: 75.0,
        }
    }
}

impl ThresholdTable {
    /// Check every distance is positive and the bands are ordered
    pub fn validate(&self) -> Result<(), HazardModelError> {
        for distance in [self.high_distance_m, self.medium_distance_m, self.low_distance_m] {
            if !distance.is_finite() || distance <= 0.0 {
                return Err(HazardModelError::InvalidDistance(distance));
            }
        }
        if !self.medium_above_kmh.is_finite() || self.medium_above_kmh > self.high_above_kmh {
            return Err(HazardModelError::InvalidSpeed(self.medium_above_kmh));
        }
        if !self.high_above_kmh.is_finite() {
            return Err(HazardModelError::InvalidSpeed(self.high_above_kmh));
        }
        Ok(())
    }
}

/// Three-band lookup. Total over all inputs: anything not strictly above
/// the MEDIUM bound (negatives and NaN included) is LOW.
#[derive(Debug, Clone, Default)]
pub struct ThresholdPolicy {
    table: ThresholdTable,
}

impl ThresholdPolicy {
    pub fn new(table: ThresholdTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &ThresholdTable {
        &self.table
    }

    /// Look up the decision for a speed in km/h
    pub fn decide(&self, speed_kmh: f64) -> AlertDecision {
        let t = &self.table;
        if speed_kmh > t.high_above_kmh {
            AlertDecision {
                distance_m: t.high_distance_m,
                level: AlertLevel::High,
            }
        } else if speed_kmh > t.medium_above_kmh {
            AlertDecision {
                distance_m: t.medium_distance_m,
                level: AlertLevel::Medium,
            }
        } else {
            AlertDecision {
                distance_m: t.low_distance_m,
                level: AlertLevel::Low,
            }
        }
    }
}

#[async_trait]
impl AlertPolicy for ThresholdPolicy {
    fn name(&self) -> &'static str {
        "threshold"
    }

    async fn evaluate(&self, speed_kmh: f64) -> Result<AlertDecision, ExternalServiceError> {
        let decision = self.decide(speed_kmh);
        debug!(speed_kmh, level = %decision.level, distance_m = decision.distance_m, "Threshold decision");
        Ok(decision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn decide(speed: f64) -> (f64, AlertLevel) {
        let d = ThresholdPolicy::default().decide(speed);
        (d.distance_m, d.level)
    }

    #[test]
    fn test_scenarios() {
        assert_eq!(decide(35.0), (75.0, AlertLevel::Low));
        assert_eq!(decide(60.0), (150.0, AlertLevel::Medium));
        assert_eq!(decide(95.0), (250.0, AlertLevel::High));
        assert_eq!(decide(0.0), (75.0, AlertLevel::Low));
        assert_eq!(decide(120.0), (250.0, AlertLevel::High));
    }

    #[test]
    fn test_band_edges() {
        assert_eq!(decide(40.0), (75.0, AlertLevel::Low));
        assert_eq!(decide(40.000_001), (150.0, AlertLevel::Medium));
        assert_eq!(decide(80.0), (150.0, AlertLevel::Medium));
        assert_eq!(decide(80.000_001), (250.0, AlertLevel::High));
    }

    #[test]
    fn test_total_over_odd_inputs() {
        assert_eq!(decide(-30.0), (75.0, AlertLevel::Low));
        assert_eq!(decide(f64::NAN), (75.0, AlertLevel::Low));
        assert_eq!(decide(f64::NEG_INFINITY), (75.0, AlertLevel::Low));
        assert_eq!(decide(f64::INFINITY), (250.0, AlertLevel::High));
    }

    #[tokio::test]
    async fn test_evaluate_never_fails() {
        let policy = ThresholdPolicy::default();
        let decision = policy.evaluate(60.0).await.unwrap();
        assert_eq!(decision.level, AlertLevel::Medium);
        assert_eq!(policy.name(), "threshold");
    }

    #[test]
    fn test_custom_table() {
        let policy = ThresholdPolicy::new(ThresholdTable {
            high_above_kmh: 100.0,
            medium_above_kmh: 50.0,
            ..Default::default()
        });
        assert_eq!(policy.decide(90.0).level, AlertLevel::Medium);
        assert_eq!(policy.decide(45.0).level, AlertLevel::Low);
    }

    #[test]
    fn test_table_validation() {
        assert!(ThresholdTable::default().validate().is_ok());

        let bad_distance = ThresholdTable {
            low_distance_m: 0.0,
            ..Default::default()
        };
        assert!(bad_distance.validate().is_err());

        let inverted = ThresholdTable {
            medium_above_kmh: 90.0,
            ..Default::default()
        };
        assert!(inverted.validate().is_err());
    }

    proptest! {
        #[test]
        fn prop_low_band(speed in -1.0e6f64..=40.0) {
            prop_assert_eq!(decide(speed), (75.0, AlertLevel::Low));
        }

        #[test]
        fn prop_medium_band(speed in 40.0f64..=80.0) {
            prop_assume!(speed > 40.0);
            prop_assert_eq!(decide(speed), (150.0, AlertLevel::Medium));
        }

        #[test]
        fn prop_high_band(speed in 80.0f64..1.0e6) {
            prop_assume!(speed > 80.0);
            prop_assert_eq!(decide(speed), (250.0, AlertLevel::High));
        }

        #[test]
        fn prop_idempotent(speed in proptest::num::f64::ANY) {
            let policy = ThresholdPolicy::default();
            prop_assert_eq!(policy.decide(speed), policy.decide(speed));
        }
    }
}
