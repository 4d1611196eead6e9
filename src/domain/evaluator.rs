//! Pure threshold evaluation.
//!
//! [`evaluate`] is the decision core of the ingestion pipeline: given a
//! dispenser's configured thresholds and a fresh reading, it decides which
//! alert candidates to raise. No I/O, no side effects; persistence and
//! deduplication are the lifecycle manager's job.

use crate::error::MonitorError;

use super::alert::{AlertCandidate, AlertKind};
use super::measurement::Reading;

/// Fixed policy floor at or below which a *critical* alert fires,
/// regardless of the dispenser's configured thresholds.
pub const CRITICAL_FLOOR: i16 = 5;

/// Per-dispenser alert thresholds, bounded 1–100 by the store schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    /// Fill percentage at or below which a low-fill alert is raised.
    pub low_fill: i16,
    /// Battery percentage at or below which a low-battery alert is raised.
    pub low_battery: i16,
}

/// Evaluates a reading against the dispenser's thresholds.
///
/// Fill and battery are evaluated independently; a single reading yields
/// zero, one, or two candidates, at most one per dimension. Comparison is
/// inclusive: a value exactly equal to a threshold triggers. Critical takes
/// precedence over low within a dimension.
///
/// # Errors
///
/// Returns [`MonitorError::InvalidInput`] if any threshold or measured
/// value lies outside 0–100. The store schema bounds both, so an
/// out-of-range value here is a data-integrity bug upstream and is never
/// clamped or tolerated silently.
pub fn evaluate(
    thresholds: &Thresholds,
    reading: &Reading,
) -> Result<Vec<AlertCandidate>, MonitorError> {
    check_percent("fill level", reading.fill_percent)?;
    check_percent("battery level", reading.battery_percent)?;
    check_percent("low-fill threshold", thresholds.low_fill)?;
    check_percent("low-battery threshold", thresholds.low_battery)?;

    let mut candidates = Vec::with_capacity(2);

    if let Some(kind) = classify(
        reading.fill_percent,
        thresholds.low_fill,
        AlertKind::CriticalFill,
        AlertKind::LowFill,
    ) {
        candidates.push(AlertCandidate {
            kind,
            triggering_value: reading.fill_percent,
        });
    }

    if let Some(kind) = classify(
        reading.battery_percent,
        thresholds.low_battery,
        AlertKind::CriticalBattery,
        AlertKind::LowBattery,
    ) {
        candidates.push(AlertCandidate {
            kind,
            triggering_value: reading.battery_percent,
        });
    }

    Ok(candidates)
}

/// Classifies one dimension: critical at or below the fixed floor, low at
/// or below the configured threshold, otherwise nothing.
const fn classify(
    value: i16,
    threshold: i16,
    critical: AlertKind,
    low: AlertKind,
) -> Option<AlertKind> {
    if value <= CRITICAL_FLOOR {
        Some(critical)
    } else if value <= threshold {
        Some(low)
    } else {
        None
    }
}

fn check_percent(what: &str, value: i16) -> Result<(), MonitorError> {
    if (0..=100).contains(&value) {
        Ok(())
    } else {
        Err(MonitorError::InvalidInput(format!(
            "{what} out of range: {value}"
        )))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    const T10: Thresholds = Thresholds {
        low_fill: 10,
        low_battery: 10,
    };

    fn eval(fill: i16, battery: i16) -> Vec<AlertCandidate> {
        let Ok(candidates) = evaluate(
            &T10,
            &Reading {
                fill_percent: fill,
                battery_percent: battery,
            },
        ) else {
            panic!("evaluation failed");
        };
        candidates
    }

    #[test]
    fn healthy_reading_yields_nothing() {
        assert!(eval(80, 95).is_empty());
        assert!(eval(100, 100).is_empty());
        assert!(eval(11, 11).is_empty());
    }

    #[test]
    fn critical_fill_ignores_configured_threshold() {
        // Scenario A: thresholds {10, 10}, reading {3, 50}.
        let candidates = eval(3, 50);
        assert_eq!(
            candidates,
            vec![AlertCandidate {
                kind: AlertKind::CriticalFill,
                triggering_value: 3,
            }]
        );

        // Even with a threshold below the floor, critical still fires.
        let low_threshold = Thresholds {
            low_fill: 1,
            low_battery: 1,
        };
        let Ok(candidates) = evaluate(
            &low_threshold,
            &Reading {
                fill_percent: 4,
                battery_percent: 50,
            },
        ) else {
            panic!("evaluation failed");
        };
        assert_eq!(candidates.first().map(|c| c.kind), Some(AlertKind::CriticalFill));
    }

    #[test]
    fn both_dimensions_low() {
        // Scenario B: thresholds {10, 10}, reading {8, 8}.
        let candidates = eval(8, 8);
        assert_eq!(
            candidates,
            vec![
                AlertCandidate {
                    kind: AlertKind::LowFill,
                    triggering_value: 8,
                },
                AlertCandidate {
                    kind: AlertKind::LowBattery,
                    triggering_value: 8,
                },
            ]
        );
    }

    #[test]
    fn threshold_boundary_is_inclusive() {
        // Exactly at the configured threshold counts as triggering.
        let candidates = eval(10, 100);
        assert_eq!(candidates.first().map(|c| c.kind), Some(AlertKind::LowFill));
    }

    #[test]
    fn critical_floor_boundary_is_inclusive() {
        let candidates = eval(100, 5);
        assert_eq!(
            candidates.first().map(|c| c.kind),
            Some(AlertKind::CriticalBattery)
        );
        // One above the floor, still under the threshold: low, not critical.
        let candidates = eval(100, 6);
        assert_eq!(
            candidates.first().map(|c| c.kind),
            Some(AlertKind::LowBattery)
        );
    }

    #[test]
    fn critical_and_low_are_mutually_exclusive_per_dimension() {
        // A value at the floor also sits below the threshold; only the
        // critical kind may be emitted.
        let candidates = eval(5, 100);
        assert_eq!(candidates.len(), 1);
        assert_eq!(
            candidates.first().map(|c| c.kind),
            Some(AlertKind::CriticalFill)
        );
    }

    #[test]
    fn zero_is_critical() {
        let candidates = eval(0, 0);
        assert_eq!(candidates.len(), 2);
        assert!(candidates.iter().all(|c| c.kind.is_critical()));
    }

    #[test]
    fn out_of_range_reading_is_rejected() {
        let result = evaluate(
            &T10,
            &Reading {
                fill_percent: 101,
                battery_percent: 50,
            },
        );
        assert!(matches!(result, Err(MonitorError::InvalidInput(_))));

        let result = evaluate(
            &T10,
            &Reading {
                fill_percent: 50,
                battery_percent: -1,
            },
        );
        assert!(matches!(result, Err(MonitorError::InvalidInput(_))));
    }

    #[test]
    fn out_of_range_threshold_is_rejected() {
        let bad = Thresholds {
            low_fill: 120,
            low_battery: 10,
        };
        let result = evaluate(
            &bad,
            &Reading {
                fill_percent: 50,
                battery_percent: 50,
            },
        );
        assert!(matches!(result, Err(MonitorError::InvalidInput(_))));
    }
}
