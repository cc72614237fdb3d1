//! Recording policy for a sensor
//!
//! A [`RecordingConfig`] declares how many times a sensor logs, how often,
//! and optionally an inequality gate on the reading. The two shapes are
//! statically distinguishable variants instead of one record with optional
//! fields, so "is this sensor in event mode" is a match on the variant,
//! never a runtime derivation from field presence.
//!
//! The config carries the *remaining* measurement budget and is mutated by
//! each produced record; the sensor snapshots the initial budget separately
//! for progress reporting.

#[cfg(not(feature = "std"))]
use alloc::{format, string::String};

use crate::constants::EVENT_POLL_PERIOD_MS;
use crate::predicate::Inequality;
use crate::time::Timestamp;

/// Immutable-once-set logging policy, set exactly once per recording session.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RecordingConfig {
    /// Log unconditionally every `period` milliseconds, `measurements` times.
    Periodic {
        /// Remaining log budget; decremented by each produced record.
        measurements: u32,
        /// Logging interval in milliseconds.
        period: Timestamp,
    },
    /// Log only when `reading <inequality> comparator` holds.
    EventGated {
        /// Remaining log budget; `None` means unlimited (log every time the
        /// predicate fires until the session is stopped).
        measurements: Option<u32>,
        /// Evaluation cadence in milliseconds; `None` polls at
        /// [`EVENT_POLL_PERIOD_MS`].
        period: Option<Timestamp>,
        /// Gate applied to each sampled reading.
        inequality: Inequality,
        /// Right-hand side of the gate.
        comparator: f64,
    },
}

impl RecordingConfig {
    /// True for the event-gated variant.
    pub fn is_event_mode(&self) -> bool {
        matches!(self, RecordingConfig::EventGated { .. })
    }

    /// Remaining measurement budget; `None` means unlimited.
    pub fn measurements_left(&self) -> Option<u32> {
        match self {
            RecordingConfig::Periodic { measurements, .. } => Some(*measurements),
            RecordingConfig::EventGated { measurements, .. } => *measurements,
        }
    }

    /// True while the budget is not exhausted. An unlimited budget never
    /// exhausts.
    pub fn has_measurements(&self) -> bool {
        self.measurements_left().map_or(true, |left| left > 0)
    }

    /// Consume one measurement from the budget. Saturates at zero; a no-op
    /// for unlimited budgets.
    pub fn decrement(&mut self) {
        match self {
            RecordingConfig::Periodic { measurements, .. } => {
                *measurements = measurements.saturating_sub(1);
            }
            RecordingConfig::EventGated { measurements, .. } => {
                if let Some(left) = measurements {
                    *left = left.saturating_sub(1);
                }
            }
        }
    }

    /// Effective wake period in milliseconds.
    pub fn period(&self) -> Timestamp {
        match self {
            RecordingConfig::Periodic { period, .. } => *period,
            RecordingConfig::EventGated { period, .. } => period.unwrap_or(EVENT_POLL_PERIOD_MS),
        }
    }

    /// The gate, if this config is event-gated.
    pub fn predicate(&self) -> Option<(Inequality, f64)> {
        match self {
            RecordingConfig::Periodic { .. } => None,
            RecordingConfig::EventGated {
                inequality,
                comparator,
                ..
            } => Some((*inequality, *comparator)),
        }
    }

    /// Human-readable gate description, `"> 10"`-style. `None` for periodic
    /// configs, whose records carry the no-event label instead.
    pub fn event_description(&self) -> Option<String> {
        self.predicate()
            .map(|(inequality, comparator)| format!("{} {}", inequality.symbol(), comparator))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn periodic_budget_exhausts() {
        let mut config = RecordingConfig::Periodic {
            measurements: 2,
            period: 1000,
        };
        assert!(config.has_measurements());
        config.decrement();
        config.decrement();
        assert!(!config.has_measurements());
        // saturates rather than wrapping
        config.decrement();
        assert_eq!(config.measurements_left(), Some(0));
    }

    #[test]
    fn unlimited_budget_never_exhausts() {
        let mut config = RecordingConfig::EventGated {
            measurements: None,
            period: None,
            inequality: Inequality::Gt,
            comparator: 10.0,
        };
        config.decrement();
        assert!(config.has_measurements());
        assert_eq!(config.measurements_left(), None);
    }

    #[test]
    fn event_config_defaults_poll_period() {
        let config = RecordingConfig::EventGated {
            measurements: Some(1),
            period: None,
            inequality: Inequality::Lt,
            comparator: 0.0,
        };
        assert_eq!(config.period(), EVENT_POLL_PERIOD_MS);
        assert!(config.is_event_mode());
    }

    #[test]
    fn event_description_format() {
        let config = RecordingConfig::EventGated {
            measurements: Some(1),
            period: Some(500),
            inequality: Inequality::Gt,
            comparator: 10.0,
        };
        assert_eq!(config.event_description().as_deref(), Some("> 10"));

        let periodic = RecordingConfig::Periodic {
            measurements: 1,
            period: 500,
        };
        assert_eq!(periodic.event_description(), None);
    }
}
