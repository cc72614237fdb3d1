//! Error types for sensor setup and configuration failures
//!
//! Everything in this module is a programmer or integration error, not a
//! runtime transient: none of these are retried, and they propagate
//! immediately so a broken session setup aborts instead of silently
//! degrading. A sampling capability returning no value is *not* an error;
//! absence is a first-class reading (see [`crate::sensor::SampleSource`]).
//!
//! Variants are kept small and `Copy` so they can be returned from hot
//! paths and asserted on directly in tests.

use thiserror_no_std::Error;

/// Result type for sensor operations.
pub type SensorResult<T> = Result<T, SensorError>;

/// Sensor configuration and usage errors.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum SensorError {
    /// `log()` or `has_measurements()` called before `set_config()`.
    #[error("sensor has no recording config; call set_config first")]
    UnconfiguredSensor,

    /// Event evaluation attempted with no config set at all.
    #[error("event evaluation requires a recording config")]
    MissingConfig,

    /// Event evaluation attempted on a periodic config, which carries no
    /// inequality or comparator.
    #[error("recording config has no inequality/comparator fields")]
    MissingPredicateFields,

    /// Inequality symbol is not in the supported symbol table.
    #[error("unsupported inequality symbol")]
    UnknownPredicate,

    /// Calibration bounds coincide, so the normalization range is zero.
    /// Rejected at construction, not at first normalization.
    #[error("calibration minimum {minimum} equals maximum {maximum}")]
    InvalidCalibration {
        /// Lower calibration bound as supplied.
        minimum: f64,
        /// Upper calibration bound as supplied.
        maximum: f64,
    },
}
