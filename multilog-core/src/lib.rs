//! Core sampling, buffering and scheduling engine for multilog
//!
//! Samples heterogeneous sensors at independent rates, keeps bounded
//! raw/normalized history windows, and emits structured log records on a
//! fixed period, after a fixed count of samples, or when an inequality over
//! the reading becomes true. The [`scheduler::SensorScheduler`] drives many
//! such sensors from a single logical thread of control, without drift and
//! without starving the short-period ones.
//!
//! ```no_run
//! use multilog_core::{RecordingConfig, Sensor, SensorScheduler, SchedulerSignal};
//!
//! let mut soil = Sensor::builder("soil moisture", || Some(411.0))
//!     .radio_name("soil")
//!     .calibration(0.0, 1023.0)
//!     .build()
//!     .expect("valid calibration");
//! soil.set_config(RecordingConfig::Periodic { measurements: 10, period: 1000 });
//!
//! let scheduler = SensorScheduler::new(vec![soil]).expect("configured sensors");
//! let handle = scheduler.start(|signal| match signal {
//!     SchedulerSignal::Record(record) => println!("{record}"),
//!     SchedulerSignal::Complete => println!("done"),
//! });
//! handle.join();
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod buffer;
pub mod config;
pub mod constants;
pub mod errors;
pub mod predicate;
pub mod record;
pub mod sensor;
pub mod sink;
pub mod time;

#[cfg(feature = "std")]
pub mod pid;
#[cfg(feature = "std")]
pub mod scheduler;

// Public API
pub use buffer::SampleBuffer;
pub use config::RecordingConfig;
pub use errors::{SensorError, SensorResult};
pub use predicate::Inequality;
pub use record::LogRecord;
pub use sensor::{SampleSource, Sensor, SensorBuilder};
pub use sink::{MemorySink, NullSink, RecordSink};

#[cfg(feature = "std")]
pub use pid::{PidController, PidHandle, PidLoop};
#[cfg(feature = "std")]
pub use sink::CsvFileSink;
#[cfg(feature = "std")]
pub use scheduler::{SchedulerError, SchedulerHandle, SchedulerSignal, SensorScheduler};

/// Crate version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
