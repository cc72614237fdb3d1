//! System-wide tunables
//!
//! Every magic number used across the crate lives here with its rationale,
//! so a deployment can be audited (and retuned) in one place.

use crate::time::Timestamp;

/// Significant characters kept when a reading is rendered into a record.
///
/// Readings are truncated, not rounded: `123.456789` becomes `123.4567`.
/// Downstream transports (radio frames, small displays) rely on this bound
/// to size their payloads, so it is a crate-wide constant rather than a
/// per-sensor knob.
pub const DISPLAY_PRECISION: usize = 8;

/// Default capacity of a sensor's raw and normalized sample buffers.
///
/// 80 readings of `f64` is 640 bytes per buffer; small enough to hold many
/// sensors on a constrained target while still giving trend analysis a
/// useful window.
pub const DEFAULT_BUFFER_CAPACITY: usize = 80;

/// Granularity of the scheduler's cancellable pause, in milliseconds.
///
/// The scheduling loop never sleeps longer than this in one stretch; the
/// cancellation flag is re-checked between chunks, bounding stop latency to
/// one chunk regardless of how long the current inter-log interval is.
pub const PAUSE_CHUNK_MS: u64 = 100;

/// Effective period for an event-gated config that carries no period.
///
/// Event-gated sensors still need a wake cadence to evaluate their predicate
/// against fresh samples. Matches [`PAUSE_CHUNK_MS`] so an event sensor is
/// polled as often as cancellation is observed.
pub const EVENT_POLL_PERIOD_MS: Timestamp = 100;

/// Capacity of the scheduler's working set of (sensor, wake time) entries.
pub const MAX_SCHEDULED_SENSORS: usize = 16;

/// Event field of a record produced outside event mode.
pub const NO_EVENT_LABEL: &str = "N/A";
