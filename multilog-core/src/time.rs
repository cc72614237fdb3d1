//! Time handling
//!
//! The scheduler keeps two notions of time deliberately separate:
//!
//! - a *logical* clock: starts at 0 when a session starts and advances only
//!   by computed sleep increments, so record timestamps never drift even
//!   when the host pauses the thread late;
//! - a *wall* clock ([`MonotonicClock`]): measures how long the previous
//!   tick's work actually took, so the next pause can be shortened by that
//!   amount.
//!
//! Record timestamps always come from the logical clock.

/// Timestamp in milliseconds since the start of a recording session.
pub type Timestamp = u64;

/// Monotonic wall-clock stopwatch used for drift compensation.
///
/// Wraps [`std::time::Instant`]; restarted at every scheduler wake so that
/// `elapsed_ms` reads "time spent since the previous wake".
#[cfg(feature = "std")]
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    started: std::time::Instant,
}

#[cfg(feature = "std")]
impl MonotonicClock {
    /// Start a new stopwatch at the current instant.
    pub fn new() -> Self {
        Self {
            started: std::time::Instant::now(),
        }
    }

    /// Milliseconds elapsed since construction or the last [`restart`].
    ///
    /// [`restart`]: MonotonicClock::restart
    pub fn elapsed_ms(&self) -> Timestamp {
        self.started.elapsed().as_millis() as Timestamp
    }

    /// Reset the stopwatch to the current instant.
    pub fn restart(&mut self) {
        self.started = std::time::Instant::now();
    }
}

#[cfg(feature = "std")]
impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}
