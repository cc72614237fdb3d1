//! Cooperative multi-rate sensor scheduler
//!
//! ## Overview
//!
//! [`SensorScheduler`] drives many independently-periodic sensors from one
//! logical thread of control, without drift and without starving the
//! short-period sensors. It owns its sensor set exclusively for the whole
//! session: construction consumes the sensors, `start` consumes the
//! scheduler, and the spawned loop is the sole mutator of every sensor's
//! budget and logged state.
//!
//! ## Algorithm
//!
//! The working set is a list of `(sensor, wake_at)` entries kept sorted
//! ascending by wake time. Time is *logical*: it starts at 0 and advances
//! only by computed sleep increments, so entries sharing a period never
//! drift apart. The wall clock is consulted only to shorten each pause by
//! the time the previous tick's work already consumed.
//!
//! ```text
//! t=0     log every sensor once, unconditionally
//! loop:
//!   next  = earliest wake_at
//!   sleep = next - current_time          (logical)
//!   pause = sleep - work_elapsed         (wall-clock compensation, >= 0)
//!   sleep in PAUSE_CHUNK_MS chunks, checking the cancel flag per chunk
//!   current_time += sleep
//!   log every entry with wake_at == current_time, in array order;
//!     survivors advance wake_at by their period, finished entries drop
//!   stable re-sort by wake_at
//! until the schedule empties or stop() is observed
//! ```
//!
//! Periods are integer milliseconds and every wake time is a sum of
//! periods, so the `wake_at == current_time` comparison is exact under the
//! discretized clock.
//!
//! ## Ordering guarantee
//!
//! When two sensors share a wake time, records are produced in current
//! schedule order; the sort is stable and ties preserve relative insertion
//! order. This ordering is observable through the signal stream and is part
//! of the contract.
//!
//! ## Completion versus cancellation
//!
//! The loop ends when the schedule empties (every budget exhausted) or when
//! [`SchedulerHandle::stop`] is observed at a pause-chunk boundary. Either
//! way the stream ends with a distinct [`SchedulerSignal::Complete`], so
//! callers never have to infer "stream ended" from the absence of records.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use thiserror_no_std::Error;

use crate::constants::{MAX_SCHEDULED_SENSORS, PAUSE_CHUNK_MS};
use crate::record::LogRecord;
use crate::sensor::Sensor;
use crate::time::{MonotonicClock, Timestamp};

/// Scheduler construction errors.
#[derive(Error, Debug)]
pub enum SchedulerError {
    /// Every sensor must be configured before it is scheduled.
    #[error("sensor `{name}` has no recording config")]
    UnconfiguredSensor {
        /// Display name of the offending sensor.
        name: String,
    },
    /// The working set is bounded at [`MAX_SCHEDULED_SENSORS`].
    #[error("scheduler holds at most {limit} sensors")]
    TooManySensors {
        /// The capacity that was exceeded.
        limit: usize,
    },
}

/// One element of the record stream.
#[derive(Debug, Clone, PartialEq)]
pub enum SchedulerSignal {
    /// A sensor produced a record.
    Record(LogRecord),
    /// No more records will be produced, whether by natural completion or
    /// cancellation. Always the final signal.
    Complete,
}

/// Observer invoked with `(sensor name, measurements remaining)` after every
/// produced record; `None` remaining means an unlimited budget.
pub type ProgressObserver = Box<dyn FnMut(&str, Option<u32>) + Send>;

/// Scheduler-internal pairing of a sensor and its next logical wake time.
struct ScheduleEntry {
    sensor: Sensor,
    wake_at: Timestamp,
}

type Schedule = heapless::Vec<ScheduleEntry, MAX_SCHEDULED_SENSORS>;

/// Multiplexes periodic logging across a set of configured sensors.
pub struct SensorScheduler {
    schedule: Schedule,
    longest_running: Option<String>,
    progress: Option<ProgressObserver>,
}

impl SensorScheduler {
    /// Build a scheduler over already-configured sensors.
    ///
    /// Fails fast on an unconfigured sensor or on exceeding the working-set
    /// capacity. The initial schedule is sorted ascending by period, every
    /// entry waking one period in.
    pub fn new(sensors: Vec<Sensor>) -> Result<Self, SchedulerError> {
        for sensor in &sensors {
            if sensor.config().is_none() {
                return Err(SchedulerError::UnconfiguredSensor {
                    name: sensor.name().into(),
                });
            }
        }

        // strictly-greater comparison so ties go to the first-encountered
        let mut longest: Option<(&Sensor, u64)> = None;
        for sensor in &sensors {
            let weight = total_run_time(sensor);
            if longest.map_or(true, |(_, best)| weight > best) {
                longest = Some((sensor, weight));
            }
        }
        let longest_running = longest.map(|(sensor, _)| String::from(sensor.name()));

        let mut schedule = Schedule::new();
        for sensor in sensors {
            let wake_at = sensor.config().map(|c| c.period()).unwrap_or_default();
            let entry = ScheduleEntry { sensor, wake_at };
            if schedule.push(entry).is_err() {
                return Err(SchedulerError::TooManySensors {
                    limit: MAX_SCHEDULED_SENSORS,
                });
            }
        }
        schedule.sort_by_key(|entry| entry.wake_at);

        Ok(Self {
            schedule,
            longest_running,
            progress: None,
        })
    }

    /// The sensor with the most total run time (`budget x period`, unlimited
    /// budgets treated as maximal, ties to first-encountered); the natural
    /// candidate for a constrained progress display.
    pub fn longest_running_sensor(&self) -> Option<&str> {
        self.longest_running.as_deref()
    }

    /// Attach a progress observer, invoked from the scheduling loop after
    /// every produced record. Must be trivially fast; it runs on the loop's
    /// time budget.
    pub fn with_progress_observer(
        mut self,
        observer: impl FnMut(&str, Option<u32>) + Send + 'static,
    ) -> Self {
        self.progress = Some(Box::new(observer));
        self
    }

    /// Start the scheduling loop on its own thread.
    ///
    /// Returns immediately; the loop takes exclusive ownership of the
    /// sensors for the whole session. `on_signal` is invoked synchronously
    /// from the loop with each produced record and a final
    /// [`SchedulerSignal::Complete`]; it must not block.
    pub fn start<F>(self, on_signal: F) -> SchedulerHandle
    where
        F: FnMut(SchedulerSignal) + Send + 'static,
    {
        let cancel = Arc::new(AtomicBool::new(false));
        let complete = Arc::new(AtomicBool::new(false));

        let loop_cancel = Arc::clone(&cancel);
        let loop_complete = Arc::clone(&complete);
        let schedule = self.schedule;
        let progress = self.progress;
        let thread = thread::Builder::new()
            .name("multilog-scheduler".into())
            .spawn(move || {
                run_loop(schedule, &loop_cancel, &loop_complete, on_signal, progress);
            })
            .ok();
        if thread.is_none() {
            log::warn!("failed to spawn scheduler thread");
        }

        SchedulerHandle {
            cancel,
            complete,
            thread,
        }
    }

    /// Start the loop and stream signals through a channel instead of a
    /// callback, for callers consuming records on another thread.
    pub fn start_channel(self) -> (SchedulerHandle, crossbeam_channel::Receiver<SchedulerSignal>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        let handle = self.start(move |signal| {
            let _ = tx.send(signal);
        });
        (handle, rx)
    }
}

/// Control surface for a running scheduling loop.
pub struct SchedulerHandle {
    cancel: Arc<AtomicBool>,
    complete: Arc<AtomicBool>,
    thread: Option<thread::JoinHandle<()>>,
}

impl SchedulerHandle {
    /// Request cooperative cancellation.
    ///
    /// Advisory: observed at the next pause-chunk boundary, not
    /// immediately. Does not log a final record.
    pub fn stop(&self) {
        self.cancel.store(true, Ordering::Release);
    }

    /// True iff the schedule emptied naturally (every sensor exhausted its
    /// budget). Stays false after cancellation; poll from any thread.
    pub fn logging_complete(&self) -> bool {
        self.complete.load(Ordering::Acquire)
    }

    /// True once [`stop`](SchedulerHandle::stop) has been called.
    pub fn was_stopped(&self) -> bool {
        self.cancel.load(Ordering::Acquire)
    }

    /// Wait for the scheduling loop to finish.
    pub fn join(mut self) {
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::warn!("scheduler thread panicked");
            }
        }
    }
}

/// Weight used to elect the progress-display sensor.
fn total_run_time(sensor: &Sensor) -> u64 {
    let period = sensor.config().map(|c| c.period()).unwrap_or_default();
    match sensor.total_measurements() {
        Some(measurements) => u64::from(measurements).saturating_mul(period),
        // unlimited budget outlasts everything
        None => u64::MAX,
    }
}

/// Log the entry at `index` and reschedule or drop it.
///
/// Returns true when the entry survives (the caller advances its index).
fn log_entry(
    schedule: &mut Schedule,
    index: usize,
    time: Timestamp,
    next_wake: Timestamp,
    on_signal: &mut impl FnMut(SchedulerSignal),
    progress: &mut Option<ProgressObserver>,
) -> bool {
    match schedule[index].sensor.log(time) {
        Ok(Some(record)) => {
            if let Some(observer) = progress.as_mut() {
                let sensor = &schedule[index].sensor;
                let remaining = sensor.config().and_then(|c| c.measurements_left());
                observer(sensor.name(), remaining);
            }
            on_signal(SchedulerSignal::Record(record));
        }
        Ok(None) => {
            log::trace!(
                "sensor `{}` produced no event at t={time}",
                schedule[index].sensor.name()
            );
        }
        Err(e) => {
            log::warn!(
                "dropping sensor `{}` from schedule: {e}",
                schedule[index].sensor.name()
            );
            schedule.remove(index);
            return false;
        }
    }

    let entry = &mut schedule[index];
    if entry.sensor.has_measurements().unwrap_or(false) {
        let period = entry.sensor.config().map(|c| c.period()).unwrap_or_default();
        entry.wake_at = next_wake + period;
        true
    } else {
        schedule.remove(index);
        false
    }
}

fn run_loop(
    mut schedule: Schedule,
    cancel: &AtomicBool,
    complete: &AtomicBool,
    mut on_signal: impl FnMut(SchedulerSignal),
    mut progress: Option<ProgressObserver>,
) {
    let mut current_time: Timestamp = 0;
    let mut wake_clock = MonotonicClock::new();

    // Logging pass at time 0: every sensor logs once, regardless of wake_at.
    let mut index = 0;
    while index < schedule.len() {
        if log_entry(&mut schedule, index, 0, 0, &mut on_signal, &mut progress) {
            index += 1;
        }
    }

    while !schedule.is_empty() {
        let next_log_time = schedule[0].wake_at;
        let sleep_time = next_log_time.saturating_sub(current_time);

        // Shorten the pause by the wall-clock time the previous wake's work
        // already consumed; floor at zero when the work overran the interval.
        let mut remaining = sleep_time.saturating_sub(wake_clock.elapsed_ms());
        let mut cancelled = cancel.load(Ordering::Acquire);
        while remaining > 0 && !cancelled {
            let chunk = remaining.min(PAUSE_CHUNK_MS);
            thread::sleep(Duration::from_millis(chunk));
            remaining -= chunk;
            cancelled = cancel.load(Ordering::Acquire);
        }
        if cancelled {
            // exit without completing the current tick
            break;
        }

        wake_clock.restart();
        current_time += sleep_time;

        let mut index = 0;
        while index < schedule.len() {
            if schedule[index].wake_at != current_time {
                index += 1;
                continue;
            }
            if log_entry(
                &mut schedule,
                index,
                current_time,
                next_log_time,
                &mut on_signal,
                &mut progress,
            ) {
                index += 1;
            }
        }

        // Stable: entries sharing a wake time keep their relative order.
        schedule.sort_by_key(|entry| entry.wake_at);
    }

    let finished = schedule.is_empty();
    complete.store(finished, Ordering::Release);
    log::debug!(
        "scheduler loop ended at t={current_time} ({})",
        if finished { "complete" } else { "stopped" }
    );
    on_signal(SchedulerSignal::Complete);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RecordingConfig;

    fn configured_sensor(name: &str, measurements: u32, period: Timestamp) -> Sensor {
        let mut sensor = Sensor::builder(name, move || Some(1.0))
            .calibration(0.0, 10.0)
            .build()
            .unwrap();
        sensor.set_config(RecordingConfig::Periodic {
            measurements,
            period,
        });
        sensor
    }

    #[test]
    fn rejects_unconfigured_sensors() {
        let sensor = Sensor::builder("bare", || Some(1.0))
            .calibration(0.0, 10.0)
            .build()
            .unwrap();
        let result = SensorScheduler::new(vec![sensor]);
        assert!(matches!(
            result.err(),
            Some(SchedulerError::UnconfiguredSensor { .. })
        ));
    }

    #[test]
    fn rejects_oversized_sensor_sets() {
        let sensors: Vec<Sensor> = (0..=MAX_SCHEDULED_SENSORS)
            .map(|i| configured_sensor(&format!("s{i}"), 1, 100))
            .collect();
        let result = SensorScheduler::new(sensors);
        assert!(matches!(
            result.err(),
            Some(SchedulerError::TooManySensors { .. })
        ));
    }

    #[test]
    fn elects_longest_running_sensor() {
        let short = configured_sensor("short", 2, 100); // 200ms total
        let long = configured_sensor("long", 3, 1000); // 3000ms total
        let scheduler = SensorScheduler::new(vec![short, long]).unwrap();
        assert_eq!(scheduler.longest_running_sensor(), Some("long"));
    }

    #[test]
    fn unlimited_budget_wins_election() {
        let mut unlimited = Sensor::builder("unlimited", || Some(1.0))
            .calibration(0.0, 10.0)
            .build()
            .unwrap();
        unlimited.set_config(RecordingConfig::EventGated {
            measurements: None,
            period: Some(10),
            inequality: crate::predicate::Inequality::Gt,
            comparator: 100.0,
        });
        let big = configured_sensor("big", 1000, 1000);
        let scheduler = SensorScheduler::new(vec![big, unlimited]).unwrap();
        assert_eq!(scheduler.longest_running_sensor(), Some("unlimited"));
    }
}
