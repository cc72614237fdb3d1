//! Sensor data model: sampling, buffering, normalization and logging
//!
//! ## Overview
//!
//! A [`Sensor`] binds an opaque sampling capability to identity, calibration
//! bounds and a logging policy. It keeps two parallel FIFO windows of recent
//! readings (raw and normalized into `[0, 1]` by the calibration range) and
//! produces structured [`LogRecord`]s on demand, either unconditionally
//! (periodic mode) or gated by an inequality over the current reading
//! (event mode).
//!
//! ## Absence is a value
//!
//! The sampling capability returns `Option<f64>`: `None` models a
//! disconnected or temporarily unavailable source and is never an error.
//! An absent sample evicts from the history window without appending and
//! never fires an event gate; in periodic mode it still produces a record
//! whose reading field is empty.
//!
//! ## Ownership
//!
//! A sensor is created with calibration and capabilities, configured once
//! per recording session, and then mutated only by whoever drives it; the
//! scheduler takes the whole sensor by value for exactly this reason.

#[cfg(not(feature = "std"))]
use alloc::{
    boxed::Box,
    string::{String, ToString},
};

use crate::buffer::SampleBuffer;
use crate::config::RecordingConfig;
use crate::constants::{DEFAULT_BUFFER_CAPACITY, NO_EVENT_LABEL};
use crate::errors::{SensorError, SensorResult};
use crate::record::LogRecord;
use crate::sink::{NullSink, RecordSink};
use crate::time::Timestamp;

/// A no-argument sampling capability.
///
/// Must be cheap and side-effect-free beyond the physical read itself; a
/// capability that blocks stalls every sensor sharing its scheduler.
pub trait SampleSource: Send {
    /// Take one reading. `None` means "no reading right now".
    fn sample(&mut self) -> Option<f64>;
}

impl<F> SampleSource for F
where
    F: FnMut() -> Option<f64> + Send,
{
    fn sample(&mut self) -> Option<f64> {
        self()
    }
}

/// A sensor with calibration bounds, buffered history and a logging policy.
pub struct Sensor {
    name: String,
    radio_name: String,
    minimum: f64,
    maximum: f64,
    /// `maximum - minimum`, precomputed once; never zero.
    range: f64,
    unit_name: String,
    unit_symbol: String,
    reading_error: f64,
    source: Box<dyn SampleSource>,
    sink: Box<dyn RecordSink>,
    data_buffer: SampleBuffer,
    normalized_buffer: SampleBuffer,
    /// Total present samples ever buffered; never decremented, even when
    /// buffer entries are evicted.
    number_of_readings: u64,
    config: Option<RecordingConfig>,
    /// Snapshot of the configured budget, kept for progress reporting.
    total_measurements: Option<u32>,
    last_logged_reading: Option<f64>,
    last_logged_event: Option<String>,
}

impl Sensor {
    /// Start building a sensor around a sampling capability.
    pub fn builder(name: impl Into<String>, source: impl SampleSource + 'static) -> SensorBuilder {
        SensorBuilder::new(name, source)
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Short transmission-safe alias.
    pub fn radio_name(&self) -> &str {
        &self.radio_name
    }

    /// Lower calibration bound.
    pub fn minimum(&self) -> f64 {
        self.minimum
    }

    /// Upper calibration bound.
    pub fn maximum(&self) -> f64 {
        self.maximum
    }

    /// Calibration span, `maximum - minimum`.
    pub fn range(&self) -> f64 {
        self.range
    }

    /// Unit name, empty when not applicable.
    pub fn unit_name(&self) -> &str {
        &self.unit_name
    }

    /// Unit symbol, empty when not applicable.
    pub fn unit_symbol(&self) -> &str {
        &self.unit_symbol
    }

    /// Stated +/- reading tolerance.
    pub fn reading_error(&self) -> f64 {
        self.reading_error
    }

    /// Raw reading history, oldest first.
    pub fn data_buffer(&self) -> &SampleBuffer {
        &self.data_buffer
    }

    /// Normalized reading history, parallel to [`data_buffer`].
    ///
    /// [`data_buffer`]: Sensor::data_buffer
    pub fn normalized_buffer(&self) -> &SampleBuffer {
        &self.normalized_buffer
    }

    /// Upper bound on both history buffers.
    pub fn max_buffer_size(&self) -> usize {
        self.data_buffer.capacity()
    }

    /// Total present samples ever buffered.
    pub fn number_of_readings(&self) -> u64 {
        self.number_of_readings
    }

    /// The active recording config, if one was set.
    pub fn config(&self) -> Option<&RecordingConfig> {
        self.config.as_ref()
    }

    /// Initial measurement budget snapshot; `None` before configuration or
    /// for an unlimited budget.
    pub fn total_measurements(&self) -> Option<u32> {
        self.total_measurements
    }

    /// True when the active config gates logging on an inequality.
    pub fn is_in_event_mode(&self) -> bool {
        self.config.map_or(false, |c| c.is_event_mode())
    }

    /// Reading carried by the most recently produced record.
    pub fn last_logged_reading(&self) -> Option<f64> {
        self.last_logged_reading
    }

    /// Event description carried by the most recently produced record.
    pub fn last_logged_event(&self) -> Option<&str> {
        self.last_logged_event.as_deref()
    }

    /// Set the recording policy for this session.
    ///
    /// Snapshots the budget for progress reporting. Must be called before
    /// [`log`] or [`has_measurements`].
    ///
    /// [`log`]: Sensor::log
    /// [`has_measurements`]: Sensor::has_measurements
    pub fn set_config(&mut self, config: RecordingConfig) {
        self.total_measurements = config.measurements_left();
        self.config = Some(config);
    }

    /// Sample once without touching the history buffers.
    pub fn reading(&mut self) -> Option<f64> {
        self.source.sample()
    }

    /// Sample once and normalize into `[0, 1]`; absence propagates.
    pub fn normalized_reading(&mut self) -> Option<f64> {
        let minimum = self.minimum;
        let range = self.range;
        self.reading().map(|value| (value - minimum) / range)
    }

    /// Sample once into the history buffers; returns the resulting length.
    ///
    /// The oldest entry of *both* buffers is evicted when the buffer is at
    /// capacity or the sample is absent. Only a present sample is appended
    /// (raw and normalized) and counted. This is the only path that grows
    /// the buffers.
    pub fn read_into_buffer_once(&mut self) -> usize {
        let sample = self.source.sample();
        if self.data_buffer.is_full() || sample.is_none() {
            self.data_buffer.pop_oldest();
            self.normalized_buffer.pop_oldest();
        }
        if let Some(value) = sample {
            let normalized = (value - self.minimum) / self.range;
            self.data_buffer.push(value);
            self.normalized_buffer.push(normalized);
            self.number_of_readings += 1;
        }
        self.data_buffer.len()
    }

    /// Change the history bound on both buffers.
    ///
    /// Shrinking below the current length drops the oldest entries
    /// immediately; growing only changes the future capacity.
    pub fn set_buffer_size(&mut self, size: usize) {
        self.data_buffer.set_capacity(size);
        self.normalized_buffer.set_capacity(size);
    }

    /// Recompute the entire normalized buffer from the raw buffer. O(len).
    pub fn normalise_data_buffer(&mut self) {
        let minimum = self.minimum;
        let range = self.range;
        self.normalized_buffer.clear();
        for index in 0..self.data_buffer.len() {
            if let Some(value) = self.data_buffer.get(index) {
                self.normalized_buffer.push((value - minimum) / range);
            }
        }
    }

    /// Evaluate the configured event gate against a reading.
    pub fn event_should_trigger(&self, reading: f64) -> SensorResult<bool> {
        let config = self.config.as_ref().ok_or(SensorError::MissingConfig)?;
        let (inequality, comparator) = config
            .predicate()
            .ok_or(SensorError::MissingPredicateFields)?;
        Ok(inequality.evaluate(reading, comparator))
    }

    /// True while the measurement budget is not exhausted.
    ///
    /// This is the sole completion predicate the scheduler uses.
    pub fn has_measurements(&self) -> SensorResult<bool> {
        let config = self.config.as_ref().ok_or(SensorError::UnconfiguredSensor)?;
        Ok(config.has_measurements())
    }

    /// Sample once and, policy permitting, produce a record.
    ///
    /// Event mode: only a firing predicate produces anything; `Ok(None)`
    /// means "no event this tick" and leaves the budget untouched, a
    /// legitimately distinct outcome from session completion. Periodic
    /// mode: a record is produced unconditionally, with an empty reading
    /// field when the sample was absent.
    ///
    /// A produced record is appended to the sensor's sink, decrements the
    /// budget exactly once, and is returned.
    pub fn log(&mut self, time: Timestamp) -> SensorResult<Option<LogRecord>> {
        let config = self.config.ok_or(SensorError::UnconfiguredSensor)?;
        let sample = self.source.sample();

        if let Some((inequality, comparator)) = config.predicate() {
            let fired = sample.is_some_and(|value| inequality.evaluate(value, comparator));
            if !fired {
                return Ok(None);
            }
        }

        if let Some(stored) = self.config.as_mut() {
            stored.decrement();
        }

        let event = config
            .event_description()
            .unwrap_or_else(|| NO_EVENT_LABEL.to_string());
        let record = LogRecord {
            sensor: self.name.clone(),
            radio_name: self.radio_name.clone(),
            time,
            reading: sample,
            event,
        };
        self.last_logged_reading = sample;
        self.last_logged_event = Some(record.event.clone());
        self.sink.append(&record);
        Ok(Some(record))
    }
}

impl core::fmt::Debug for Sensor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Sensor")
            .field("name", &self.name)
            .field("radio_name", &self.radio_name)
            .field("minimum", &self.minimum)
            .field("maximum", &self.maximum)
            .field("buffered", &self.data_buffer.len())
            .field("number_of_readings", &self.number_of_readings)
            .field("config", &self.config)
            .finish()
    }
}

/// Builder for [`Sensor`].
///
/// Calibration defaults to `[0, 1]` (an already-normalized source); equal
/// bounds are rejected at [`build`](SensorBuilder::build) with
/// [`SensorError::InvalidCalibration`], not at first normalization.
pub struct SensorBuilder {
    name: String,
    radio_name: Option<String>,
    minimum: f64,
    maximum: f64,
    unit_name: String,
    unit_symbol: String,
    reading_error: f64,
    source: Box<dyn SampleSource>,
    setup: Option<Box<dyn FnOnce() + Send>>,
    sink: Box<dyn RecordSink>,
    buffer_capacity: usize,
}

impl SensorBuilder {
    /// Start a builder with a display name and sampling capability.
    pub fn new(name: impl Into<String>, source: impl SampleSource + 'static) -> Self {
        Self {
            name: name.into(),
            radio_name: None,
            minimum: 0.0,
            maximum: 1.0,
            unit_name: String::new(),
            unit_symbol: String::new(),
            reading_error: 0.0,
            source: Box::new(source),
            setup: None,
            sink: Box::new(NullSink),
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
        }
    }

    /// Short transmission-safe alias; defaults to the display name.
    pub fn radio_name(mut self, radio_name: impl Into<String>) -> Self {
        self.radio_name = Some(radio_name.into());
        self
    }

    /// Calibration bounds used for normalization.
    pub fn calibration(mut self, minimum: f64, maximum: f64) -> Self {
        self.minimum = minimum;
        self.maximum = maximum;
        self
    }

    /// Unit name and symbol.
    pub fn unit(mut self, name: impl Into<String>, symbol: impl Into<String>) -> Self {
        self.unit_name = name.into();
        self.unit_symbol = symbol.into();
        self
    }

    /// Stated +/- reading tolerance.
    pub fn reading_error(mut self, error: f64) -> Self {
        self.reading_error = error;
        self
    }

    /// One-shot setup procedure, invoked exactly once at construction,
    /// before any sampling.
    pub fn setup(mut self, setup: impl FnOnce() + Send + 'static) -> Self {
        self.setup = Some(Box::new(setup));
        self
    }

    /// Record sink; defaults to [`NullSink`].
    pub fn sink(mut self, sink: impl RecordSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    /// History bound for both buffers; defaults to
    /// [`DEFAULT_BUFFER_CAPACITY`].
    pub fn buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }

    /// Validate calibration, run setup, and produce the sensor.
    pub fn build(self) -> SensorResult<Sensor> {
        if self.minimum == self.maximum {
            return Err(SensorError::InvalidCalibration {
                minimum: self.minimum,
                maximum: self.maximum,
            });
        }
        if let Some(setup) = self.setup {
            setup();
        }
        let radio_name = self.radio_name.unwrap_or_else(|| self.name.clone());
        Ok(Sensor {
            name: self.name,
            radio_name,
            minimum: self.minimum,
            maximum: self.maximum,
            range: self.maximum - self.minimum,
            unit_name: self.unit_name,
            unit_symbol: self.unit_symbol,
            reading_error: self.reading_error,
            source: self.source,
            sink: self.sink,
            data_buffer: SampleBuffer::new(self.buffer_capacity),
            normalized_buffer: SampleBuffer::new(self.buffer_capacity),
            number_of_readings: 0,
            config: None,
            total_measurements: None,
            last_logged_reading: None,
            last_logged_event: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::Inequality;
    use crate::sink::MemorySink;

    #[cfg(not(feature = "std"))]
    use alloc::{vec, vec::Vec};

    fn sequence_source(values: &[Option<f64>]) -> impl SampleSource + 'static {
        let mut values: Vec<Option<f64>> = values.to_vec();
        values.reverse();
        move || values.pop().flatten()
    }

    fn constant_source(value: f64) -> impl SampleSource + 'static {
        move || Some(value)
    }

    fn periodic(measurements: u32, period: u64) -> RecordingConfig {
        RecordingConfig::Periodic {
            measurements,
            period,
        }
    }

    #[test]
    fn equal_calibration_bounds_rejected() {
        let result = Sensor::builder("broken", constant_source(1.0))
            .calibration(5.0, 5.0)
            .build();
        assert_eq!(
            result.err(),
            Some(SensorError::InvalidCalibration {
                minimum: 5.0,
                maximum: 5.0,
            })
        );
    }

    #[test]
    fn setup_runs_exactly_once_before_sampling() {
        use core::sync::atomic::{AtomicUsize, Ordering};
        static CALLS: AtomicUsize = AtomicUsize::new(0);

        let mut sensor = Sensor::builder("temp", constant_source(20.0))
            .calibration(-10.0, 50.0)
            .setup(|| {
                CALLS.fetch_add(1, Ordering::SeqCst);
            })
            .build()
            .unwrap();
        assert_eq!(CALLS.load(Ordering::SeqCst), 1);
        sensor.reading();
        assert_eq!(CALLS.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn normalized_reading_uses_calibration_range() {
        let mut sensor = Sensor::builder("temp", constant_source(25.0))
            .calibration(0.0, 100.0)
            .build()
            .unwrap();
        assert_eq!(sensor.reading(), Some(25.0));
        assert_eq!(sensor.normalized_reading(), Some(0.25));
        // pure reads do not touch the buffers
        assert!(sensor.data_buffer().is_empty());
        assert_eq!(sensor.number_of_readings(), 0);
    }

    #[test]
    fn buffers_stay_parallel_across_absent_samples() {
        let mut sensor = Sensor::builder(
            "flaky",
            sequence_source(&[Some(1.0), None, Some(2.0), None, Some(3.0)]),
        )
        .calibration(0.0, 10.0)
        .buffer_capacity(4)
        .build()
        .unwrap();

        for _ in 0..5 {
            sensor.read_into_buffer_once();
            assert_eq!(sensor.data_buffer().len(), sensor.normalized_buffer().len());
        }
        // absent samples evicted 1.0 and 2.0 in FIFO order
        let raw: Vec<f64> = sensor.data_buffer().iter().collect();
        assert_eq!(raw, vec![3.0]);
        assert_eq!(sensor.number_of_readings(), 3);
    }

    #[test]
    fn buffer_eviction_at_capacity() {
        let mut sensor = Sensor::builder("counter", {
            let mut next = 0.0;
            move || {
                next += 1.0;
                Some(next)
            }
        })
        .calibration(0.0, 100.0)
        .buffer_capacity(3)
        .build()
        .unwrap();

        for _ in 0..5 {
            sensor.read_into_buffer_once();
        }
        let raw: Vec<f64> = sensor.data_buffer().iter().collect();
        assert_eq!(raw, vec![3.0, 4.0, 5.0]);
        // counter keeps counting despite evictions
        assert_eq!(sensor.number_of_readings(), 5);
    }

    #[test]
    fn shrink_keeps_ten_newest_of_fifty() {
        let mut sensor = Sensor::builder("counter", {
            let mut next = -1.0;
            move || {
                next += 1.0;
                Some(next)
            }
        })
        .calibration(0.0, 100.0)
        .build()
        .unwrap();

        for _ in 0..50 {
            sensor.read_into_buffer_once();
        }
        sensor.set_buffer_size(10);
        let raw: Vec<f64> = sensor.data_buffer().iter().collect();
        let expected: Vec<f64> = (40..50).map(|i| i as f64).collect();
        assert_eq!(raw, expected);
        assert_eq!(sensor.normalized_buffer().len(), 10);
    }

    #[test]
    fn normalise_data_buffer_rebuilds_from_raw() {
        let mut sensor = Sensor::builder("temp", sequence_source(&[Some(20.0), Some(80.0)]))
            .calibration(0.0, 100.0)
            .build()
            .unwrap();
        sensor.read_into_buffer_once();
        sensor.read_into_buffer_once();
        sensor.normalise_data_buffer();
        let normalized: Vec<f64> = sensor.normalized_buffer().iter().collect();
        assert_eq!(normalized, vec![0.2, 0.8]);
    }

    #[test]
    fn unconfigured_sensor_errors() {
        let mut sensor = Sensor::builder("temp", constant_source(1.0))
            .calibration(0.0, 10.0)
            .build()
            .unwrap();
        assert_eq!(sensor.log(0).err(), Some(SensorError::UnconfiguredSensor));
        assert_eq!(
            sensor.has_measurements().err(),
            Some(SensorError::UnconfiguredSensor)
        );
        assert_eq!(
            sensor.event_should_trigger(1.0).err(),
            Some(SensorError::MissingConfig)
        );
    }

    #[test]
    fn periodic_config_lacks_predicate_fields() {
        let mut sensor = Sensor::builder("temp", constant_source(1.0))
            .calibration(0.0, 10.0)
            .build()
            .unwrap();
        sensor.set_config(periodic(3, 1000));
        assert_eq!(
            sensor.event_should_trigger(1.0).err(),
            Some(SensorError::MissingPredicateFields)
        );
    }

    #[test]
    fn periodic_log_decrements_and_records() {
        let mut sensor = Sensor::builder("light", constant_source(128.0))
            .radio_name("light")
            .calibration(0.0, 255.0)
            .sink(MemorySink::new())
            .build()
            .unwrap();
        sensor.set_config(periodic(2, 1000));

        let record = sensor.log(0).unwrap().unwrap();
        assert_eq!(record.to_line(), "light,0,128,N/A");
        assert_eq!(sensor.config().unwrap().measurements_left(), Some(1));
        assert!(sensor.has_measurements().unwrap());

        sensor.log(1000).unwrap().unwrap();
        assert!(!sensor.has_measurements().unwrap());
        assert_eq!(sensor.last_logged_reading(), Some(128.0));
        assert_eq!(sensor.last_logged_event(), Some("N/A"));
    }

    #[test]
    fn periodic_log_with_absent_sample_still_records() {
        let mut sensor = Sensor::builder("flaky", sequence_source(&[None]))
            .calibration(0.0, 10.0)
            .build()
            .unwrap();
        sensor.set_config(periodic(1, 1000));
        let record = sensor.log(0).unwrap().unwrap();
        assert_eq!(record.reading, None);
        assert!(!sensor.has_measurements().unwrap());
    }

    #[test]
    fn event_gate_only_fires_on_predicate() {
        let mut sensor = Sensor::builder("temp", sequence_source(&[Some(5.0), Some(15.0)]))
            .radio_name("t1")
            .calibration(0.0, 100.0)
            .build()
            .unwrap();
        sensor.set_config(RecordingConfig::EventGated {
            measurements: Some(1),
            period: Some(1000),
            inequality: Inequality::Gt,
            comparator: 10.0,
        });
        assert!(sensor.is_in_event_mode());

        // 5.0 does not fire: no record, budget untouched
        assert_eq!(sensor.log(0).unwrap(), None);
        assert_eq!(sensor.config().unwrap().measurements_left(), Some(1));

        // 15.0 fires: record produced, budget exhausted
        let record = sensor.log(1000).unwrap().unwrap();
        assert_eq!(record.event, "> 10");
        assert_eq!(record.to_line(), "t1,1000,15,> 10");
        assert_eq!(sensor.config().unwrap().measurements_left(), Some(0));
        assert!(!sensor.has_measurements().unwrap());
    }

    #[test]
    fn event_gate_never_fires_on_absent_sample() {
        let mut sensor = Sensor::builder("gone", sequence_source(&[None, None]))
            .calibration(0.0, 10.0)
            .build()
            .unwrap();
        sensor.set_config(RecordingConfig::EventGated {
            measurements: Some(1),
            period: None,
            inequality: Inequality::Ge,
            comparator: 0.0,
        });
        assert_eq!(sensor.log(0).unwrap(), None);
        assert_eq!(sensor.log(100).unwrap(), None);
        assert!(sensor.has_measurements().unwrap());
    }

    #[test]
    fn records_flow_to_bound_sink() {
        // observable through last_logged state; sink contents are covered by
        // the scheduler integration tests where the sink outlives the sensor
        let mut sensor = Sensor::builder("light", constant_source(9.0))
            .calibration(0.0, 255.0)
            .sink(MemorySink::new())
            .build()
            .unwrap();
        sensor.set_config(periodic(1, 500));
        assert!(sensor.log(0).unwrap().is_some());
        assert_eq!(sensor.last_logged_reading(), Some(9.0));
    }

    #[test]
    fn total_measurements_snapshot_survives_decrements() {
        let mut sensor = Sensor::builder("temp", constant_source(1.0))
            .calibration(0.0, 10.0)
            .build()
            .unwrap();
        sensor.set_config(periodic(3, 100));
        sensor.log(0).unwrap();
        sensor.log(100).unwrap();
        assert_eq!(sensor.total_measurements(), Some(3));
        assert_eq!(sensor.config().unwrap().measurements_left(), Some(1));
    }
}
