//! Record sinks
//!
//! A sink is the opaque append-only writer a sensor hands its records to.
//! The core defines only the call contract and the field set; storage and
//! transport belong to the caller. Sinks are invoked synchronously from the
//! scheduling loop and must stay fast.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::record::LogRecord;

/// Append-only structured-record writer.
pub trait RecordSink: Send {
    /// Persist or forward one record. Failures are the sink's problem;
    /// logging must not stall the producing sensor.
    fn append(&mut self, record: &LogRecord);
}

/// Discards every record. The default sink for sensors that only stream
/// through the scheduler callback.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl RecordSink for NullSink {
    fn append(&mut self, _record: &LogRecord) {}
}

/// Collects records in memory; intended for tests and short sessions.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    records: Vec<LogRecord>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// All records appended so far, in order.
    pub fn records(&self) -> &[LogRecord] {
        &self.records
    }

    /// Number of records appended so far.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when nothing has been appended.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drain the collected records.
    pub fn take(&mut self) -> Vec<LogRecord> {
        core::mem::take(&mut self.records)
    }
}

impl RecordSink for MemorySink {
    fn append(&mut self, record: &LogRecord) {
        self.records.push(record.clone());
    }
}

/// Append-only CSV file with the standard four-column header.
#[cfg(feature = "std")]
#[derive(Debug)]
pub struct CsvFileSink {
    writer: std::io::BufWriter<std::fs::File>,
}

#[cfg(feature = "std")]
impl CsvFileSink {
    /// Create (or truncate) the file at `path` and write the header row.
    pub fn create<P: AsRef<std::path::Path>>(path: P) -> std::io::Result<Self> {
        use std::io::Write;

        let file = std::fs::File::create(path)?;
        let mut writer = std::io::BufWriter::new(file);
        writeln!(writer, "Sensor,Time (ms),Reading,Event")?;
        Ok(Self { writer })
    }
}

#[cfg(feature = "std")]
impl RecordSink for CsvFileSink {
    fn append(&mut self, record: &LogRecord) {
        use std::io::Write;

        let outcome = writeln!(
            self.writer,
            "{},{},{},{}",
            record.sensor,
            record.time,
            record.reading_display(),
            record.event
        )
        .and_then(|_| self.writer.flush());
        if let Err(e) = outcome {
            log::warn!("csv sink write failed: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> LogRecord {
        LogRecord {
            sensor: "light level".into(),
            radio_name: "light".into(),
            time: 0,
            reading: Some(128.0),
            event: "N/A".into(),
        }
    }

    #[test]
    fn memory_sink_collects_in_order() {
        let mut sink = MemorySink::new();
        let mut second = sample_record();
        second.time = 1000;

        sink.append(&sample_record());
        sink.append(&second);

        assert_eq!(sink.len(), 2);
        assert_eq!(sink.records()[0].time, 0);
        assert_eq!(sink.records()[1].time, 1000);

        let drained = sink.take();
        assert_eq!(drained.len(), 2);
        assert!(sink.is_empty());
    }

    #[cfg(feature = "std")]
    #[test]
    fn csv_sink_writes_header_and_rows() {
        let dir = std::env::temp_dir().join("multilog-csv-sink-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("session.csv");

        {
            let mut sink = CsvFileSink::create(&path).unwrap();
            sink.append(&sample_record());
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();
        assert_eq!(lines.next(), Some("Sensor,Time (ms),Reading,Event"));
        assert_eq!(lines.next(), Some("light level,0,128,N/A"));
        std::fs::remove_file(&path).ok();
    }
}
