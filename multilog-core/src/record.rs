//! Structured log records and their stable wire rendering
//!
//! A [`LogRecord`] is what a sensor hands to its sink and what the scheduler
//! streams to callers: the named field set `Sensor`, `Time (ms)`, `Reading`,
//! `Event`. The comma-joined line format produced by [`LogRecord::to_line`]
//! is consumed by downstream transport and display collaborators and must
//! stay stable: `radioName,time,reading,eventOrNA`.

#[cfg(not(feature = "std"))]
use alloc::string::String;
#[cfg(not(feature = "std"))]
use alloc::format;

use crate::constants::DISPLAY_PRECISION;
use crate::time::Timestamp;

/// Render a reading with at most [`DISPLAY_PRECISION`] significant
/// characters.
///
/// Truncation, not rounding: the decimal rendering is cut after the
/// precision limit, matching what fits on a constrained display or in a
/// radio frame.
pub fn truncate_reading(value: f64) -> String {
    let mut rendered = format!("{}", value);
    rendered.truncate(DISPLAY_PRECISION);
    rendered
}

/// One produced log record.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LogRecord {
    /// Display name of the producing sensor.
    pub sensor: String,
    /// Short transmission-safe alias of the producing sensor.
    pub radio_name: String,
    /// Session-relative timestamp in milliseconds.
    pub time: Timestamp,
    /// Sampled value; `None` when the capability had no reading. Sinks
    /// choose their own representation for absence.
    pub reading: Option<f64>,
    /// Event description (`"> 10"`-style) in event mode, `"N/A"` otherwise.
    pub event: String,
}

impl LogRecord {
    /// The reading as it appears on the wire: truncated to the display
    /// precision, empty when absent.
    pub fn reading_display(&self) -> String {
        self.reading.map(truncate_reading).unwrap_or_default()
    }

    /// Stable comma-joined line: `radioName,time,reading,event`.
    pub fn to_line(&self) -> String {
        format!(
            "{},{},{},{}",
            self.radio_name,
            self.time,
            self.reading_display(),
            self.event
        )
    }
}

impl core::fmt::Display for LogRecord {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.to_line())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(not(feature = "std"))]
    use alloc::string::ToString;

    fn record(reading: Option<f64>) -> LogRecord {
        LogRecord {
            sensor: "soil moisture".into(),
            radio_name: "soil".into(),
            time: 2000,
            reading,
            event: "N/A".into(),
        }
    }

    #[test]
    fn truncates_to_display_precision() {
        assert_eq!(truncate_reading(123.456789), "123.4567");
        assert_eq!(truncate_reading(0.5), "0.5");
        assert_eq!(truncate_reading(-1.2345678), "-1.23456");
    }

    #[test]
    fn line_format_is_stable() {
        assert_eq!(record(Some(42.5)).to_line(), "soil,2000,42.5,N/A");
        assert_eq!(record(Some(42.5)).to_string(), "soil,2000,42.5,N/A");
    }

    #[test]
    fn absent_reading_renders_empty() {
        assert_eq!(record(None).to_line(), "soil,2000,,N/A");
        assert_eq!(record(None).reading_display(), "");
    }
}
