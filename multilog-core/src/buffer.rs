//! Bounded FIFO buffer for sensor reading history
//!
//! ## Overview
//!
//! Each sensor keeps a sliding window of its most recent readings (raw and
//! normalized, in two parallel buffers). This module provides the ring
//! buffer backing those windows.
//!
//! ## Design
//!
//! The buffer is a ring over a heap-allocated slab with a **runtime**
//! capacity. A compile-time capacity would be cheaper, but sensors expose
//! `set_buffer_size`, which can shrink or grow the bound mid-session, so the
//! capacity has to be a value rather than a const generic.
//!
//! Eviction is strict FIFO: when a push lands on a full buffer, the entry
//! with the smallest insertion index still present is dropped. Callers can
//! also evict explicitly with [`pop_oldest`](SampleBuffer::pop_oldest),
//! which the sensor layer uses when a sample comes back absent.
//!
//! ```text
//! capacity = 5, after pushes 1..=7:
//!
//! physical:  [6, 7, 3, 4, 5]     start = 2
//!                   ↑
//! logical:   [3, 4, 5, 6, 7]     (oldest → newest)
//! ```
//!
//! All operations are O(1) except `set_capacity` and iteration, which are
//! O(len). Values are plain `f64` readings; timestamps live on the records,
//! not in the history window.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// Bounded FIFO ring of readings with runtime capacity.
///
/// Invariants:
/// - `len <= capacity`
/// - `start < capacity` whenever `capacity > 0`
/// - iteration yields entries in insertion order, oldest first
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    /// Backing slab; slots beyond `len` hold stale values, never read.
    data: Vec<f64>,
    /// Physical index of the oldest entry.
    start: usize,
    /// Current number of valid entries.
    len: usize,
}

impl SampleBuffer {
    /// Create an empty buffer bounded at `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        let mut data = Vec::new();
        data.resize(capacity, 0.0);
        Self {
            data,
            start: 0,
            len: 0,
        }
    }

    /// Number of stored readings.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when no readings are stored.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// True when a push would evict the oldest reading.
    pub fn is_full(&self) -> bool {
        self.len == self.capacity()
    }

    /// Maximum number of readings the buffer will hold.
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Append a reading, evicting the oldest one first when full.
    ///
    /// A zero-capacity buffer silently discards every push.
    pub fn push(&mut self, value: f64) {
        let capacity = self.capacity();
        if capacity == 0 {
            return;
        }
        if self.len == capacity {
            self.data[self.start] = value;
            self.start = (self.start + 1) % capacity;
        } else {
            self.data[(self.start + self.len) % capacity] = value;
            self.len += 1;
        }
    }

    /// Remove and return the oldest reading, if any.
    pub fn pop_oldest(&mut self) -> Option<f64> {
        if self.len == 0 {
            return None;
        }
        let value = self.data[self.start];
        self.start = (self.start + 1) % self.capacity();
        self.len -= 1;
        Some(value)
    }

    /// Reading by logical index (0 = oldest, `len - 1` = newest).
    pub fn get(&self, index: usize) -> Option<f64> {
        if index >= self.len {
            return None;
        }
        Some(self.data[(self.start + index) % self.capacity()])
    }

    /// Most recent reading, if any.
    pub fn last(&self) -> Option<f64> {
        if self.len == 0 {
            None
        } else {
            self.get(self.len - 1)
        }
    }

    /// Iterate oldest to newest.
    pub fn iter(&self) -> SampleBufferIter<'_> {
        SampleBufferIter {
            buffer: self,
            index: 0,
        }
    }

    /// Drop all readings, keeping the capacity.
    pub fn clear(&mut self) {
        self.start = 0;
        self.len = 0;
    }

    /// Change the capacity bound.
    ///
    /// Shrinking below the current length drops the oldest `len - capacity`
    /// entries immediately; the survivors keep their relative order. Growing
    /// only raises the bound for future pushes.
    pub fn set_capacity(&mut self, capacity: usize) {
        let keep = self.len.min(capacity);
        let skip = self.len - keep;
        let mut data = Vec::new();
        data.resize(capacity, 0.0);
        for (slot, logical) in (skip..self.len).enumerate() {
            data[slot] = self.data[(self.start + logical) % self.capacity()];
        }
        self.data = data;
        self.start = 0;
        self.len = keep;
    }
}

/// Iterator over buffer contents, oldest first.
pub struct SampleBufferIter<'a> {
    buffer: &'a SampleBuffer,
    index: usize,
}

impl<'a> Iterator for SampleBufferIter<'a> {
    type Item = f64;

    fn next(&mut self) -> Option<Self::Item> {
        let value = self.buffer.get(self.index)?;
        self.index += 1;
        Some(value)
    }
}
