//! Fixed-Size Rolling Window for Sensor Readings
//!
//! ## Overview
//!
//! Each sensor channel keeps its last few valid readings in a ring buffer and
//! publishes an aggregate of them. Three samples smooth out a single noisy
//! conversion while keeping memory and latency deterministic.
//!
//! ## Design Rationale
//!
//! - O(1) insertion: a circular write index, never a linear shift
//! - Oldest reading evicted first once full
//! - Fixed `[f32; N]` storage, no heap
//! - Statistics are O(N) over at most N elements
//!
//! ### Memory Layout
//!
//! ```text
//! SampleWindow<3> after 4 inserts (a, b, c, d):
//! ┌─────┬─────┬─────┐
//! │  d  │  b  │  c  │  ← physical slots
//! └─────┴─────┴─────┘
//!          ↑
//!          └── write_pos = 1 (also the oldest element once full)
//!
//! Logical view (oldest → newest): [b, c, d]
//! ```
//!
//! ## Usage Example
//!
//! ```rust
//! use wiretemp_core::buffer::SampleWindow;
//!
//! let mut window: SampleWindow<3> = SampleWindow::new();
//! window.insert(-21.12);
//! window.insert(21.12);
//! window.insert(88.88);
//!
//! let avg = window.average().unwrap();
//! assert!((avg - 29.626_667).abs() < 1e-4);
//! assert_eq!(window.min().unwrap(), -21.12);
//! assert_eq!(window.max().unwrap(), 88.88);
//! ```

use crate::errors::{TelemetryError, TelemetryResult};

/// Which statistic of a window to publish
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Aggregate {
    /// Arithmetic mean
    #[default]
    Average,
    /// Smallest reading
    Minimum,
    /// Largest reading
    Maximum,
}

/// Fixed-capacity ring buffer of the most recent readings
///
/// ## Internal Invariants
///
/// - `write_pos < N`
/// - `len <= N`
/// - when `len < N` the readings occupy `data[..len]` in insertion order;
///   once full, the oldest reading sits at `write_pos`
///
/// Not thread-safe. The agent only touches it from the loop thread.
#[derive(Debug, Clone)]
pub struct SampleWindow<const N: usize> {
    data: [f32; N],
    write_pos: usize,
    len: usize,
}

impl<const N: usize> SampleWindow<N> {
    /// Compile-time guard against a zero-capacity window
    const CAPACITY_OK: () = assert!(N > 0, "SampleWindow capacity must be non-zero");

    /// Creates a new empty window
    pub const fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let _ = Self::CAPACITY_OK;
        Self {
            data: [0.0; N],
            write_pos: 0,
            len: 0,
        }
    }

    /// Appends a reading, overwriting the oldest one when full
    pub fn insert(&mut self, reading: f32) {
        self.data[self.write_pos] = reading;
        self.write_pos = (self.write_pos + 1) % N;

        if self.len < N {
            self.len += 1;
        }
    }

    /// Number of readings held
    pub fn len(&self) -> usize {
        self.len
    }

    /// Fixed capacity
    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == N
    }

    /// Most recent reading
    pub fn latest(&self) -> Option<f32> {
        if self.is_empty() {
            return None;
        }
        let idx = if self.write_pos == 0 { N - 1 } else { self.write_pos - 1 };
        Some(self.data[idx])
    }

    /// Iterate from oldest to newest
    pub fn iter(&self) -> SampleWindowIter<'_, N> {
        SampleWindowIter {
            window: self,
            index: 0,
        }
    }

    /// Drop every reading
    pub fn clear(&mut self) {
        self.write_pos = 0;
        self.len = 0;
    }

    /// Mean of the held readings
    pub fn average(&self) -> TelemetryResult<f32> {
        self.require_data()?;
        let sum: f32 = self.iter().sum();
        Ok(sum / self.len as f32)
    }

    /// Smallest held reading
    pub fn min(&self) -> TelemetryResult<f32> {
        self.require_data()?;
        Ok(self.iter().fold(f32::INFINITY, f32::min))
    }

    /// Largest held reading
    pub fn max(&self) -> TelemetryResult<f32> {
        self.require_data()?;
        Ok(self.iter().fold(f32::NEG_INFINITY, f32::max))
    }

    /// Compute the selected statistic
    pub fn aggregate(&self, which: Aggregate) -> TelemetryResult<f32> {
        match which {
            Aggregate::Average => self.average(),
            Aggregate::Minimum => self.min(),
            Aggregate::Maximum => self.max(),
        }
    }

    fn require_data(&self) -> TelemetryResult<()> {
        if self.is_empty() {
            Err(TelemetryError::InsufficientData {
                required: 1,
                available: 0,
            })
        } else {
            Ok(())
        }
    }

    /// Logical index (0 = oldest) to physical slot
    fn get(&self, index: usize) -> Option<f32> {
        if index >= self.len {
            return None;
        }

        let actual_index = if self.len < N {
            index
        } else {
            (self.write_pos + index) % N
        };

        Some(self.data[actual_index])
    }
}

/// Iterator over window contents, oldest first
pub struct SampleWindowIter<'a, const N: usize> {
    window: &'a SampleWindow<N>,
    index: usize,
}

impl<const N: usize> Iterator for SampleWindowIter<'_, N> {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.window.get(self.index)?;
        self.index += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.window.len().saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl<const N: usize> ExactSizeIterator for SampleWindowIter<'_, N> {}

impl<const N: usize> Default for SampleWindow<N> {
    fn default() -> Self {
        Self::new()
    }
}
