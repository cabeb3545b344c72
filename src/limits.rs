//! Value limits over 2-D sample buffers.
//!
//! Used to pick a display range for image-like data: either the plain
//! minimum and maximum, or the bounds of the central percentage of samples
//! so a few outliers do not stretch the range.
//!
//! Masked, NaN and infinite samples are ignored everywhere. When no valid
//! sample remains the calculators return `None`, which callers treat as
//! "keep the previous limits".
//!
//! ```
//! use axtick::limits::{LimitsCalculator, PercentileCalculator, SampleBuffer};
//!
//! let data: Vec<f64> = (1..=100).map(f64::from).collect();
//! let buffer = SampleBuffer::new(data.as_slice(), 100, 1, None).unwrap();
//!
//! let calc = PercentileCalculator::new(50.0).unwrap();
//! assert_eq!(calc.calc_limits(&[buffer]), Some((26.0, 75.0)));
//! ```

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use crate::{Error, Result};

/// Borrowed sample storage of one element type.
#[derive(Debug, Clone, Copy)]
pub enum Samples<'a> {
    I8(&'a [i8]),
    U8(&'a [u8]),
    I16(&'a [i16]),
    U16(&'a [u16]),
    I32(&'a [i32]),
    F32(&'a [f32]),
    F64(&'a [f64]),
}

macro_rules! impl_samples_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl<'a> From<&'a [$ty]> for Samples<'a> {
                fn from(slice: &'a [$ty]) -> Self {
                    Samples::$variant(slice)
                }
            }
        )*
    };
}

impl_samples_from! {
    i8 => I8,
    u8 => U8,
    i16 => I16,
    u16 => U16,
    i32 => I32,
    f32 => F32,
    f64 => F64,
}

impl Samples<'_> {
    pub fn len(&self) -> usize {
        match self {
            Samples::I8(s) => s.len(),
            Samples::U8(s) => s.len(),
            Samples::I16(s) => s.len(),
            Samples::U16(s) => s.len(),
            Samples::I32(s) => s.len(),
            Samples::F32(s) => s.len(),
            Samples::F64(s) => s.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get(&self, index: usize) -> f64 {
        match self {
            Samples::I8(s) => f64::from(s[index]),
            Samples::U8(s) => f64::from(s[index]),
            Samples::I16(s) => f64::from(s[index]),
            Samples::U16(s) => f64::from(s[index]),
            Samples::I32(s) => f64::from(s[index]),
            Samples::F32(s) => f64::from(s[index]),
            Samples::F64(s) => s[index],
        }
    }
}

/// A row-major `width × height` view over samples, with an optional mask.
///
/// A `true` mask entry excludes the sample at the same index.
#[derive(Debug, Clone, Copy)]
pub struct SampleBuffer<'a> {
    samples: Samples<'a>,
    width: usize,
    height: usize,
    mask: Option<&'a [bool]>,
}

impl<'a> SampleBuffer<'a> {
    /// Fails with [`Error::IllegalArgument`] when `samples` or `mask` holds
    /// fewer than `width × height` entries.
    pub fn new(
        samples: impl Into<Samples<'a>>,
        width: usize,
        height: usize,
        mask: Option<&'a [bool]>,
    ) -> Result<Self> {
        let samples = samples.into();
        let size = width
            .checked_mul(height)
            .ok_or_else(|| Error::illegal(format!("{width}×{height} buffer is too large")))?;
        if samples.len() < size {
            return Err(Error::illegal(format!(
                "{} samples cannot fill a {width}×{height} buffer",
                samples.len()
            )));
        }
        if let Some(mask) = mask
            && mask.len() < size
        {
            return Err(Error::illegal(format!(
                "{} mask entries cannot cover a {width}×{height} buffer",
                mask.len()
            )));
        }
        Ok(Self {
            samples,
            width,
            height,
            mask,
        })
    }

    pub const fn width(&self) -> usize {
        self.width
    }

    pub const fn height(&self) -> usize {
        self.height
    }

    /// Unmasked finite samples in row-major order.
    pub fn valid_values(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.width * self.height)
            .filter(|&i| !self.mask.is_some_and(|mask| mask[i]))
            .map(|i| self.samples.get(i))
            .filter(|v| v.is_finite())
    }

    pub fn count_valid(&self) -> usize {
        self.valid_values().count()
    }
}

/// Computes display limits over a set of buffers.
pub trait LimitsCalculator {
    /// `(low, high)` over all valid samples, or `None` when there are none.
    fn calc_limits(&self, buffers: &[SampleBuffer<'_>]) -> Option<(f64, f64)>;
}

/// Plain minimum and maximum.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinMaxCalculator;

impl LimitsCalculator for MinMaxCalculator {
    fn calc_limits(&self, buffers: &[SampleBuffer<'_>]) -> Option<(f64, f64)> {
        buffers
            .iter()
            .flat_map(|buffer| buffer.valid_values())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

/// Bounds of the central `percentage` percent of valid samples.
///
/// The same share is cut from both ends. When the cut falls between two
/// samples, the limit is interpolated between them.
#[derive(Debug, Clone, Copy)]
pub struct PercentileCalculator {
    percentage: f64,
}

impl PercentileCalculator {
    /// `percentage` must lie in `(0, 100]`.
    pub fn new(percentage: f64) -> Result<Self> {
        if !(percentage > 0.0 && percentage <= 100.0) {
            return Err(Error::illegal(format!(
                "percentage {percentage} is outside (0, 100]"
            )));
        }
        Ok(Self { percentage })
    }

    pub const fn percentage(&self) -> f64 {
        self.percentage
    }
}

impl LimitsCalculator for PercentileCalculator {
    fn calc_limits(&self, buffers: &[SampleBuffer<'_>]) -> Option<(f64, f64)> {
        if self.percentage == 100.0 {
            return MinMaxCalculator.calc_limits(buffers);
        }

        let count: usize = buffers.iter().map(SampleBuffer::count_valid).sum();
        if count < 2 {
            return MinMaxCalculator.calc_limits(buffers);
        }

        // samples to drop from each end
        let cutoff = count as f64 * (100.0 - self.percentage) / 200.0;
        // a percentage too small to move `100 - p` puts the cut at `count / 2`
        let whole = (cutoff.floor() as usize).min(count - 2);
        let rate = whole as f64 + 1.0 - cutoff;

        let mut lowest = Lowest::new(whole + 2);
        let mut highest = Highest::new(whole + 2);
        for v in buffers.iter().flat_map(|buffer| buffer.valid_values()) {
            lowest.push(v);
            highest.push(v);
        }
        let lowest = lowest.into_sorted();
        let highest = highest.into_sorted();

        let low = lowest[whole + 1] * (1.0 - rate) + lowest[whole] * rate;
        let high = highest[whole + 1] * (1.0 - rate) + highest[whole] * rate;
        log::trace!(
            "{}% limits over {count} samples: [{low}, {high}]",
            self.percentage
        );
        Some((low, high))
    }
}

/// `f64` ordered by `total_cmp`, for use in heaps.
#[derive(Debug, Clone, Copy)]
struct Sample(f64);

impl PartialEq for Sample {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Sample {}

impl PartialOrd for Sample {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Sample {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Keeps the `capacity` smallest values seen.
struct Lowest {
    capacity: usize,
    heap: BinaryHeap<Sample>,
}

impl Lowest {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            heap: BinaryHeap::with_capacity(capacity),
        }
    }

    fn push(&mut self, v: f64) {
        if self.heap.len() < self.capacity {
            self.heap.push(Sample(v));
        } else if let Some(mut top) = self.heap.peek_mut()
            && Sample(v) < *top
        {
            *top = Sample(v);
        }
    }

    /// Ascending.
    fn into_sorted(self) -> Vec<f64> {
        self.heap.into_sorted_vec().into_iter().map(|s| s.0).collect()
    }
}

/// Keeps the `capacity` largest values seen.
struct Highest {
    capacity: usize,
    heap: BinaryHeap<Reverse<Sample>>,
}

impl Highest {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            heap: BinaryHeap::with_capacity(capacity),
        }
    }

    fn push(&mut self, v: f64) {
        if self.heap.len() < self.capacity {
            self.heap.push(Reverse(Sample(v)));
        } else if let Some(mut top) = self.heap.peek_mut()
            && Sample(v) > top.0
        {
            *top = Reverse(Sample(v));
        }
    }

    /// Descending.
    fn into_sorted(self) -> Vec<f64> {
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|Reverse(s)| s.0)
            .collect()
    }
}
