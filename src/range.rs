//! Immutable one-dimensional ranges.
//!
//! A [`Range`] keeps its endpoints in the order they were given, so an
//! inverted range (`start > end`) describes an axis running the other way.
//! Every operation returns a new value.

use crate::tick::util::sorted_pair;

/// A range of `f64` values with per-endpoint inclusion flags.
///
/// # Examples
///
/// ```
/// use axtick::Range;
///
/// let r = Range::new(10.0, 2.0);
/// assert!(r.is_inverted());
/// assert_eq!(r.min(), 2.0);
/// assert_eq!(r.max(), 10.0);
/// assert_eq!(r.span(), 8.0);
///
/// let flipped = r.invert();
/// assert_eq!((flipped.start(), flipped.end()), (2.0, 10.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Range {
    start: f64,
    end: f64,
    start_included: bool,
    end_included: bool,
}

impl Range {
    /// Creates a closed range.
    pub const fn new(start: f64, end: f64) -> Self {
        Self {
            start,
            end,
            start_included: true,
            end_included: true,
        }
    }

    /// Creates a range with explicit inclusion flags.
    pub const fn with_inclusion(
        start: f64,
        start_included: bool,
        end: f64,
        end_included: bool,
    ) -> Self {
        Self {
            start,
            end,
            start_included,
            end_included,
        }
    }

    pub const fn start(&self) -> f64 {
        self.start
    }

    pub const fn end(&self) -> f64 {
        self.end
    }

    pub const fn is_start_included(&self) -> bool {
        self.start_included
    }

    pub const fn is_end_included(&self) -> bool {
        self.end_included
    }

    pub fn min(&self) -> f64 {
        self.start.min(self.end)
    }

    pub fn max(&self) -> f64 {
        self.start.max(self.end)
    }

    fn is_min_included(&self) -> bool {
        if self.is_inverted() {
            self.end_included
        } else {
            self.start_included
        }
    }

    fn is_max_included(&self) -> bool {
        if self.is_inverted() {
            self.start_included
        } else {
            self.end_included
        }
    }

    /// Absolute distance between the endpoints.
    pub fn span(&self) -> f64 {
        (self.end - self.start).abs()
    }

    pub fn is_inverted(&self) -> bool {
        self.start > self.end
    }

    /// True if either endpoint is NaN.
    pub fn is_empty(&self) -> bool {
        self.start.is_nan() || self.end.is_nan()
    }

    /// Swaps the endpoints together with their inclusion flags.
    pub const fn invert(&self) -> Self {
        Self {
            start: self.end,
            end: self.start,
            start_included: self.end_included,
            end_included: self.start_included,
        }
    }

    /// Returns true if `value` lies inside the range, honouring inclusion flags.
    pub fn contains(&self, value: f64) -> bool {
        let (lo, hi) = sorted_pair(self.start, self.end);
        let above = if self.is_min_included() {
            value >= lo
        } else {
            value > lo
        };
        let below = if self.is_max_included() {
            value <= hi
        } else {
            value < hi
        };
        above && below
    }

    /// Overlap of two ranges, oriented like `self`. `None` when they are disjoint.
    ///
    /// ```
    /// use axtick::Range;
    ///
    /// let r = Range::new(0.0, 10.0).intersect(&Range::new(15.0, 5.0));
    /// assert_eq!(r, Some(Range::new(5.0, 10.0)));
    /// assert_eq!(Range::new(0.0, 1.0).intersect(&Range::new(2.0, 3.0)), None);
    /// ```
    pub fn intersect(&self, other: &Range) -> Option<Range> {
        if self.is_empty() || other.is_empty() {
            return None;
        }

        let (min, min_incl) = if self.min() == other.min() {
            (self.min(), self.is_min_included() && other.is_min_included())
        } else if self.min() > other.min() {
            (self.min(), self.is_min_included())
        } else {
            (other.min(), other.is_min_included())
        };
        let (max, max_incl) = if self.max() == other.max() {
            (self.max(), self.is_max_included() && other.is_max_included())
        } else if self.max() < other.max() {
            (self.max(), self.is_max_included())
        } else {
            (other.max(), other.is_max_included())
        };

        if min > max {
            return None;
        }
        Some(self.oriented(min, min_incl, max, max_incl))
    }

    /// Smallest range covering both, oriented like `self`.
    pub fn union(&self, other: &Range) -> Range {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }

        let (min, min_incl) = if self.min() == other.min() {
            (self.min(), self.is_min_included() || other.is_min_included())
        } else if self.min() < other.min() {
            (self.min(), self.is_min_included())
        } else {
            (other.min(), other.is_min_included())
        };
        let (max, max_incl) = if self.max() == other.max() {
            (self.max(), self.is_max_included() || other.is_max_included())
        } else if self.max() > other.max() {
            (self.max(), self.is_max_included())
        } else {
            (other.max(), other.is_max_included())
        };

        self.oriented(min, min_incl, max, max_incl)
    }

    fn oriented(&self, min: f64, min_incl: bool, max: f64, max_incl: bool) -> Range {
        if self.is_inverted() {
            Range::with_inclusion(max, max_incl, min, min_incl)
        } else {
            Range::with_inclusion(min, min_incl, max, max_incl)
        }
    }
}

impl std::fmt::Display for Range {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let open = if self.start_included { '[' } else { '(' };
        let close = if self.end_included { ']' } else { ')' };
        write!(f, "{open}{}, {}{close}", self.start, self.end)
    }
}
