//! Tick calculators.
//!
//! A tick calculator owns one axis range and, after a `calc_values_by_*`
//! call, the major and minor tick values that decorate it. It is a small
//! state machine:
//!
//! 1. *Unset*: no range yet, every calculation fails with
//!    [`Error::InvalidRange`](crate::Error::InvalidRange).
//! 2. *Range set*: [`TickCalculator::set_range`] validated the endpoints and
//!    cleared any earlier results.
//! 3. *Values computed*: [`TickCalculator::values`] and
//!    [`TickCalculator::minor_values`] hold the last result.
//!
//! Available calculators:
//! - [`LinearTickCalculator`] - nice `{1, 2, 5} × 10^n` spacing
//! - [`LogTickCalculator`] - decades in exponent space, linear fallback for
//!   sub-decade ranges
//! - [`DateTickCalculator`] - calendar units over epoch milliseconds
//!
//! Calculators are not thread-safe; one axis owns one calculator.
//!
//! # Examples
//!
//! ```rust
//! use axtick::tick::{LinearTickCalculator, MinorTicks, TickCalculator};
//!
//! let mut calc = LinearTickCalculator::new();
//! calc.set_range(0.0, 10.0).unwrap();
//! calc.calc_values_by_tick_number(6, MinorTicks::Auto).unwrap();
//!
//! assert_eq!(calc.values(), &[0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
//! assert_eq!(calc.minor_number(), 3);
//! ```

pub mod date;
pub mod linear;
pub mod log;
pub mod util;

pub use date::{DateInterval, DateTickCalculator, TimeUnit};
pub use linear::LinearTickCalculator;
pub use log::LogTickCalculator;

use crate::{Range, Result};

/// Relative tolerance used when deciding whether a tick lies on a range endpoint.
pub const DOUBLE_PRECISION_TOLERANCE: f64 = 1.0 / (1u64 << 40) as f64;

/// Upper bound on the number of major plus minor values one request may produce.
pub const MAX_TICK_COUNT: usize = 100_000;

pub const DEFAULT_TICK_NUMBER: u32 = 5;

/// How many minor ticks to place between two majors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MinorTicks {
    /// Let the calculator derive a count from the chosen interval.
    #[default]
    Auto,
    /// Exactly this many minors between adjacent majors.
    Count(u32),
}

/// Common contract of the linear, logarithmic and calendar calculators.
pub trait TickCalculator {
    /// Type of the tick values (`f64`, or `i64` epoch milliseconds).
    type Value: Copy;

    /// Label format chosen for the computed values.
    type Format: std::fmt::Display;

    /// Stores a new range and clears any computed values.
    fn set_range(&mut self, start: Self::Value, end: Self::Value) -> Result<()>;

    /// The current range, oriented as it was set.
    fn range(&self) -> Result<Range>;

    /// Picks a nice interval giving about `tick_number` majors, then computes values.
    fn calc_values_by_tick_number(&mut self, tick_number: u32, minor: MinorTicks) -> Result<()>;

    /// Computes values at multiples of `interval` shifted by `offset`.
    fn calc_values_by_tick_interval(
        &mut self,
        interval: f64,
        offset: f64,
        minor: MinorTicks,
    ) -> Result<()>;

    /// Major values, ordered along the range direction.
    fn values(&self) -> &[Self::Value];

    /// Minor values, ordered along the range direction.
    fn minor_values(&self) -> &[Self::Value];

    /// The major interval used by the last calculation or expansion.
    fn interval(&self) -> f64;

    /// The minor count used by the last calculation.
    fn minor_number(&self) -> u32;

    /// Label format for the current major values.
    fn label_format(&self) -> Self::Format;

    /// Widens the range outward to nice boundaries for about `tick_number` ticks.
    fn expand_range_by_tick_number(&mut self, tick_number: u32) -> Result<Range>;

    /// Widens the range outward to multiples of `interval`.
    fn expand_range_by_tick_interval(&mut self, interval: f64) -> Result<Range>;
}

/// Tick settings an axis carries between recalculations.
///
/// # Examples
///
/// ```rust
/// use axtick::tick::{LinearTickCalculator, MinorTicks, TickCalculator, TickConfig};
///
/// let config = TickConfig {
///     interval: Some(0.25),
///     minor: MinorTicks::Count(0),
///     ..TickConfig::default()
/// };
///
/// let mut calc = LinearTickCalculator::new();
/// calc.set_range(0.0, 1.0).unwrap();
/// config.apply(&mut calc).unwrap();
/// assert_eq!(calc.values(), &[0.0, 0.25, 0.5, 0.75, 1.0]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TickConfig {
    pub tick_number: u32,
    pub minor: MinorTicks,
    /// Fixed major interval. `None` lets the calculator choose one.
    pub interval: Option<f64>,
    pub offset: f64,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            tick_number: DEFAULT_TICK_NUMBER,
            minor: MinorTicks::Auto,
            interval: None,
            offset: 0.0,
        }
    }
}

impl TickConfig {
    /// Computes tick values on `calc` according to these settings.
    pub fn apply<C: TickCalculator + ?Sized>(&self, calc: &mut C) -> Result<()> {
        match self.interval {
            Some(interval) => calc.calc_values_by_tick_interval(interval, self.offset, self.minor),
            None => calc.calc_values_by_tick_number(self.tick_number, self.minor),
        }
    }

    /// Expands the range of `calc` according to these settings.
    pub fn expand<C: TickCalculator + ?Sized>(&self, calc: &mut C) -> Result<Range> {
        match self.interval {
            Some(interval) => calc.expand_range_by_tick_interval(interval),
            None => calc.expand_range_by_tick_number(self.tick_number),
        }
    }
}

/// Orders `values` ascending, or descending when the range is inverted.
pub(crate) fn orient(values: &mut [f64], inverted: bool) {
    values.sort_by(f64::total_cmp);
    if inverted {
        values.reverse();
    }
}

/// `10^exp`, correctly rounded.
pub(crate) fn pow10(exp: i32) -> f64 {
    crate::NumericInterval::new(1, exp).value()
}

/// `10^v`, routed through [`pow10`] when `v` is integral.
pub(crate) fn exp10(v: f64) -> f64 {
    if v.fract() == 0.0 && v.abs() < f64::from(i32::MAX) {
        pow10(v as i32)
    } else {
        10f64.powf(v)
    }
}

/// Rejects requests that would allocate more than [`MAX_TICK_COUNT`] values.
///
/// The estimate is a float so that counts past `i64` (or NaN from
/// `inf - inf`) are rejected rather than wrapped.
pub(crate) fn check_tick_count(count: f64) -> Result<()> {
    if !(count <= MAX_TICK_COUNT as f64) {
        ::log::warn!("rejecting tick request producing {count} values");
        return Err(crate::Error::illegal(format!(
            "{count} tick values exceed the limit of {MAX_TICK_COUNT}"
        )));
    }
    Ok(())
}
