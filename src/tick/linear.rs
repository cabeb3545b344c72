use super::{DOUBLE_PRECISION_TOLERANCE, MinorTicks, TickCalculator, check_tick_count, orient, util};
use crate::format::{LabelFormat, label_format_for};
use crate::interval::magnitude;
use crate::{Error, NumericInterval, Range, Result};

/// Linear tick calculator: majors at consecutive multiples of a nice interval.
///
/// `LinearTickCalculator` chooses intervals from the set `{1, 2, 5} × 10^n`
/// and places majors at every multiple of the interval that lies inside the
/// range, widened by a relative tolerance so that endpoints hit by rounding
/// error are kept.
///
/// # Interval Selection
///
/// For a request of `n` ticks the rough step `span / (n - 1)` is bracketed by
/// two nice candidates (see [`NumericInterval::candidates`]). The candidate
/// whose actual tick count is nearer `n` wins; a tie goes to the larger
/// interval, so the axis is never more crowded than asked for.
///
/// # Minor Ticks
///
/// With [`MinorTicks::Auto`] the minor count follows the interval's leading
/// digit:
///
/// | digit | 1 | 2 | 3 | 4 | 5 | 6 | 7 | 8 | 9 |
/// |-------|---|---|---|---|---|---|---|---|---|
/// | minors| 4 | 3 | 2 | 3 | 4 | 2 | 6 | 3 | 2 |
///
/// Intervals with more than one significant digit get no minors.
///
/// # Inverted Ranges
///
/// When `start > end`, both value arrays run from `start` towards `end`.
///
/// # Examples
///
/// ## Tick Number
///
/// ```rust
/// use axtick::tick::{LinearTickCalculator, MinorTicks, TickCalculator};
///
/// let mut calc = LinearTickCalculator::new();
/// calc.set_range(-1.6, 1.6).unwrap();
/// calc.calc_values_by_tick_number(10, MinorTicks::Count(0)).unwrap();
///
/// assert_eq!(calc.interval(), 0.5);
/// assert_eq!(calc.values(), &[-1.5, -1.0, -0.5, 0.0, 0.5, 1.0, 1.5]);
/// ```
///
/// ## Tick Interval With Offset
///
/// ```rust
/// use axtick::tick::{LinearTickCalculator, MinorTicks, TickCalculator};
///
/// let mut calc = LinearTickCalculator::new();
/// calc.set_range(0.0, 50.0).unwrap();
/// calc.calc_values_by_tick_interval(10.0, 3.0, MinorTicks::Count(1)).unwrap();
///
/// assert_eq!(calc.values(), &[3.0, 13.0, 23.0, 33.0, 43.0]);
/// assert_eq!(calc.minor_values(), &[8.0, 18.0, 28.0, 38.0, 48.0]);
/// ```
///
/// ## Range Expansion
///
/// ```rust
/// use axtick::{Range, tick::{LinearTickCalculator, TickCalculator}};
///
/// let mut calc = LinearTickCalculator::new();
/// calc.set_range(0.0, 5.5).unwrap();
/// let expanded = calc.expand_range_by_tick_number(5).unwrap();
///
/// assert_eq!(expanded, Range::new(0.0, 6.0));
/// assert_eq!(calc.interval(), 2.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct LinearTickCalculator {
    range: Option<(f64, f64)>,
    interval: f64,
    minor_number: u32,
    values: Vec<f64>,
    minor_values: Vec<f64>,
}

impl LinearTickCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    fn bounds(&self) -> Result<(f64, f64)> {
        self.range
            .ok_or_else(|| Error::InvalidRange("range is not set".into()))
    }

    /// Chooses the nice interval for `tick_number` ticks without computing values.
    ///
    /// A request for one tick is treated as two.
    pub fn calc_interval(&mut self, tick_number: u32) -> Result<NumericInterval> {
        let (start, end) = self.bounds()?;
        if tick_number == 0 {
            return Err(Error::illegal("tick number must be greater than zero"));
        }
        if start == end {
            return Err(Error::invalid_range(start, end));
        }
        let n = tick_number.max(2);
        let (lo, hi) = util::sorted_pair(start, end);

        let (itv_a, itv_b) = NumericInterval::candidates(rough_step(lo, hi, n))?;

        let (expand_lo, expand_hi) = util::expand_by_tolerance(lo, hi);
        let count = |itv: &NumericInterval| {
            let d = itv.value();
            if !d.is_finite() {
                return i64::MAX;
            }
            ((expand_hi / d).floor() - (expand_lo / d).ceil() + 1.0) as i64
        };
        let (num_a, num_b) = (count(&itv_a), count(&itv_b));
        log::trace!("interval candidates {itv_a} ({num_a} ticks), {itv_b} ({num_b} ticks)");

        let chosen = pick_candidate(i64::from(n), (itv_a, num_a), (itv_b, num_b));
        self.interval = chosen.value();
        log::debug!("linear interval {chosen} for {n} ticks over [{start}, {end}]");
        Ok(chosen)
    }

    /// Indices of `values` that lie inside the tolerance-widened range.
    ///
    /// ```rust
    /// use axtick::tick::{LinearTickCalculator, TickCalculator};
    ///
    /// let mut calc = LinearTickCalculator::new();
    /// calc.set_range(1.0, 3.0).unwrap();
    /// let idx = calc.values_in_range_indices(&[0.0, 1.0, 2.0, 3.0, 4.0]).unwrap();
    /// assert_eq!(idx, vec![1, 2, 3]);
    /// ```
    pub fn values_in_range_indices(&self, values: &[f64]) -> Result<Vec<usize>> {
        let (start, end) = self.bounds()?;
        let (lo, hi) = util::sorted_pair(start, end);
        let (expand_lo, expand_hi) = util::expand_by_tolerance(lo, hi);

        Ok(values
            .iter()
            .enumerate()
            .filter(|(_, v)| **v >= expand_lo && **v <= expand_hi)
            .map(|(i, _)| i)
            .collect())
    }

    fn calc_values(&mut self, interval: f64, offset: f64, minor_number: u32) -> Result<()> {
        let (start, end) = self.bounds()?;
        if interval == 0.0 || !interval.is_finite() {
            return Err(Error::illegal(format!("invalid tick interval {interval}")));
        }
        if !offset.is_finite() {
            return Err(Error::illegal(format!("invalid tick offset {offset}")));
        }
        let d = interval;
        let (lo, hi) = util::sorted_pair(start, end);
        let (expand_lo, expand_hi) = util::expand_by_tolerance(lo, hi);
        let (expand_lo, expand_hi) = (expand_lo - offset, expand_hi - offset);

        // Indices stay floats: `lo / d` may be far outside `i64`.
        let i_lo = (expand_lo / d).ceil();
        let i_hi = (expand_hi / d).floor();
        let tick_num = i_hi - i_lo + 1.0;
        check_tick_count(tick_num)?;
        let minor_interval = d / (f64::from(minor_number) + 1.0);

        let mut values = Vec::new();
        let mut minor_values = Vec::new();
        if tick_num < 1.0 {
            // No major inside the range; minors may still fit.
            let mi_lo = (expand_lo / minor_interval).ceil();
            let mi_hi = (expand_hi / minor_interval).floor();
            let minor_num = mi_hi - mi_lo + 1.0;
            check_tick_count(minor_num)?;
            minor_values.extend(
                (0..minor_num.max(0.0) as usize)
                    .map(|k| minor_interval * (mi_lo + k as f64) + offset),
            );
        } else {
            let per_interval = f64::from(minor_number);
            let low_margin = d * i_lo - expand_lo;
            let high_margin = expand_hi - d * i_hi;
            let minors_before = (low_margin / minor_interval).floor().clamp(0.0, per_interval);
            let minors_after = (high_margin / minor_interval).floor().clamp(0.0, per_interval);
            check_tick_count(
                tick_num + minors_before + (tick_num - 1.0) * per_interval + minors_after,
            )?;

            let (tick_num, minors_before, minors_after) =
                (tick_num as usize, minors_before as usize, minors_after as usize);
            let first = d * i_lo + offset;
            minor_values
                .extend((1..=minors_before).rev().map(|im| first - minor_interval * im as f64));
            for k in 0..tick_num {
                let v = d * (i_lo + k as f64) + offset;
                values.push(v);
                let count = if k + 1 == tick_num { minors_after } else { minor_number as usize };
                minor_values.extend((1..=count).map(|im| v + minor_interval * im as f64));
            }
        }

        let inverted = start > end;
        orient(&mut values, inverted);
        orient(&mut minor_values, inverted);
        self.values = values;
        self.minor_values = minor_values;
        Ok(())
    }

    fn expand_zero_span(&mut self, value: f64, tick_number: u32) -> Result<Range> {
        let itv = if value == 0.0 {
            NumericInterval::new(1, 0)
        } else {
            NumericInterval::new(1, magnitude(value.abs())?)
        };
        let d = itv.value();
        let below = f64::from((tick_number - 1) / 2);
        let first = (value / d).round() - below;
        let lo = d * first;
        let hi = d * (first + f64::from(tick_number - 1));

        log::debug!("zero span at {value} expanded to [{lo}, {hi}]");
        let expanded = self.store_expanded(lo, hi)?;
        self.interval = d;
        Ok(expanded)
    }

    fn store_expanded(&mut self, start: f64, end: f64) -> Result<Range> {
        if !start.is_finite() || !end.is_finite() {
            return Err(Error::invalid_range(start, end));
        }
        // ceil of a small negative index is -0
        let (start, end) = (start + 0.0, end + 0.0);
        self.range = Some((start, end));
        self.values.clear();
        self.minor_values.clear();
        Ok(Range::new(start, end))
    }
}

/// `(hi - lo) / (n - 1)`, dividing first so a span past `f64::MAX` stays finite for `n > 2`.
fn rough_step(lo: f64, hi: f64, n: u32) -> f64 {
    let d = f64::from(n - 1);
    hi / d - lo / d
}

/// Candidate whose tick count is nearer `n`, ties to the larger interval `b`.
pub(crate) fn pick_candidate<T>(n: i64, a: (T, i64), b: (T, i64)) -> T {
    if a.1.abs_diff(n) < b.1.abs_diff(n) { a.0 } else { b.0 }
}

/// Auto minor count for an explicit interval, from its leading digit.
pub(crate) fn minor_number_from_interval(interval: f64) -> u32 {
    if interval == 0.0 || !interval.is_finite() {
        return 0;
    }
    let interval = interval.abs();
    let Ok(mag) = magnitude(interval) else {
        return 0;
    };
    let coefficient = interval / 10f64.powi(mag);
    let digit = coefficient.round();
    if (digit / coefficient - 1.0).abs() > DOUBLE_PRECISION_TOLERANCE {
        return 0;
    }
    match digit as u32 {
        1 | 10 => 4,
        2 => 3,
        3 => 2,
        4 => 3,
        5 => 4,
        6 => 2,
        7 => 6,
        8 => 3,
        9 => 2,
        _ => 0,
    }
}

impl TickCalculator for LinearTickCalculator {
    type Value = f64;
    type Format = LabelFormat;

    fn set_range(&mut self, start: f64, end: f64) -> Result<()> {
        if !start.is_finite() || !end.is_finite() {
            return Err(Error::invalid_range(start, end));
        }
        self.range = Some((start, end));
        self.values.clear();
        self.minor_values.clear();
        Ok(())
    }

    fn range(&self) -> Result<Range> {
        let (start, end) = self.bounds()?;
        Ok(Range::new(start, end))
    }

    fn calc_values_by_tick_number(&mut self, tick_number: u32, minor: MinorTicks) -> Result<()> {
        let itv = self.calc_interval(tick_number)?;
        self.minor_number = match minor {
            MinorTicks::Auto => match itv.coefficient() {
                2 => 3,
                _ => 4,
            },
            MinorTicks::Count(n) => n,
        };
        self.calc_values(itv.value(), 0.0, self.minor_number)
    }

    fn calc_values_by_tick_interval(
        &mut self,
        interval: f64,
        offset: f64,
        minor: MinorTicks,
    ) -> Result<()> {
        let interval = interval.abs();
        self.minor_number = match minor {
            MinorTicks::Auto => minor_number_from_interval(interval),
            MinorTicks::Count(n) => n,
        };
        self.calc_values(interval, offset, self.minor_number)?;
        self.interval = interval;
        Ok(())
    }

    fn values(&self) -> &[f64] {
        &self.values
    }

    fn minor_values(&self) -> &[f64] {
        &self.minor_values
    }

    fn interval(&self) -> f64 {
        self.interval
    }

    fn minor_number(&self) -> u32 {
        self.minor_number
    }

    fn label_format(&self) -> LabelFormat {
        label_format_for(&self.values)
    }

    fn expand_range_by_tick_number(&mut self, tick_number: u32) -> Result<Range> {
        let (start, end) = self.bounds()?;
        if tick_number == 0 {
            return Err(Error::illegal("tick number must be greater than zero"));
        }
        let n = tick_number.max(2);
        if start == end {
            return self.expand_zero_span(start, n);
        }

        let (lo, hi) = util::sorted_pair(start, end);
        let (itv_a, itv_b) = NumericInterval::candidates(rough_step(lo, hi, n))?;

        let (shrink_lo, shrink_hi) = util::shrink_by_tolerance(lo, hi);
        let snap = |itv: NumericInterval| {
            let d = itv.value();
            let (i_lo, i_hi) = ((shrink_lo / d).floor(), (shrink_hi / d).ceil());
            let count = if d.is_finite() { (i_hi - i_lo + 1.0) as i64 } else { i64::MAX };
            ((d, i_lo, i_hi), count)
        };
        let (d, i_lo, i_hi) = pick_candidate(i64::from(n), snap(itv_a), snap(itv_b));

        let (x_lo, x_hi) = (d * i_lo, d * i_hi);
        log::debug!("range [{start}, {end}] expanded to [{x_lo}, {x_hi}] by interval {d}");
        let expanded = if end > start {
            self.store_expanded(x_lo, x_hi)?
        } else {
            self.store_expanded(x_hi, x_lo)?
        };
        self.interval = d;
        Ok(expanded)
    }

    fn expand_range_by_tick_interval(&mut self, interval: f64) -> Result<Range> {
        let (start, end) = self.bounds()?;
        let d = interval.abs();
        if d == 0.0 || !d.is_finite() {
            return Err(Error::illegal(format!("invalid tick interval {interval}")));
        }

        let (lo, hi) = util::sorted_pair(start, end);
        let (shrink_lo, shrink_hi) = util::shrink_by_tolerance(lo, hi);
        let i_lo = (shrink_lo / d).floor();
        let mut i_hi = (shrink_hi / d).ceil();
        if i_hi <= i_lo {
            i_hi = i_lo + 1.0;
        }

        let (x_lo, x_hi) = (d * i_lo, d * i_hi);
        if x_lo == x_hi {
            return Err(Error::illegal(format!(
                "interval {interval} is below the resolution of [{start}, {end}]"
            )));
        }
        let expanded = if end < start {
            self.store_expanded(x_hi, x_lo)?
        } else {
            self.store_expanded(x_lo, x_hi)?
        };
        self.interval = d;
        Ok(expanded)
    }
}
