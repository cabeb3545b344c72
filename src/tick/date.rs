//! Calendar ticks over epoch milliseconds.
//!
//! Values are `i64` milliseconds since the Unix epoch. Calendar arithmetic is
//! done in UTC with `chrono`, so months and years have their real lengths
//! when walking; only interval *selection* uses the nominal lengths of
//! [`TimeUnit::millis`].

use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Timelike, Utc};

use super::linear::pick_candidate;
use super::util::{minor_number_for, sorted_pair};
use super::{MAX_TICK_COUNT, MinorTicks, TickCalculator, check_tick_count};
use crate::interval::magnitude;
use crate::{Error, Range, Result};

/// Calendar unit of a [`DateInterval`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TimeUnit {
    Millisecond,
    Second,
    Minute,
    Hour,
    Day,
    Week,
    /// Nominally 30 days.
    Month,
    /// Nominally 360 days.
    Year,
}

impl TimeUnit {
    /// Nominal length in milliseconds.
    pub const fn millis(self) -> i64 {
        match self {
            TimeUnit::Millisecond => 1,
            TimeUnit::Second => 1_000,
            TimeUnit::Minute => 60_000,
            TimeUnit::Hour => 3_600_000,
            TimeUnit::Day => 86_400_000,
            TimeUnit::Week => 7 * 86_400_000,
            TimeUnit::Month => 30 * 86_400_000,
            TimeUnit::Year => 360 * 86_400_000,
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TimeUnit::Millisecond => "ms",
            TimeUnit::Second => "s",
            TimeUnit::Minute => "min",
            TimeUnit::Hour => "h",
            TimeUnit::Day => "d",
            TimeUnit::Week => "wk",
            TimeUnit::Month => "mo",
            TimeUnit::Year => "y",
        })
    }
}

/// A calendar interval: `value` consecutive `unit`s.
///
/// Two intervals are equal when their nominal lengths are equal, so
/// `1000 ms == 1 s`.
///
/// ```
/// use axtick::tick::{DateInterval, TimeUnit};
///
/// let itv = DateInterval::from_millis(90 * 86_400_000);
/// assert_eq!(itv.unit(), TimeUnit::Month);
/// assert_eq!(itv.value(), 3);
/// assert_eq!(itv.to_string(), "3mo");
/// ```
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DateInterval {
    unit: TimeUnit,
    value: u32,
}

impl DateInterval {
    pub const fn new(unit: TimeUnit, value: u32) -> Self {
        Self { unit, value }
    }

    /// Expresses `millis` in the largest unit not longer than it, truncating.
    ///
    /// Weeks are never chosen; 14 days stay 14 days.
    pub fn from_millis(millis: i64) -> Self {
        let unit = if millis < TimeUnit::Second.millis() {
            TimeUnit::Millisecond
        } else if millis < TimeUnit::Minute.millis() {
            TimeUnit::Second
        } else if millis < TimeUnit::Hour.millis() {
            TimeUnit::Minute
        } else if millis < TimeUnit::Day.millis() {
            TimeUnit::Hour
        } else if millis < TimeUnit::Month.millis() {
            TimeUnit::Day
        } else if millis < TimeUnit::Year.millis() {
            TimeUnit::Month
        } else {
            TimeUnit::Year
        };
        let value = u32::try_from(millis / unit.millis()).unwrap_or(u32::MAX);
        Self::new(unit, value)
    }

    pub const fn unit(&self) -> TimeUnit {
        self.unit
    }

    pub const fn value(&self) -> u32 {
        self.value
    }

    /// Nominal length in milliseconds.
    pub const fn millis(&self) -> i64 {
        self.value as i64 * self.unit.millis()
    }
}

impl PartialEq for DateInterval {
    fn eq(&self, other: &Self) -> bool {
        self.millis() == other.millis()
    }
}

impl Eq for DateInterval {}

impl Hash for DateInterval {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.millis().hash(state);
    }
}

impl fmt::Display for DateInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit)
    }
}

/// Nice intervals from one second to one year, in increasing length.
const LADDER: [DateInterval; 25] = [
    DateInterval::new(TimeUnit::Second, 1),
    DateInterval::new(TimeUnit::Second, 2),
    DateInterval::new(TimeUnit::Second, 5),
    DateInterval::new(TimeUnit::Second, 10),
    DateInterval::new(TimeUnit::Second, 15),
    DateInterval::new(TimeUnit::Second, 30),
    DateInterval::new(TimeUnit::Minute, 1),
    DateInterval::new(TimeUnit::Minute, 2),
    DateInterval::new(TimeUnit::Minute, 5),
    DateInterval::new(TimeUnit::Minute, 10),
    DateInterval::new(TimeUnit::Minute, 15),
    DateInterval::new(TimeUnit::Minute, 30),
    DateInterval::new(TimeUnit::Hour, 1),
    DateInterval::new(TimeUnit::Hour, 2),
    DateInterval::new(TimeUnit::Hour, 3),
    DateInterval::new(TimeUnit::Hour, 6),
    DateInterval::new(TimeUnit::Hour, 12),
    DateInterval::new(TimeUnit::Day, 1),
    DateInterval::new(TimeUnit::Day, 2),
    DateInterval::new(TimeUnit::Week, 1),
    DateInterval::new(TimeUnit::Week, 2),
    DateInterval::new(TimeUnit::Month, 1),
    DateInterval::new(TimeUnit::Month, 3),
    DateInterval::new(TimeUnit::Month, 6),
    DateInterval::new(TimeUnit::Year, 1),
];

/// `{1, 2, 5, 10} × scale` pairs bracketing `coeff × scale`.
fn decimal_pair(unit: TimeUnit, coeff: f64, scale: u32) -> (DateInterval, DateInterval) {
    let (a, b) = if coeff < 2.0 {
        (1, 2)
    } else if coeff < 5.0 {
        (2, 5)
    } else {
        (5, 10)
    };
    (
        DateInterval::new(unit, a * scale),
        DateInterval::new(unit, b * scale),
    )
}

/// The two candidate intervals bracketing a rough step in milliseconds.
fn candidates(rough: f64) -> Result<(DateInterval, DateInterval)> {
    if rough < 1000.0 {
        let scale = if rough < 10.0 {
            1
        } else if rough < 100.0 {
            10
        } else {
            100
        };
        return Ok(decimal_pair(TimeUnit::Millisecond, rough / f64::from(scale), scale));
    }

    if let Some(pair) = LADDER
        .windows(2)
        .find(|pair| rough < pair[1].millis() as f64)
    {
        return Ok((pair[0], pair[1]));
    }

    let rough_year = rough / TimeUnit::Year.millis() as f64;
    let scale = 10u32.saturating_pow(magnitude(rough_year)?.max(0) as u32);
    Ok(decimal_pair(TimeUnit::Year, rough_year / f64::from(scale), scale))
}

/// Number of interval multiples covering `[lo, hi]`.
fn covering_count(lo: i64, hi: i64, itv: &DateInterval) -> i64 {
    let t = itv.millis().max(1);
    let i_lo = lo.div_euclid(t);
    let i_hi = hi.div_euclid(t) + i64::from(hi.rem_euclid(t) != 0);
    i_hi - i_lo + 1
}

fn to_datetime(millis: i64) -> Result<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| Error::illegal(format!("timestamp {millis} ms is out of range")))
}

fn out_of_range() -> Error {
    Error::illegal("calendar arithmetic left the representable range")
}

fn at_midnight(date: NaiveDate) -> Option<DateTime<Utc>> {
    date.and_hms_opt(0, 0, 0)
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Clears every field finer than `unit`. Returns whether anything changed.
fn floor_to_unit(dt: DateTime<Utc>, unit: TimeUnit) -> Result<(DateTime<Utc>, bool)> {
    let date = dt.date_naive();
    let floored = match unit {
        TimeUnit::Millisecond => Some(dt),
        TimeUnit::Second => dt.with_nanosecond(0),
        TimeUnit::Minute => dt.with_second(0).and_then(|d| d.with_nanosecond(0)),
        TimeUnit::Hour => dt
            .with_minute(0)
            .and_then(|d| d.with_second(0))
            .and_then(|d| d.with_nanosecond(0)),
        TimeUnit::Day => at_midnight(date),
        TimeUnit::Week => date
            .checked_sub_signed(Duration::days(i64::from(
                date.weekday().num_days_from_monday(),
            )))
            .and_then(at_midnight),
        TimeUnit::Month => date.with_day(1).and_then(at_midnight),
        TimeUnit::Year => NaiveDate::from_ymd_opt(date.year(), 1, 1).and_then(at_midnight),
    }
    .ok_or_else(out_of_range)?;
    Ok((floored, floored != dt))
}

/// Moves `dt` by `amount` units; months and years keep the day where possible.
fn shift(dt: DateTime<Utc>, unit: TimeUnit, amount: i64) -> Result<DateTime<Utc>> {
    let months = match unit {
        TimeUnit::Month => amount,
        TimeUnit::Year => amount.checked_mul(12).ok_or_else(out_of_range)?,
        _ => {
            let millis = amount
                .checked_mul(unit.millis())
                .ok_or_else(out_of_range)?;
            return dt
                .checked_add_signed(Duration::milliseconds(millis))
                .ok_or_else(out_of_range);
        }
    };

    let total = i64::from(dt.year()) * 12 + i64::from(dt.month0()) + months;
    let year = i32::try_from(total.div_euclid(12)).map_err(|_| out_of_range())?;
    let month = total.rem_euclid(12) as u32 + 1;
    let date = (1..=dt.day())
        .rev()
        .find_map(|day| NaiveDate::from_ymd_opt(year, month, day))
        .ok_or_else(out_of_range)?;
    Ok(Utc.from_utc_datetime(&date.and_time(dt.time())))
}

/// Distance, in `unit`s, down to the previous multiple of `value` within the
/// next larger calendar field.
fn distance_to_boundary(dt: &DateTime<Utc>, unit: TimeUnit, value: i64) -> i64 {
    let field = match unit {
        TimeUnit::Millisecond => i64::from(dt.timestamp_subsec_millis()),
        TimeUnit::Second => i64::from(dt.second()),
        TimeUnit::Minute => i64::from(dt.minute()),
        TimeUnit::Hour => i64::from(dt.hour()),
        TimeUnit::Day => i64::from(dt.day0()),
        TimeUnit::Week => i64::from(dt.iso_week().week0()),
        TimeUnit::Month => i64::from(dt.month0()),
        TimeUnit::Year => i64::from(dt.year()),
    };
    field.rem_euclid(value.max(1))
}

/// Snaps `[lo, hi]` outward to multiples of `interval`.
fn expand_to_interval(lo: i64, hi: i64, interval: &DateInterval) -> Result<(i64, i64)> {
    let unit = interval.unit();
    let value = i64::from(interval.value());

    let (mut lo_dt, _) = floor_to_unit(to_datetime(lo)?, unit)?;
    let lo_delta = distance_to_boundary(&lo_dt, unit, value);
    if lo_delta != 0 {
        lo_dt = shift(lo_dt, unit, -lo_delta)?;
    }

    let (mut hi_dt, rounded) = floor_to_unit(to_datetime(hi)?, unit)?;
    if rounded {
        hi_dt = shift(hi_dt, unit, 1)?;
    }
    let hi_delta = distance_to_boundary(&hi_dt, unit, value);
    if hi_delta != 0 {
        hi_dt = shift(hi_dt, unit, value - hi_delta)?;
    }

    Ok((lo_dt.timestamp_millis(), hi_dt.timestamp_millis()))
}

/// The finest field of `dt` that is above its minimum.
fn finest_set_field(dt: &DateTime<Utc>) -> TimeUnit {
    if dt.timestamp_subsec_millis() > 0 {
        TimeUnit::Millisecond
    } else if dt.second() > 0 {
        TimeUnit::Second
    } else if dt.minute() > 0 {
        TimeUnit::Minute
    } else if dt.hour() > 0 {
        TimeUnit::Hour
    } else if dt.day0() > 0 {
        TimeUnit::Day
    } else if dt.month0() > 0 {
        TimeUnit::Month
    } else {
        TimeUnit::Year
    }
}

/// The coarsest field in which `a` and `b` differ.
fn coarsest_difference(a: &DateTime<Utc>, b: &DateTime<Utc>) -> Option<TimeUnit> {
    if a.year() != b.year() {
        Some(TimeUnit::Year)
    } else if a.month() != b.month() {
        Some(TimeUnit::Month)
    } else if a.day() != b.day() {
        Some(TimeUnit::Day)
    } else if a.hour() != b.hour() {
        Some(TimeUnit::Hour)
    } else if a.minute() != b.minute() {
        Some(TimeUnit::Minute)
    } else if a.second() != b.second() {
        Some(TimeUnit::Second)
    } else if a.timestamp_subsec_millis() != b.timestamp_subsec_millis() {
        Some(TimeUnit::Millisecond)
    } else {
        None
    }
}

/// strftime format showing `precision`, prefixed by the date when the labels
/// differ by a day or more.
fn strftime_for(precision: TimeUnit, difference: Option<TimeUnit>) -> String {
    let time = match precision {
        TimeUnit::Millisecond => "%H:%M:%S%.3f",
        TimeUnit::Second => "%H:%M:%S",
        TimeUnit::Minute | TimeUnit::Hour => "%H:%M",
        _ => return "%Y-%m-%d".to_string(),
    };
    match difference {
        Some(unit) if unit >= TimeUnit::Day => format!("%Y-%m-%d {time}"),
        _ => time.to_string(),
    }
}

/// strftime format for labelling `values`, `None` when there are none.
///
/// ```
/// use axtick::tick::date::label_format_for_dates;
///
/// // 1975-06-19 07:30:00 and 07:30:05 UTC
/// let values = [172_395_000_000, 172_395_005_000];
/// assert_eq!(label_format_for_dates(&values).as_deref(), Some("%H:%M:%S"));
/// assert_eq!(label_format_for_dates(&[]), None);
/// ```
pub fn label_format_for_dates(values: &[i64]) -> Option<String> {
    let dates: Vec<DateTime<Utc>> = values
        .iter()
        .filter_map(|v| Utc.timestamp_millis_opt(*v).single())
        .collect();
    let precision = dates.iter().map(finest_set_field).min()?;
    let lo = dates.iter().min()?;
    let hi = dates.iter().max()?;
    Some(strftime_for(precision, coarsest_difference(lo, hi)))
}

/// Renders epoch milliseconds with a strftime `format` in UTC.
///
/// ```
/// use axtick::tick::date::format_millis;
///
/// assert_eq!(
///     format_millis(172_395_000_000, "%Y-%m-%d %H:%M").as_deref(),
///     Some("1975-06-19 07:30")
/// );
/// ```
pub fn format_millis(millis: i64, format: &str) -> Option<String> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .map(|dt| dt.format(format).to_string())
}

/// Calendar tick calculator.
///
/// Interval selection climbs a fixed ladder of calendar-friendly steps:
///
/// | unit | steps |
/// |------|-------|
/// | ms   | `{1, 2, 5} × {1, 10, 100}` |
/// | s    | 1, 2, 5, 10, 15, 30 |
/// | min  | 1, 2, 5, 10, 15, 30 |
/// | h    | 1, 2, 3, 6, 12 |
/// | day  | 1, 2 |
/// | week | 1, 2 |
/// | month| 1, 3, 6 |
/// | year | `{1, 2, 5} × 10^k` |
///
/// Values are found by walking the calendar from the first unit boundary in
/// range, one minor step at a time; an instant is a major when its field is a
/// multiple of the interval. The tick offset is not used.
///
/// # Examples
///
/// ```rust
/// use axtick::tick::{DateTickCalculator, MinorTicks, TickCalculator};
///
/// // 1975-06-19 07:30:00 UTC plus one minute
/// let start = 172_395_000_000;
/// let mut calc = DateTickCalculator::new();
/// calc.set_range(start, start + 60_000).unwrap();
/// calc.calc_values_by_tick_number(11, MinorTicks::Auto).unwrap();
///
/// assert_eq!(calc.interval(), 5_000.0);
/// assert_eq!(calc.minor_number(), 4);
/// assert_eq!(calc.values().len(), 13);
/// assert_eq!(calc.label_format(), "%H:%M:%S");
/// ```
#[derive(Debug, Clone, Default)]
pub struct DateTickCalculator {
    range: Option<(i64, i64)>,
    interval: Option<DateInterval>,
    minor_number: u32,
    values: Vec<i64>,
    minor_values: Vec<i64>,
}

impl DateTickCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    fn bounds(&self) -> Result<(i64, i64)> {
        self.range
            .ok_or_else(|| Error::InvalidRange("range is not set".into()))
    }

    /// The interval chosen by the last calculation or expansion.
    pub fn date_interval(&self) -> Option<DateInterval> {
        self.interval
    }

    /// Chooses a calendar interval giving about `tick_number` ticks.
    pub fn calc_interval(&mut self, tick_number: u32) -> Result<DateInterval> {
        let (start, end) = self.bounds()?;
        if start == end {
            return Err(Error::InvalidRange(format!(
                "[{start}, {end}] ms has zero span"
            )));
        }
        if tick_number == 0 {
            return Err(Error::illegal("tick number must be greater than zero"));
        }
        let n = tick_number.max(2);
        let (lo, hi) = sorted_pair(start, end);

        let rough = (hi - lo) as f64 / f64::from(n - 1);
        let (itv_a, itv_b) = candidates(rough)?;
        let (num_a, num_b) = (covering_count(lo, hi, &itv_a), covering_count(lo, hi, &itv_b));
        log::trace!("date interval candidates {itv_a} ({num_a} ticks), {itv_b} ({num_b} ticks)");

        let chosen = pick_candidate(i64::from(n), (itv_a, num_a), (itv_b, num_b));
        log::debug!("date interval {chosen} for {n} ticks");
        self.interval = Some(chosen);
        Ok(chosen)
    }

    fn auto_minor_number(interval: &DateInterval) -> u32 {
        if interval.value() == 1 {
            0
        } else {
            minor_number_for(interval.value(), 3)
        }
    }

    fn calc_values(&mut self, interval: DateInterval) -> Result<()> {
        let (start, end) = self.bounds()?;
        let (lo, hi) = sorted_pair(start, end);
        let unit = interval.unit();
        let value = i64::from(interval.value());
        if value == 0 {
            return Err(Error::illegal("date interval cannot be zero"));
        }

        // a count that does not divide the interval rounds the step down,
        // to no less than one unit
        let step = if self.minor_number == 0 {
            value
        } else {
            (value / (i64::from(self.minor_number) + 1)).max(1)
        };
        self.minor_number = u32::try_from(value / step - 1).unwrap_or(0);
        check_tick_count(((hi - lo) / step.saturating_mul(unit.millis()) + 1) as f64)?;

        let hi_dt = to_datetime(hi)?;
        let (mut t, rounded) = floor_to_unit(to_datetime(lo)?, unit)?;
        if rounded {
            t = shift(t, unit, 1)?;
        }
        let delta = distance_to_boundary(&t, unit, step);
        if delta != 0 {
            t = shift(t, unit, step - delta)?;
        }

        let mut values = Vec::new();
        let mut minor_values = Vec::new();
        while t <= hi_dt {
            if step == value || distance_to_boundary(&t, unit, value) == 0 {
                values.push(t.timestamp_millis());
            } else {
                minor_values.push(t.timestamp_millis());
            }
            if values.len() + minor_values.len() > MAX_TICK_COUNT {
                check_tick_count((values.len() + minor_values.len()) as f64)?;
            }
            t = shift(t, unit, step)?;
        }

        if start > end {
            values.reverse();
            minor_values.reverse();
        }
        self.interval = Some(interval);
        self.values = values;
        self.minor_values = minor_values;
        Ok(())
    }

    fn store_expanded(&mut self, lo: i64, hi: i64) -> Result<Range> {
        let (start, end) = self.bounds()?;
        let (start, end) = if start > end { (hi, lo) } else { (lo, hi) };
        self.range = Some((start, end));
        self.values.clear();
        self.minor_values.clear();
        log::debug!("date range expanded to [{start}, {end}] ms");
        Ok(Range::new(start as f64, end as f64))
    }
}

impl TickCalculator for DateTickCalculator {
    type Value = i64;
    type Format = String;

    fn set_range(&mut self, start: i64, end: i64) -> Result<()> {
        to_datetime(start).map_err(|_| Error::invalid_range(start as f64, end as f64))?;
        to_datetime(end).map_err(|_| Error::invalid_range(start as f64, end as f64))?;
        self.range = Some((start, end));
        self.values.clear();
        self.minor_values.clear();
        Ok(())
    }

    fn range(&self) -> Result<Range> {
        let (start, end) = self.bounds()?;
        Ok(Range::new(start as f64, end as f64))
    }

    fn calc_values_by_tick_number(&mut self, tick_number: u32, minor: MinorTicks) -> Result<()> {
        let interval = self.calc_interval(tick_number)?;
        self.minor_number = match minor {
            MinorTicks::Auto => Self::auto_minor_number(&interval),
            MinorTicks::Count(n) => n,
        };
        self.calc_values(interval)
    }

    /// `interval` is in milliseconds; `offset` is ignored.
    fn calc_values_by_tick_interval(
        &mut self,
        interval: f64,
        _offset: f64,
        minor: MinorTicks,
    ) -> Result<()> {
        let millis = interval.abs().round();
        if !millis.is_finite() || millis < 1.0 {
            return Err(Error::illegal(format!("invalid date interval {interval} ms")));
        }
        let interval = DateInterval::from_millis(millis as i64);
        self.minor_number = match minor {
            MinorTicks::Auto => Self::auto_minor_number(&interval),
            MinorTicks::Count(n) => n,
        };
        self.calc_values(interval)
    }

    fn values(&self) -> &[i64] {
        &self.values
    }

    fn minor_values(&self) -> &[i64] {
        &self.minor_values
    }

    fn interval(&self) -> f64 {
        self.interval.map_or(0.0, |itv| itv.millis() as f64)
    }

    fn minor_number(&self) -> u32 {
        self.minor_number
    }

    /// strftime format for the current range and interval.
    fn label_format(&self) -> String {
        let (Some((start, end)), Some(interval)) = (self.range, self.interval) else {
            return strftime_for(TimeUnit::Millisecond, Some(TimeUnit::Year));
        };
        let difference = match (
            Utc.timestamp_millis_opt(start).single(),
            Utc.timestamp_millis_opt(end).single(),
        ) {
            (Some(a), Some(b)) => coarsest_difference(&a, &b),
            _ => Some(TimeUnit::Year),
        };
        strftime_for(interval.unit(), difference)
    }

    fn expand_range_by_tick_number(&mut self, tick_number: u32) -> Result<Range> {
        let (start, end) = self.bounds()?;
        if tick_number == 0 {
            return Err(Error::illegal("tick number must be greater than zero"));
        }
        let n = i64::from(tick_number.max(2));
        let (lo, hi) = sorted_pair(start, end);

        let span = hi - lo;
        if span < n - 1 {
            let missing = n - 1 - span;
            self.interval = Some(DateInterval::new(TimeUnit::Millisecond, 1));
            return self.store_expanded(lo - missing / 2, hi + missing / 2 + missing % 2);
        }

        let interval = self.calc_interval(tick_number)?;
        let (x_lo, x_hi) = expand_to_interval(lo, hi, &interval)?;
        self.store_expanded(x_lo, x_hi)
    }

    /// `interval` is in milliseconds.
    fn expand_range_by_tick_interval(&mut self, interval: f64) -> Result<Range> {
        let (start, end) = self.bounds()?;
        let millis = interval.abs().round();
        if !millis.is_finite() || millis < 1.0 {
            return Err(Error::illegal(format!("invalid date interval {interval} ms")));
        }
        let interval = DateInterval::from_millis(millis as i64);
        let (lo, hi) = sorted_pair(start, end);

        let (x_lo, mut x_hi) = expand_to_interval(lo, hi, &interval)?;
        if x_lo == x_hi {
            x_hi = shift(to_datetime(x_hi)?, interval.unit(), i64::from(interval.value()))?
                .timestamp_millis();
        }
        self.interval = Some(interval);
        self.store_expanded(x_lo, x_hi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: i64 = 86_400_000;

    fn ms(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> i64 {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s)
            .unwrap()
            .timestamp_millis()
    }

    fn interval_for(start: i64, end: i64, n: u32) -> DateInterval {
        let mut calc = DateTickCalculator::new();
        calc.set_range(start, end).unwrap();
        calc.calc_interval(n).unwrap()
    }

    #[test]
    fn test_date_interval_from_millis() {
        let cases = [
            (500, TimeUnit::Millisecond, 500),
            (1_500, TimeUnit::Second, 1),
            (90_000, TimeUnit::Minute, 1),
            (7_200_000, TimeUnit::Hour, 2),
            (3 * DAY, TimeUnit::Day, 3),
            (14 * DAY, TimeUnit::Day, 14),
            (60 * DAY, TimeUnit::Month, 2),
            (720 * DAY, TimeUnit::Year, 2),
        ];
        for (millis, unit, value) in cases {
            let itv = DateInterval::from_millis(millis);
            assert_eq!((itv.unit(), itv.value()), (unit, value), "{millis} ms");
        }
    }

    #[test]
    fn test_date_interval_equality_by_length() {
        assert_eq!(
            DateInterval::new(TimeUnit::Millisecond, 1000),
            DateInterval::new(TimeUnit::Second, 1)
        );
        assert_ne!(
            DateInterval::new(TimeUnit::Week, 1),
            DateInterval::new(TimeUnit::Day, 6)
        );
    }

    #[test]
    fn test_date_calc_interval() {
        let start = ms(1975, 6, 19, 7, 30, 0);
        let cases = [
            (start + 15, 11, DateInterval::new(TimeUnit::Millisecond, 2)),
            (start + 40, 11, DateInterval::new(TimeUnit::Millisecond, 5)),
            (start + 80, 11, DateInterval::new(TimeUnit::Millisecond, 10)),
            (start + 1_000, 11, DateInterval::new(TimeUnit::Millisecond, 100)),
            (ms(1975, 6, 19, 7, 31, 0), 11, DateInterval::new(TimeUnit::Second, 5)),
            (ms(1975, 6, 19, 8, 30, 0), 11, DateInterval::new(TimeUnit::Minute, 5)),
            (ms(1975, 6, 19, 22, 30, 0), 11, DateInterval::new(TimeUnit::Hour, 2)),
            (ms(1975, 6, 20, 7, 30, 0), 11, DateInterval::new(TimeUnit::Hour, 3)),
            (ms(1975, 6, 21, 7, 30, 0), 11, DateInterval::new(TimeUnit::Hour, 6)),
            (ms(1975, 7, 19, 7, 30, 0), 15, DateInterval::new(TimeUnit::Day, 2)),
            (ms(1975, 7, 19, 7, 30, 0), 11, DateInterval::new(TimeUnit::Week, 1)),
            (ms(1976, 6, 19, 7, 30, 0), 11, DateInterval::new(TimeUnit::Month, 1)),
            (ms(1985, 6, 19, 7, 30, 0), 11, DateInterval::new(TimeUnit::Year, 1)),
        ];
        for (end, n, expected) in cases {
            assert_eq!(interval_for(start, end, n), expected, "end {end}, {n} ticks");
        }
    }

    #[test]
    fn test_date_calc_interval_tie_prefers_larger() {
        // 2 years cover 15 ticks, 5 years cover 7; both are 4 away from 11
        let start = ms(1975, 6, 19, 7, 30, 0);
        let end = ms(2000, 6, 19, 7, 30, 0);
        assert_eq!(
            interval_for(start, end, 11),
            DateInterval::new(TimeUnit::Year, 5)
        );
    }

    #[test]
    fn test_date_zero_span_rejected() {
        let start = ms(1975, 6, 19, 7, 30, 0);
        let mut calc = DateTickCalculator::new();
        calc.set_range(start, start).unwrap();
        assert!(matches!(
            calc.calc_values_by_tick_number(11, MinorTicks::Count(0)),
            Err(Error::InvalidRange(_))
        ));
    }

    #[test]
    fn test_date_ticks_milliseconds() {
        let start = ms(1975, 6, 19, 7, 30, 0);
        let mut calc = DateTickCalculator::new();
        calc.set_range(start, start + 1_000).unwrap();
        calc.calc_values_by_tick_number(11, MinorTicks::Count(0))
            .unwrap();

        assert_eq!(calc.interval(), 100.0);
        let expected: Vec<i64> = (0..=10).map(|i| start + 100 * i).collect();
        assert_eq!(calc.values(), expected.as_slice());
        assert!(calc.minor_values().is_empty());
        assert_eq!(calc.label_format(), "%H:%M:%S%.3f");
    }

    #[test]
    fn test_date_ticks_seconds() {
        let start = ms(1975, 6, 19, 7, 30, 0);
        let mut calc = DateTickCalculator::new();
        calc.set_range(start, ms(1975, 6, 19, 7, 31, 0)).unwrap();
        calc.calc_values_by_tick_number(11, MinorTicks::Auto).unwrap();

        assert_eq!(calc.interval(), 5_000.0);
        assert_eq!(calc.minor_number(), 4);
        assert_eq!(calc.values().len(), 13);
        assert_eq!(calc.minor_values().len(), 48);
        assert_eq!(calc.label_format(), "%H:%M:%S");
        assert_eq!(
            label_format_for_dates(calc.values()).as_deref(),
            Some("%H:%M:%S")
        );
    }

    #[test]
    fn test_date_ticks_minutes() {
        let start = ms(1975, 6, 19, 7, 30, 0);
        let mut calc = DateTickCalculator::new();
        calc.set_range(start, ms(1975, 6, 19, 8, 30, 0)).unwrap();
        calc.calc_values_by_tick_number(11, MinorTicks::Auto).unwrap();

        assert_eq!(calc.interval(), 300_000.0);
        assert_eq!(calc.minor_number(), 4);
        assert_eq!(calc.label_format(), "%H:%M");
        assert_eq!(
            label_format_for_dates(calc.values()).as_deref(),
            Some("%H:%M")
        );
    }

    #[test]
    fn test_date_ticks_hours_cross_midnight() {
        let start = ms(1975, 6, 19, 7, 30, 0);
        let mut calc = DateTickCalculator::new();
        calc.set_range(start, ms(1975, 6, 20, 7, 30, 0)).unwrap();
        calc.calc_values_by_tick_number(11, MinorTicks::Auto).unwrap();

        assert_eq!(calc.interval(), 3.0 * 3_600_000.0);
        assert_eq!(calc.minor_number(), 2);
        assert_eq!(calc.values().len(), 8);
        assert_eq!(calc.minor_values().len(), 16);
        assert_eq!(calc.values()[0], ms(1975, 6, 19, 9, 0, 0));
        assert_eq!(calc.minor_values()[0], ms(1975, 6, 19, 8, 0, 0));
        assert_eq!(calc.label_format(), "%Y-%m-%d %H:%M");
        assert_eq!(
            label_format_for_dates(calc.values()).as_deref(),
            Some("%Y-%m-%d %H:%M")
        );
    }

    #[test]
    fn test_date_ticks_weeks_start_on_monday() {
        let start = ms(1975, 6, 19, 7, 30, 0);
        let mut calc = DateTickCalculator::new();
        calc.set_range(start, ms(1975, 7, 19, 7, 30, 0)).unwrap();
        calc.calc_values_by_tick_number(11, MinorTicks::Auto).unwrap();

        assert_eq!(calc.interval(), 7.0 * DAY as f64);
        assert_eq!(calc.minor_number(), 0);
        assert_eq!(
            calc.values(),
            &[
                ms(1975, 6, 23, 0, 0, 0),
                ms(1975, 6, 30, 0, 0, 0),
                ms(1975, 7, 7, 0, 0, 0),
                ms(1975, 7, 14, 0, 0, 0),
            ]
        );
        assert_eq!(calc.label_format(), "%Y-%m-%d");
    }

    #[test]
    fn test_date_ticks_decades() {
        let mut calc = DateTickCalculator::new();
        calc.set_range(ms(1970, 1, 1, 0, 0, 0), ms(2000, 1, 1, 0, 0, 0))
            .unwrap();
        calc.calc_values_by_tick_number(5, MinorTicks::Count(0))
            .unwrap();
        assert_eq!(
            calc.values(),
            &[
                ms(1970, 1, 1, 0, 0, 0),
                ms(1980, 1, 1, 0, 0, 0),
                ms(1990, 1, 1, 0, 0, 0),
                ms(2000, 1, 1, 0, 0, 0),
            ]
        );
    }

    #[test]
    fn test_date_ticks_inverted() {
        let start = ms(1975, 6, 19, 7, 30, 0);
        let mut calc = DateTickCalculator::new();
        calc.set_range(start + 1_000, start).unwrap();
        calc.calc_values_by_tick_number(11, MinorTicks::Count(0))
            .unwrap();
        assert_eq!(calc.values().first(), Some(&(start + 1_000)));
        assert_eq!(calc.values().last(), Some(&start));
    }

    #[test]
    fn test_date_tick_interval_quarters() {
        let mut calc = DateTickCalculator::new();
        calc.set_range(ms(1975, 1, 1, 0, 0, 0), ms(1975, 12, 31, 0, 0, 0))
            .unwrap();
        calc.calc_values_by_tick_interval(90.0 * DAY as f64, 0.0, MinorTicks::Auto)
            .unwrap();

        assert_eq!(calc.minor_number(), 2);
        assert_eq!(
            calc.values(),
            &[
                ms(1975, 1, 1, 0, 0, 0),
                ms(1975, 4, 1, 0, 0, 0),
                ms(1975, 7, 1, 0, 0, 0),
                ms(1975, 10, 1, 0, 0, 0),
            ]
        );
        assert_eq!(calc.minor_values().len(), 8);
        // real month lengths, not 30 days
        assert_eq!(calc.minor_values()[0] - calc.values()[0], 31 * DAY);
        assert_eq!(calc.minor_values()[1] - calc.minor_values()[0], 28 * DAY);
    }

    #[test]
    fn test_date_minor_number_reports_walked_minors() {
        let mut calc = DateTickCalculator::new();
        calc.set_range(ms(1975, 6, 19, 0, 0, 0), ms(1975, 6, 19, 10, 0, 0))
            .unwrap();
        // 3 minors cannot split 5 hours evenly; the step rounds down to 1 hour
        calc.calc_values_by_tick_interval(5.0 * 3_600_000.0, 0.0, MinorTicks::Count(3))
            .unwrap();

        assert_eq!(
            calc.values(),
            &[
                ms(1975, 6, 19, 0, 0, 0),
                ms(1975, 6, 19, 5, 0, 0),
                ms(1975, 6, 19, 10, 0, 0),
            ]
        );
        assert_eq!(calc.minor_values().len(), 8);
        assert_eq!(calc.minor_number(), 4);

        calc.calc_values_by_tick_interval(5.0 * 3_600_000.0, 0.0, MinorTicks::Count(9))
            .unwrap();
        assert_eq!(calc.minor_number(), 4);

        calc.calc_values_by_tick_interval(5.0 * 3_600_000.0, 0.0, MinorTicks::Count(0))
            .unwrap();
        assert_eq!(calc.minor_number(), 0);
        assert!(calc.minor_values().is_empty());
    }

    #[test]
    fn test_date_tick_interval_rejects_zero() {
        let mut calc = DateTickCalculator::new();
        calc.set_range(0, 1_000).unwrap();
        assert!(matches!(
            calc.calc_values_by_tick_interval(0.0, 0.0, MinorTicks::Auto),
            Err(Error::IllegalArgument(_))
        ));
    }

    #[test]
    fn test_date_expand_by_tick_number() {
        let start = ms(1975, 5, 19, 7, 30, 0);
        let end = ms(1975, 5, 19, 7, 30, 1);
        let mut calc = DateTickCalculator::new();
        let cases = [
            ((start, start), (start - 5, start + 5)),
            ((start, end), (start, start + 1_000)),
            ((start + 1, end - 1), (start, start + 1_000)),
            ((start - 1, end + 1), (start - 100, start + 1_100)),
        ];
        for ((lo, hi), (x_lo, x_hi)) in cases {
            calc.set_range(lo, hi).unwrap();
            let r = calc.expand_range_by_tick_number(11).unwrap();
            assert_eq!(r, Range::new(x_lo as f64, x_hi as f64), "[{lo}, {hi}]");
        }
    }

    #[test]
    fn test_date_expand_by_tick_interval() {
        let start = ms(1975, 5, 19, 7, 30, 0);
        let end = ms(1975, 5, 19, 7, 30, 1);
        let mut calc = DateTickCalculator::new();
        let cases = [
            ((start, start), (start, start + 100)),
            ((start, start + 1), (start, start + 100)),
            ((start, end), (start, start + 1_000)),
            ((start + 1, end - 1), (start, start + 1_000)),
            ((start - 1, end + 1), (start - 100, start + 1_100)),
        ];
        for ((lo, hi), (x_lo, x_hi)) in cases {
            calc.set_range(lo, hi).unwrap();
            let r = calc.expand_range_by_tick_interval(100.0).unwrap();
            assert_eq!(r, Range::new(x_lo as f64, x_hi as f64), "[{lo}, {hi}]");
        }
    }

    #[test]
    fn test_date_expand_to_quarters() {
        let mut calc = DateTickCalculator::new();
        calc.set_range(ms(1975, 2, 10, 0, 0, 0), ms(1975, 5, 20, 0, 0, 0))
            .unwrap();
        let r = calc.expand_range_by_tick_interval(90.0 * DAY as f64).unwrap();
        assert_eq!(
            r,
            Range::new(
                ms(1975, 1, 1, 0, 0, 0) as f64,
                ms(1975, 7, 1, 0, 0, 0) as f64
            )
        );
    }

    #[test]
    fn test_date_floor_to_unit() {
        let dt = to_datetime(ms(1975, 6, 19, 7, 30, 32) + 129).unwrap();
        let floored = |unit| floor_to_unit(dt, unit).unwrap();

        assert_eq!(floored(TimeUnit::Millisecond), (dt, false));
        let expected = [
            (TimeUnit::Second, ms(1975, 6, 19, 7, 30, 32)),
            (TimeUnit::Minute, ms(1975, 6, 19, 7, 30, 0)),
            (TimeUnit::Hour, ms(1975, 6, 19, 7, 0, 0)),
            (TimeUnit::Day, ms(1975, 6, 19, 0, 0, 0)),
            (TimeUnit::Week, ms(1975, 6, 16, 0, 0, 0)),
            (TimeUnit::Month, ms(1975, 6, 1, 0, 0, 0)),
            (TimeUnit::Year, ms(1975, 1, 1, 0, 0, 0)),
        ];
        for (unit, millis) in expected {
            let (t, changed) = floored(unit);
            assert!(changed, "{unit}");
            assert_eq!(t.timestamp_millis(), millis, "{unit}");
        }
    }

    #[test]
    fn test_date_shift_clamps_day_of_month() {
        let jan31 = to_datetime(ms(1975, 1, 31, 12, 0, 0)).unwrap();
        let feb = shift(jan31, TimeUnit::Month, 1).unwrap();
        assert_eq!(feb.timestamp_millis(), ms(1975, 2, 28, 12, 0, 0));

        let back = shift(jan31, TimeUnit::Year, -6).unwrap();
        assert_eq!(back.timestamp_millis(), ms(1969, 1, 31, 12, 0, 0));
    }

    #[test]
    fn test_label_format_for_dates() {
        assert_eq!(label_format_for_dates(&[]), None);
        assert_eq!(
            label_format_for_dates(&[ms(1975, 1, 1, 0, 0, 0), ms(1975, 1, 2, 0, 0, 0)]).as_deref(),
            Some("%Y-%m-%d")
        );
        let t = ms(1975, 6, 19, 7, 30, 0);
        assert_eq!(
            label_format_for_dates(&[t + 250, t + 500]).as_deref(),
            Some("%H:%M:%S%.3f")
        );
    }
}
