use super::linear::LinearTickCalculator;
use super::util::minor_number_for;
use super::{MinorTicks, TickCalculator, exp10, orient, pow10, util};
use crate::format::{LabelFormat, label_format_for};
use crate::{Error, NumericInterval, Range, Result};

/// Logarithmic tick calculator.
///
/// Intervals are chosen by a [`LinearTickCalculator`] working on `log10` of
/// the range ("exponent space"). The exponent interval is never smaller than
/// one decade:
///
/// - With one-decade spacing every power of ten in range is a major, and the
///   minors sit at `{2..9} × 10^k` (plus the partial decades at both ends).
/// - With multi-decade spacing majors are every `k`-th decade and minors fall
///   on whole decades in between.
///
/// A range narrower than one decade has at most one power of ten inside it.
/// In that case the calculator falls back to plain linear ticks over the
/// raw values, so `[2, 3]` is ticked like a linear axis.
///
/// # Examples
///
/// ```rust
/// use axtick::tick::{LogTickCalculator, MinorTicks, TickCalculator};
///
/// let mut calc = LogTickCalculator::new();
/// calc.set_range(1.0, 1000.0).unwrap();
/// calc.calc_values_by_tick_number(4, MinorTicks::Auto).unwrap();
///
/// assert_eq!(calc.values(), &[1.0, 10.0, 100.0, 1000.0]);
/// assert_eq!(calc.minor_values().len(), 24);
/// assert_eq!(calc.minor_number(), 9);
/// assert_eq!(calc.interval(), 10.0);
/// ```
/// How a request is ticked once the exponent interval is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ticking {
    /// Majors every `n` decades.
    Decades(u32),
    /// Too few powers of ten in range; tick the raw values linearly.
    Linear,
}

#[derive(Debug, Clone, Default)]
pub struct LogTickCalculator {
    range: Option<(f64, f64)>,
    exp: LinearTickCalculator,
    interval: f64,
    minor_number: u32,
    values: Vec<f64>,
    minor_values: Vec<f64>,
}

impl LogTickCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    fn bounds(&self) -> Result<(f64, f64)> {
        self.range
            .ok_or_else(|| Error::InvalidRange("range is not set".into()))
    }

    /// Exponent interval for `tick_number` ticks, at least one decade.
    fn calc_exp_interval(&mut self, tick_number: u32) -> Result<u32> {
        let itv = self.exp.calc_interval(tick_number)?.value();
        Ok(if itv < 1.0 { 1 } else { itv as u32 })
    }

    /// Whole decades as majors, `{2..9} × 10^k` as minors.
    fn calc_values_exp1(&mut self) -> Result<()> {
        let (start, end) = self.bounds()?;
        let (lo, hi) = util::sorted_pair(start, end);
        let (exp_lo, exp_hi) = util::expand_by_tolerance(lo.log10(), hi.log10());

        let exp_start = exp_lo.ceil() as i32;
        let exp_end = exp_hi.floor() as i32;

        self.values.clear();
        self.minor_values.clear();
        if exp_end < exp_start {
            return Ok(());
        }

        let minor_start = 10f64.powf(exp_lo - f64::from(exp_start) + 1.0).ceil() as i32;
        let minor_end = 10f64.powf(exp_hi - f64::from(exp_end)).floor() as i32;

        self.minor_values.extend(
            (minor_start..=9).map(|coef| NumericInterval::new(coef, exp_start - 1).value()),
        );
        for exp in exp_start..=exp_end {
            self.values.push(pow10(exp));
            if exp < exp_end {
                self.minor_values
                    .extend((2..=9).map(|coef| NumericInterval::new(coef, exp).value()));
            }
        }
        self.minor_values
            .extend((2..=minor_end).map(|coef| NumericInterval::new(coef, exp_end).value()));

        self.interval = 10.0;
        self.minor_number = 9;
        Ok(())
    }

    fn calc_values(&mut self, exp_interval: u32, minor: MinorTicks) -> Result<()> {
        if exp_interval == 1 {
            return self.calc_values_exp1();
        }

        let minor = match minor {
            MinorTicks::Auto => MinorTicks::Count(minor_number_for(exp_interval, exp_interval - 1)),
            count => count,
        };
        self.exp
            .calc_values_by_tick_interval(f64::from(exp_interval), 0.0, minor)?;
        self.values = self.exp.values().iter().map(|e| exp10(*e)).collect();
        self.minor_values = self.exp.minor_values().iter().map(|e| exp10(*e)).collect();
        self.interval = pow10(exp_interval as i32);
        self.minor_number = self.exp.minor_number();
        Ok(())
    }

    /// Decade ticks for `tick_number`, or [`Ticking::Linear`] when fewer than
    /// two majors fit.
    fn ticking_for_number(&mut self, tick_number: u32, minor: MinorTicks) -> Result<Ticking> {
        let exp_interval = self.calc_exp_interval(tick_number)?;
        self.calc_values(exp_interval, minor)?;
        Ok(if self.values.len() < 2 {
            Ticking::Linear
        } else {
            Ticking::Decades(exp_interval)
        })
    }

    /// Decade ticks for an explicit `interval`, or [`Ticking::Linear`] when
    /// nothing but a lone major fits.
    fn ticking_for_interval(&mut self, interval: f64, minor: MinorTicks) -> Result<Ticking> {
        let exp_interval = exp_interval_of(interval)?;
        self.calc_values(exp_interval, minor)?;
        let lone = self.values.len() == 1 && self.minor_values.is_empty();
        Ok(if self.values.is_empty() || lone {
            Ticking::Linear
        } else {
            Ticking::Decades(exp_interval)
        })
    }

    fn finish(&mut self, minor: MinorTicks) -> Result<()> {
        let (start, end) = self.bounds()?;
        if minor == MinorTicks::Count(0) {
            self.minor_values.clear();
            self.minor_number = 0;
        }
        let inverted = start > end;
        orient(&mut self.values, inverted);
        orient(&mut self.minor_values, inverted);
        Ok(())
    }

    fn linear(&self) -> Result<LinearTickCalculator> {
        let (start, end) = self.bounds()?;
        let mut calc = LinearTickCalculator::new();
        calc.set_range(start, end)?;
        Ok(calc)
    }

    fn adopt(&mut self, calc: LinearTickCalculator) {
        self.interval = calc.interval();
        self.minor_number = calc.minor_number();
        self.values = calc.values().to_vec();
        self.minor_values = calc.minor_values().to_vec();
    }

    fn store_expanded(&mut self) -> Result<Range> {
        let exp_range = self.exp.range()?;
        let (start, end) = (exp10(exp_range.start()), exp10(exp_range.end()));
        self.range = Some((start, end));
        self.interval = exp10(self.exp.interval());
        self.values.clear();
        self.minor_values.clear();
        Ok(Range::new(start, end))
    }
}

/// Exponent step for an explicit interval: its decimal exponent, at least 1.
fn exp_interval_of(interval: f64) -> Result<u32> {
    if interval < 0.0 {
        return Err(Error::illegal("logarithmic axis only accepts a positive interval"));
    }
    if interval == 0.0 || !interval.is_finite() {
        return Err(Error::illegal(format!("invalid tick interval {interval}")));
    }
    let exp = NumericInterval::from_value(interval).exponent().unsigned_abs();
    Ok(exp.max(1))
}

impl TickCalculator for LogTickCalculator {
    type Value = f64;
    type Format = LabelFormat;

    fn set_range(&mut self, start: f64, end: f64) -> Result<()> {
        if !start.is_finite() || !end.is_finite() || start <= 0.0 || end <= 0.0 {
            return Err(Error::invalid_range(start, end));
        }
        self.exp.set_range(start.log10(), end.log10())?;
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
        match self.ticking_for_number(tick_number, minor)? {
            Ticking::Decades(exp_interval) => {
                log::debug!("logarithmic ticks every {exp_interval} decades");
                self.finish(minor)
            }
            Ticking::Linear => {
                log::debug!(
                    "{} decade ticks in range, falling back to linear ticks",
                    self.values.len()
                );
                let mut calc = self.linear()?;
                calc.calc_values_by_tick_number(tick_number, minor)?;
                self.adopt(calc);
                Ok(())
            }
        }
    }

    fn calc_values_by_tick_interval(
        &mut self,
        interval: f64,
        offset: f64,
        minor: MinorTicks,
    ) -> Result<()> {
        match self.ticking_for_interval(interval, minor)? {
            Ticking::Decades(exp_interval) => {
                log::debug!("logarithmic ticks every {exp_interval} decades");
                self.finish(minor)
            }
            Ticking::Linear => {
                log::debug!(
                    "interval {interval} gives no decade ticks, falling back to linear ticks"
                );
                let mut calc = self.linear()?;
                calc.calc_values_by_tick_interval(interval, offset, minor)?;
                self.adopt(calc);
                Ok(())
            }
        }
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
        self.bounds()?;
        self.exp.expand_range_by_tick_number(tick_number)?;
        if self.exp.interval() < 1.0 {
            self.exp.expand_range_by_tick_interval(1.0)?;
        }
        let range = self.store_expanded()?;
        log::debug!("logarithmic range expanded to {range}");
        Ok(range)
    }

    fn expand_range_by_tick_interval(&mut self, interval: f64) -> Result<Range> {
        self.bounds()?;
        let exp_interval = exp_interval_of(interval)?;
        self.exp
            .expand_range_by_tick_interval(f64::from(exp_interval))?;
        self.store_expanded()
    }
}
