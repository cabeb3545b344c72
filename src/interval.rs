//! Nice numbers of the form `coefficient × 10^exponent`.

use std::fmt;

use crate::{Error, Result};

/// A "nice" tick spacing, `coefficient × 10^exponent`.
///
/// Intervals produced by the tick calculators always carry a coefficient of
/// 1, 2 or 5. [`NumericInterval::from_value`] can also round an arbitrary
/// number to one significant digit, in which case the coefficient may be
/// anything in `±1..=9`.
///
/// Equality compares `(coefficient, exponent)`. Because the coefficient is
/// normalized (never 10, never 0 unless the value is 0), two intervals with
/// the same value compare equal.
///
/// # Examples
///
/// ```
/// use axtick::NumericInterval;
///
/// let itv = NumericInterval::new(2, -3);
/// assert!((itv.value() - 0.002).abs() < 1e-18);
/// assert_eq!(itv.to_string(), "2e-3");
///
/// // 9.6 rounds up into the next decade
/// assert_eq!(NumericInterval::from_value(9.6), NumericInterval::new(1, 1));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NumericInterval {
    coefficient: i32,
    exponent: i32,
}

impl NumericInterval {
    pub const fn new(coefficient: i32, exponent: i32) -> Self {
        Self {
            coefficient,
            exponent,
        }
    }

    /// Rounds `value` to one significant digit.
    ///
    /// Zero and non-finite values map to `0e0`.
    pub fn from_value(value: f64) -> Self {
        let Ok(exponent) = magnitude(value.abs()) else {
            return Self::new(0, 0);
        };
        let mut coefficient = (value / 10f64.powi(exponent)).round() as i32;
        let mut exponent = exponent;
        if coefficient.abs() == 10 {
            coefficient /= 10;
            exponent += 1;
        }
        Self::new(coefficient, exponent)
    }

    /// The two nice intervals bracketing a rough step.
    ///
    /// With `rough = coeff × 10^k` and `1 <= coeff < 10`: `coeff < 2` gives
    /// `(1, 2)`, `coeff < 5` gives `(2, 5)`, otherwise `(5, 10)`, all scaled by
    /// `10^k`. The first element is always the smaller interval.
    ///
    /// A rough step that is zero, negative or not finite is an
    /// [`Error::InvalidRange`].
    pub fn candidates(rough: f64) -> Result<(Self, Self)> {
        let expn = magnitude(rough)?;
        let coeff = rough / 10f64.powi(expn);
        Ok(if coeff < 2.0 {
            (Self::new(1, expn), Self::new(2, expn))
        } else if coeff < 5.0 {
            (Self::new(2, expn), Self::new(5, expn))
        } else {
            (Self::new(5, expn), Self::new(1, expn + 1))
        })
    }

    pub const fn coefficient(&self) -> i32 {
        self.coefficient
    }

    pub const fn exponent(&self) -> i32 {
        self.exponent
    }

    /// The interval as a double, correctly rounded.
    pub fn value(&self) -> f64 {
        // Powers of ten up to 1e22 are exact doubles, so one multiply or
        // divide rounds once. Beyond that the decimal parser does it.
        match self.exponent {
            0..=22 => self.coefficient as f64 * 10f64.powi(self.exponent),
            -22..0 => self.coefficient as f64 / 10f64.powi(-self.exponent),
            _ => format!("{}e{}", self.coefficient, self.exponent)
                .parse()
                .unwrap_or(f64::NAN),
        }
    }
}

impl fmt::Display for NumericInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}e{}", self.coefficient, self.exponent)
    }
}

/// `floor(log10(v))` for a positive finite `v`, corrected for rounding in `log10`.
pub(crate) fn magnitude(v: f64) -> Result<i32> {
    if !(v > 0.0 && v.is_finite()) {
        return Err(Error::InvalidRange(format!("{v} has no decimal magnitude")));
    }
    let mut mag = v.log10().floor() as i32;
    if v >= 10f64.powi(mag + 1) {
        mag += 1;
    } else if v < 10f64.powi(mag) {
        mag -= 1;
    }
    Ok(mag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_from_value() {
        assert_eq!(NumericInterval::from_value(1.0), NumericInterval::new(1, 0));
        assert_eq!(NumericInterval::from_value(250.0), NumericInterval::new(3, 2));
        assert_eq!(NumericInterval::from_value(0.05), NumericInterval::new(5, -2));
        assert_eq!(NumericInterval::from_value(-0.2), NumericInterval::new(-2, -1));
        assert_eq!(NumericInterval::from_value(99.0), NumericInterval::new(1, 2));
        assert_eq!(NumericInterval::from_value(0.0), NumericInterval::new(0, 0));
    }

    #[test]
    fn test_interval_value() {
        assert_eq!(NumericInterval::new(1, -1).value(), 0.1);
        assert_eq!(NumericInterval::new(5, 2).value(), 500.0);
        assert_eq!(NumericInterval::new(2, 0).value(), 2.0);
    }

    #[test]
    fn test_interval_equal_values_compare_equal() {
        assert_eq!(
            NumericInterval::from_value(10.0),
            NumericInterval::from_value(9.9999999)
        );
    }

    #[test]
    fn test_interval_value_exact_at_extreme_exponents() {
        assert_eq!(NumericInterval::new(1, 200).value(), 1e200);
        assert_eq!(NumericInterval::new(1, -200).value(), 1e-200);
        assert_eq!(NumericInterval::new(5, 307).value(), 5e307);
        assert_eq!(NumericInterval::new(2, -300).value(), 2e-300);
        assert_eq!(NumericInterval::new(1, 22).value(), 1e22);
        assert_eq!(NumericInterval::new(1, 309).value(), f64::INFINITY);
    }

    #[test]
    fn test_interval_candidates() {
        assert_eq!(
            NumericInterval::candidates(1.5).unwrap(),
            (NumericInterval::new(1, 0), NumericInterval::new(2, 0))
        );
        assert_eq!(
            NumericInterval::candidates(0.03).unwrap(),
            (NumericInterval::new(2, -2), NumericInterval::new(5, -2))
        );
        assert_eq!(
            NumericInterval::candidates(700.0).unwrap(),
            (NumericInterval::new(5, 2), NumericInterval::new(1, 3))
        );
        assert_eq!(
            NumericInterval::candidates(f64::MAX).unwrap(),
            (NumericInterval::new(1, 308), NumericInterval::new(2, 308))
        );
    }

    #[test]
    fn test_interval_candidates_reject_non_finite() {
        for rough in [f64::INFINITY, f64::NAN, 0.0, -3.0] {
            assert!(
                matches!(NumericInterval::candidates(rough), Err(Error::InvalidRange(_))),
                "{rough}"
            );
        }
    }

    #[test]
    fn test_magnitude_powers_of_ten() {
        for k in -12..=12 {
            assert_eq!(magnitude(10f64.powi(k)).unwrap(), k, "10^{k}");
        }
        assert_eq!(magnitude(0.003).unwrap(), -3);
        assert_eq!(magnitude(999.0).unwrap(), 2);
        assert_eq!(magnitude(f64::MAX).unwrap(), 308);
        assert_eq!(magnitude(f64::MIN_POSITIVE).unwrap(), -308);
        assert!(magnitude(f64::INFINITY).is_err());
    }
}
