//! Tick label formats.
//!
//! Formats are written in a small printf-like dialect:
//!
//! | format  | meaning                                                  |
//! |---------|----------------------------------------------------------|
//! | `%.Nf`  | fixed point, `N` fraction digits                         |
//! | `%.Nm`  | mantissa × power of ten, `N` fraction digits in mantissa |
//! | `%d`    | integer                                                  |
//!
//! `m` is the "math" conversion. [`mantissa_to_exponent`] turns it into the
//! standard `e` conversion for printf-style consumers that do not know it.
//!
//! [`label_format_for`] picks a format for a set of tick values: fixed point
//! while the labels stay short, scientific once more than three zeros would
//! have to be written out.

use std::fmt;
use std::str::FromStr;

use crate::interval::magnitude;
use crate::{Error, Result};

/// Internal precision used to count the significant digits of a value.
const SIGNIFICANT_DIGITS_PRECISION: usize = 14;

/// Label format for one axis.
///
/// # Examples
///
/// ```rust
/// use axtick::format::{FormattedLabel, LabelFormat};
///
/// let fmt = LabelFormat::Scientific { fraction_digits: 1 };
/// assert_eq!(fmt.to_string(), "%.1m");
/// assert_eq!(fmt.to_standard(), "%.1e");
/// assert_eq!(
///     fmt.format(150_000.0),
///     FormattedLabel::Power { mantissa: Some("1.5".into()), exponent: 5 }
/// );
///
/// let fmt: LabelFormat = "%.2f".parse().unwrap();
/// assert_eq!(fmt.format(0.5).to_string(), "0.50");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LabelFormat {
    Fixed { fraction_digits: usize },
    Scientific { fraction_digits: usize },
    Integer,
}

impl Default for LabelFormat {
    fn default() -> Self {
        LabelFormat::Fixed { fraction_digits: 0 }
    }
}

impl LabelFormat {
    /// The format with the `m` conversion replaced by `e`.
    pub fn to_standard(&self) -> String {
        mantissa_to_exponent(&self.to_string())
    }

    /// Renders `value` as a label.
    pub fn format(&self, value: f64) -> FormattedLabel {
        match *self {
            LabelFormat::Fixed { fraction_digits } => {
                FormattedLabel::Text(format!("{value:.fraction_digits$}"))
            }
            LabelFormat::Integer => FormattedLabel::Text(format!("{value:.0}")),
            LabelFormat::Scientific { fraction_digits } => {
                let s = format!("{value:.fraction_digits$e}");
                let Some((mantissa, exponent)) = s.split_once('e') else {
                    // inf and NaN carry no exponent
                    return FormattedLabel::Text(s);
                };
                let exponent: i32 = exponent.parse().unwrap_or(0);
                if exponent == 0 {
                    FormattedLabel::Text(mantissa.to_string())
                } else if mantissa == "1" {
                    FormattedLabel::Power {
                        mantissa: None,
                        exponent,
                    }
                } else {
                    FormattedLabel::Power {
                        mantissa: Some(mantissa.to_string()),
                        exponent,
                    }
                }
            }
        }
    }
}

impl fmt::Display for LabelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LabelFormat::Fixed { fraction_digits } => write!(f, "%.{fraction_digits}f"),
            LabelFormat::Scientific { fraction_digits } => write!(f, "%.{fraction_digits}m"),
            LabelFormat::Integer => f.write_str("%d"),
        }
    }
}

impl FromStr for LabelFormat {
    type Err = Error;

    /// Parses `%d`, `%.Nf`, `%.Nm` and `%.Ne` (read as `%.Nm`).
    fn from_str(s: &str) -> Result<Self> {
        if s == "%d" {
            return Ok(LabelFormat::Integer);
        }
        let invalid = || Error::illegal(format!("unsupported label format {s:?}"));

        let body = s.strip_prefix("%.").ok_or_else(invalid)?;
        let conversion = body.chars().last().ok_or_else(invalid)?;
        let fraction_digits = body[..body.len() - conversion.len_utf8()]
            .parse::<usize>()
            .map_err(|_| invalid())?;
        match conversion {
            'f' => Ok(LabelFormat::Fixed { fraction_digits }),
            'm' | 'e' => Ok(LabelFormat::Scientific { fraction_digits }),
            _ => Err(invalid()),
        }
    }
}

/// A rendered label: plain text, or a mantissa times a power of ten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormattedLabel {
    Text(String),
    /// `mantissa × 10^exponent`; no mantissa means a bare power of ten.
    Power {
        mantissa: Option<String>,
        exponent: i32,
    },
}

impl fmt::Display for FormattedLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormattedLabel::Text(s) => f.write_str(s),
            FormattedLabel::Power {
                mantissa: None,
                exponent,
            } => write!(f, "10^{exponent}"),
            FormattedLabel::Power {
                mantissa: Some(m),
                exponent,
            } => write!(f, "{m} ×10^{exponent}"),
        }
    }
}

/// Replaces the first `m` conversion after position 0 with `e`.
///
/// Strings without one are returned unchanged.
///
/// ```
/// use axtick::format::mantissa_to_exponent;
///
/// assert_eq!(mantissa_to_exponent("%.3m"), "%.3e");
/// assert_eq!(mantissa_to_exponent("%.2f"), "%.2f");
/// ```
pub fn mantissa_to_exponent(format: &str) -> String {
    match format.char_indices().skip(1).find(|(_, c)| *c == 'm') {
        Some((idx, _)) => {
            let mut s = format.to_string();
            s.replace_range(idx..idx + 1, "e");
            s
        }
        None => format.to_string(),
    }
}

/// Index of the last character that is not `'0'`.
fn last_non_zero_idx(s: &str) -> Option<usize> {
    s.bytes().rposition(|b| b != b'0')
}

/// Chooses a label format that shows every value in `values` exactly.
///
/// Zeros and non-finite values are ignored. Fixed point is used while at most
/// three zeros would be padded and magnitudes stay within `1e-4 ..< 1e6`.
///
/// ```
/// use axtick::format::{LabelFormat, label_format_for};
///
/// assert_eq!(
///     label_format_for(&[0.11, 1.1, 11.0, 110.0]),
///     LabelFormat::Fixed { fraction_digits: 2 }
/// );
/// assert_eq!(
///     label_format_for(&[1e-8, 2e-8]),
///     LabelFormat::Scientific { fraction_digits: 0 }
/// );
/// ```
pub fn label_format_for(values: &[f64]) -> LabelFormat {
    let mut min_mag = i32::MAX;
    let mut max_mag = i32::MIN;
    let mut max_prec = 0i32;
    let mut max_fraction_digits = 0i32;

    for (v, mag) in values
        .iter()
        .map(|v| v.abs())
        .filter_map(|v| magnitude(v).ok().map(|mag| (v, mag)))
    {
        min_mag = min_mag.min(mag);
        max_mag = max_mag.max(mag);

        let coefficient = v / 10f64.powi(mag);
        let s = format!("{coefficient:.SIGNIFICANT_DIGITS_PRECISION$}");
        // "1.1000..." has its last significant digit at index 2
        let pp1 = last_non_zero_idx(&s).map_or(-1, |i| i as i32);
        max_prec = max_prec.max(pp1);
        max_fraction_digits = max_fraction_digits.max(pp1 - mag - 1);
    }

    if max_mag < min_mag {
        return LabelFormat::default();
    }

    let n0 = if min_mag >= 0 {
        max_mag - max_prec + 1
    } else if max_mag <= 0 {
        -min_mag
    } else {
        max_mag - min_mag
    };

    if n0 < 4 && min_mag >= -4 && max_mag < 6 {
        LabelFormat::Fixed {
            fraction_digits: max_fraction_digits as usize,
        }
    } else {
        LabelFormat::Scientific {
            fraction_digits: (max_prec - 1).max(0) as usize,
        }
    }
}

/// Chooses `%d` or scientific for integral values.
///
/// ```
/// use axtick::format::{LabelFormat, label_format_for_integers};
///
/// assert_eq!(label_format_for_integers(&[1100, 2200]), LabelFormat::Integer);
/// assert_eq!(
///     label_format_for_integers(&[1_000_000, 2_000_000]),
///     LabelFormat::Scientific { fraction_digits: 0 }
/// );
/// ```
pub fn label_format_for_integers(values: &[i64]) -> LabelFormat {
    let mut max_mag = i32::MIN;
    let mut max_prec = 0i32;

    for v in values.iter().map(|v| v.unsigned_abs()).filter(|v| *v != 0) {
        max_mag = max_mag.max(v.ilog10() as i32);
        let pp1 = last_non_zero_idx(&v.to_string()).map_or(0, |i| i as i32 + 1);
        max_prec = max_prec.max(pp1);
    }

    if max_mag == i32::MIN {
        return LabelFormat::Integer;
    }

    let n0 = max_mag - max_prec + 1;
    if n0 < 4 && max_mag < 6 {
        LabelFormat::Integer
    } else {
        LabelFormat::Scientific {
            fraction_digits: (max_prec - 1).max(0) as usize,
        }
    }
}
