use num_traits::Float;

use super::DOUBLE_PRECISION_TOLERANCE;

/// Return `(min, max)` for two owned values.
pub fn sorted_pair<T: PartialOrd>(a: T, b: T) -> (T, T) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Widen `[lo, hi]` outward by the relative floating tolerance.
pub(crate) fn expand_by_tolerance<T: Float>(lo: T, hi: T) -> (T, T) {
    let tol = T::from(DOUBLE_PRECISION_TOLERANCE).unwrap_or_else(T::epsilon);
    (
        (lo - lo.abs() * tol).max(T::min_value()),
        (hi + hi.abs() * tol).min(T::max_value()),
    )
}

/// Narrow `[lo, hi]` inward by the relative floating tolerance.
pub(crate) fn shrink_by_tolerance<T: Float>(lo: T, hi: T) -> (T, T) {
    let tol = T::from(DOUBLE_PRECISION_TOLERANCE).unwrap_or_else(T::epsilon);
    (lo + lo.abs() * tol, hi - hi.abs() * tol)
}

/// Compare two doubles ignoring the lowest `bits` bits of the mantissa.
///
/// Values of different sign, or where either is NaN, never match. Zero matches
/// only zero.
///
/// ```
/// use axtick::tick::util::approximate;
///
/// assert!(approximate(0.1 + 0.2, 0.3, 4));
/// assert!(!approximate(1.0, 1.001, 4));
/// ```
pub fn approximate(a: f64, b: f64, bits: u32) -> bool {
    if a == b {
        return true;
    }
    if a.is_nan() || b.is_nan() || a.signum() != b.signum() || a == 0.0 || b == 0.0 {
        return false;
    }
    let shift = bits.min(52);
    let (ia, ib) = (a.abs().to_bits() >> shift, b.abs().to_bits() >> shift);
    ia.abs_diff(ib) <= 1
}

/// Choose a minor tick count for an integral major interval.
///
/// Only the significant digits of `major_interval` are considered (trailing
/// zeros are dropped), and the minor spacing must divide them evenly. Of the
/// two divisors surrounding the proposed spacing, the one whose minor count
/// is nearer `proposed` wins; ties go to fewer minors.
///
/// ```
/// use axtick::tick::util::minor_number_for;
///
/// assert_eq!(minor_number_for(10, 3), 4);
/// assert_eq!(minor_number_for(6, 4), 5);
/// assert_eq!(minor_number_for(12, 4), 3);
/// ```
pub fn minor_number_for(major_interval: u32, proposed: u32) -> u32 {
    let mut digits = major_interval;
    while digits > 10 && digits % 10 == 0 {
        digits /= 10;
    }
    if digits <= 1 {
        return 0;
    }

    let minor_interval = (digits / proposed.saturating_add(1)).max(1);
    let below = (2..=minor_interval)
        .rev()
        .find(|itv| digits % itv == 0)
        .unwrap_or(1);
    let above = (minor_interval + 1..digits)
        .find(|itv| digits % itv == 0)
        .unwrap_or(digits);

    let num_below = digits / below - 1;
    let num_above = digits / above - 1;
    if num_above == 0 {
        return num_below;
    }

    let proposed = i64::from(proposed);
    if i64::from(num_below) - proposed < proposed - i64::from(num_above) {
        num_below
    } else {
        num_above
    }
}
