//! Coordinate transformations between world values and physical coordinates.
//!
//! This module maps values through three spaces:
//! - **World space**: data values in their native units
//! - **Normalized space**: `[0, 1]` across the visible world range
//! - **Physical space**: paper or device coordinates along one axis
//!
//! # Overview
//!
//! A [`CoordinateTransform`] is an immutable value. Zooming, inverting or
//! dropping the offset derive a new transform; nothing is mutated in place.
//! Whether the mapping is linear or logarithmic is carried by a
//! [`TransformKind`] tag rather than by separate types.
//!
//! A transform built from a degenerate world range (zero span, NaN, or a
//! non-positive endpoint on a logarithmic axis) is still constructed, but it
//! is *invalid*: every conversion on it returns
//! [`Error::InvalidRange`].
//!
//! # Examples
//!
//! ## Linear axis
//!
//! ```rust
//! use axtick::{CoordinateTransform, Range, TransformKind};
//!
//! // 800 pixels showing world values 0..100
//! let t = CoordinateTransform::new(
//!     TransformKind::Linear,
//!     Range::new(0.0, 800.0),
//!     Range::new(0.0, 100.0),
//! );
//! assert_eq!(t.trans_p(25.0).unwrap(), 200.0);
//! assert_eq!(t.trans_u(400.0).unwrap(), 50.0);
//! ```
//!
//! ## Logarithmic axis
//!
//! ```rust
//! use axtick::{CoordinateTransform, Range, TransformKind};
//!
//! let t = CoordinateTransform::new_normal(TransformKind::Logarithmic, Range::new(1.0, 100.0));
//! assert!((t.trans_p(10.0).unwrap() - 0.5).abs() < 1e-12);
//!
//! // Non-positive values land at infinity instead of failing
//! assert_eq!(t.trans_p(0.0).unwrap(), f64::NEG_INFINITY);
//! ```
//!
//! ## Zoom
//!
//! ```rust
//! use axtick::{CoordinateTransform, Range, TransformKind};
//!
//! let t = CoordinateTransform::new_normal(TransformKind::Linear, Range::new(0.0, 100.0));
//! let zoomed = t.zoom(&Range::new(0.25, 0.75)).unwrap();
//! assert_eq!(zoomed.value_range().unwrap(), Range::new(25.0, 75.0));
//! ```

use crate::{Error, Range, Result};

/// How world values are spaced along the axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransformKind {
    #[default]
    Linear,
    /// Equal ratios get equal space. World values must be positive.
    Logarithmic,
}

impl TransformKind {
    /// World value to the space where the mapping is affine.
    fn forward(self, w: f64) -> f64 {
        match self {
            TransformKind::Linear => w,
            TransformKind::Logarithmic => w.log10(),
        }
    }

    fn backward(self, v: f64) -> f64 {
        match self {
            TransformKind::Linear => v,
            TransformKind::Logarithmic => 10f64.powf(v),
        }
    }

    fn accepts(self, w: f64) -> bool {
        match self {
            TransformKind::Linear => w.is_finite(),
            TransformKind::Logarithmic => w.is_finite() && w > 0.0,
        }
    }
}

/// A reversible mapping between world values and physical coordinates.
///
/// Internally the world range is reduced to `scale` and `offset` such that
/// `normalized = (f(world) - offset) / scale`, where `f` is the identity or
/// `log10`. The normalized value is then placed linearly along the physical
/// range.
///
/// Transforms are plain `Copy` values and can be shared freely across
/// threads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateTransform {
    kind: TransformKind,
    valid: bool,
    scale: f64,
    offset: f64,
    physical: Range,
}

impl CoordinateTransform {
    /// Creates a transform mapping `world` onto `physical`.
    ///
    /// Degenerate input produces an invalid transform rather than an error;
    /// use [`create_transform`] to get the error up front.
    pub fn new(kind: TransformKind, physical: Range, world: Range) -> Self {
        let (w1, w2) = (world.start(), world.end());
        let physical_ok = physical.start().is_finite()
            && physical.end().is_finite()
            && physical.start() != physical.end();

        if !(physical_ok && kind.accepts(w1) && kind.accepts(w2)) {
            return Self::invalid(kind, physical);
        }

        let offset = kind.forward(w1);
        let scale = kind.forward(w2) - offset;
        if scale == 0.0 || !scale.is_finite() {
            return Self::invalid(kind, physical);
        }

        Self {
            kind,
            valid: true,
            scale,
            offset,
            physical,
        }
    }

    /// Creates a transform onto the normalized range `[0, 1]`.
    pub fn new_normal(kind: TransformKind, world: Range) -> Self {
        Self::new(kind, Range::new(0.0, 1.0), world)
    }

    fn invalid(kind: TransformKind, physical: Range) -> Self {
        Self {
            kind,
            valid: false,
            scale: f64::NAN,
            offset: f64::NAN,
            physical,
        }
    }

    /// A transform with the same kind and physical range but new coefficients.
    fn derive(&self, scale: f64, offset: f64) -> Self {
        Self {
            scale,
            offset,
            ..*self
        }
    }

    fn check(&self) -> Result<()> {
        if self.valid {
            Ok(())
        } else {
            Err(Error::InvalidRange("transform is invalid".into()))
        }
    }

    pub const fn kind(&self) -> TransformKind {
        self.kind
    }

    pub const fn is_valid(&self) -> bool {
        self.valid
    }

    /// Span of the world range in the affine space (`log10` for logarithmic).
    pub const fn scale(&self) -> f64 {
        self.scale
    }

    /// The world start in the affine space.
    pub const fn offset(&self) -> f64 {
        self.offset
    }

    pub const fn physical_range(&self) -> Range {
        self.physical
    }

    fn to_normal(&self, w: f64) -> f64 {
        if self.kind == TransformKind::Logarithmic && w <= 0.0 {
            return f64::NEG_INFINITY * self.scale;
        }
        (self.kind.forward(w) - self.offset) / self.scale
    }

    fn from_normal(&self, n: f64) -> f64 {
        self.kind.backward(self.scale * n + self.offset)
    }

    fn physical_span(&self) -> f64 {
        self.physical.end() - self.physical.start()
    }

    /// World value to physical coordinate.
    ///
    /// On a logarithmic axis a non-positive `world` maps to an infinity on the
    /// side of the axis where values shrink toward zero.
    pub fn trans_p(&self, world: f64) -> Result<f64> {
        self.check()?;
        let n = self.to_normal(world);
        Ok(self.physical.start() + n * self.physical_span())
    }

    /// Physical coordinate to world value. Inverse of [`trans_p`](Self::trans_p).
    pub fn trans_u(&self, physical: f64) -> Result<f64> {
        self.check()?;
        let n = (physical - self.physical.start()) / self.physical_span();
        Ok(self.from_normal(n))
    }

    /// Maps both endpoints with [`trans_p`](Self::trans_p), keeping inclusion flags.
    pub fn trans_p_range(&self, world: &Range) -> Result<Range> {
        Ok(Range::with_inclusion(
            self.trans_p(world.start())?,
            world.is_start_included(),
            self.trans_p(world.end())?,
            world.is_end_included(),
        ))
    }

    /// Maps both endpoints with [`trans_u`](Self::trans_u), keeping inclusion flags.
    pub fn trans_u_range(&self, physical: &Range) -> Result<Range> {
        Ok(Range::with_inclusion(
            self.trans_u(physical.start())?,
            physical.is_start_included(),
            self.trans_u(physical.end())?,
            physical.is_end_included(),
        ))
    }

    /// The world values at the start and end of the physical range.
    pub fn value_range(&self) -> Result<Range> {
        self.check()?;
        Ok(Range::new(self.from_normal(0.0), self.from_normal(1.0)))
    }

    /// Whether world values grow against the physical direction.
    pub fn is_inverted(&self) -> bool {
        (self.scale < 0.0) != self.physical.is_inverted()
    }

    /// Restricts the visible world range to the normalized sub-range `npr`.
    ///
    /// A sub-range running backwards inverts the result. A span that would
    /// overflow is clamped to `±f64::MAX`.
    pub fn zoom(&self, npr: &Range) -> Result<Self> {
        self.check()?;
        let offset = self.offset + self.scale * npr.start();
        let mut scale = self.scale * (npr.end() - npr.start());
        if scale == f64::INFINITY {
            scale = f64::MAX;
        } else if scale == f64::NEG_INFINITY {
            scale = -f64::MAX;
        }
        if scale == 0.0 || !scale.is_finite() || !offset.is_finite() {
            return Err(Error::InvalidRange(format!(
                "zoom to {npr} collapses the transform"
            )));
        }
        Ok(self.derive(scale, offset))
    }

    /// Flips the direction of the world axis over the same physical range.
    pub fn invert(&self) -> Result<Self> {
        self.check()?;
        Ok(self.derive(-self.scale, self.scale + self.offset))
    }

    /// Same scale with the offset dropped, so world zero (or one, on a
    /// logarithmic axis) sits at the physical start.
    pub fn derive_no_offset(&self) -> Result<Self> {
        self.check()?;
        Ok(self.derive(self.scale, 0.0))
    }

    /// Smallest physical span between `p_lo` and `p_hi` that still resolves
    /// distinct world values at relative precision `precision_limit`.
    ///
    /// For a linear axis the limit grows with the distance from world zero and
    /// is zero when `[p_lo, p_hi]` straddles it. For a logarithmic axis it is
    /// constant: `|log10(1 - t)| / |scale|` of the physical span.
    pub fn min_p_span_for_precision_limit(
        &self,
        p_lo: f64,
        p_hi: f64,
        precision_limit: f64,
    ) -> Result<f64> {
        self.check()?;
        match self.kind {
            TransformKind::Linear => {
                let zero = self.trans_p(0.0)?;
                let (lo, hi) = crate::tick::util::sorted_pair(p_lo, p_hi);
                if lo < zero && hi > zero {
                    return Ok(0.0);
                }
                let far = if lo + hi > 2.0 * zero { hi } else { lo };
                Ok(precision_limit * (far - zero).abs())
            }
            TransformKind::Logarithmic => Ok((1.0 - precision_limit).log10().abs()
                / self.scale.abs()
                * self.physical_span().abs()),
        }
    }
}

/// Creates a transform, failing with [`Error::InvalidRange`] on degenerate input.
///
/// ```
/// use axtick::{Error, Range, TransformKind, create_transform};
///
/// let err = create_transform(
///     TransformKind::Logarithmic,
///     Range::new(0.0, 1.0),
///     Range::new(-1.0, 10.0),
/// );
/// assert!(matches!(err, Err(Error::InvalidRange(_))));
/// ```
pub fn create_transform(
    kind: TransformKind,
    physical: Range,
    world: Range,
) -> Result<CoordinateTransform> {
    let t = CoordinateTransform::new(kind, physical, world);
    if t.is_valid() {
        Ok(t)
    } else {
        Err(Error::InvalidRange(format!("{kind:?} transform of {world}")))
    }
}

/// Widens `range` around its midpoint to the narrowest span that values of
/// magnitude `mid` can resolve at relative precision `precision_limit`.
///
/// Ranges already wide enough are returned unchanged.
pub fn range_for_precision_limit(range: &Range, precision_limit: f64) -> Range {
    let factor = precision_limit / (2.0 - precision_limit);
    let mid = (range.start() + range.end()) / 2.0;
    let half_span = (mid * factor).abs();
    if range.span() >= half_span * 2.0 {
        *range
    } else {
        Range::new(mid - half_span, mid + half_span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() <= 1e-12 * b.abs().max(1.0), "{a} != {b}");
    }

    #[test]
    fn test_transform_linear_normal() {
        let t = CoordinateTransform::new_normal(TransformKind::Linear, Range::new(10.0, 20.0));
        assert!(t.is_valid());
        assert_eq!(t.scale(), 10.0);
        assert_eq!(t.offset(), 10.0);
        assert_eq!(t.trans_p(15.0).unwrap(), 0.5);
        assert_eq!(t.trans_u(0.25).unwrap(), 12.5);
    }

    #[test]
    fn test_transform_linear_physical() {
        let t = CoordinateTransform::new(
            TransformKind::Linear,
            Range::new(600.0, 0.0),
            Range::new(0.0, 50.0),
        );
        assert_eq!(t.trans_p(0.0).unwrap(), 600.0);
        assert_eq!(t.trans_p(50.0).unwrap(), 0.0);
        assert_eq!(t.trans_u(150.0).unwrap(), 37.5);
        assert!(t.is_inverted());
    }

    #[test]
    fn test_transform_degenerate_is_invalid() {
        let cases = [
            (TransformKind::Linear, Range::new(5.0, 5.0)),
            (TransformKind::Linear, Range::new(f64::NAN, 1.0)),
            (TransformKind::Logarithmic, Range::new(0.0, 10.0)),
            (TransformKind::Logarithmic, Range::new(-1.0, 10.0)),
            (TransformKind::Logarithmic, Range::new(3.0, 3.0)),
        ];
        for (kind, world) in cases {
            let t = CoordinateTransform::new_normal(kind, world);
            assert!(!t.is_valid(), "{kind:?} {world}");
            assert!(matches!(t.trans_p(1.0), Err(Error::InvalidRange(_))));
            assert!(matches!(t.trans_u(0.5), Err(Error::InvalidRange(_))));
            assert!(t.zoom(&Range::new(0.0, 0.5)).is_err());
            assert!(create_transform(kind, Range::new(0.0, 1.0), world).is_err());
        }
    }

    #[test]
    fn test_transform_zero_physical_span_is_invalid() {
        let t = CoordinateTransform::new(
            TransformKind::Linear,
            Range::new(3.0, 3.0),
            Range::new(0.0, 1.0),
        );
        assert!(!t.is_valid());
    }

    #[test]
    fn test_transform_log_non_positive_goes_to_infinity() {
        let t = CoordinateTransform::new_normal(TransformKind::Logarithmic, Range::new(1.0, 1000.0));
        assert_close(t.trans_p(10.0).unwrap(), 1.0 / 3.0);
        assert_eq!(t.trans_p(0.0).unwrap(), f64::NEG_INFINITY);
        assert_eq!(t.trans_p(-5.0).unwrap(), f64::NEG_INFINITY);

        let inverted = CoordinateTransform::new_normal(TransformKind::Logarithmic, Range::new(1000.0, 1.0));
        assert_eq!(inverted.trans_p(0.0).unwrap(), f64::INFINITY);
    }

    #[test]
    fn test_transform_log_round_trip() {
        let t = CoordinateTransform::new(
            TransformKind::Logarithmic,
            Range::new(0.0, 500.0),
            Range::new(0.01, 1e6),
        );
        for w in [0.01, 0.5, 3.0, 42.0, 1e5] {
            let back = t.trans_u(t.trans_p(w).unwrap()).unwrap();
            assert_close(back, w);
        }
    }

    #[test]
    fn test_transform_range_keeps_inclusion() {
        let t = CoordinateTransform::new_normal(TransformKind::Linear, Range::new(0.0, 10.0));
        let r = t
            .trans_p_range(&Range::with_inclusion(2.0, false, 8.0, true))
            .unwrap();
        assert_eq!(r, Range::with_inclusion(0.2, false, 0.8, true));

        let back = t.trans_u_range(&r).unwrap();
        assert!(!back.is_start_included());
        assert!(back.is_end_included());
    }

    #[test]
    fn test_transform_zoom() {
        let t = CoordinateTransform::new_normal(TransformKind::Linear, Range::new(0.0, 100.0));
        let zoomed = t.zoom(&Range::new(0.25, 0.75)).unwrap();
        assert_eq!(zoomed.value_range().unwrap(), Range::new(25.0, 75.0));
        assert_eq!(zoomed.trans_p(50.0).unwrap(), 0.5);

        let flipped = t.zoom(&Range::new(1.0, 0.0)).unwrap();
        assert!(flipped.is_inverted());
        assert_eq!(flipped.value_range().unwrap(), Range::new(100.0, 0.0));
    }

    #[test]
    fn test_transform_zoom_log() {
        let t = CoordinateTransform::new_normal(TransformKind::Logarithmic, Range::new(1.0, 10_000.0));
        let zoomed = t.zoom(&Range::new(0.25, 0.75)).unwrap();
        let r = zoomed.value_range().unwrap();
        assert_close(r.start(), 10.0);
        assert_close(r.end(), 1000.0);
    }

    #[test]
    fn test_transform_zoom_clamps_overflow() {
        let t = CoordinateTransform::new_normal(TransformKind::Linear, Range::new(0.0, f64::MAX));
        let zoomed = t.zoom(&Range::new(0.0, 4.0)).unwrap();
        assert_eq!(zoomed.scale(), f64::MAX);
        assert!(zoomed.trans_u(0.5).unwrap().is_finite());

        let negative = t.zoom(&Range::new(0.0, -4.0)).unwrap();
        assert_eq!(negative.scale(), -f64::MAX);
    }

    #[test]
    fn test_transform_invert() {
        let t = CoordinateTransform::new_normal(TransformKind::Linear, Range::new(0.0, 100.0));
        let inv = t.invert().unwrap();
        assert!(inv.is_inverted());
        assert_eq!(inv.value_range().unwrap(), Range::new(100.0, 0.0));
        assert_eq!(inv.trans_p(25.0).unwrap(), 0.75);
        assert_eq!(inv.invert().unwrap(), t);
    }

    #[test]
    fn test_transform_derive_no_offset() {
        let t = CoordinateTransform::new_normal(TransformKind::Linear, Range::new(10.0, 20.0));
        let d = t.derive_no_offset().unwrap();
        assert_eq!(d.offset(), 0.0);
        assert_eq!(d.value_range().unwrap(), Range::new(0.0, 10.0));
    }

    #[test]
    fn test_transform_min_p_span_linear() {
        let t = CoordinateTransform::new_normal(TransformKind::Linear, Range::new(100.0, 200.0));
        // world zero sits at p = -1, the far end at p = 1
        assert_close(t.min_p_span_for_precision_limit(0.0, 1.0, 1e-3).unwrap(), 2e-3);

        let straddling = CoordinateTransform::new_normal(TransformKind::Linear, Range::new(-100.0, 100.0));
        assert_eq!(
            straddling
                .min_p_span_for_precision_limit(0.0, 1.0, 1e-3)
                .unwrap(),
            0.0
        );
    }

    #[test]
    fn test_transform_min_p_span_log() {
        let t = CoordinateTransform::new(
            TransformKind::Logarithmic,
            Range::new(0.0, 10.0),
            Range::new(1.0, 100.0),
        );
        let span = t.min_p_span_for_precision_limit(0.0, 10.0, 0.5).unwrap();
        assert_close(span, 0.5f64.log10().abs() / 2.0 * 10.0);
        assert!(span > 0.0);
    }

    #[test]
    fn test_range_for_precision_limit() {
        let wide = Range::new(0.0, 10.0);
        assert_eq!(range_for_precision_limit(&wide, 1e-9), wide);

        let narrow = Range::new(1e10, 1e10 + 1.0);
        let widened = range_for_precision_limit(&narrow, 1e-9);
        assert!(widened.span() > 9.99 && widened.span() < 10.01);
        assert_close((widened.start() + widened.end()) / 2.0, 1e10 + 0.5);
    }
}
