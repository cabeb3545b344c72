//! Axis transforms and tick generation
//!
//! `axtick` provides the numeric core of a chart axis: mapping data values to
//! paper or pixel coordinates, choosing "nice" tick marks for a range, and
//! picking a label format that shows those ticks without wasted digits.
//! Rendering, layout and interaction are left to the caller.
//!
//! # Core Concepts
//!
//! ## Transforms
//!
//! A [`CoordinateTransform`] maps world values onto a physical range and
//! back. It is an immutable value; [`zoom`](CoordinateTransform::zoom),
//! [`invert`](CoordinateTransform::invert) and
//! [`derive_no_offset`](CoordinateTransform::derive_no_offset) derive new
//! ones. The kind is selected with [`TransformKind`]:
//! - [`TransformKind::Linear`] - affine mapping
//! - [`TransformKind::Logarithmic`] - equal ratios get equal space
//!
//! ## Tick calculators
//!
//! Every calculator implements [`tick::TickCalculator`]:
//! - [`tick::LinearTickCalculator`] - `{1, 2, 5} × 10^n` spacing
//! - [`tick::LogTickCalculator`] - decades, with `2..9` minors
//! - [`tick::DateTickCalculator`] - calendar units over epoch milliseconds
//!
//! Besides computing ticks inside a fixed range, calculators can expand a
//! range outward to nice boundaries for auto-ranging.
//!
//! ## Label formats
//!
//! [`format::label_format_for`] chooses between fixed-point and scientific
//! notation for a set of tick values.
//!
//! ## Limits
//!
//! [`limits`] computes min/max or percentile display limits over 2-D sample
//! buffers.
//!
//! # Examples
//!
//! ## Ticks and labels
//!
//! ```rust
//! use axtick::tick::{LinearTickCalculator, MinorTicks, TickCalculator};
//!
//! let mut calc = LinearTickCalculator::new();
//! calc.set_range(0.0, 1.0).unwrap();
//! calc.calc_values_by_tick_number(3, MinorTicks::Auto).unwrap();
//!
//! assert_eq!(calc.values(), &[0.0, 0.5, 1.0]);
//! assert_eq!(calc.minor_number(), 4);
//! assert_eq!(calc.label_format().to_string(), "%.1f");
//! ```
//!
//! ## Auto-ranging
//!
//! ```rust
//! use axtick::Range;
//! use axtick::tick::{LinearTickCalculator, TickCalculator};
//!
//! let mut calc = LinearTickCalculator::new();
//! calc.set_range(0.3, 9.2).unwrap();
//! let expanded = calc.expand_range_by_tick_number(6).unwrap();
//! assert_eq!(expanded, Range::new(0.0, 10.0));
//! ```
//!
//! ## Projecting ticks
//!
//! ```rust
//! use axtick::{CoordinateTransform, Range, TransformKind};
//! use axtick::tick::{LogTickCalculator, MinorTicks, TickCalculator};
//!
//! let world = Range::new(1.0, 1000.0);
//! let transform = CoordinateTransform::new(TransformKind::Logarithmic, Range::new(0.0, 300.0), world);
//!
//! let mut calc = LogTickCalculator::new();
//! calc.set_range(world.start(), world.end()).unwrap();
//! calc.calc_values_by_tick_number(4, MinorTicks::Auto).unwrap();
//!
//! let pixels: Vec<f64> = calc
//!     .values()
//!     .iter()
//!     .map(|v| transform.trans_p(*v).unwrap().round())
//!     .collect();
//! assert_eq!(pixels, vec![0.0, 100.0, 200.0, 300.0]);
//! ```

pub mod error;
pub mod format;
pub mod interval;
pub mod limits;
pub mod range;
pub mod tick;
pub mod transform;

pub use error::{Error, Result};
pub use format::{FormattedLabel, LabelFormat};
pub use interval::NumericInterval;
pub use limits::{LimitsCalculator, MinMaxCalculator, PercentileCalculator, SampleBuffer};
pub use range::Range;
pub use tick::TickCalculator;
pub use transform::{CoordinateTransform, TransformKind, create_transform};
