//! Error type shared by transforms, tick calculators and limit calculators.

/// Errors raised synchronously by the operation that needed a valid input.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The stored range or transform cannot produce a value: NaN or infinite
    /// endpoints, a zero span, or a non-positive logarithmic endpoint.
    #[error("Invalid range: {0}")]
    InvalidRange(String),
    /// An input lies outside the domain the operation accepts.
    #[error("Illegal argument: {0}")]
    IllegalArgument(String),
}

impl Error {
    pub(crate) fn invalid_range(start: f64, end: f64) -> Self {
        Error::InvalidRange(format!("[{start}, {end}]"))
    }

    pub(crate) fn illegal(msg: impl Into<String>) -> Self {
        Error::IllegalArgument(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
