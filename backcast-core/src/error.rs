//! Domain error taxonomy shared by every evaluator, generator and aggregator.

use thiserror::Error;

/// Errors raised by the core.
///
/// Each variant is a caller-facing domain failure, not a server fault. The
/// display strings are reported verbatim at the response boundary.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Malformed request data: bad dates, non-positive capital, bad window
    /// ordering, unsupported frequency.
    #[error("{0}")]
    InvalidInput(String),

    /// The provider response was missing, empty or ambiguous.
    #[error("{0}")]
    DataUnavailable(String),

    /// The series is shorter than a required window.
    #[error("insufficient data: {required} points required, {available} available")]
    InsufficientData { required: usize, available: usize },

    #[error("No valid buy dates available in price data")]
    NoValidBuyDates,

    #[error("calibration series produced no returns")]
    EmptyReturnSample,

    #[error("no simulation produced a valid outcome")]
    NoValidSimulations,
}

impl Error {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::DataUnavailable(msg.into())
    }

    /// Stable taxonomy name, used in logs and error envelopes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "InvalidInput",
            Self::DataUnavailable(_) => "DataUnavailable",
            Self::InsufficientData { .. } => "InsufficientData",
            Self::NoValidBuyDates => "NoValidBuyDates",
            Self::EmptyReturnSample => "EmptyReturnSample",
            Self::NoValidSimulations => "NoValidSimulations",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
