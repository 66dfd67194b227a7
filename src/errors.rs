use rust_decimal::Decimal;
use thiserror::Error;

use crate::decimal::Rate;

/// construction and configuration failures.
///
/// the calculation engines themselves never fail; they degrade to zero
#[derive(Error, Debug)]
pub enum CalculatorError {
    #[error("unsupported compounding frequency: {periods} periods per year")]
    UnsupportedCompounding {
        periods: u32,
    },

    #[error("invalid rate table: {message}")]
    InvalidRateTable {
        message: String,
    },

    #[error("invalid rate range: lo {lo} exceeds hi {hi}")]
    InvalidRateRange {
        lo: Rate,
        hi: Rate,
    },

    #[error("invalid excise schedule: {message}")]
    InvalidExciseSchedule {
        message: String,
    },

    #[error("invalid tenure: {months} months")]
    InvalidTenure {
        months: Decimal,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    #[error("configuration parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CalculatorError>;
