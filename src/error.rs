//! Error kinds raised or reported by the performance pipeline.
//!
//! Only structural problems are returned as `Err`: a bad year-quarter, a vendor
//! file missing a required column, or an output encoding that cannot be used.
//! The per-month and per-row kinds are never returned; the pipeline logs them
//! with `warn!` and keeps going.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("invalid year-quarter '{0}', expected YYYY.Qn or YYYYn with n in 1..=4")]
    InvalidPeriod(String),

    #[error("required column '{0}' is missing from the performance export")]
    MissingColumn(String),

    #[error("no qualifying properties for {month}")]
    MissingMonthData { month: String },

    #[error("city '{city}' has no region mapping")]
    UnmappedRegion { city: String },

    #[error("quarter {quarter} has {months} of 3 months")]
    IncompleteQuarter { quarter: String, months: usize },

    #[error("unsupported output encoding '{0}'")]
    UnsupportedEncoding(String),

    #[error("report contains characters that cannot be written as {0}")]
    Unencodable(String),
}

pub type Result<T> = core::result::Result<T, AnalysisError>;
