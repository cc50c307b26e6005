//! Error types for the call statistics core library.

/// Top-level error enum for the call statistics core library.
///
/// Only request-level defects surface here. Per-record defects (bad
/// timestamps, unknown kinds, negative durations) are absorbed by the
/// engine and never abort a whole aggregation.
#[derive(Debug, thiserror::Error)]
pub enum CallStatError {
    #[error("Call record at index {index} has no source label")]
    MissingSource { index: usize },

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(feature = "python")]
impl From<CallStatError> for pyo3::PyErr {
    fn from(err: CallStatError) -> pyo3::PyErr {
        pyo3::exceptions::PyValueError::new_err(err.to_string())
    }
}

pub type CallStatResult<T> = Result<T, CallStatError>;
