//! Call statistics core library: the analytics engine behind the call
//! history service.
//!
//! The crate turns in-memory call records into two derived views: a
//! filtered statistical report (`analytics::statistics`) and cross-source
//! similarity groups (`analytics::similarity`). It performs no I/O. With
//! the `python` feature it also compiles as the `_callstat_core` extension
//! module used by the Python service layer.

pub mod analytics;
pub mod errors;
pub mod lookup;
pub mod models;

#[cfg(feature = "python")]
pub mod bindings;

pub use analytics::{aggregate, aggregate_all, filter_groups, group_similar};
pub use errors::{CallStatError, CallStatResult};
pub use models::{CallFilter, CallRecord, SimilarityGroup, StatisticsReport};

#[cfg(feature = "python")]
use pyo3::prelude::*;

// ---------------------------------------------------------------------------
// Top-level Python module: _callstat_core
// ---------------------------------------------------------------------------

#[cfg(feature = "python")]
#[pymodule]
fn _callstat_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    bindings::register(m)
}
