//! Python entry points for the analytics engine.
//!
//! Inputs arrive as Python objects (or pre-serialized JSON strings) and are
//! bridged through the `json` module into the serde models; results travel
//! back the same way.

use pyo3::prelude::*;
use pyo3::types::{PyModule, PyString};
use serde::Serialize;

use crate::analytics::guards::{DEFAULT_TOP_N, HOURS_PER_DAY, UNKNOWN_APP};
use crate::analytics::similarity::{filter_groups, group_similar};
use crate::analytics::statistics::aggregate;
use crate::analytics::views::ReportViews;
use crate::lookup::{Annotator, ContactDirectory, ContactInfo, CountryClassifier};
use crate::models::{
    parse_call_payload, parse_filter_payload, CallRecord, ComparableField, StatisticsReport,
};

fn dumps(obj: &Bound<'_, PyAny>) -> PyResult<String> {
    if obj.is_instance_of::<PyString>() {
        return obj.extract();
    }
    let json_module = obj.py().import("json")?;
    json_module.call_method1("dumps", (obj,))?.extract()
}

fn loads<T: Serialize>(py: Python<'_>, value: &T) -> PyResult<PyObject> {
    let json_str = serde_json::to_string(value)
        .map_err(|e| pyo3::exceptions::PyRuntimeError::new_err(e.to_string()))?;
    let json_module = py.import("json")?;
    json_module
        .call_method1("loads", (json_str,))
        .map(|o| o.into())
}

/// A Python callable `number -> Optional[str]`.
struct PyCountryLookup<'py> {
    callable: Bound<'py, PyAny>,
}

impl CountryClassifier for PyCountryLookup<'_> {
    fn classify_country(&self, number: &str) -> Option<String> {
        match self
            .callable
            .call1((number,))
            .and_then(|value| value.extract::<Option<String>>())
        {
            Ok(country) => country,
            Err(err) => {
                tracing::warn!(%err, "country lookup failed; leaving record unannotated");
                None
            }
        }
    }
}

/// A Python callable `number -> Optional[dict]` with `name` / `city` keys.
struct PyContactLookup<'py> {
    callable: Bound<'py, PyAny>,
}

impl PyContactLookup<'_> {
    fn lookup(&self, number: &str) -> PyResult<Option<ContactInfo>> {
        let value = self.callable.call1((number,))?;
        if value.is_none() {
            return Ok(None);
        }
        let info: ContactInfo = serde_json::from_str(&dumps(&value)?)
            .map_err(|e| pyo3::exceptions::PyValueError::new_err(e.to_string()))?;
        Ok(Some(info))
    }
}

impl ContactDirectory for PyContactLookup<'_> {
    fn resolve_contact(&self, number: &str) -> Option<ContactInfo> {
        match self.lookup(number) {
            Ok(info) => info,
            Err(err) => {
                tracing::warn!(%err, "contact lookup failed; leaving record unannotated");
                None
            }
        }
    }
}

fn annotate_calls(
    records: Vec<CallRecord>,
    country_lookup: Option<&Bound<'_, PyAny>>,
    contact_lookup: Option<&Bound<'_, PyAny>>,
) -> Vec<CallRecord> {
    if country_lookup.is_none() && contact_lookup.is_none() {
        return records;
    }
    let classifier = country_lookup.map(|c| PyCountryLookup {
        callable: c.clone(),
    });
    let directory = contact_lookup.map(|c| PyContactLookup {
        callable: c.clone(),
    });
    let mut annotator = Annotator::new();
    if let Some(classifier) = &classifier {
        annotator = annotator.with_classifier(classifier);
    }
    if let Some(directory) = &directory {
        annotator = annotator.with_directory(directory);
    }
    annotator.annotate(&records)
}

/// Build the statistics report for `calls` under optional `filters`.
#[pyfunction]
#[pyo3(signature = (calls, filters=None, country_lookup=None, contact_lookup=None))]
pub fn aggregate_statistics(
    py: Python<'_>,
    calls: &Bound<'_, PyAny>,
    filters: Option<&Bound<'_, PyAny>>,
    country_lookup: Option<&Bound<'_, PyAny>>,
    contact_lookup: Option<&Bound<'_, PyAny>>,
) -> PyResult<PyObject> {
    let records = parse_call_payload(&dumps(calls)?)?;
    let filter = match filters {
        Some(f) if !f.is_none() => Some(parse_filter_payload(&dumps(f)?)?),
        _ => None,
    };
    let records = annotate_calls(records, country_lookup, contact_lookup);
    let report = aggregate(&records, filter.as_ref())?;
    loads(py, &report)
}

/// Build cross-source similarity groups, optionally narrowed by field/value.
#[pyfunction]
#[pyo3(signature = (calls, field=None, value=None))]
pub fn group_similar_calls(
    py: Python<'_>,
    calls: &Bound<'_, PyAny>,
    field: Option<&str>,
    value: Option<&str>,
) -> PyResult<PyObject> {
    let records = parse_call_payload(&dumps(calls)?)?;
    let groups = filter_groups(group_similar(&records)?, field, value);
    loads(py, &groups)
}

/// Ranked and dated views of a report produced by `aggregate_statistics`.
#[pyfunction]
#[pyo3(signature = (report, top_n=DEFAULT_TOP_N))]
pub fn report_views(
    py: Python<'_>,
    report: &Bound<'_, PyAny>,
    top_n: usize,
) -> PyResult<PyObject> {
    let report: StatisticsReport = serde_json::from_str(&dumps(report)?)
        .map_err(|e| pyo3::exceptions::PyValueError::new_err(e.to_string()))?;
    loads(py, &ReportViews::build(&report, top_n))
}

/// Register constants and functions on the extension module.
pub fn register(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add("UNKNOWN_APP", UNKNOWN_APP)?;
    m.add("HOURS_PER_DAY", HOURS_PER_DAY)?;
    m.add("DEFAULT_TOP_N", DEFAULT_TOP_N)?;
    let fields: Vec<&str> = ComparableField::ALL.iter().map(|f| f.as_str()).collect();
    m.add("GROUPED_FIELDS", fields)?;

    m.add_function(wrap_pyfunction!(aggregate_statistics, m)?)?;
    m.add_function(wrap_pyfunction!(group_similar_calls, m)?)?;
    m.add_function(wrap_pyfunction!(report_views, m)?)?;
    Ok(())
}
