//! Record filter evaluation.

use chrono::NaiveDateTime;

use crate::analytics::timestamps::{parse_bound, parse_timestamp, BoundEdge};
use crate::errors::{CallStatError, CallStatResult};
use crate::models::{normalize_kind, CallFilter, CallRecord};

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

/// A `CallFilter` with its time bounds parsed once up front.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CompiledFilter {
    kind: Option<String>,
    app: Option<String>,
    phone_number: Option<String>,
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
}

impl CompiledFilter {
    /// Compile a filter. An unparsable time bound is an invalid filter; an
    /// inverted range is not, it simply matches nothing.
    pub fn compile(filter: &CallFilter) -> CallStatResult<Self> {
        let bound = |raw: &Option<String>, edge: BoundEdge, key: &str| {
            present(raw)
                .map(|value| {
                    parse_bound(value, edge).ok_or_else(|| {
                        CallStatError::InvalidFilter(format!("unparsable {key} '{value}'"))
                    })
                })
                .transpose()
        };

        Ok(Self {
            kind: present(&filter.kind).map(normalize_kind),
            app: present(&filter.app).map(str::to_string),
            phone_number: present(&filter.phone_number).map(str::to_string),
            start: bound(&filter.start_time, BoundEdge::Start, "startTime")?,
            end: bound(&filter.end_time, BoundEdge::End, "endTime")?,
        })
    }

    pub fn is_unconstrained(&self) -> bool {
        self.kind.is_none()
            && self.app.is_none()
            && self.phone_number.is_none()
            && self.start.is_none()
            && self.end.is_none()
    }

    fn has_time_bounds(&self) -> bool {
        self.start.is_some() || self.end.is_some()
    }

    /// Whether `record` satisfies every constraint of the filter.
    pub fn matches(&self, record: &CallRecord) -> bool {
        if let Some(kind) = &self.kind {
            if record.normalized_kind().as_deref() != Some(kind.as_str()) {
                return false;
            }
        }
        if let Some(app) = &self.app {
            if record.app.as_deref() != Some(app.as_str()) {
                return false;
            }
        }
        if let Some(number) = &self.phone_number {
            if record.number.as_deref() != Some(number.as_str()) {
                return false;
            }
        }
        if self.has_time_bounds() {
            let Some(ts) = record.timestamp.as_deref().and_then(parse_timestamp) else {
                tracing::debug!(
                    timestamp = ?record.timestamp,
                    "skipping record with unparsable timestamp under time filter"
                );
                return false;
            };
            if self.start.is_some_and(|start| ts < start) {
                return false;
            }
            if self.end.is_some_and(|end| ts > end) {
                return false;
            }
        }
        true
    }
}

/// Evaluate `filter` against a single record.
pub fn matches(record: &CallRecord, filter: &CallFilter) -> CallStatResult<bool> {
    Ok(CompiledFilter::compile(filter)?.matches(record))
}

/// Records of `records` that satisfy `filter`, in input order.
pub fn apply_filter<'a>(
    records: &'a [CallRecord],
    filter: &CompiledFilter,
) -> Vec<&'a CallRecord> {
    if filter.is_unconstrained() {
        return records.iter().collect();
    }
    records.iter().filter(|r| filter.matches(r)).collect()
}
