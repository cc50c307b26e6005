//! Shared typed models used by the filter, aggregation and grouping layers.

use std::fmt;

use chrono::NaiveDate;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::analytics::guards::{HOURS_PER_DAY, UNKNOWN_APP};
use crate::errors::CallStatResult;

// ---------------------------------------------------------------------------
// 1. CallKind
// ---------------------------------------------------------------------------

/// Direction of a call after normalization.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallKind {
    Incoming,
    Outgoing,
}

impl CallKind {
    /// Parse a free-form kind string. Anything other than `incoming` or
    /// `outgoing` (after trimming and lowercasing) is unrecognized.
    pub fn parse(raw: &str) -> Option<Self> {
        match normalize_kind(raw).as_str() {
            "incoming" => Some(CallKind::Incoming),
            "outgoing" => Some(CallKind::Outgoing),
            _ => None,
        }
    }

}

/// Canonical comparison form of a kind string.
pub fn normalize_kind(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

/// Merge a canonical key with its legacy spelling: the first non-blank value
/// wins, and a blank canonical value is kept only when nothing better exists.
fn merge_keys(canonical: Option<String>, legacy: Option<String>) -> Option<String> {
    if non_blank(canonical.as_ref()).is_some() {
        return canonical;
    }
    legacy.filter(|v| !v.trim().is_empty()).or(canonical)
}

// ---------------------------------------------------------------------------
// 2. CallRecord
// ---------------------------------------------------------------------------

/// One logged call, with every field nullable.
///
/// `kind` is also accepted under the `type` key used by the upstream
/// request payloads, and both keys may appear together. `source`, `country`
/// and `city` are attached by the caller before the record reaches the engine.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "CallRecordWire")]
pub struct CallRecord {
    pub kind: Option<String>,
    pub app: Option<String>,
    pub number: Option<String>,
    pub duration: Option<f64>,
    pub timestamp: Option<String>,
    pub status: Option<String>,
    pub name: Option<String>,
    pub source: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
}

/// Wire shape of a call record; `kind` and `type` are read independently.
#[derive(Deserialize)]
struct CallRecordWire {
    #[serde(default)]
    kind: Option<String>,
    #[serde(default, rename = "type")]
    legacy_kind: Option<String>,
    #[serde(default)]
    app: Option<String>,
    #[serde(default)]
    number: Option<String>,
    #[serde(default)]
    duration: Option<f64>,
    #[serde(default)]
    timestamp: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    city: Option<String>,
}

impl From<CallRecordWire> for CallRecord {
    fn from(wire: CallRecordWire) -> Self {
        CallRecord {
            kind: merge_keys(wire.kind, wire.legacy_kind),
            app: wire.app,
            number: wire.number,
            duration: wire.duration,
            timestamp: wire.timestamp,
            status: wire.status,
            name: wire.name,
            source: wire.source,
            country: wire.country,
            city: wire.city,
        }
    }
}

impl CallRecord {
    pub fn call_kind(&self) -> Option<CallKind> {
        self.kind.as_deref().and_then(CallKind::parse)
    }

    /// Normalized kind string, recognized or not. `None` for a blank kind.
    pub fn normalized_kind(&self) -> Option<String> {
        non_blank(self.kind.as_ref()).map(normalize_kind)
    }

    /// Duration usable for averaging: present, finite and non-negative.
    /// `-0.0` is folded into `0.0`.
    pub fn valid_duration(&self) -> Option<f64> {
        match self.duration {
            Some(d) if d.is_finite() && d >= 0.0 => Some(d + 0.0),
            _ => None,
        }
    }

    /// Whether the record carries a duration the engine has to discard.
    pub fn has_defective_duration(&self) -> bool {
        self.duration.is_some() && self.valid_duration().is_none()
    }

    /// App key for usage aggregation; null or blank apps map to `"unknown"`.
    pub fn app_label(&self) -> &str {
        match self.app.as_deref() {
            Some(app) if !app.trim().is_empty() => app,
            _ => UNKNOWN_APP,
        }
    }

    pub fn contact_name(&self) -> Option<&str> {
        non_blank(self.name.as_ref())
    }

    pub fn source_label(&self) -> Option<&str> {
        non_blank(self.source.as_ref())
    }

    pub fn country_label(&self) -> Option<&str> {
        non_blank(self.country.as_ref())
    }

    pub fn city_label(&self) -> Option<&str> {
        non_blank(self.city.as_ref())
    }
}

// ---------------------------------------------------------------------------
// 3. CallFilter
// ---------------------------------------------------------------------------

/// Sparse record predicate. Present fields are combined with logical AND;
/// unknown keys in a payload are ignored. Serialized with camelCase keys.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "CallFilterWire")]
pub struct CallFilter {
    pub kind: Option<String>,
    pub app: Option<String>,
    pub phone_number: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

/// Wire shape of a filter. Canonical camelCase keys and their legacy
/// spellings are read side by side, so a payload may carry both.
#[derive(Deserialize)]
struct CallFilterWire {
    #[serde(default)]
    kind: Option<String>,
    #[serde(default, rename = "type")]
    legacy_kind: Option<String>,
    #[serde(default)]
    app: Option<String>,
    #[serde(default, rename = "phoneNumber")]
    phone_number: Option<String>,
    #[serde(default, rename = "phone_number")]
    legacy_phone_number: Option<String>,
    #[serde(default, rename = "startTime")]
    start_time: Option<String>,
    #[serde(default, rename = "start_time")]
    legacy_start_time: Option<String>,
    #[serde(default, rename = "endTime")]
    end_time: Option<String>,
    #[serde(default, rename = "end_time")]
    legacy_end_time: Option<String>,
}

impl From<CallFilterWire> for CallFilter {
    fn from(wire: CallFilterWire) -> Self {
        CallFilter {
            kind: merge_keys(wire.kind, wire.legacy_kind),
            app: wire.app,
            phone_number: merge_keys(wire.phone_number, wire.legacy_phone_number),
            start_time: merge_keys(wire.start_time, wire.legacy_start_time),
            end_time: merge_keys(wire.end_time, wire.legacy_end_time),
        }
    }
}

// ---------------------------------------------------------------------------
// 4. StatisticsReport
// ---------------------------------------------------------------------------

/// Duration summary for one bucket of calls.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DurationStats {
    /// Calls in the bucket.
    pub count: u64,
    /// Calls in the bucket that carried a usable duration.
    pub timed_count: u64,
    pub total_duration: f64,
    pub average_duration: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CallDurationStats {
    pub incoming: DurationStats,
    pub outgoing: DurationStats,
    pub total: DurationStats,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppUsage {
    pub incoming: u64,
    pub outgoing: u64,
}

impl AppUsage {
    pub fn total(&self) -> u64 {
        self.incoming + self.outgoing
    }
}

/// Calls on one calendar date, bucketed by hour of day (index 0 = 00:00-00:59).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayActivity {
    pub hours: [u64; HOURS_PER_DAY],
    pub total_calls: u64,
}

impl Default for DayActivity {
    fn default() -> Self {
        Self {
            hours: [0; HOURS_PER_DAY],
            total_calls: 0,
        }
    }
}

/// Full statistical summary of a (filtered) record set.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StatisticsReport {
    pub total_records: u64,
    pub incoming_count: u64,
    pub outgoing_count: u64,
    pub call_duration: CallDurationStats,
    pub call_apps: IndexMap<String, AppUsage>,
    pub key_contacts: IndexMap<String, u64>,
    /// Keyed by calendar date, iterated in ascending order.
    pub activity_periods: std::collections::BTreeMap<NaiveDate, DayActivity>,
    /// Absent when no record carried a country annotation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_activity: Option<IndexMap<String, u64>>,
    /// Absent when no record carried a city annotation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city_activity: Option<IndexMap<String, u64>>,
    /// Records left out of activity periods for a missing or unparsable timestamp.
    pub skipped_timestamps: u64,
}

// ---------------------------------------------------------------------------
// 5. Similarity
// ---------------------------------------------------------------------------

/// Record fields compared across sources, in output order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ComparableField {
    Kind,
    App,
    Number,
    Duration,
    Timestamp,
    Status,
    Name,
}

impl ComparableField {
    pub const ALL: [ComparableField; 7] = [
        ComparableField::Kind,
        ComparableField::App,
        ComparableField::Number,
        ComparableField::Duration,
        ComparableField::Timestamp,
        ComparableField::Status,
        ComparableField::Name,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ComparableField::Kind => "kind",
            ComparableField::App => "app",
            ComparableField::Number => "number",
            ComparableField::Duration => "duration",
            ComparableField::Timestamp => "timestamp",
            ComparableField::Status => "status",
            ComparableField::Name => "name",
        }
    }

    /// Value this field takes on `record`, if any.
    pub fn value_of(self, record: &CallRecord) -> Option<FieldValue> {
        let text = |v: &Option<String>| v.clone().map(FieldValue::Text);
        match self {
            ComparableField::Kind => record.normalized_kind().map(FieldValue::Text),
            ComparableField::App => text(&record.app),
            ComparableField::Number => text(&record.number),
            ComparableField::Duration => record.valid_duration().map(FieldValue::Number),
            ComparableField::Timestamp => text(&record.timestamp),
            ComparableField::Status => text(&record.status),
            ComparableField::Name => text(&record.name),
        }
    }
}

impl fmt::Display for ComparableField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A compared value: numeric for durations, text for everything else.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// Whether `raw` names this value. Numbers also match on parsed
    /// numeric equality, so `"30"` and `"30.0"` both select `30`.
    pub fn matches_str(&self, raw: &str) -> bool {
        match self {
            FieldValue::Text(text) => text == raw,
            FieldValue::Number(n) => {
                self.to_string() == raw || raw.trim().parse::<f64>().is_ok_and(|p| p == *n)
            }
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(n) => write!(f, "{n}"),
            FieldValue::Text(text) => f.write_str(text),
        }
    }
}

/// A (field, value) pair observed in records from two or more sources.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimilarityGroup {
    pub field: String,
    pub value: FieldValue,
    /// Distinct sources, in order of first appearance.
    pub sources: IndexSet<String>,
    /// Contributing records, in input order.
    pub matching_records: Vec<CallRecord>,
}

// ---------------------------------------------------------------------------
// 6. Request payloads
// ---------------------------------------------------------------------------

/// Either a bare list of calls or the `{"call_history": [...]}` envelope.
#[derive(Deserialize)]
#[serde(untagged)]
enum CallPayload {
    Records(Vec<CallRecord>),
    History { call_history: Vec<CallRecord> },
}

/// Parse a JSON call payload in either accepted shape.
pub fn parse_call_payload(json: &str) -> CallStatResult<Vec<CallRecord>> {
    let payload: CallPayload = serde_json::from_str(json)?;
    Ok(match payload {
        CallPayload::History { call_history } => call_history,
        CallPayload::Records(records) => records,
    })
}

/// Parse a JSON filter payload; `null` is the empty filter.
pub fn parse_filter_payload(json: &str) -> CallStatResult<CallFilter> {
    let filter: Option<CallFilter> = serde_json::from_str(json)?;
    Ok(filter.unwrap_or_default())
}
