//! Statistics aggregation over a (filtered) call record set.

use indexmap::IndexMap;

use crate::analytics::filter::{apply_filter, CompiledFilter};
use crate::analytics::timestamps::{date_and_hour, parse_timestamp};
use crate::errors::CallStatResult;
use crate::models::{CallFilter, CallKind, CallRecord, DurationStats, StatisticsReport};

#[derive(Default)]
struct DurationAccumulator {
    count: u64,
    timed_count: u64,
    total: f64,
}

impl DurationAccumulator {
    fn add(&mut self, duration: Option<f64>) {
        self.count += 1;
        if let Some(d) = duration {
            self.timed_count += 1;
            self.total += d;
        }
    }

    fn finish(self) -> DurationStats {
        let average_duration = if self.timed_count == 0 {
            0.0
        } else {
            self.total / self.timed_count as f64
        };
        DurationStats {
            count: self.count,
            timed_count: self.timed_count,
            total_duration: self.total,
            average_duration,
        }
    }
}

fn bump(map: &mut IndexMap<String, u64>, key: &str) {
    match map.get_mut(key) {
        Some(count) => *count += 1,
        None => {
            map.insert(key.to_string(), 1);
        }
    }
}

/// Build the statistics report for the records matching `filter`
/// (every record when `filter` is `None`).
pub fn aggregate(
    records: &[CallRecord],
    filter: Option<&CallFilter>,
) -> CallStatResult<StatisticsReport> {
    let compiled = match filter {
        Some(f) => CompiledFilter::compile(f)?,
        None => CompiledFilter::default(),
    };
    let filtered = apply_filter(records, &compiled);
    let report = aggregate_filtered(&filtered);

    tracing::debug!(
        input = records.len(),
        matched = filtered.len(),
        incoming = report.incoming_count,
        outgoing = report.outgoing_count,
        skipped_timestamps = report.skipped_timestamps,
        "aggregated call statistics"
    );
    Ok(report)
}

/// Unfiltered entry point; cannot fail.
pub fn aggregate_all(records: &[CallRecord]) -> StatisticsReport {
    let all: Vec<&CallRecord> = records.iter().collect();
    aggregate_filtered(&all)
}

/// Single pass over an already-filtered record set.
pub fn aggregate_filtered(records: &[&CallRecord]) -> StatisticsReport {
    let mut report = StatisticsReport {
        total_records: records.len() as u64,
        ..Default::default()
    };

    let mut incoming = DurationAccumulator::default();
    let mut outgoing = DurationAccumulator::default();
    let mut total = DurationAccumulator::default();
    let mut countries: IndexMap<String, u64> = IndexMap::new();
    let mut cities: IndexMap<String, u64> = IndexMap::new();
    let mut saw_country = false;
    let mut saw_city = false;

    for record in records {
        if record.has_defective_duration() {
            tracing::warn!(
                duration = ?record.duration,
                number = ?record.number,
                "ignoring negative or non-finite call duration"
            );
        }
        let duration = record.valid_duration();
        let kind = record.call_kind();

        // Kind counts and per-kind durations.
        match kind {
            Some(CallKind::Incoming) => {
                report.incoming_count += 1;
                incoming.add(duration);
            }
            Some(CallKind::Outgoing) => {
                report.outgoing_count += 1;
                outgoing.add(duration);
            }
            None => {}
        }
        total.add(duration);

        // App usage.
        let usage = report
            .call_apps
            .entry(record.app_label().to_string())
            .or_default();
        match kind {
            Some(CallKind::Incoming) => usage.incoming += 1,
            Some(CallKind::Outgoing) => usage.outgoing += 1,
            None => {}
        }

        if let Some(name) = record.contact_name() {
            bump(&mut report.key_contacts, name);
        }

        match record.timestamp.as_deref().and_then(parse_timestamp) {
            Some(ts) => {
                let (date, hour) = date_and_hour(&ts);
                let day = report.activity_periods.entry(date).or_default();
                day.hours[hour] += 1;
                day.total_calls += 1;
            }
            None => {
                tracing::debug!(
                    timestamp = ?record.timestamp,
                    "record left out of activity periods"
                );
                report.skipped_timestamps += 1;
            }
        }

        if let Some(country) = record.country_label() {
            saw_country = true;
            bump(&mut countries, country);
        }
        if let Some(city) = record.city_label() {
            saw_city = true;
            bump(&mut cities, city);
        }
    }

    report.call_duration.incoming = incoming.finish();
    report.call_duration.outgoing = outgoing.finish();
    report.call_duration.total = total.finish();
    report.country_activity = saw_country.then_some(countries);
    report.city_activity = saw_city.then_some(cities);
    report
}
