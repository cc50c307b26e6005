//! Ordered projections of a statistics report for ranked or dated output.

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::analytics::guards::{clamp_top_n, OTHERS_LABEL};
use crate::models::StatisticsReport;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedEntry {
    pub label: String,
    pub count: u64,
}

fn ranked(counts: impl IntoIterator<Item = (String, u64)>) -> Vec<RankedEntry> {
    let mut entries: Vec<RankedEntry> = counts
        .into_iter()
        .map(|(label, count)| RankedEntry { label, count })
        .collect();
    entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    entries
}

/// Entries by count descending (ties by label), with everything past the
/// first `n` folded into a single `"Others"` entry.
pub fn top_n_with_others(counts: &IndexMap<String, u64>, n: usize) -> Vec<RankedEntry> {
    let n = clamp_top_n(n);
    let mut entries = ranked(counts.iter().map(|(k, v)| (k.clone(), *v)));
    if entries.len() > n {
        let rest: u64 = entries.drain(n..).map(|e| e.count).sum();
        entries.push(RankedEntry {
            label: OTHERS_LABEL.to_string(),
            count: rest,
        });
    }
    entries
}

pub fn ranked_contacts(report: &StatisticsReport, n: usize) -> Vec<RankedEntry> {
    let mut entries = ranked(
        report
            .key_contacts
            .iter()
            .map(|(name, count)| (name.clone(), *count)),
    );
    entries.truncate(clamp_top_n(n));
    entries
}

/// Apps ranked by incoming + outgoing calls.
pub fn app_totals(report: &StatisticsReport) -> Vec<RankedEntry> {
    ranked(
        report
            .call_apps
            .iter()
            .map(|(app, usage)| (app.clone(), usage.total())),
    )
}

/// `(date, total_calls)` in ascending date order.
pub fn daily_totals(report: &StatisticsReport) -> Vec<(NaiveDate, u64)> {
    report
        .activity_periods
        .iter()
        .map(|(date, day)| (*date, day.total_calls))
        .collect()
}

pub fn country_breakdown(report: &StatisticsReport, n: usize) -> Option<Vec<RankedEntry>> {
    report
        .country_activity
        .as_ref()
        .map(|counts| top_n_with_others(counts, n))
}

pub fn city_breakdown(report: &StatisticsReport, n: usize) -> Option<Vec<RankedEntry>> {
    report
        .city_activity
        .as_ref()
        .map(|counts| top_n_with_others(counts, n))
}

/// All ranked views of a report in one serializable bundle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReportViews {
    pub top_contacts: Vec<RankedEntry>,
    pub apps: Vec<RankedEntry>,
    pub daily_totals: Vec<(NaiveDate, u64)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub countries: Option<Vec<RankedEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cities: Option<Vec<RankedEntry>>,
}

impl ReportViews {
    pub fn build(report: &StatisticsReport, top_n: usize) -> Self {
        Self {
            top_contacts: ranked_contacts(report, top_n),
            apps: app_totals(report),
            daily_totals: daily_totals(report),
            countries: country_breakdown(report, top_n),
            cities: city_breakdown(report, top_n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::statistics::aggregate_all;
    use crate::models::CallRecord;

    fn counts(pairs: &[(&str, u64)]) -> IndexMap<String, u64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_top_n_folds_remainder_into_others() {
        let map = counts(&[("a", 1), ("b", 5), ("c", 3), ("d", 2)]);
        let top = top_n_with_others(&map, 2);
        let labels: Vec<&str> = top.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["b", "c", OTHERS_LABEL]);
        assert_eq!(top[2].count, 3);
    }

    #[test]
    fn test_top_n_without_overflow_has_no_others() {
        let map = counts(&[("a", 1), ("b", 1)]);
        let top = top_n_with_others(&map, 10);
        let labels: Vec<&str> = top.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["a", "b"]);
    }

    #[test]
    fn test_views_from_report() {
        let records: Vec<CallRecord> = [
            ("Anna", "Phone", "2024-01-02T09:00:00", Some("Minsk")),
            ("Anna", "Viber", "2024-01-01T09:00:00", None),
            ("Boris", "Viber", "2024-01-01T18:00:00", None),
        ]
        .iter()
        .map(|(name, app, ts, city)| CallRecord {
            kind: Some("incoming".to_string()),
            name: Some(name.to_string()),
            app: Some(app.to_string()),
            timestamp: Some(ts.to_string()),
            city: city.map(str::to_string),
            ..Default::default()
        })
        .collect();
        let report = aggregate_all(&records);
        let views = ReportViews::build(&report, 1);

        assert_eq!(
            views.top_contacts,
            vec![RankedEntry {
                label: "Anna".to_string(),
                count: 2
            }]
        );
        assert_eq!(views.apps[0].label, "Viber");
        assert_eq!(views.daily_totals.len(), 2);
        assert!(views.daily_totals[0].0 < views.daily_totals[1].0);
        assert_eq!(views.daily_totals[0].1, 2);
        assert!(views.countries.is_none());
        assert_eq!(views.cities.as_ref().unwrap()[0].label, "Minsk");
    }
}
