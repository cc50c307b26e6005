//! Shared constants, bounds and environment toggles for the analytics engine.

/// App key used for records without an app.
pub const UNKNOWN_APP: &str = "unknown";

/// Label of the roll-up entry in ranked views.
pub const OTHERS_LABEL: &str = "Others";

/// Number of time-of-day buckets per calendar date (one per hour).
pub const HOURS_PER_DAY: usize = 24;

pub const DEFAULT_TOP_N: usize = 10;
pub const MAX_TOP_N: usize = 1000;

/// Below this many records the grouper builds field maps sequentially.
pub const DEFAULT_PARALLEL_MIN_RECORDS: usize = 2048;

pub fn clamp_top_n(value: usize) -> usize {
    value.clamp(1, MAX_TOP_N)
}

pub fn parallel_grouping_enabled() -> bool {
    match std::env::var("CALLSTAT_PARALLEL_GROUPING") {
        Ok(val) => {
            let v = val.trim().to_lowercase();
            !matches!(v.as_str(), "0" | "false" | "no" | "off")
        }
        Err(_) => true,
    }
}

pub fn parallel_min_records() -> usize {
    std::env::var("CALLSTAT_PARALLEL_MIN_RECORDS")
        .ok()
        .and_then(|val| val.trim().parse::<usize>().ok())
        .unwrap_or(DEFAULT_PARALLEL_MIN_RECORDS)
}

/// Fan-out decision for explicit settings.
pub fn parallelize_with(enabled: bool, min_records: usize, record_count: usize) -> bool {
    enabled && record_count >= min_records
}

/// Whether a grouping pass over `record_count` records should fan out,
/// according to the environment.
pub fn should_parallelize(record_count: usize) -> bool {
    parallelize_with(
        parallel_grouping_enabled(),
        parallel_min_records(),
        record_count,
    )
}
