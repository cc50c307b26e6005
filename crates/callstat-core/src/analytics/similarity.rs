//! Cross-source similarity grouping.
//!
//! For every comparable field, each observed value is mapped to the distinct
//! sources that produced it. Values seen in two or more sources become
//! `SimilarityGroup`s, ordered by field, then by first appearance of the value.

use indexmap::{IndexMap, IndexSet};
use rayon::prelude::*;

use crate::analytics::guards::should_parallelize;
use crate::errors::{CallStatError, CallStatResult};
use crate::models::{CallRecord, ComparableField, FieldValue, SimilarityGroup};

/// Hashable identity of a `FieldValue`. Durations compare by exact bit
/// pattern, which is exact numeric equality once `-0.0` is folded away.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum ValueKey {
    Number(u64),
    Text(String),
}

impl From<&FieldValue> for ValueKey {
    fn from(value: &FieldValue) -> Self {
        match value {
            FieldValue::Number(n) => ValueKey::Number(n.to_bits()),
            FieldValue::Text(text) => ValueKey::Text(text.clone()),
        }
    }
}

struct ValueBucket<'a> {
    value: FieldValue,
    sources: IndexSet<String>,
    records: Vec<&'a CallRecord>,
}

/// Reject the whole input if any record lacks a source label.
pub fn validate_sources(records: &[CallRecord]) -> CallStatResult<()> {
    match records.iter().position(|r| r.source_label().is_none()) {
        Some(index) => Err(CallStatError::MissingSource { index }),
        None => Ok(()),
    }
}

fn field_groups(records: &[CallRecord], field: ComparableField) -> Vec<SimilarityGroup> {
    let mut buckets: IndexMap<ValueKey, ValueBucket<'_>> = IndexMap::new();

    for record in records {
        let Some(value) = field.value_of(record) else {
            continue;
        };
        // Sources were validated before grouping started.
        let Some(source) = record.source_label() else {
            continue;
        };
        let bucket = buckets
            .entry(ValueKey::from(&value))
            .or_insert_with(|| ValueBucket {
                value,
                sources: IndexSet::new(),
                records: Vec::new(),
            });
        if !bucket.sources.contains(source) {
            bucket.sources.insert(source.to_string());
        }
        bucket.records.push(record);
    }

    buckets
        .into_values()
        .filter(|bucket| bucket.sources.len() >= 2)
        .map(|bucket| SimilarityGroup {
            field: field.as_str().to_string(),
            value: bucket.value,
            sources: bucket.sources,
            matching_records: bucket.records.into_iter().cloned().collect(),
        })
        .collect()
}

/// Build the cross-source similarity groups of `records`.
///
/// Every record must carry a non-blank `source`; otherwise the call fails
/// with `CallStatError::MissingSource` before any grouping happens.
pub fn group_similar(records: &[CallRecord]) -> CallStatResult<Vec<SimilarityGroup>> {
    validate_sources(records)?;
    Ok(build_groups(records, should_parallelize(records.len())))
}

/// Group already-validated records, one field map per comparable field,
/// either on the Rayon pool or sequentially. Records without a source are
/// ignored. Both strategies produce the same groups in the same order.
pub fn build_groups(records: &[CallRecord], parallel: bool) -> Vec<SimilarityGroup> {
    let per_field: Vec<Vec<SimilarityGroup>> = if parallel {
        ComparableField::ALL
            .as_slice()
            .par_iter()
            .map(|field| field_groups(records, *field))
            .collect()
    } else {
        ComparableField::ALL
            .iter()
            .map(|field| field_groups(records, *field))
            .collect()
    };
    let groups: Vec<SimilarityGroup> = per_field.into_iter().flatten().collect();

    tracing::debug!(
        records = records.len(),
        groups = groups.len(),
        parallel,
        "built cross-source similarity groups"
    );
    groups
}

/// Narrow groups to an exact `field` and/or a string-compared `value`,
/// keeping their order.
pub fn filter_groups(
    groups: Vec<SimilarityGroup>,
    field: Option<&str>,
    value: Option<&str>,
) -> Vec<SimilarityGroup> {
    groups
        .into_iter()
        .filter(|g| field.map_or(true, |f| g.field == f))
        .filter(|g| value.map_or(true, |v| g.value.matches_str(v)))
        .collect()
}
