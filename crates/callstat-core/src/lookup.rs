//! Caller-injected lookups used to annotate records before aggregation.
//!
//! The engine holds no prefix tables or subscriber directory. Callers supply
//! read-only lookups through these traits (any matching closure works) and
//! the `Annotator` fills in missing `country`, `name` and `city` fields.

use serde::{Deserialize, Serialize};

use crate::models::CallRecord;

/// What a directory knows about the owner of a number.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
}

pub trait CountryClassifier {
    fn classify_country(&self, number: &str) -> Option<String>;
}

pub trait ContactDirectory {
    fn resolve_contact(&self, number: &str) -> Option<ContactInfo>;
}

impl<F> CountryClassifier for F
where
    F: Fn(&str) -> Option<String>,
{
    fn classify_country(&self, number: &str) -> Option<String> {
        self(number)
    }
}

impl<F> ContactDirectory for F
where
    F: Fn(&str) -> Option<ContactInfo>,
{
    fn resolve_contact(&self, number: &str) -> Option<ContactInfo> {
        self(number)
    }
}

fn is_missing(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

fn fill(slot: &mut Option<String>, value: Option<String>) {
    if is_missing(slot) {
        if let Some(v) = value.filter(|v| !v.trim().is_empty()) {
            *slot = Some(v);
        }
    }
}

/// Applies optional lookups to records. Existing values are never replaced.
#[derive(Default)]
pub struct Annotator<'a> {
    classifier: Option<&'a dyn CountryClassifier>,
    directory: Option<&'a dyn ContactDirectory>,
}

impl<'a> Annotator<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_classifier(mut self, classifier: &'a dyn CountryClassifier) -> Self {
        self.classifier = Some(classifier);
        self
    }

    pub fn with_directory(mut self, directory: &'a dyn ContactDirectory) -> Self {
        self.directory = Some(directory);
        self
    }

    pub fn annotate_record(&self, record: &CallRecord) -> CallRecord {
        let mut annotated = record.clone();
        let Some(number) = record.number.as_deref().filter(|n| !n.trim().is_empty()) else {
            return annotated;
        };

        if let Some(classifier) = self.classifier {
            if is_missing(&annotated.country) {
                fill(&mut annotated.country, classifier.classify_country(number));
            }
        }
        if let Some(directory) = self.directory {
            if is_missing(&annotated.name) || is_missing(&annotated.city) {
                if let Some(info) = directory.resolve_contact(number) {
                    fill(&mut annotated.name, info.name);
                    fill(&mut annotated.city, info.city);
                }
            }
        }
        annotated
    }

    pub fn annotate(&self, records: &[CallRecord]) -> Vec<CallRecord> {
        let annotated: Vec<CallRecord> = records.iter().map(|r| self.annotate_record(r)).collect();
        tracing::debug!(records = annotated.len(), "annotated call records");
        annotated
    }
}
