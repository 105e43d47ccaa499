use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::models::meal::{MealItem, MealRecord, ValidationIssue};

/// A catalog entry that did not make it into the usable catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rejection {
    /// 1-based position in the submitted catalog.
    pub position: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub issues: Vec<ValidationIssue>,
}

/// Outcome of validating a catalog: the usable items plus every rejection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogReport {
    pub accepted: Vec<MealItem>,
    pub rejected: Vec<Rejection>,
}

impl CatalogReport {
    pub fn is_empty(&self) -> bool {
        self.accepted.is_empty()
    }

    fn accept_or_reject(&mut self, seen: &mut HashSet<String>, position: usize, item: MealItem) {
        if !seen.insert(item.id.as_str().to_string()) {
            self.reject(
                position,
                Some(item.id.to_string()),
                item.title.clone(),
                vec![ValidationIssue::new("id", format!("duplicate id '{}'", item.id))],
            );
            return;
        }
        self.accepted.push(item);
    }

    fn reject(
        &mut self,
        position: usize,
        id: Option<String>,
        title: String,
        issues: Vec<ValidationIssue>,
    ) {
        warn!(
            position,
            id = id.as_deref().unwrap_or("-"),
            "rejected catalog item: {}",
            issues
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ")
        );
        self.rejected.push(Rejection {
            position,
            id,
            title,
            issues,
        });
    }
}

/// Validate raw records from an uploaded file.
pub fn validate_records(records: Vec<MealRecord>) -> CatalogReport {
    let mut report = CatalogReport::default();
    let mut seen = HashSet::new();

    for (i, record) in records.into_iter().enumerate() {
        let position = i + 1;
        let id = record.id.as_ref().map(ToString::to_string);
        let title = record.title.clone();
        match MealItem::from_record(record, position) {
            Ok(item) => report.accept_or_reject(&mut seen, position, item),
            Err(issues) => report.reject(position, id, title, issues),
        }
    }

    report
}

/// Validate arbitrary JSON values, so one malformed entry (say, a string
/// where a number belongs) rejects only that entry.
pub fn validate_values(values: Vec<Value>) -> CatalogReport {
    let mut report = CatalogReport::default();
    let mut seen = HashSet::new();

    for (i, value) in values.into_iter().enumerate() {
        let position = i + 1;
        let title = value
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let record: MealRecord = match serde_json::from_value(value) {
            Ok(record) => record,
            Err(e) => {
                report.reject(
                    position,
                    None,
                    title,
                    vec![ValidationIssue::new("record", e.to_string())],
                );
                continue;
            }
        };
        let id = record.id.as_ref().map(ToString::to_string);
        match MealItem::from_record(record, position) {
            Ok(item) => report.accept_or_reject(&mut seen, position, item),
            Err(issues) => report.reject(position, id, title, issues),
        }
    }

    report
}

/// Re-check already constructed items. Valid items come back untouched and
/// in the same order.
pub fn validate_items(items: Vec<MealItem>) -> CatalogReport {
    let mut report = CatalogReport::default();
    let mut seen = HashSet::new();

    for (i, item) in items.into_iter().enumerate() {
        let issues = item.issues();
        if issues.is_empty() {
            report.accept_or_reject(&mut seen, i + 1, item);
        } else {
            report.reject(i + 1, Some(item.id.to_string()), item.title.clone(), issues);
        }
    }

    report
}

/// Borrowing variant used by the optimizer: indices of the usable items.
pub(crate) fn usable_indices(catalog: &[MealItem]) -> (Vec<usize>, Vec<Rejection>) {
    let mut report = CatalogReport::default();
    let mut seen = HashSet::new();
    let mut usable = Vec::new();

    for (i, item) in catalog.iter().enumerate() {
        let issues = item.issues();
        if !issues.is_empty() {
            report.reject(i + 1, Some(item.id.to_string()), item.title.clone(), issues);
        } else if !seen.insert(item.id.as_str()) {
            report.reject(
                i + 1,
                Some(item.id.to_string()),
                item.title.clone(),
                vec![ValidationIssue::new("id", format!("duplicate id '{}'", item.id))],
            );
        } else {
            usable.push(i);
        }
    }

    (usable, report.rejected)
}
