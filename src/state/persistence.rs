use std::fs;
use std::path::Path;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{PlannerError, Result};
use crate::models::{NutrientBounds, Profiles, ValidationIssue};
use crate::planner::{validate_values, CatalogReport};

/// Pull the list of records out of a catalog document. Accepts a bare array
/// or an object with a `meals` array.
pub fn catalog_entries(value: Value) -> Result<Vec<Value>> {
    match value {
        Value::Array(entries) => Ok(entries),
        Value::Object(mut map) => match map.remove("meals") {
            Some(Value::Array(entries)) => Ok(entries),
            _ => Err(PlannerError::InvalidInput(
                "catalog must be a JSON array or an object with a 'meals' array".to_string(),
            )),
        },
        _ => Err(PlannerError::InvalidInput(
            "catalog must be a JSON array".to_string(),
        )),
    }
}

/// Load and validate a meal catalog. Invalid entries are reported, not fatal.
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<CatalogReport> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&content)?;
    let report = validate_values(catalog_entries(value)?);
    info!(
        path = %path.display(),
        accepted = report.accepted.len(),
        rejected = report.rejected.len(),
        "loaded catalog"
    );
    Ok(report)
}

/// Load bounds in either the keyed or the flat requirements shape.
pub fn load_bounds<P: AsRef<Path>>(path: P) -> Result<NutrientBounds> {
    let content = fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&content)?;
    let bounds = NutrientBounds::from_value(&value).map_err(|issues| PlannerError::invalid(&issues))?;
    debug!(bounded = bounds.len(), "loaded bounds");
    Ok(bounds)
}

/// Parse a profiles document: `{ "name": { <bounds> }, ... }`.
pub fn profiles_from_value(value: &Value) -> Result<Profiles> {
    let map = value.as_object().ok_or_else(|| {
        PlannerError::InvalidInput("profiles must be a JSON object".to_string())
    })?;

    let mut profiles = std::collections::BTreeMap::new();
    let mut issues = Vec::new();
    for (name, entry) in map {
        match NutrientBounds::from_value(entry) {
            Ok(bounds) => {
                profiles.insert(name.clone(), bounds);
            }
            Err(found) => issues.extend(
                found
                    .into_iter()
                    .map(|i| ValidationIssue::new(format!("{}.{}", name, i.field), i.message)),
            ),
        }
    }

    if !issues.is_empty() {
        return Err(PlannerError::invalid(&issues));
    }
    Ok(Profiles::new(profiles))
}

pub fn load_profiles<P: AsRef<Path>>(path: P) -> Result<Profiles> {
    let content = fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&content)?;
    profiles_from_value(&value)
}

/// Write any serializable value as pretty JSON.
pub fn save_json<P: AsRef<Path>, T: Serialize + ?Sized>(path: P, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}
