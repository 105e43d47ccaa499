use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::meal::ValidationIssue;
use crate::models::nutrient::Nutrient;

/// Optional lower and upper limit for one nutrient.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Bound {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl Bound {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    pub fn at_least(min: f64) -> Self {
        Self::new(Some(min), None)
    }

    pub fn at_most(max: f64) -> Self {
        Self::new(None, Some(max))
    }

    pub fn between(min: f64, max: f64) -> Self {
        Self::new(Some(min), Some(max))
    }

    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    /// Both limits multiplied by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(self.min.map(|v| v * factor), self.max.map(|v| v * factor))
    }

    /// Amount by which `value` falls below the minimum (0 when satisfied).
    pub fn shortfall(&self, value: f64) -> f64 {
        self.min.map_or(0.0, |min| (min - value).max(0.0))
    }

    /// Amount by which `value` exceeds the maximum (0 when satisfied).
    pub fn excess(&self, value: f64) -> f64 {
        self.max.map_or(0.0, |max| (value - max).max(0.0))
    }

    pub fn contains(&self, value: f64, tolerance: f64) -> bool {
        self.shortfall(value) <= tolerance && self.excess(value) <= tolerance
    }

    /// Distance from `value` to the nearer limit, or `None` when unbounded.
    pub fn slack(&self, value: f64) -> Option<f64> {
        match (self.min, self.max) {
            (None, None) => None,
            (Some(min), None) => Some(value - min),
            (None, Some(max)) => Some(max - value),
            (Some(min), Some(max)) => Some((value - min).min(max - value)),
        }
    }
}

/// Per-nutrient bounds supplied with a planning request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NutrientBounds {
    bounds: BTreeMap<Nutrient, Bound>,
}

impl NutrientBounds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    pub fn with(mut self, nutrient: Nutrient, bound: Bound) -> Self {
        self.set(nutrient, bound);
        self
    }

    pub fn set(&mut self, nutrient: Nutrient, bound: Bound) {
        if bound.is_unbounded() {
            self.bounds.remove(&nutrient);
        } else {
            self.bounds.insert(nutrient, bound);
        }
    }

    pub fn get(&self, nutrient: Nutrient) -> Bound {
        self.bounds.get(&nutrient).copied().unwrap_or_default()
    }

    /// Bounded nutrients in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Nutrient, Bound)> + '_ {
        self.bounds.iter().map(|(n, b)| (*n, *b))
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    /// Every limit multiplied by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            bounds: self
                .bounds
                .iter()
                .map(|(n, b)| (*n, b.scaled(factor)))
                .collect(),
        }
    }

    /// Check internal consistency. Takes `&self`: validation never rewrites bounds.
    pub fn validate(&self) -> Result<(), Vec<ValidationIssue>> {
        let mut issues = Vec::new();
        for (nutrient, bound) in self.iter() {
            for (side, value) in [("min", bound.min), ("max", bound.max)] {
                if let Some(v) = value {
                    if !v.is_finite() {
                        issues.push(ValidationIssue::new(
                            format!("{}.{}", nutrient.key(), side),
                            "must be a finite number",
                        ));
                    } else if v < 0.0 {
                        issues.push(ValidationIssue::new(
                            format!("{}.{}", nutrient.key(), side),
                            format!("must be non-negative (got {})", v),
                        ));
                    }
                }
            }
            if let (Some(min), Some(max)) = (bound.min, bound.max) {
                if min > max {
                    issues.push(ValidationIssue::new(
                        nutrient.key(),
                        format!("min {} is greater than max {}", min, max),
                    ));
                }
            }
        }
        if issues.is_empty() { Ok(()) } else { Err(issues) }
    }

    /// Parse either the keyed shape (`{"sodium": {"max": 400}}`) or the flat
    /// web-form shape (`{"maxSodium": 400, "minProtein": 20}`).
    pub fn from_value(value: &Value) -> Result<Self, Vec<ValidationIssue>> {
        let map = value
            .as_object()
            .ok_or_else(|| vec![ValidationIssue::new("bounds", "expected a JSON object")])?;

        let mut bounds = NutrientBounds::new();
        let mut issues = Vec::new();

        for (key, entry) in map {
            if let Some((side, name)) = split_requirement_key(key) {
                let nutrient = match name.parse::<Nutrient>() {
                    Ok(n) => n,
                    Err(message) => {
                        issues.push(ValidationIssue::new(key.clone(), message));
                        continue;
                    }
                };
                let amount = match entry {
                    Value::Null => continue,
                    Value::Number(n) => n.as_f64(),
                    Value::String(s) if s.trim().is_empty() => continue,
                    Value::String(s) => s.trim().parse::<f64>().ok(),
                    _ => None,
                };
                let Some(amount) = amount else {
                    issues.push(ValidationIssue::new(key.clone(), "expected a number"));
                    continue;
                };
                let mut bound = bounds.get(nutrient);
                match side {
                    Side::Min => bound.min = Some(amount),
                    Side::Max => bound.max = Some(amount),
                }
                bounds.set(nutrient, bound);
                continue;
            }

            let nutrient = match key.parse::<Nutrient>() {
                Ok(n) => n,
                Err(message) => {
                    issues.push(ValidationIssue::new(key.clone(), message));
                    continue;
                }
            };
            match serde_json::from_value::<Bound>(entry.clone()) {
                Ok(bound) => bounds.set(nutrient, bound),
                Err(e) => issues.push(ValidationIssue::new(key.clone(), e.to_string())),
            }
        }

        if issues.is_empty() {
            Ok(bounds)
        } else {
            Err(issues)
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Side {
    Min,
    Max,
}

/// `"minVitaminA"` -> `(Min, "VitaminA")`. Keys that are themselves nutrient
/// names are never treated as requirement keys.
fn split_requirement_key(key: &str) -> Option<(Side, &str)> {
    if Nutrient::from_key(key).is_some() {
        return None;
    }
    if let Some(rest) = key.strip_prefix("min").filter(|r| !r.is_empty()) {
        return Some((Side::Min, rest.trim_start_matches('_')));
    }
    if let Some(rest) = key.strip_prefix("max").filter(|r| !r.is_empty()) {
        return Some((Side::Max, rest.trim_start_matches('_')));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_keyed_shape_with_aliases() {
        let bounds = NutrientBounds::from_value(&json!({
            "calories": {"min": 1800, "max": 2200},
            "vitaminC": {"min": 15},
            "sodium_mg": {"max": 400}
        }))
        .unwrap();
        assert_eq!(bounds.get(Nutrient::Calories), Bound::between(1800.0, 2200.0));
        assert_eq!(bounds.get(Nutrient::VitaminC), Bound::at_least(15.0));
        assert_eq!(bounds.get(Nutrient::Sodium), Bound::at_most(400.0));
        assert!(bounds.get(Nutrient::Iron).is_unbounded());
    }

    #[test]
    fn test_requirements_form() {
        let bounds = NutrientBounds::from_value(&json!({
            "minCalories": 300,
            "maxCalories": "700",
            "maxSodium": 400,
            "minIron": null
        }))
        .unwrap();
        assert_eq!(bounds.get(Nutrient::Calories), Bound::between(300.0, 700.0));
        assert_eq!(bounds.get(Nutrient::Sodium), Bound::at_most(400.0));
        assert_eq!(bounds.len(), 2);
    }

    #[test]
    fn test_unknown_key_reports_suggestion() {
        let issues = NutrientBounds::from_value(&json!({"protien": {"min": 50}})).unwrap_err();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].message.contains("protein"));
    }

    #[test]
    fn test_validate_min_above_max() {
        let bounds = NutrientBounds::new()
            .with(Nutrient::Fat, Bound::between(90.0, 10.0))
            .with(Nutrient::Iron, Bound::at_least(-1.0));
        let issues = bounds.validate().unwrap_err();
        assert_eq!(issues.len(), 2);
        assert!(issues.iter().any(|i| i.field == "fat"));
        assert!(issues.iter().any(|i| i.field == "iron_mg.min"));
    }

    #[test]
    fn test_slack_uses_nearer_bound() {
        let bound = Bound::between(100.0, 200.0);
        assert_eq!(bound.slack(120.0), Some(20.0));
        assert_eq!(bound.slack(190.0), Some(10.0));
        assert_eq!(bound.excess(250.0), 50.0);
        assert_eq!(bound.shortfall(250.0), 0.0);
        assert_eq!(Bound::default().slack(5.0), None);
    }
}
