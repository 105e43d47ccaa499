use std::collections::BTreeMap;
use std::fmt;

use serde::de::{Error as _, IgnoredAny};
use serde::{Deserialize, Deserializer, Serialize};

use crate::models::nutrient::{Nutrient, NutrientVector};

/// Rating assumed for meals that carry none.
pub const DEFAULT_RATING: u8 = 5;

/// Highest rating a user can give.
pub const MAX_RATING: u8 = 10;

/// Catalog identifier. Integer ids in JSON (including whole-number floats
/// such as `1.0`) are normalized to their decimal text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct MealId(String);

impl MealId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MealId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MealId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<u64> for MealId {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

impl<'de> Deserialize<'de> for MealId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // largest float that still holds every integer exactly
        const MAX_EXACT_FLOAT: f64 = 9_007_199_254_740_992.0;

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Unsigned(u64),
            Int(i64),
            Float(f64),
            Text(String),
            Other(IgnoredAny),
        }

        match RawId::deserialize(deserializer)? {
            RawId::Unsigned(n) => Ok(MealId(n.to_string())),
            RawId::Int(n) => Ok(MealId(n.to_string())),
            RawId::Float(x) if x.fract() == 0.0 && x.abs() <= MAX_EXACT_FLOAT => {
                Ok(MealId((x as i64).to_string()))
            }
            RawId::Float(x) => Err(D::Error::custom(format!(
                "id must be a whole number or text (got {})",
                x
            ))),
            RawId::Text(s) => Ok(MealId(s.trim().to_string())),
            RawId::Other(_) => Err(D::Error::custom("id must be a whole number or text")),
        }
    }
}

/// A catalog record as it appears in an uploaded JSON file, before validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MealRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<MealId>,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(rename = "estimated_cost_usd", alias = "cost", default)]
    pub cost: Option<f64>,

    #[serde(default)]
    pub calories: Option<f64>,

    #[serde(default)]
    pub macros: BTreeMap<String, f64>,

    #[serde(default)]
    pub micros: BTreeMap<String, f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_rating: Option<i64>,
}

/// A single problem found while validating a record or bound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// A validated, immutable catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "MealRecord", try_from = "MealRecord")]
pub struct MealItem {
    pub id: MealId,
    pub title: String,
    pub description: String,
    pub cost: f64,
    pub user_rating: u8,
    nutrients: NutrientVector,
}

impl MealItem {
    /// Build an item with every nutrient at zero.
    pub fn new(id: impl Into<MealId>, title: impl Into<String>, cost: f64, calories: f64) -> Self {
        let mut nutrients = NutrientVector::zero();
        nutrients.set(Nutrient::Calories, calories);
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            cost,
            user_rating: DEFAULT_RATING,
            nutrients,
        }
    }

    /// Builder-style setter for a single nutrient amount.
    pub fn with(mut self, nutrient: Nutrient, amount: f64) -> Self {
        self.nutrients.set(nutrient, amount);
        self
    }

    pub fn with_rating(mut self, rating: u8) -> Self {
        self.user_rating = rating;
        self
    }

    #[inline]
    pub fn nutrient(&self, nutrient: Nutrient) -> f64 {
        self.nutrients.get(nutrient)
    }

    #[inline]
    pub fn nutrients(&self) -> &NutrientVector {
        &self.nutrients
    }

    #[inline]
    pub fn calories(&self) -> f64 {
        self.nutrients.get(Nutrient::Calories)
    }

    /// Problems with this item's invariants. Empty means valid.
    pub fn issues(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        if self.id.as_str().is_empty() {
            issues.push(ValidationIssue::new("id", "must not be empty"));
        }
        check_amount("estimated_cost_usd", self.cost, &mut issues);
        for (nutrient, value) in self.nutrients.iter() {
            check_amount(nutrient.key(), value, &mut issues);
        }
        if !(1..=MAX_RATING).contains(&self.user_rating) {
            issues.push(ValidationIssue::new(
                "user_rating",
                format!("must be between 1 and {}", MAX_RATING),
            ));
        }
        issues
    }

    pub fn is_valid(&self) -> bool {
        self.issues().is_empty()
    }

    /// Validate a raw record. `position` is the 1-based place in the file and
    /// becomes the id when neither `id` nor `title` is present.
    pub fn from_record(record: MealRecord, position: usize) -> Result<Self, Vec<ValidationIssue>> {
        let mut issues = Vec::new();
        let mut nutrients = NutrientVector::zero();

        let cost = match record.cost {
            Some(cost) => cost,
            None => {
                issues.push(ValidationIssue::new("estimated_cost_usd", "missing"));
                0.0
            }
        };

        match record.calories {
            Some(calories) => nutrients.set(Nutrient::Calories, calories),
            None => issues.push(ValidationIssue::new("calories", "missing")),
        }

        for (key, value) in &record.macros {
            match Nutrient::from_key(key) {
                Some(n) if Nutrient::MACROS.contains(&n) => nutrients.set(n, *value),
                _ => issues.push(ValidationIssue::new(
                    format!("macros.{}", key),
                    "unknown macronutrient",
                )),
            }
        }

        for (key, value) in &record.micros {
            match Nutrient::from_key(key) {
                Some(n) if n.is_micro() => nutrients.set(n, *value),
                _ => {
                    let message = match Nutrient::suggest(key) {
                        Some(hint) => format!("unknown micronutrient (did you mean '{}'?)", hint),
                        None => "unknown micronutrient".to_string(),
                    };
                    issues.push(ValidationIssue::new(format!("micros.{}", key), message));
                }
            }
        }

        let user_rating = match record.user_rating {
            None => DEFAULT_RATING,
            Some(r) if (1..=MAX_RATING as i64).contains(&r) => r as u8,
            Some(_) => {
                issues.push(ValidationIssue::new(
                    "user_rating",
                    format!("must be between 1 and {}", MAX_RATING),
                ));
                DEFAULT_RATING
            }
        };

        let id = match record.id {
            Some(id) => id,
            None if !record.title.trim().is_empty() => MealId::new(record.title.trim()),
            None => MealId::new(position.to_string()),
        };

        let item = MealItem {
            id,
            title: record.title,
            description: record.description,
            cost,
            user_rating,
            nutrients,
        };
        issues.extend(item.issues());

        if issues.is_empty() {
            Ok(item)
        } else {
            Err(issues)
        }
    }

    /// Convert back to the on-disk record shape.
    pub fn to_record(&self) -> MealRecord {
        MealRecord {
            id: Some(self.id.clone()),
            title: self.title.clone(),
            description: self.description.clone(),
            cost: Some(self.cost),
            calories: Some(self.calories()),
            macros: Nutrient::MACROS
                .into_iter()
                .map(|n| (n.key().to_string(), self.nutrient(n)))
                .collect(),
            micros: Nutrient::MICROS
                .into_iter()
                .map(|n| (n.key().to_string(), self.nutrient(n)))
                .collect(),
            user_rating: Some(self.user_rating as i64),
        }
    }

    /// One-line description for logs.
    pub fn debug_string(&self) -> String {
        format!(
            "{} '{}': ${:.2}, {} kcal, P:{} C:{} F:{}",
            self.id,
            self.title,
            self.cost,
            self.calories(),
            self.nutrient(Nutrient::Protein),
            self.nutrient(Nutrient::Carbs),
            self.nutrient(Nutrient::Fat)
        )
    }
}

fn check_amount(field: &str, value: f64, issues: &mut Vec<ValidationIssue>) {
    if !value.is_finite() {
        issues.push(ValidationIssue::new(field, "must be a finite number"));
    } else if value < 0.0 {
        issues.push(ValidationIssue::new(
            field,
            format!("must be non-negative (got {})", value),
        ));
    }
}

impl From<MealItem> for MealRecord {
    fn from(item: MealItem) -> Self {
        item.to_record()
    }
}

impl TryFrom<MealRecord> for MealItem {
    type Error = String;

    fn try_from(record: MealRecord) -> Result<Self, Self::Error> {
        MealItem::from_record(record, 0).map_err(|issues| {
            issues
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> MealRecord {
        serde_json::from_str(
            r#"{
                "id": 7,
                "title": "Lentil Soup",
                "description": "Red lentils with cumin",
                "estimated_cost_usd": 2.5,
                "calories": 420,
                "macros": {"protein": 22, "carbs": 60, "fat": 8},
                "micros": {"iron_mg": 6.1, "sodium_mg": 540}
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_integer_id_normalized() {
        let record = sample_record();
        assert_eq!(record.id, Some(MealId::new("7")));
    }

    #[test]
    fn test_numeric_id_forms() {
        let id = |raw: &str| serde_json::from_str::<MealId>(raw);

        assert_eq!(id("1.0").unwrap(), MealId::new("1"));
        assert_eq!(id("18446744073709551615").unwrap(), MealId::new("18446744073709551615"));
        assert_eq!(id("-3").unwrap(), MealId::new("-3"));
        assert_eq!(id("\" m7 \"").unwrap(), MealId::new("m7"));

        let err = id("2.5").unwrap_err().to_string();
        assert!(err.contains("whole number"), "{}", err);
        let err = id("true").unwrap_err().to_string();
        assert!(err.contains("whole number"), "{}", err);
    }

    #[test]
    fn test_from_record_defaults_missing_micros() {
        let item = MealItem::from_record(sample_record(), 1).unwrap();
        assert_eq!(item.nutrient(Nutrient::Iron), 6.1);
        assert_eq!(item.nutrient(Nutrient::Zinc), 0.0);
        assert_eq!(item.user_rating, DEFAULT_RATING);
    }

    #[test]
    fn test_from_record_rejects_negative_and_unknown() {
        let mut record = sample_record();
        record.cost = Some(-1.0);
        record.micros.insert("vitamin_k_mcg".to_string(), 3.0);
        let issues = MealItem::from_record(record, 1).unwrap_err();
        assert!(issues.iter().any(|i| i.field == "estimated_cost_usd"));
        assert!(issues.iter().any(|i| i.field == "micros.vitamin_k_mcg"));
    }

    #[test]
    fn test_id_falls_back_to_title_then_position() {
        let mut record = sample_record();
        record.id = None;
        let item = MealItem::from_record(record.clone(), 3).unwrap();
        assert_eq!(item.id.as_str(), "Lentil Soup");

        record.title = String::new();
        let item = MealItem::from_record(record, 3).unwrap();
        assert_eq!(item.id.as_str(), "3");
    }

    #[test]
    fn test_serde_uses_catalog_shape() {
        let item = MealItem::new("a", "Oats", 1.25, 300.0).with(Nutrient::Protein, 10.0);
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["estimated_cost_usd"], 1.25);
        assert_eq!(json["macros"]["protein"], 10.0);
        assert_eq!(json["micros"]["zinc_mg"], 0.0);

        let back: MealItem = serde_json::from_value(json).unwrap();
        assert_eq!(back, item);
    }
}
