use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::bounds::NutrientBounds;

/// Named bound presets, e.g. `healthy-adult` or `keto`.
///
/// Profile values describe a single meal, so they pair naturally with the
/// `average` aggregation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Profiles(BTreeMap<String, NutrientBounds>);

impl Profiles {
    pub fn new(profiles: BTreeMap<String, NutrientBounds>) -> Self {
        Self(profiles)
    }

    /// Look up a profile by name (case-insensitive).
    pub fn get(&self, name: &str) -> Option<&NutrientBounds> {
        self.0
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name.trim()))
            .map(|(_, v)| v)
    }

    /// Closest profile name to a mistyped one.
    pub fn suggest(&self, name: &str) -> Option<&str> {
        let name = name.to_lowercase();
        self.0
            .keys()
            .map(|k| (k.as_str(), strsim::jaro_winkler(&k.to_lowercase(), &name)))
            .filter(|(_, score)| *score > 0.7)
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(k, _)| k)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &NutrientBounds)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
