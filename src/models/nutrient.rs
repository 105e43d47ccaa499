use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Number of trackable nutrients.
pub const NUTRIENT_COUNT: usize = 14;

/// A trackable nutrient.
///
/// Calories and the three macros come first, then the ten micronutrients in
/// the order they appear in catalog files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Nutrient {
    Calories,
    Protein,
    Carbs,
    Fat,
    VitaminA,
    VitaminC,
    VitaminD,
    VitaminE,
    Calcium,
    Iron,
    Magnesium,
    Potassium,
    Sodium,
    Zinc,
}

impl Nutrient {
    pub const ALL: [Nutrient; NUTRIENT_COUNT] = [
        Nutrient::Calories,
        Nutrient::Protein,
        Nutrient::Carbs,
        Nutrient::Fat,
        Nutrient::VitaminA,
        Nutrient::VitaminC,
        Nutrient::VitaminD,
        Nutrient::VitaminE,
        Nutrient::Calcium,
        Nutrient::Iron,
        Nutrient::Magnesium,
        Nutrient::Potassium,
        Nutrient::Sodium,
        Nutrient::Zinc,
    ];

    pub const MACROS: [Nutrient; 3] = [Nutrient::Protein, Nutrient::Carbs, Nutrient::Fat];

    pub const MICROS: [Nutrient; 10] = [
        Nutrient::VitaminA,
        Nutrient::VitaminC,
        Nutrient::VitaminD,
        Nutrient::VitaminE,
        Nutrient::Calcium,
        Nutrient::Iron,
        Nutrient::Magnesium,
        Nutrient::Potassium,
        Nutrient::Sodium,
        Nutrient::Zinc,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Canonical key as used in catalog files.
    pub fn key(self) -> &'static str {
        match self {
            Nutrient::Calories => "calories",
            Nutrient::Protein => "protein",
            Nutrient::Carbs => "carbs",
            Nutrient::Fat => "fat",
            Nutrient::VitaminA => "vitamin_a_mcg",
            Nutrient::VitaminC => "vitamin_c_mg",
            Nutrient::VitaminD => "vitamin_d_mcg",
            Nutrient::VitaminE => "vitamin_e_mg",
            Nutrient::Calcium => "calcium_mg",
            Nutrient::Iron => "iron_mg",
            Nutrient::Magnesium => "magnesium_mg",
            Nutrient::Potassium => "potassium_mg",
            Nutrient::Sodium => "sodium_mg",
            Nutrient::Zinc => "zinc_mg",
        }
    }

    /// Short camel-case name used by profile files and the web form.
    pub fn alias(self) -> &'static str {
        match self {
            Nutrient::Calories => "calories",
            Nutrient::Protein => "protein",
            Nutrient::Carbs => "carbs",
            Nutrient::Fat => "fat",
            Nutrient::VitaminA => "vitaminA",
            Nutrient::VitaminC => "vitaminC",
            Nutrient::VitaminD => "vitaminD",
            Nutrient::VitaminE => "vitaminE",
            Nutrient::Calcium => "calcium",
            Nutrient::Iron => "iron",
            Nutrient::Magnesium => "magnesium",
            Nutrient::Potassium => "potassium",
            Nutrient::Sodium => "sodium",
            Nutrient::Zinc => "zinc",
        }
    }

    /// Human-readable label with unit.
    pub fn label(self) -> &'static str {
        match self {
            Nutrient::Calories => "Calories (kcal)",
            Nutrient::Protein => "Protein (g)",
            Nutrient::Carbs => "Carbs (g)",
            Nutrient::Fat => "Fat (g)",
            Nutrient::VitaminA => "Vitamin A (mcg)",
            Nutrient::VitaminC => "Vitamin C (mg)",
            Nutrient::VitaminD => "Vitamin D (mcg)",
            Nutrient::VitaminE => "Vitamin E (mg)",
            Nutrient::Calcium => "Calcium (mg)",
            Nutrient::Iron => "Iron (mg)",
            Nutrient::Magnesium => "Magnesium (mg)",
            Nutrient::Potassium => "Potassium (mg)",
            Nutrient::Sodium => "Sodium (mg)",
            Nutrient::Zinc => "Zinc (mg)",
        }
    }

    pub fn is_micro(self) -> bool {
        self.index() >= Nutrient::VitaminA.index()
    }

    /// Look up a nutrient by canonical key or alias, ignoring case.
    pub fn from_key(key: &str) -> Option<Nutrient> {
        let key = key.trim();
        Nutrient::ALL.into_iter().find(|n| {
            n.key().eq_ignore_ascii_case(key) || n.alias().eq_ignore_ascii_case(key)
        })
    }

    /// Closest known name for an unrecognized key, if any is reasonably close.
    pub fn suggest(key: &str) -> Option<&'static str> {
        let key = key.to_lowercase();
        Nutrient::ALL
            .into_iter()
            .flat_map(|n| [n.key(), n.alias()])
            .map(|name| (name, strsim::jaro_winkler(&name.to_lowercase(), &key)))
            .filter(|(_, score)| *score > 0.8)
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(name, _)| name)
    }
}

impl fmt::Display for Nutrient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Nutrient {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Nutrient::from_key(s).ok_or_else(|| match Nutrient::suggest(s) {
            Some(hint) => format!("unknown nutrient '{}' (did you mean '{}'?)", s, hint),
            None => format!("unknown nutrient '{}'", s),
        })
    }
}

impl Serialize for Nutrient {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.key())
    }
}

impl<'de> Deserialize<'de> for Nutrient {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Fixed-size vector of nutrient amounts indexed by [`Nutrient`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NutrientVector([f64; NUTRIENT_COUNT]);

impl NutrientVector {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn get(&self, nutrient: Nutrient) -> f64 {
        self.0[nutrient.index()]
    }

    pub fn set(&mut self, nutrient: Nutrient, value: f64) {
        self.0[nutrient.index()] = value;
    }

    pub fn add_assign(&mut self, other: &NutrientVector) {
        for (a, b) in self.0.iter_mut().zip(other.0.iter()) {
            *a += b;
        }
    }

    pub fn plus(&self, other: &NutrientVector) -> NutrientVector {
        let mut out = *self;
        out.add_assign(other);
        out
    }

    pub fn scaled(&self, factor: f64) -> NutrientVector {
        let mut out = *self;
        for v in out.0.iter_mut() {
            *v *= factor;
        }
        out
    }

    /// Iterate `(nutrient, value)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Nutrient, f64)> + '_ {
        Nutrient::ALL.into_iter().map(move |n| (n, self.0[n.index()]))
    }
}

impl Index<Nutrient> for NutrientVector {
    type Output = f64;

    fn index(&self, nutrient: Nutrient) -> &f64 {
        &self.0[nutrient.index()]
    }
}

impl IndexMut<Nutrient> for NutrientVector {
    fn index_mut(&mut self, nutrient: Nutrient) -> &mut f64 {
        &mut self.0[nutrient.index()]
    }
}
