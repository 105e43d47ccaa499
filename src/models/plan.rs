use std::collections::BTreeSet;

use serde::Serialize;

use crate::models::bounds::Bound;
use crate::models::meal::{MealId, MealItem};
use crate::models::nutrient::{Nutrient, NutrientVector};

/// Day names used for the first week of a plan.
pub const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Label for the zero-based `day` of a plan.
pub fn day_label(day: usize) -> String {
    match WEEKDAYS.get(day) {
        Some(name) => name.to_string(),
        None => format!("Day {}", day + 1),
    }
}

/// The meals chosen for one day. Borrows from the catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaySelection<'c> {
    pub day: String,
    pub meals: Vec<&'c MealItem>,
}

impl DaySelection<'_> {
    pub fn cost(&self) -> f64 {
        self.meals.iter().map(|m| m.cost).sum()
    }

    pub fn totals(&self) -> NutrientVector {
        let mut totals = NutrientVector::zero();
        for meal in &self.meals {
            totals.add_assign(meal.nutrients());
        }
        totals
    }
}

/// A complete selection over the planning period.
///
/// Totals are always derived from the selections, never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plan<'c> {
    pub days: Vec<DaySelection<'c>>,
}

impl<'c> Plan<'c> {
    /// Group a flat slot assignment into days of `meals_per_day` meals.
    pub fn from_slots(slots: &[&'c MealItem], meals_per_day: usize) -> Self {
        let days = slots
            .chunks(meals_per_day.max(1))
            .enumerate()
            .map(|(i, meals)| DaySelection {
                day: day_label(i),
                meals: meals.to_vec(),
            })
            .collect();
        Self { days }
    }

    pub fn meals(&self) -> impl Iterator<Item = &'c MealItem> + '_ {
        self.days.iter().flat_map(|d| d.meals.iter().copied())
    }

    pub fn total_cost(&self) -> f64 {
        self.meals().map(|m| m.cost).sum()
    }

    pub fn total_rating(&self) -> u32 {
        self.meals().map(|m| m.user_rating as u32).sum()
    }

    pub fn totals(&self) -> NutrientVector {
        let mut totals = NutrientVector::zero();
        for meal in self.meals() {
            totals.add_assign(meal.nutrients());
        }
        totals
    }

    pub fn meal_count(&self) -> usize {
        self.meals().count()
    }

    /// Number of different catalog items used.
    pub fn distinct_meals(&self) -> usize {
        self.meals().map(|m| &m.id).collect::<BTreeSet<&MealId>>().len()
    }
}

/// Totals and slack for one nutrient.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NutrientSummary {
    pub nutrient: Nutrient,
    pub total: f64,
    pub average: f64,
    /// The limit actually enforced, in the same units as `total` (or per day
    /// for daily aggregation).
    #[serde(skip_serializing_if = "Bound::is_unbounded")]
    pub bound: Bound,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slack: Option<f64>,
}

/// Result figures reported next to a plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanSummary {
    pub total_cost: f64,
    pub total_rating: u32,
    pub num_meals: usize,
    pub distinct_meals: usize,
    /// True when the search space was exhausted, so no cheaper plan exists.
    pub optimal: bool,
    pub steps: usize,
    pub nutrients: Vec<NutrientSummary>,
}

impl PlanSummary {
    pub fn nutrient(&self, nutrient: Nutrient) -> Option<&NutrientSummary> {
        self.nutrients.iter().find(|s| s.nutrient == nutrient)
    }
}
