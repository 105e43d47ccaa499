use std::path::Path;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::error::Result;
use crate::models::{Nutrient, Plan, PlanSummary};
use crate::planner::{Rejection, Solution};

/// Serializes a plan as `{ "Monday": [meals], "Tuesday": [...] }`, keeping
/// day order.
#[derive(Debug, Clone, Copy)]
pub struct DayMap<'a, 'c>(pub &'a Plan<'c>);

impl Serialize for DayMap<'_, '_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.days.len()))?;
        for day in &self.0.days {
            map.serialize_entry(&day.day, &day.meals)?;
        }
        map.end()
    }
}

/// JSON document written by `plan --json`.
#[derive(Debug, Serialize)]
pub struct PlanExport<'a, 'c> {
    pub meal_plan: DayMap<'a, 'c>,
    pub summary: &'a PlanSummary,
    pub rejected: &'a [Rejection],
}

impl<'a, 'c> PlanExport<'a, 'c> {
    pub fn new(solution: &'a Solution<'c>) -> Self {
        Self {
            meal_plan: DayMap(&solution.plan),
            summary: &solution.summary,
            rejected: &solution.rejected,
        }
    }
}

const CSV_NUTRIENTS: [Nutrient; 4] = [
    Nutrient::Calories,
    Nutrient::Protein,
    Nutrient::Carbs,
    Nutrient::Fat,
];

/// Write one row per planned meal.
pub fn write_plan_csv(plan: &Plan<'_>, path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    let mut header = vec!["day", "slot", "id", "title", "cost"];
    header.extend(CSV_NUTRIENTS.iter().map(|n| n.key()));
    wtr.write_record(&header)?;

    for day in &plan.days {
        for (slot, meal) in day.meals.iter().enumerate() {
            let mut row = vec![
                day.day.clone(),
                (slot + 1).to_string(),
                meal.id.to_string(),
                meal.title.clone(),
                format!("{:.2}", meal.cost),
            ];
            row.extend(CSV_NUTRIENTS.iter().map(|n| format!("{:.1}", meal.nutrient(*n))));
            wtr.write_record(&row)?;
        }
    }

    wtr.flush()?;
    Ok(())
}
