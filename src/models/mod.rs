pub mod bounds;
pub mod meal;
pub mod nutrient;
pub mod plan;
pub mod profile;

pub use bounds::{Bound, NutrientBounds};
pub use meal::{MealId, MealItem, MealRecord, ValidationIssue, MAX_RATING};
pub use nutrient::{Nutrient, NutrientVector};
pub use plan::{day_label, DaySelection, NutrientSummary, Plan, PlanSummary};
pub use profile::Profiles;
