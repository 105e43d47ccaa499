pub mod export;
pub mod prompts;
pub mod render;

pub use export::{write_plan_csv, DayMap, PlanExport};
pub use prompts::{collect_bounds, match_nutrient, prompt_yes_no, NutrientMatch};
pub use render::{
    display_catalog_report, display_failure, display_plan, display_profiles, format_bound,
};
