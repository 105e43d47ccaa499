use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::meal::{MealItem, ValidationIssue, MAX_RATING};
use crate::models::Plan;
use crate::planner::constants::{
    DEFAULT_DAYS, DEFAULT_MAX_STEPS, DEFAULT_MEALS_PER_DAY, MAX_DAYS, MAX_MEALS_PER_DAY,
};

/// How nutrient totals are compared against bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    /// The whole period's total must lie within the bound.
    #[default]
    Weekly,
    /// Every single day's total must lie within the bound.
    Daily,
    /// The period total divided by the number of days must lie within the bound.
    Average,
}

/// What the search minimizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    #[default]
    MinimizeCost,
    MaximizeRating,
}

impl Objective {
    /// Per-slot penalty of choosing `item`. Lower is better.
    pub fn penalty(self, item: &MealItem) -> f64 {
        match self {
            Objective::MinimizeCost => item.cost,
            Objective::MaximizeRating => (MAX_RATING.saturating_sub(item.user_rating)) as f64,
        }
    }

    /// Summed penalty over every meal in `plan`.
    pub fn plan_penalty(self, plan: &Plan<'_>) -> f64 {
        plan.meals().map(|m| self.penalty(m)).sum()
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Aggregation::Weekly => "weekly",
            Aggregation::Daily => "daily",
            Aggregation::Average => "average",
        })
    }
}

impl FromStr for Aggregation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "weekly" => Ok(Aggregation::Weekly),
            "daily" => Ok(Aggregation::Daily),
            "average" => Ok(Aggregation::Average),
            other => Err(format!(
                "unknown aggregation '{}' (expected weekly, daily or average)",
                other
            )),
        }
    }
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Objective::MinimizeCost => "minimize_cost",
            Objective::MaximizeRating => "maximize_rating",
        })
    }
}

impl FromStr for Objective {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "minimize_cost" => Ok(Objective::MinimizeCost),
            "maximize_rating" => Ok(Objective::MaximizeRating),
            other => Err(format!(
                "unknown objective '{}' (expected minimize_cost or maximize_rating)",
                other
            )),
        }
    }
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase().replace('-', "_")
}

/// Knobs for a single optimization call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub days: usize,
    pub meals_per_day: usize,
    pub allow_repeats: bool,
    /// An item used on day `d` may not reappear on a day closer than this.
    /// Zero disables the window.
    pub max_repeat_within_days: usize,
    /// Cap on how many times one item may appear in the whole plan.
    pub max_uses_per_item: Option<usize>,
    pub aggregation: Aggregation,
    pub objective: Objective,
    pub max_steps: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            days: DEFAULT_DAYS,
            meals_per_day: DEFAULT_MEALS_PER_DAY,
            allow_repeats: true,
            max_repeat_within_days: 0,
            max_uses_per_item: None,
            aggregation: Aggregation::Weekly,
            objective: Objective::MinimizeCost,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

impl PlannerConfig {
    pub fn with_days(mut self, days: usize) -> Self {
        self.days = days;
        self
    }

    pub fn with_aggregation(mut self, aggregation: Aggregation) -> Self {
        self.aggregation = aggregation;
        self
    }

    /// Slots in the plan. Saturates instead of overflowing on configs that
    /// have not been validated yet.
    pub fn total_slots(&self) -> usize {
        self.days.saturating_mul(self.meals_per_day)
    }

    /// Most times any single item may be placed in the plan.
    pub fn use_limit(&self) -> usize {
        let limit = if self.allow_repeats { usize::MAX } else { 1 };
        self.max_uses_per_item.map_or(limit, |m| m.min(limit))
    }

    pub fn validate(&self) -> Result<(), Vec<ValidationIssue>> {
        let mut issues = Vec::new();
        if self.days == 0 {
            issues.push(ValidationIssue::new("days", "must be at least 1"));
        } else if self.days > MAX_DAYS {
            issues.push(ValidationIssue::new(
                "days",
                format!("must be at most {} (got {})", MAX_DAYS, self.days),
            ));
        }
        if self.meals_per_day == 0 {
            issues.push(ValidationIssue::new("meals_per_day", "must be at least 1"));
        } else if self.meals_per_day > MAX_MEALS_PER_DAY {
            issues.push(ValidationIssue::new(
                "meals_per_day",
                format!(
                    "must be at most {} (got {})",
                    MAX_MEALS_PER_DAY, self.meals_per_day
                ),
            ));
        }
        if self.max_steps == 0 {
            issues.push(ValidationIssue::new("max_steps", "must be at least 1"));
        }
        if self.max_uses_per_item == Some(0) {
            issues.push(ValidationIssue::new("max_uses_per_item", "must be at least 1"));
        }
        if issues.is_empty() { Ok(()) } else { Err(issues) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_enums() {
        assert_eq!("daily".parse::<Aggregation>().unwrap(), Aggregation::Daily);
        assert_eq!(
            "maximize-rating".parse::<Objective>().unwrap(),
            Objective::MaximizeRating
        );
        assert!("hourly".parse::<Aggregation>().is_err());
        assert_eq!(Objective::MinimizeCost.to_string(), "minimize_cost");
    }

    #[test]
    fn test_use_limit() {
        let mut config = PlannerConfig::default();
        assert_eq!(config.use_limit(), usize::MAX);
        config.max_uses_per_item = Some(2);
        assert_eq!(config.use_limit(), 2);
        config.allow_repeats = false;
        assert_eq!(config.use_limit(), 1);
    }

    #[test]
    fn test_validate_rejects_zero_days() {
        let config = PlannerConfig::default().with_days(0);
        let issues = config.validate().unwrap_err();
        assert_eq!(issues[0].field, "days");
    }

    #[test]
    fn test_validate_rejects_oversized_plans() {
        let config = PlannerConfig::default().with_days(1_000_000_000_000);
        assert_eq!(config.total_slots(), 1_000_000_000_000);
        let issues = config.validate().unwrap_err();
        assert_eq!(issues[0].field, "days");
        assert!(issues[0].message.contains("at most 366"));

        let mut config = PlannerConfig::default().with_days(MAX_DAYS);
        config.meals_per_day = usize::MAX;
        assert_eq!(config.total_slots(), usize::MAX);
        let issues = config.validate().unwrap_err();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "meals_per_day");

        config.meals_per_day = MAX_MEALS_PER_DAY;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rating_penalty() {
        let item = MealItem::new("a", "Oats", 3.0, 100.0).with_rating(8);
        assert_eq!(Objective::MaximizeRating.penalty(&item), 2.0);
        assert_eq!(Objective::MinimizeCost.penalty(&item), 3.0);
    }
}
