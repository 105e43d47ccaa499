use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::models::{Bound, MealId, Nutrient, ValidationIssue};
use crate::planner::validation::Rejection;

/// Which side of a bound was missed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    Shortfall,
    Excess,
}

/// One bound that the closest plan fails to meet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    pub nutrient: Nutrient,
    pub kind: ViolationKind,
    /// How far below the minimum or above the maximum the total lands.
    pub amount: f64,
    pub total: f64,
    pub bound: Bound,
    /// Set for daily aggregation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day: Option<String>,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self.kind {
            ViolationKind::Shortfall => "short by",
            ViolationKind::Excess => "exceeded by",
        };
        match &self.day {
            Some(day) => write!(f, "{} {} {:.2} on {}", self.nutrient, verb, self.amount, day),
            None => write!(f, "{} {} {:.2}", self.nutrient, verb, self.amount),
        }
    }
}

/// Meal ids for one day of the closest (non-satisfying) plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClosestDay {
    pub day: String,
    pub meals: Vec<MealId>,
}

/// The least-violating plan found. Never a valid plan; kept for debugging
/// and for telling the caller which bounds to relax.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClosestPlan {
    pub days: Vec<ClosestDay>,
    pub total_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InfeasibleReport {
    pub violations: Vec<Violation>,
    /// True when every assignment was ruled out, false when the step budget ran out.
    pub exhausted: bool,
    pub steps: usize,
    pub closest: Option<ClosestPlan>,
}

impl fmt::Display for InfeasibleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&join(&self.violations))
    }
}

impl InfeasibleReport {
    /// Violations for a single nutrient.
    pub fn violations_for(&self, nutrient: Nutrient) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(move |v| v.nutrient == nutrient)
    }
}

/// Why a planning request produced no plan.
#[derive(Debug, Clone, PartialEq, Serialize, Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Failure {
    #[error("invalid request: {}", join(.issues))]
    Validation { issues: Vec<ValidationIssue> },

    #[error("no usable meals in catalog ({} rejected)", .rejected.len())]
    EmptyCatalog { rejected: Vec<Rejection> },

    #[error("no plan satisfies the bounds: {0}")]
    Infeasible(InfeasibleReport),
}

impl Failure {
    pub fn kind(&self) -> &'static str {
        match self {
            Failure::Validation { .. } => "validation",
            Failure::EmptyCatalog { .. } => "empty_catalog",
            Failure::Infeasible(_) => "infeasible",
        }
    }

    /// Human-readable list of unmet constraints or issues.
    pub fn details(&self) -> Vec<String> {
        match self {
            Failure::Validation { issues } => issues.iter().map(ToString::to_string).collect(),
            Failure::EmptyCatalog { rejected } => rejected
                .iter()
                .map(|r| {
                    format!(
                        "#{} {}: {}",
                        r.position,
                        r.id.as_deref().unwrap_or(&r.title),
                        join(&r.issues)
                    )
                })
                .collect(),
            Failure::Infeasible(report) => {
                report.violations.iter().map(ToString::to_string).collect()
            }
        }
    }
}

fn join<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infeasible_message_names_nutrient() {
        let failure = Failure::Infeasible(InfeasibleReport {
            violations: vec![Violation {
                nutrient: Nutrient::Sodium,
                kind: ViolationKind::Excess,
                amount: 120.0,
                total: 520.0,
                bound: Bound::at_most(400.0),
                day: None,
            }],
            exhausted: true,
            steps: 3,
            closest: None,
        });
        assert_eq!(
            failure.to_string(),
            "no plan satisfies the bounds: sodium_mg exceeded by 120.00"
        );
        assert_eq!(failure.kind(), "infeasible");

        let json = serde_json::to_value(&failure).unwrap();
        assert_eq!(json["kind"], "infeasible");
        assert_eq!(json["violations"][0]["nutrient"], "sodium_mg");
    }
}
