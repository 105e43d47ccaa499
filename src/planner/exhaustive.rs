//! Brute-force reference solver for tiny instances.
//!
//! Enumerates every slot assignment without pruning or symmetry breaking, so
//! it shares nothing with the search except input validation and the repeat
//! policy. Used to cross-check [`crate::planner::optimize`].

use crate::models::{MealItem, NutrientBounds, Plan, ValidationIssue};
use crate::planner::constants::{MAX_EXHAUSTIVE_ASSIGNMENTS, TOLERANCE};
use crate::planner::failure::Failure;
use crate::planner::options::PlannerConfig;
use crate::planner::search::{Problem, Usage};

/// Cheapest satisfying assignment found by full enumeration. Among equally
/// cheap assignments the one with the most distinct meals wins.
#[derive(Debug, Clone)]
pub struct ExhaustiveSolution<'c> {
    pub plan: Plan<'c>,
    /// Objective value (cost, or missing rating) of the plan.
    pub penalty: f64,
    pub distinct: usize,
    /// Satisfying assignments seen during enumeration.
    pub feasible_count: u64,
}

struct Best {
    chosen: Vec<usize>,
    penalty: f64,
    distinct: usize,
}

impl Best {
    fn is_beaten_by(&self, penalty: f64, distinct: usize) -> bool {
        penalty < self.penalty - TOLERANCE
            || (penalty <= self.penalty + TOLERANCE && distinct > self.distinct)
    }
}

/// Solve by enumerating all `items^slots` assignments.
///
/// Returns `Ok(None)` when no assignment satisfies the bounds.
pub fn solve<'c>(
    catalog: &'c [MealItem],
    bounds: &NutrientBounds,
    config: &PlannerConfig,
) -> Result<Option<ExhaustiveSolution<'c>>, Failure> {
    let problem = Problem::prepare(catalog, bounds, config)?;

    let assignments = u32::try_from(problem.slots)
        .ok()
        .and_then(|slots| (problem.items.len() as u64).checked_pow(slots));
    if assignments.is_none_or(|n| n > MAX_EXHAUSTIVE_ASSIGNMENTS) {
        return Err(Failure::Validation {
            issues: vec![ValidationIssue::new(
                "catalog",
                format!(
                    "{} items over {} slots is too large to enumerate",
                    problem.items.len(),
                    problem.slots
                ),
            )],
        });
    }

    let mut chosen = Vec::with_capacity(problem.slots);
    let mut usage = problem.usage();
    let mut best: Option<Best> = None;
    let mut feasible_count = 0;
    enumerate(&problem, &mut chosen, &mut usage, &mut best, &mut feasible_count);

    Ok(best.map(|b| ExhaustiveSolution {
        plan: problem.plan_from(&b.chosen),
        penalty: b.penalty,
        distinct: b.distinct,
        feasible_count,
    }))
}

fn enumerate(
    problem: &Problem<'_>,
    chosen: &mut Vec<usize>,
    usage: &mut Usage,
    best: &mut Option<Best>,
    feasible_count: &mut u64,
) {
    if chosen.len() == problem.slots {
        let plan = problem.plan_from(chosen);
        if !problem.targets.is_satisfied_by(&plan) {
            return;
        }
        *feasible_count += 1;
        let penalty = problem.penalty_of(chosen);
        let distinct = plan.distinct_meals();
        if best.as_ref().is_none_or(|b| b.is_beaten_by(penalty, distinct)) {
            *best = Some(Best {
                chosen: chosen.clone(),
                penalty,
                distinct,
            });
        }
        return;
    }

    for item in 0..problem.items.len() {
        if problem.allowed(item, usage) {
            chosen.push(item);
            usage.push(item);
            enumerate(problem, chosen, usage, best, feasible_count);
            usage.pop();
            chosen.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Bound, Nutrient};

    #[test]
    fn test_enumerates_cheapest_pair() {
        let catalog = vec![
            MealItem::new("a", "A", 4.0, 900.0),
            MealItem::new("b", "B", 1.0, 400.0),
            MealItem::new("c", "C", 2.0, 1100.0),
        ];
        let bounds = NutrientBounds::new().with(Nutrient::Calories, Bound::between(1500.0, 2000.0));
        let config = PlannerConfig::default().with_days(2);

        let solution = solve(&catalog, &bounds, &config).unwrap().unwrap();
        // b+c reaches 1500 kcal for $3; a+b falls short and c+c overshoots
        assert_eq!(solution.penalty, 3.0);
        assert!(solution.feasible_count >= 2);
    }

    #[test]
    fn test_prefers_variety_among_equal_cost() {
        let catalog = vec![
            MealItem::new("a", "A", 2.0, 500.0),
            MealItem::new("b", "B", 2.0, 500.0),
            MealItem::new("c", "C", 2.0, 500.0),
        ];
        let config = PlannerConfig::default().with_days(3);

        let solution = solve(&catalog, &NutrientBounds::new(), &config).unwrap().unwrap();
        assert_eq!(solution.penalty, 6.0);
        assert_eq!(solution.distinct, 3);
    }

    #[test]
    fn test_refuses_large_instances() {
        let catalog: Vec<MealItem> = (0..20)
            .map(|i| MealItem::new(i.to_string().as_str(), "x", 1.0, 100.0))
            .collect();
        let result = solve(&catalog, &NutrientBounds::new(), &PlannerConfig::default());
        assert!(matches!(result, Err(Failure::Validation { .. })));
    }

    #[test]
    fn test_none_when_unsatisfiable() {
        let catalog = vec![MealItem::new("a", "A", 1.0, 100.0)];
        let bounds = NutrientBounds::new().with(Nutrient::Calories, Bound::at_least(500.0));
        let config = PlannerConfig::default().with_days(2);
        assert!(solve(&catalog, &bounds, &config).unwrap().is_none());
    }
}
