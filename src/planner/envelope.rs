//! Bound targets and the feasibility envelope.
//!
//! A *scope* is the span of slots whose totals are compared against a bound:
//! the whole period for weekly and average aggregation, a single day for
//! daily aggregation.

use crate::models::{Bound, MealItem, Nutrient, NutrientBounds, NutrientVector, Plan};
use crate::models::{NutrientSummary, PlanSummary};
use crate::planner::constants::{TOLERANCE, VIOLATION_SCALE_FLOOR};
use crate::planner::failure::{Violation, ViolationKind};
use crate::planner::options::{Aggregation, PlannerConfig};

/// Bounds expressed in scope units, plus the scope geometry.
#[derive(Debug, Clone)]
pub struct Targets {
    bounds: Vec<(Nutrient, Bound)>,
    aggregation: Aggregation,
    days: usize,
    meals_per_day: usize,
}

impl Targets {
    pub fn new(bounds: &NutrientBounds, config: &PlannerConfig) -> Self {
        let factor = match config.aggregation {
            Aggregation::Average => config.days as f64,
            Aggregation::Weekly | Aggregation::Daily => 1.0,
        };
        Self {
            bounds: bounds
                .iter()
                .filter(|(_, b)| !b.is_unbounded())
                .map(|(n, b)| (n, b.scaled(factor)))
                .collect(),
            aggregation: config.aggregation,
            days: config.days,
            meals_per_day: config.meals_per_day,
        }
    }

    pub fn bounds(&self) -> &[(Nutrient, Bound)] {
        &self.bounds
    }

    pub fn is_daily(&self) -> bool {
        self.aggregation == Aggregation::Daily
    }

    /// Slots in one scope.
    pub fn scope_len(&self) -> usize {
        if self.is_daily() {
            self.meals_per_day
        } else {
            self.days * self.meals_per_day
        }
    }

    /// True when `slot` opens a new scope, so running totals restart at zero.
    pub fn starts_scope(&self, slot: usize) -> bool {
        slot % self.scope_len() == 0
    }

    /// Slots left in the scope after `slot` is filled.
    pub fn remaining_after(&self, slot: usize) -> usize {
        let len = self.scope_len();
        len - 1 - slot % len
    }

    /// Bound on the scope total for `nutrient`.
    pub fn bound(&self, nutrient: Nutrient) -> Bound {
        self.bounds
            .iter()
            .find(|(n, _)| *n == nutrient)
            .map(|(_, b)| *b)
            .unwrap_or_default()
    }

    /// Can `remaining` more slots, each contributing between `leanest` and
    /// `richest`, still bring `totals` inside every bound?
    pub fn is_open(
        &self,
        totals: &NutrientVector,
        remaining: usize,
        leanest: &NutrientVector,
        richest: &NutrientVector,
    ) -> bool {
        let r = remaining as f64;
        self.bounds.iter().all(|(n, b)| {
            let reachable_high = totals[*n] + r * richest[*n];
            let reachable_low = totals[*n] + r * leanest[*n];
            b.shortfall(reachable_high) <= TOLERANCE && b.excess(reachable_low) <= TOLERANCE
        })
    }

    /// Sum of normalized shortfalls and excesses of `totals`.
    pub fn violation_score(&self, totals: &NutrientVector) -> f64 {
        self.bounds
            .iter()
            .map(|(n, b)| {
                let scale = b.max.or(b.min).unwrap_or(0.0).max(VIOLATION_SCALE_FLOOR);
                (b.shortfall(totals[*n]) + b.excess(totals[*n])) / scale
            })
            .sum()
    }

    /// Micronutrient coverage after adding `item` to `totals`: for each
    /// micronutrient still below its minimum, the ratio actual/min capped at 1.
    pub fn coverage(&self, totals: &NutrientVector, item: &MealItem) -> f64 {
        self.bounds
            .iter()
            .filter(|(n, _)| n.is_micro())
            .filter_map(|(n, b)| match b.min {
                Some(min) if min > 0.0 && totals[*n] < min => {
                    Some(((totals[*n] + item.nutrient(*n)) / min).min(1.0))
                }
                _ => None,
            })
            .sum()
    }

    /// Scope totals of a finished plan, labelled with the day for daily scopes.
    fn scope_totals(&self, plan: &Plan<'_>) -> Vec<(Option<String>, NutrientVector)> {
        if self.is_daily() {
            plan.days
                .iter()
                .map(|d| (Some(d.day.clone()), d.totals()))
                .collect()
        } else {
            vec![(None, plan.totals())]
        }
    }

    /// Every bound the plan misses.
    pub fn violations(&self, plan: &Plan<'_>) -> Vec<Violation> {
        let mut out = Vec::new();
        for (day, totals) in self.scope_totals(plan) {
            for (n, b) in &self.bounds {
                let total = totals[*n];
                let shortfall = b.shortfall(total);
                let excess = b.excess(total);
                let (kind, amount) = if shortfall > TOLERANCE {
                    (ViolationKind::Shortfall, shortfall)
                } else if excess > TOLERANCE {
                    (ViolationKind::Excess, excess)
                } else {
                    continue;
                };
                out.push(Violation {
                    nutrient: *n,
                    kind,
                    amount,
                    total,
                    bound: *b,
                    day: day.clone(),
                });
            }
        }
        out
    }

    pub fn is_satisfied_by(&self, plan: &Plan<'_>) -> bool {
        self.violations(plan).is_empty()
    }

    /// Totals, averages and slack for every nutrient.
    pub fn summarize(&self, plan: &Plan<'_>, optimal: bool, steps: usize) -> PlanSummary {
        let totals = plan.totals();
        let scopes = self.scope_totals(plan);
        let days = plan.days.len().max(1) as f64;

        let nutrients = Nutrient::ALL
            .into_iter()
            .map(|n| {
                let bound = self.bound(n);
                let slack = scopes
                    .iter()
                    .filter_map(|(_, t)| bound.slack(t[n]))
                    .reduce(f64::min);
                NutrientSummary {
                    nutrient: n,
                    total: totals[n],
                    average: totals[n] / days,
                    bound,
                    slack,
                }
            })
            .collect();

        PlanSummary {
            total_cost: plan.total_cost(),
            total_rating: plan.total_rating(),
            num_meals: plan.meal_count(),
            distinct_meals: plan.distinct_meals(),
            optimal,
            steps,
            nutrients,
        }
    }
}

/// Per-nutrient minimum and maximum over `items[from..]`, for every `from`.
///
/// Index `items.len()` holds the empty envelope (all zeros).
pub fn suffix_extremes(items: &[&MealItem]) -> Vec<(NutrientVector, NutrientVector)> {
    let mut out = vec![(NutrientVector::zero(), NutrientVector::zero()); items.len() + 1];
    for i in (0..items.len()).rev() {
        let values = items[i].nutrients();
        let (mut lean, mut rich) = if i + 1 == items.len() {
            (*values, *values)
        } else {
            out[i + 1]
        };
        for n in Nutrient::ALL {
            lean[n] = lean[n].min(values[n]);
            rich[n] = rich[n].max(values[n]);
        }
        out[i] = (lean, rich);
    }
    out
}
