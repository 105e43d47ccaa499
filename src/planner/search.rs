use tracing::{debug, info, warn};

use crate::models::{MealItem, NutrientBounds, NutrientVector, Plan, PlanSummary};
use crate::planner::constants::TOLERANCE;
use crate::planner::envelope::{suffix_extremes, Targets};
use crate::planner::failure::{ClosestDay, ClosestPlan, Failure, InfeasibleReport};
use crate::planner::options::{Aggregation, PlannerConfig};
use crate::planner::ranking::{least_violating, rank_candidates};
use crate::planner::validation::{usable_indices, Rejection};

/// A bound-satisfying plan and what it achieved.
#[derive(Debug, Clone)]
pub struct Solution<'c> {
    pub plan: Plan<'c>,
    pub summary: PlanSummary,
    /// Catalog entries skipped during validation.
    pub rejected: Vec<Rejection>,
}

/// Validated inputs shared by the search and the exhaustive solver.
pub(crate) struct Problem<'c> {
    pub(crate) items: Vec<&'c MealItem>,
    pub(crate) penalties: Vec<f64>,
    pub(crate) targets: Targets,
    pub(crate) rejected: Vec<Rejection>,
    pub(crate) slots: usize,
    meals_per_day: usize,
    use_limit: usize,
    window: usize,
    daily: bool,
    max_steps: usize,
}

/// One level of the explicit search stack. Candidates live in the shared
/// arena at `start..end`; `cursor` is the next one to try.
#[derive(Debug)]
struct Frame {
    start: usize,
    end: usize,
    cursor: usize,
    totals: NutrientVector,
    penalty: f64,
}

#[derive(Debug, Clone)]
struct Incumbent {
    chosen: Vec<usize>,
    penalty: f64,
    distinct: usize,
}

impl Incumbent {
    fn is_beaten_by(&self, penalty: f64, distinct: usize) -> bool {
        penalty < self.penalty - TOLERANCE
            || (penalty <= self.penalty + TOLERANCE && distinct > self.distinct)
    }
}

/// Per-item use counts and last-used day, kept in step with the picks made
/// so far so the repeat policy is checked without rescanning them.
#[derive(Debug, Clone)]
pub(crate) struct Usage {
    meals_per_day: usize,
    uses: Vec<usize>,
    last_day: Vec<Option<usize>>,
    /// Placed items with the last-used day each one replaced.
    history: Vec<(usize, Option<usize>)>,
}

impl Usage {
    pub(crate) fn new(items: usize, meals_per_day: usize) -> Self {
        Self {
            meals_per_day,
            uses: vec![0; items],
            last_day: vec![None; items],
            history: Vec::new(),
        }
    }

    /// Slots filled so far.
    pub(crate) fn len(&self) -> usize {
        self.history.len()
    }

    /// Place `item` in the next slot.
    pub(crate) fn push(&mut self, item: usize) {
        let day = self.history.len() / self.meals_per_day;
        self.history.push((item, self.last_day[item]));
        self.uses[item] += 1;
        self.last_day[item] = Some(day);
    }

    pub(crate) fn pop(&mut self) {
        if let Some((item, previous)) = self.history.pop() {
            self.uses[item] -= 1;
            self.last_day[item] = previous;
        }
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        while self.history.len() > len {
            self.pop();
        }
    }
}

struct SearchOutcome {
    best: Option<Incumbent>,
    steps: usize,
    exhausted: bool,
}

impl<'c> Problem<'c> {
    /// Validate configuration, bounds and catalog, in that order.
    pub(crate) fn prepare(
        catalog: &'c [MealItem],
        bounds: &NutrientBounds,
        config: &PlannerConfig,
    ) -> Result<Self, Failure> {
        config
            .validate()
            .map_err(|issues| Failure::Validation { issues })?;
        bounds
            .validate()
            .map_err(|issues| Failure::Validation { issues })?;

        let (usable, rejected) = usable_indices(catalog);
        if usable.is_empty() {
            return Err(Failure::EmptyCatalog { rejected });
        }

        let items: Vec<&MealItem> = usable.iter().map(|&i| &catalog[i]).collect();
        let penalties = items.iter().map(|m| config.objective.penalty(m)).collect();

        Ok(Self {
            items,
            penalties,
            targets: Targets::new(bounds, config),
            rejected,
            slots: config.total_slots(),
            meals_per_day: config.meals_per_day,
            use_limit: config.use_limit(),
            window: config.max_repeat_within_days,
            daily: config.aggregation == Aggregation::Daily,
            max_steps: config.max_steps,
        })
    }

    /// Whether `slot` is interchangeable with the one before it, so it may be
    /// restricted to items at or after the previous pick.
    fn follows_previous(&self, slot: usize) -> bool {
        if slot == 0 {
            return false;
        }
        if slot % self.meals_per_day != 0 {
            return true;
        }
        self.window == 0 && (!self.daily || self.meals_per_day == 1)
    }

    /// For each slot: do all later slots of its scope follow it?
    fn chained_slots(&self) -> Vec<bool> {
        let mut chained = vec![true; self.slots];
        for s in (0..self.slots).rev() {
            if self.targets.remaining_after(s) > 0 {
                chained[s] = self.follows_previous(s + 1) && chained[s + 1];
            }
        }
        chained
    }

    pub(crate) fn usage(&self) -> Usage {
        Usage::new(self.items.len(), self.meals_per_day)
    }

    /// Repeat policy for placing `item` in the next slot after the picks
    /// recorded in `usage`.
    pub(crate) fn allowed(&self, item: usize, usage: &Usage) -> bool {
        if usage.uses[item] >= self.use_limit {
            return false;
        }
        if self.window > 0 {
            let day = usage.len() / self.meals_per_day;
            if let Some(last) = usage.last_day[item] {
                if day.saturating_sub(last) < self.window {
                    return false;
                }
            }
        }
        true
    }

    pub(crate) fn plan_from(&self, chosen: &[usize]) -> Plan<'c> {
        let slots: Vec<&'c MealItem> = chosen.iter().map(|&i| self.items[i]).collect();
        Plan::from_slots(&slots, self.meals_per_day)
    }

    pub(crate) fn penalty_of(&self, chosen: &[usize]) -> f64 {
        chosen.iter().map(|&i| self.penalties[i]).sum()
    }

    fn push_frame(
        &self,
        stack: &mut Vec<Frame>,
        arena: &mut Vec<usize>,
        chosen: &[usize],
        usage: &Usage,
        totals: NutrientVector,
        penalty: f64,
    ) {
        let slot = stack.len();
        let lower = if self.follows_previous(slot) {
            chosen[slot - 1]
        } else {
            0
        };
        let candidates = (lower..self.items.len()).filter(|&i| self.allowed(i, usage));
        let ranked = rank_candidates(
            candidates,
            &self.items,
            &self.penalties,
            &self.targets,
            &totals,
        );

        let start = arena.len();
        arena.extend(ranked);
        stack.push(Frame {
            start,
            end: arena.len(),
            cursor: start,
            totals,
            penalty,
        });
    }

    /// Depth-first branch and bound over slot assignments.
    fn search(&self) -> SearchOutcome {
        let extremes = suffix_extremes(&self.items);
        let chained = self.chained_slots();
        let min_penalty = self
            .penalties
            .iter()
            .copied()
            .fold(f64::INFINITY, f64::min);

        let mut arena: Vec<usize> = Vec::new();
        let mut stack: Vec<Frame> = Vec::with_capacity(self.slots);
        let mut chosen: Vec<usize> = Vec::with_capacity(self.slots);
        let mut usage = self.usage();
        let mut best: Option<Incumbent> = None;
        let mut steps = 0;

        self.push_frame(
            &mut stack,
            &mut arena,
            &chosen,
            &usage,
            NutrientVector::zero(),
            0.0,
        );

        while let Some(depth) = stack.len().checked_sub(1) {
            let frame = &mut stack[depth];
            if frame.cursor == frame.end {
                arena.truncate(frame.start);
                stack.pop();
                chosen.truncate(depth);
                usage.truncate(depth);
                continue;
            }
            if steps >= self.max_steps {
                return SearchOutcome {
                    best,
                    steps,
                    exhausted: false,
                };
            }
            steps += 1;

            let item = arena[frame.cursor];
            frame.cursor += 1;
            let penalty = frame.penalty + self.penalties[item];

            if let Some(incumbent) = &best {
                let optimistic = penalty + (self.slots - depth - 1) as f64 * min_penalty;
                if optimistic > incumbent.penalty + TOLERANCE {
                    // candidates are ordered by penalty; the rest of the frame is no better
                    frame.cursor = frame.end;
                    continue;
                }
            }

            let totals = frame.totals.plus(self.items[item].nutrients());
            let from = if chained[depth] { item } else { 0 };
            let (lean, rich) = &extremes[from];
            if !self
                .targets
                .is_open(&totals, self.targets.remaining_after(depth), lean, rich)
            {
                continue;
            }

            chosen.truncate(depth);
            chosen.push(item);
            usage.truncate(depth);
            usage.push(item);

            if depth + 1 == self.slots {
                let distinct = distinct_count(&chosen);
                if best.as_ref().is_none_or(|b| b.is_beaten_by(penalty, distinct)) {
                    debug!(steps, penalty, distinct, "new incumbent");
                    best = Some(Incumbent {
                        chosen: chosen.clone(),
                        penalty,
                        distinct,
                    });
                }
                chosen.pop();
                usage.pop();
                continue;
            }

            let next_totals = if self.targets.starts_scope(depth + 1) {
                NutrientVector::zero()
            } else {
                totals
            };
            self.push_frame(&mut stack, &mut arena, &chosen, &usage, next_totals, penalty);
        }

        SearchOutcome {
            best,
            steps,
            exhausted: true,
        }
    }

    /// Greedy least-violation fill, ignoring bounds as hard constraints.
    /// One pass over the catalog per slot.
    fn closest(&self) -> Vec<usize> {
        let mut chosen = Vec::with_capacity(self.slots);
        let mut usage = self.usage();
        let mut totals = NutrientVector::zero();

        for slot in 0..self.slots {
            if self.targets.starts_scope(slot) {
                totals = NutrientVector::zero();
            }
            let allowed: Vec<usize> = (0..self.items.len())
                .filter(|&i| self.allowed(i, &usage))
                .collect();
            let pool = if allowed.is_empty() {
                (0..self.items.len()).collect()
            } else {
                allowed
            };
            let pick = least_violating(
                pool,
                &self.items,
                &self.penalties,
                &self.targets,
                &totals,
                self.targets.remaining_after(slot),
            )
            .unwrap_or(0);
            totals.add_assign(self.items[pick].nutrients());
            chosen.push(pick);
            usage.push(pick);
        }

        chosen
    }
}

fn distinct_count(chosen: &[usize]) -> usize {
    let mut seen: Vec<usize> = chosen.to_vec();
    seen.sort_unstable();
    seen.dedup();
    seen.len()
}

/// Select meals for every slot of the planning period.
///
/// Invalid catalog entries are skipped and reported in
/// [`Solution::rejected`]. A returned plan always satisfies every bound; when
/// none can be found the closest attempt is reported inside
/// [`Failure::Infeasible`] instead.
pub fn optimize<'c>(
    catalog: &'c [MealItem],
    bounds: &NutrientBounds,
    config: &PlannerConfig,
) -> Result<Solution<'c>, Failure> {
    let problem = Problem::prepare(catalog, bounds, config)?;
    debug!(
        items = problem.items.len(),
        rejected = problem.rejected.len(),
        slots = problem.slots,
        bounded = problem.targets.bounds().len(),
        "starting plan search"
    );

    let outcome = problem.search();

    if let Some(best) = outcome.best {
        let plan = problem.plan_from(&best.chosen);
        let summary = problem
            .targets
            .summarize(&plan, outcome.exhausted, outcome.steps);
        info!(
            cost = summary.total_cost,
            steps = outcome.steps,
            optimal = outcome.exhausted,
            "plan found"
        );
        return Ok(Solution {
            plan,
            summary,
            rejected: problem.rejected,
        });
    }

    let chosen = problem.closest();
    let plan = problem.plan_from(&chosen);
    let violations = problem.targets.violations(&plan);

    if violations.is_empty() && chosen_respects_policy(&problem, &chosen) {
        // Only reachable when the step budget cut the search short.
        warn!(steps = outcome.steps, "search budget exhausted; using greedy fallback plan");
        let summary = problem.targets.summarize(&plan, false, outcome.steps);
        return Ok(Solution {
            plan,
            summary,
            rejected: problem.rejected,
        });
    }

    warn!(
        steps = outcome.steps,
        exhausted = outcome.exhausted,
        violations = violations.len(),
        "no plan satisfies the bounds"
    );

    let closest = ClosestPlan {
        total_cost: plan.total_cost(),
        days: plan
            .days
            .iter()
            .map(|d| ClosestDay {
                day: d.day.clone(),
                meals: d.meals.iter().map(|m| m.id.clone()).collect(),
            })
            .collect(),
    };

    Err(Failure::Infeasible(InfeasibleReport {
        violations,
        exhausted: outcome.exhausted,
        steps: outcome.steps,
        closest: Some(closest),
    }))
}

fn chosen_respects_policy(problem: &Problem<'_>, chosen: &[usize]) -> bool {
    let mut usage = problem.usage();
    chosen.iter().all(|&item| {
        let ok = problem.allowed(item, &usage);
        usage.push(item);
        ok
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Bound, Nutrient};
    use crate::planner::constants::{MAX_DAYS, MAX_MEALS_PER_DAY};
    use crate::planner::failure::ViolationKind;

    fn two_item_catalog() -> Vec<MealItem> {
        vec![
            MealItem::new("1", "Steak Dinner", 5.0, 2000.0).with(Nutrient::Protein, 80.0),
            MealItem::new("2", "Pasta Bowl", 3.0, 1500.0).with(Nutrient::Protein, 40.0),
        ]
    }

    #[test]
    fn test_single_day_picks_item_meeting_protein() {
        let catalog = two_item_catalog();
        let bounds = NutrientBounds::new()
            .with(Nutrient::Calories, Bound::between(1800.0, 2200.0))
            .with(Nutrient::Protein, Bound::at_least(50.0));
        let config = PlannerConfig::default().with_days(1);

        let solution = optimize(&catalog, &bounds, &config).unwrap();
        assert_eq!(solution.plan.days.len(), 1);
        assert_eq!(solution.plan.days[0].meals[0].id.as_str(), "1");
        assert_eq!(solution.summary.total_cost, 5.0);
        assert!(solution.summary.optimal);
    }

    #[test]
    fn test_calorie_cap_reports_smallest_excess() {
        let catalog = two_item_catalog();
        let bounds = NutrientBounds::new().with(Nutrient::Calories, Bound::at_most(1000.0));
        let config = PlannerConfig::default().with_days(1);

        let Err(Failure::Infeasible(report)) = optimize(&catalog, &bounds, &config) else {
            panic!("expected infeasible");
        };
        assert!(report.exhausted);
        assert_eq!(report.violations.len(), 1);
        let v = &report.violations[0];
        assert_eq!(v.nutrient, Nutrient::Calories);
        assert_eq!(v.kind, ViolationKind::Excess);
        assert_eq!(v.amount, 500.0);
        let closest = report.closest.unwrap();
        assert_eq!(closest.days[0].meals[0].as_str(), "2");
    }

    #[test]
    fn test_allowed_respects_window_and_uses() {
        let catalog = two_item_catalog();
        let mut config = PlannerConfig::default();
        config.max_repeat_within_days = 2;
        config.max_uses_per_item = Some(2);
        let problem = Problem::prepare(&catalog, &NutrientBounds::new(), &config).unwrap();

        let mut usage = problem.usage();
        usage.push(0);
        // item 0 on day 0: blocked on day 1, fine on day 2
        assert!(!problem.allowed(0, &usage));
        usage.push(1);
        assert!(problem.allowed(0, &usage));
        usage.push(0);
        usage.push(1);
        // third use exceeds the cap
        assert!(!problem.allowed(0, &usage));

        // backing out restores the earlier state
        usage.truncate(1);
        assert_eq!(usage.len(), 1);
        assert!(!problem.allowed(0, &usage));
        assert!(problem.allowed(1, &usage));
    }

    #[test]
    fn test_usage_window_counts_days_not_slots() {
        let catalog = two_item_catalog();
        let mut config = PlannerConfig::default();
        config.meals_per_day = 2;
        config.max_repeat_within_days = 1;
        let problem = Problem::prepare(&catalog, &NutrientBounds::new(), &config).unwrap();

        let mut usage = problem.usage();
        usage.push(0);
        // same day is still inside the window
        assert!(!problem.allowed(0, &usage));
        usage.push(1);
        // next day is fine
        assert!(problem.allowed(0, &usage));
    }

    #[test]
    fn test_closest_plan_on_long_periods_stays_linear() {
        let catalog: Vec<MealItem> = (0..20)
            .map(|i| MealItem::new(format!("m{}", i).as_str(), "Meal", 1.0 + i as f64, 500.0))
            .collect();
        let bounds = NutrientBounds::new().with(Nutrient::Calories, Bound::at_most(1.0));
        let mut config = PlannerConfig::default().with_days(MAX_DAYS);
        config.meals_per_day = MAX_MEALS_PER_DAY;
        config.max_repeat_within_days = 3;

        let started = std::time::Instant::now();
        let Err(Failure::Infeasible(report)) = optimize(&catalog, &bounds, &config) else {
            panic!("expected infeasible");
        };
        assert!(report.steps <= config.max_steps);
        let closest = report.closest.unwrap();
        assert_eq!(closest.days.len(), MAX_DAYS);
        assert!(
            started.elapsed() < std::time::Duration::from_secs(20),
            "took {:?}",
            started.elapsed()
        );
    }

    #[test]
    fn test_daily_aggregation_checks_each_day() {
        let catalog = vec![
            MealItem::new("a", "Light", 1.0, 500.0),
            MealItem::new("b", "Heavy", 2.0, 1500.0),
        ];
        let bounds = NutrientBounds::new().with(Nutrient::Calories, Bound::between(1800.0, 2200.0));
        let mut config = PlannerConfig::default()
            .with_days(2)
            .with_aggregation(Aggregation::Daily);
        config.meals_per_day = 2;

        let solution = optimize(&catalog, &bounds, &config).unwrap();
        for day in &solution.plan.days {
            let ids: Vec<&str> = day.meals.iter().map(|m| m.id.as_str()).collect();
            assert_eq!(ids, vec!["a", "b"]);
        }
        assert_eq!(solution.summary.total_cost, 6.0);
    }

    #[test]
    fn test_step_budget_without_plan_is_infeasible() {
        let catalog = two_item_catalog();
        let bounds = NutrientBounds::new().with(Nutrient::Protein, Bound::at_least(1000.0));
        let mut config = PlannerConfig::default();
        config.max_steps = 1;

        let Err(Failure::Infeasible(report)) = optimize(&catalog, &bounds, &config) else {
            panic!("expected infeasible");
        };
        assert!(!report.exhausted);
        assert_eq!(report.steps, 1);
        assert!(report.violations_for(Nutrient::Protein).next().is_some());
    }
}
