use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, warn};

use crate::models::{MealItem, NutrientBounds};
use crate::planner::envelope::Targets;
use crate::planner::{optimize, solve_exhaustive, Aggregation, Failure, Objective, PlannerConfig};
use crate::verify::synthetic::{random_bounds, random_catalog, random_config, InstanceShape};

const PENALTY_TOLERANCE: f64 = 1e-6;

/// One optimizer-versus-enumeration comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialResult {
    pub trial: usize,
    pub items: usize,
    pub days: usize,
    pub meals_per_day: usize,
    pub aggregation: Aggregation,
    pub objective: Objective,
    /// Objective value of each solver's plan (cost, or missing rating).
    pub optimizer_penalty: Option<f64>,
    pub exhaustive_penalty: Option<f64>,
    pub optimizer_distinct: Option<usize>,
    pub exhaustive_distinct: Option<usize>,
    pub steps: usize,
    /// The optimizer's plan met every bound (true when it returned none).
    pub bounds_ok: bool,
}

impl TrialResult {
    pub fn is_feasible(&self) -> bool {
        self.exhaustive_penalty.is_some()
    }

    /// Same objective value and, among equal values, the same variety.
    pub fn is_match(&self) -> bool {
        let penalties_agree = match (self.optimizer_penalty, self.exhaustive_penalty) {
            (None, None) => true,
            (Some(a), Some(b)) => (a - b).abs() <= PENALTY_TOLERANCE,
            _ => false,
        };
        penalties_agree && self.optimizer_distinct == self.exhaustive_distinct && self.bounds_ok
    }
}

/// Solve one instance both ways.
pub fn run_trial(
    trial: usize,
    catalog: &[MealItem],
    bounds: &NutrientBounds,
    config: &PlannerConfig,
) -> Result<TrialResult, Failure> {
    let exhaustive = solve_exhaustive(catalog, bounds, config)?;

    let (optimizer, steps, bounds_ok) = match optimize(catalog, bounds, config) {
        Ok(solution) => {
            let ok = Targets::new(bounds, config).is_satisfied_by(&solution.plan);
            let penalty = config.objective.plan_penalty(&solution.plan);
            (
                Some((penalty, solution.summary.distinct_meals)),
                solution.summary.steps,
                ok,
            )
        }
        Err(Failure::Infeasible(report)) => (None, report.steps, true),
        Err(other) => return Err(other),
    };

    Ok(TrialResult {
        trial,
        items: catalog.len(),
        days: config.days,
        meals_per_day: config.meals_per_day,
        aggregation: config.aggregation,
        objective: config.objective,
        optimizer_penalty: optimizer.map(|(p, _)| p),
        exhaustive_penalty: exhaustive.as_ref().map(|e| e.penalty),
        optimizer_distinct: optimizer.map(|(_, d)| d),
        exhaustive_distinct: exhaustive.as_ref().map(|e| e.distinct),
        steps,
        bounds_ok,
    })
}

/// Settings for a verification run.
#[derive(Debug, Clone)]
pub struct VerifyConfig {
    pub iterations: usize,
    pub seed: u64,
    pub shape: InstanceShape,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            iterations: 200,
            seed: 123,
            shape: InstanceShape { items: 5, days: 3 },
        }
    }
}

pub struct VerifyReport {
    pub results: Vec<TrialResult>,
}

impl VerifyReport {
    pub fn mismatches(&self) -> impl Iterator<Item = &TrialResult> {
        self.results.iter().filter(|r| !r.is_match())
    }

    pub fn feasible_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_feasible()).count()
    }
}

/// Run `iterations` seeded random trials.
pub fn run_verification(config: &VerifyConfig) -> Result<VerifyReport, Failure> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut results = Vec::with_capacity(config.iterations);

    for trial in 1..=config.iterations {
        let catalog = random_catalog(&mut rng, config.shape.items);
        let planner = random_config(&mut rng, config.shape);
        let bounds = random_bounds(&mut rng, &catalog, &planner);

        let result = run_trial(trial, &catalog, &bounds, &planner)?;
        if result.is_match() {
            debug!(trial, feasible = result.is_feasible(), "trial agrees");
        } else {
            warn!(
                trial,
                optimizer = ?result.optimizer_penalty,
                exhaustive = ?result.exhaustive_penalty,
                "optimizer disagrees with enumeration"
            );
        }
        results.push(result);
    }

    Ok(VerifyReport { results })
}
