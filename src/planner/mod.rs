pub mod constants;
pub mod envelope;
pub mod exhaustive;
pub mod failure;
pub mod options;
pub mod ranking;
pub mod search;
pub mod validation;

pub use constants::*;
pub use exhaustive::{solve as solve_exhaustive, ExhaustiveSolution};
pub use failure::{ClosestDay, ClosestPlan, Failure, InfeasibleReport, Violation, ViolationKind};
pub use options::{Aggregation, Objective, PlannerConfig};
pub use search::{optimize, Solution};
pub use validation::{validate_items, validate_records, validate_values, CatalogReport, Rejection};
