pub mod cli;
pub mod config;
pub mod error;
pub mod interface;
pub mod models;
pub mod planner;
pub mod server;
pub mod state;
pub mod verify;

pub use error::{PlannerError, Result};
pub use models::{MealItem, NutrientBounds, Plan};
pub use planner::{optimize, Failure, PlannerConfig, Solution};
