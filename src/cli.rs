use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::ConfigOverrides;
use crate::planner::{Aggregation, Objective};

/// Meal planner: pick a week of meals that meets nutrient bounds at the lowest cost.
#[derive(Parser, Debug)]
#[command(name = "meal_planner")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Increase log detail (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build a meal plan from a catalog and nutrient bounds.
    Plan(PlanArgs),

    /// Check a catalog (and optionally a bounds file) without planning.
    Validate {
        /// Path to the meal catalog JSON file.
        #[arg(short, long, default_value = "meals.json")]
        catalog: PathBuf,

        /// Path to a bounds JSON file.
        #[arg(short, long)]
        bounds: Option<PathBuf>,
    },

    /// List the nutritional profiles in a profiles file.
    Profiles {
        #[arg(long, default_value = "nutritional_profiles.json")]
        profiles: PathBuf,
    },

    /// Serve the JSON API.
    Serve {
        #[arg(long, default_value = "127.0.0.1:5001")]
        bind: String,

        /// Catalog served by /get_sample_meals and used when a request has none.
        #[arg(short, long)]
        catalog: Option<PathBuf>,

        #[arg(long)]
        profiles: Option<PathBuf>,

        /// Settings file with a `meal_planning` section.
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Path to the meal catalog JSON file.
    #[arg(short, long, default_value = "meals.json")]
    pub catalog: PathBuf,

    /// Path to a bounds JSON file.
    #[arg(short, long, conflicts_with_all = ["profile", "interactive"])]
    pub bounds: Option<PathBuf>,

    /// Name of a profile in the profiles file.
    #[arg(short, long, conflicts_with = "interactive")]
    pub profile: Option<String>,

    #[arg(long, default_value = "nutritional_profiles.json")]
    pub profiles: PathBuf,

    /// Enter bounds through prompts.
    #[arg(short, long)]
    pub interactive: bool,

    /// Settings file with a `meal_planning` section.
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: OverrideArgs,

    /// Write the plan and summary as JSON.
    #[arg(long)]
    pub json: Option<PathBuf>,

    /// Write the plan as CSV, one row per meal.
    #[arg(long)]
    pub csv: Option<PathBuf>,
}

/// Planner settings that override the config file.
#[derive(Args, Debug, Clone, Default)]
pub struct OverrideArgs {
    #[arg(long)]
    pub days: Option<usize>,

    #[arg(long = "meals-per-day")]
    pub meals_per_day: Option<usize>,

    /// Use each meal at most once.
    #[arg(long = "no-repeats")]
    pub no_repeats: bool,

    /// Minimum spacing in days between two uses of the same meal.
    #[arg(long = "repeat-window")]
    pub repeat_window: Option<usize>,

    /// Cap on uses of any one meal across the plan.
    #[arg(long = "max-uses")]
    pub max_uses: Option<usize>,

    /// weekly, daily or average.
    #[arg(long)]
    pub aggregation: Option<Aggregation>,

    /// minimize_cost or maximize_rating.
    #[arg(long)]
    pub objective: Option<Objective>,

    /// Search step budget.
    #[arg(long = "max-steps")]
    pub max_steps: Option<usize>,
}

impl From<OverrideArgs> for ConfigOverrides {
    fn from(args: OverrideArgs) -> Self {
        Self {
            days: args.days,
            meals_per_day: args.meals_per_day,
            no_repeats: args.no_repeats,
            repeat_window: args.repeat_window,
            max_uses: args.max_uses,
            aggregation: args.aggregation,
            objective: args.objective,
            max_steps: args.max_steps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plan_with_overrides() {
        let cli = Cli::parse_from([
            "meal_planner",
            "-v",
            "plan",
            "--catalog",
            "m.json",
            "--profile",
            "keto",
            "--days",
            "3",
            "--aggregation",
            "daily",
        ]);
        assert_eq!(cli.verbose, 1);
        let Command::Plan(args) = cli.command else {
            panic!("expected plan");
        };
        assert_eq!(args.profile.as_deref(), Some("keto"));
        assert_eq!(args.overrides.days, Some(3));
        assert_eq!(args.overrides.aggregation, Some(Aggregation::Daily));
    }

    #[test]
    fn test_bounds_conflicts_with_profile() {
        let result = Cli::try_parse_from([
            "meal_planner",
            "plan",
            "--bounds",
            "b.json",
            "--profile",
            "keto",
        ]);
        assert!(result.is_err());
    }
}
