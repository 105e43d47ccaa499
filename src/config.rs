use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::planner::{Aggregation, Objective, PlannerConfig};

/// On-disk settings file. Only the `meal_planning` section is read; other
/// sections are ignored so one file can be shared with other tools.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub meal_planning: PlannerConfig,
}

/// Command-line values that win over the file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub days: Option<usize>,
    pub meals_per_day: Option<usize>,
    pub no_repeats: bool,
    pub repeat_window: Option<usize>,
    pub max_uses: Option<usize>,
    pub aggregation: Option<Aggregation>,
    pub objective: Option<Objective>,
    pub max_steps: Option<usize>,
}

impl FileConfig {
    /// Read the file at `path`, or fall back to defaults when none is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let data = fs::read_to_string(path)?;
        let parsed: Self = serde_json::from_str(&data)?;
        debug!(path = %path.display(), "loaded config file");
        Ok(parsed)
    }

    pub fn apply_overrides(mut self, overrides: &ConfigOverrides) -> PlannerConfig {
        let config = &mut self.meal_planning;
        if let Some(days) = overrides.days {
            config.days = days;
        }
        if let Some(meals) = overrides.meals_per_day {
            config.meals_per_day = meals;
        }
        if overrides.no_repeats {
            config.allow_repeats = false;
        }
        if let Some(window) = overrides.repeat_window {
            config.max_repeat_within_days = window;
        }
        if overrides.max_uses.is_some() {
            config.max_uses_per_item = overrides.max_uses;
        }
        if let Some(aggregation) = overrides.aggregation {
            config.aggregation = aggregation;
        }
        if let Some(objective) = overrides.objective {
            config.objective = objective;
        }
        if let Some(steps) = overrides.max_steps {
            config.max_steps = steps;
        }
        self.meal_planning
    }
}
