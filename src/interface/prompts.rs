use dialoguer::{Confirm, Input, Select};
use strsim::jaro_winkler;

use crate::error::{PlannerError, Result};
use crate::models::{Bound, Nutrient, NutrientBounds, Profiles};

/// Outcome of matching typed text against nutrient names.
#[derive(Debug, Clone, PartialEq)]
pub enum NutrientMatch {
    Exact(Nutrient),
    /// Close spellings, best first.
    Fuzzy(Vec<Nutrient>),
    NoMatch,
}

/// Match `input` against canonical keys, aliases and labels.
pub fn match_nutrient(input: &str) -> NutrientMatch {
    let input = input.trim().to_lowercase();
    if let Some(n) = Nutrient::from_key(&input) {
        return NutrientMatch::Exact(n);
    }
    if let Some(n) = Nutrient::ALL
        .into_iter()
        .find(|n| n.label().to_lowercase() == input)
    {
        return NutrientMatch::Exact(n);
    }

    let mut candidates: Vec<(Nutrient, f64)> = Nutrient::ALL
        .into_iter()
        .map(|n| {
            let score = [n.key(), n.alias(), n.label()]
                .iter()
                .map(|name| jaro_winkler(&name.to_lowercase(), &input))
                .fold(0.0, f64::max);
            (n, score)
        })
        .filter(|(_, score)| *score > 0.7)
        .collect();

    candidates.sort_by(|a, b| b.1.total_cmp(&a.1));

    if candidates.is_empty() {
        NutrientMatch::NoMatch
    } else {
        NutrientMatch::Fuzzy(candidates.into_iter().map(|(n, _)| n).collect())
    }
}

/// Parse an optional amount; empty input means "no limit".
pub fn parse_amount(input: &str) -> Result<Option<f64>> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }
    match input.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(Some(v)),
        _ => Err(PlannerError::InvalidInput(format!(
            "'{}' is not a non-negative number",
            input
        ))),
    }
}

fn prompt_amount(prompt: &str) -> Result<Option<f64>> {
    let input: String = Input::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()?;
    parse_amount(&input)
}

/// Prompt for the minimum and maximum of one nutrient.
pub fn prompt_bound(nutrient: Nutrient) -> Result<Bound> {
    let min = prompt_amount(&format!("Minimum {} (Enter for none)", nutrient.label()))?;
    let max = prompt_amount(&format!("Maximum {} (Enter for none)", nutrient.label()))?;
    let bound = Bound::new(min, max);

    if let (Some(min), Some(max)) = (min, max) {
        if min > max {
            return Err(PlannerError::InvalidInput(format!(
                "{}: minimum {} is above maximum {}",
                nutrient.label(),
                min,
                max
            )));
        }
    }
    Ok(bound)
}

/// Prompt for a nutrient name with fuzzy matching.
pub fn prompt_nutrient() -> Result<Option<Nutrient>> {
    loop {
        let input: String = Input::new()
            .with_prompt("Nutrient to bound (or press Enter to finish)")
            .allow_empty(true)
            .interact_text()?;

        if input.trim().is_empty() {
            return Ok(None);
        }

        match match_nutrient(&input) {
            NutrientMatch::Exact(n) => return Ok(Some(n)),
            NutrientMatch::NoMatch => {
                println!("No nutrient matches '{}'", input.trim());
            }
            NutrientMatch::Fuzzy(candidates) if candidates.len() == 1 => {
                let nutrient = candidates[0];
                let confirm = Confirm::new()
                    .with_prompt(format!("Did you mean '{}'?", nutrient.label()))
                    .default(true)
                    .interact()?;
                if confirm {
                    return Ok(Some(nutrient));
                }
            }
            NutrientMatch::Fuzzy(candidates) => {
                let shown: Vec<Nutrient> = candidates.into_iter().take(5).collect();
                let mut options: Vec<String> =
                    shown.iter().map(|n| n.label().to_string()).collect();
                options.push("None of these".to_string());

                let selection = Select::new()
                    .with_prompt("Which did you mean?")
                    .items(&options)
                    .default(0)
                    .interact()?;

                if let Some(nutrient) = shown.get(selection) {
                    return Ok(Some(*nutrient));
                }
            }
        }
    }
}

/// Let the user pick a named profile. `None` means "enter bounds by hand".
pub fn prompt_profile(profiles: &Profiles) -> Result<Option<String>> {
    if profiles.is_empty() {
        return Ok(None);
    }

    let mut options: Vec<String> = profiles.names().map(str::to_string).collect();
    options.push("Custom bounds".to_string());

    let selection = Select::new()
        .with_prompt("Choose a nutritional profile")
        .items(&options)
        .default(0)
        .interact()?;

    Ok(options
        .get(selection)
        .filter(|_| selection < profiles.len())
        .cloned())
}

/// Prompt for yes/no confirmation.
pub fn prompt_yes_no(prompt: &str, default: bool) -> Result<bool> {
    Ok(Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()?)
}

/// Collect a full bound set, starting from a profile when one is chosen.
pub fn collect_bounds(profiles: &Profiles) -> Result<NutrientBounds> {
    let mut bounds = match prompt_profile(profiles)? {
        Some(name) => {
            println!("Using profile '{}'", name);
            let chosen = profiles.get(&name).cloned().unwrap_or_default();
            if !prompt_yes_no("Adjust any of its bounds?", false)? {
                return Ok(chosen);
            }
            chosen
        }
        None => NutrientBounds::new(),
    };

    while let Some(nutrient) = prompt_nutrient()? {
        let bound = prompt_bound(nutrient)?;
        bounds.set(nutrient, bound);
        println!("{}: {}", nutrient.label(), super::render::format_bound(&bound));
    }

    bounds
        .validate()
        .map_err(|issues| PlannerError::invalid(&issues))?;
    Ok(bounds)
}
