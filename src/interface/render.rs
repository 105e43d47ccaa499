use crate::models::{Bound, Nutrient, Plan, PlanSummary, Profiles};
use crate::planner::{CatalogReport, Failure, InfeasibleReport, Rejection, Solution};

/// "1800 - 2200", ">= 50", "<= 400" or "-" for no limit.
pub fn format_bound(bound: &Bound) -> String {
    match (bound.min, bound.max) {
        (Some(min), Some(max)) => format!("{:.0} - {:.0}", min, max),
        (Some(min), None) => format!(">= {:.0}", min),
        (None, Some(max)) => format!("<= {:.0}", max),
        (None, None) => "-".to_string(),
    }
}

/// Display a plan, its summary, and any skipped catalog entries.
pub fn display_plan(solution: &Solution<'_>) {
    display_days(&solution.plan);
    display_summary(&solution.summary);
    if !solution.rejected.is_empty() {
        display_rejections(&solution.rejected);
    }
}

fn display_days(plan: &Plan<'_>) {
    println!();
    println!("=== Meal Plan ===");
    println!();

    let day_width = plan.days.iter().map(|d| d.day.len()).max().unwrap_or(9);
    let title_width = plan.meals().map(|m| m.title.len()).max().unwrap_or(10);

    for day in &plan.days {
        for (i, meal) in day.meals.iter().enumerate() {
            let label = if i == 0 { day.day.as_str() } else { "" };
            println!(
                "{:<dw$}  {:<tw$}  ${:>6.2}  {:>5.0} kcal  P:{:.0} C:{:.0} F:{:.0}",
                label,
                meal.title,
                meal.cost,
                meal.calories(),
                meal.nutrient(Nutrient::Protein),
                meal.nutrient(Nutrient::Carbs),
                meal.nutrient(Nutrient::Fat),
                dw = day_width,
                tw = title_width
            );
        }
    }
}

fn display_summary(summary: &PlanSummary) {
    println!();
    println!("--- Summary ---");
    println!("Total meals: {} ({} distinct)", summary.num_meals, summary.distinct_meals);
    println!("Total cost: ${:.2}", summary.total_cost);
    println!(
        "Search: {} steps, {}",
        summary.steps,
        if summary.optimal {
            "proven cheapest"
        } else {
            "budget reached, best found"
        }
    );
    println!();
    println!(
        "{:<16} {:>10} {:>10} {:>16} {:>10}",
        "Nutrient", "Total", "Per day", "Bound", "Slack"
    );
    for row in &summary.nutrients {
        let slack = row
            .slack
            .map(|s| format!("{:.1}", s))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<16} {:>10.1} {:>10.1} {:>16} {:>10}",
            row.nutrient.label(),
            row.total,
            row.average,
            format_bound(&row.bound),
            slack
        );
    }
    println!();
}

fn display_rejections(rejected: &[Rejection]) {
    println!("Skipped {} catalog entries:", rejected.len());
    for r in rejected {
        let name = r.id.as_deref().unwrap_or(&r.title);
        let reasons: Vec<String> = r.issues.iter().map(ToString::to_string).collect();
        println!("  #{} {}: {}", r.position, name, reasons.join("; "));
    }
    println!();
}

fn display_infeasible(report: &InfeasibleReport) {
    println!("No meal plan satisfies the bounds.");
    if !report.exhausted {
        println!(
            "The search stopped after {} steps; raising the step budget may help.",
            report.steps
        );
    }
    println!();
    println!("Unmet on the closest plan:");
    for v in &report.violations {
        println!("  {}", v);
    }

    if let Some(closest) = &report.closest {
        println!();
        println!("Closest plan (${:.2}, NOT valid):", closest.total_cost);
        for day in &closest.days {
            let ids: Vec<&str> = day.meals.iter().map(|m| m.as_str()).collect();
            println!("  {:<9} {}", day.day, ids.join(", "));
        }
    }
    println!();
}

/// Explain why no plan was produced.
pub fn display_failure(failure: &Failure) {
    println!();
    match failure {
        Failure::Infeasible(report) => display_infeasible(report),
        Failure::EmptyCatalog { rejected } => {
            println!("No usable meals in the catalog.");
            display_rejections(rejected);
        }
        Failure::Validation { .. } => {
            println!("The request is invalid:");
            for detail in failure.details() {
                println!("  {}", detail);
            }
            println!();
        }
    }
}

/// Display the outcome of validating a catalog file.
pub fn display_catalog_report(report: &CatalogReport) {
    println!();
    println!("=== Catalog ({} usable) ===", report.accepted.len());
    println!();
    for item in &report.accepted {
        println!("  {}", item.debug_string());
    }
    println!();
    if !report.rejected.is_empty() {
        display_rejections(&report.rejected);
    }
}

pub fn display_profiles(profiles: &Profiles) {
    if profiles.is_empty() {
        println!("No profiles defined.");
        return;
    }

    for (name, bounds) in profiles.iter() {
        println!();
        println!("=== {} ({} bounds) ===", name, bounds.len());
        for (nutrient, bound) in bounds.iter() {
            println!("  {:<16} {}", nutrient.label(), format_bound(&bound));
        }
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bound() {
        assert_eq!(format_bound(&Bound::between(1800.0, 2200.0)), "1800 - 2200");
        assert_eq!(format_bound(&Bound::at_least(50.0)), ">= 50");
        assert_eq!(format_bound(&Bound::at_most(400.0)), "<= 400");
        assert_eq!(format_bound(&Bound::default()), "-");
    }
}
