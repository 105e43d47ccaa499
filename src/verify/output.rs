use std::path::Path;

use crate::error::Result;
use crate::verify::trial::{TrialResult, VerifyReport};

fn penalty_cell(penalty: Option<f64>) -> String {
    penalty.map(|p| format!("{:.2}", p)).unwrap_or_default()
}

fn count_cell(count: Option<usize>) -> String {
    count.map(|c| c.to_string()).unwrap_or_default()
}

/// Write one CSV row per trial.
pub fn write_csv(results: &[TrialResult], path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "trial",
        "items",
        "days",
        "meals_per_day",
        "aggregation",
        "objective",
        "feasible",
        "optimizer_penalty",
        "exhaustive_penalty",
        "optimizer_distinct",
        "exhaustive_distinct",
        "steps",
        "match",
    ])?;

    for r in results {
        wtr.write_record([
            r.trial.to_string(),
            r.items.to_string(),
            r.days.to_string(),
            r.meals_per_day.to_string(),
            r.aggregation.to_string(),
            r.objective.to_string(),
            r.is_feasible().to_string(),
            penalty_cell(r.optimizer_penalty),
            penalty_cell(r.exhaustive_penalty),
            count_cell(r.optimizer_distinct),
            count_cell(r.exhaustive_distinct),
            r.steps.to_string(),
            r.is_match().to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn print_summary(report: &VerifyReport) {
    let total = report.results.len();
    let mismatches: Vec<&TrialResult> = report.mismatches().collect();
    let max_steps = report.results.iter().map(|r| r.steps).max().unwrap_or(0);

    println!();
    println!("=== Verification ===");
    println!("Trials:     {}", total);
    println!("Feasible:   {}", report.feasible_count());
    println!("Max steps:  {}", max_steps);
    println!("Mismatches: {}", mismatches.len());

    for r in &mismatches {
        println!(
            "  #{} ({} items, {} days x {}, {}, {}): optimizer={} ({} distinct) exhaustive={} ({} distinct){}",
            r.trial,
            r.items,
            r.days,
            r.meals_per_day,
            r.aggregation,
            r.objective,
            penalty_cell(r.optimizer_penalty),
            count_cell(r.optimizer_distinct),
            penalty_cell(r.exhaustive_penalty),
            count_cell(r.exhaustive_distinct),
            if r.bounds_ok { "" } else { " [bounds violated]" }
        );
    }
    println!();
}
