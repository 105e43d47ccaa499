use std::path::PathBuf;

use clap::Parser;

use meal_planner_rs::verify::{
    print_summary, run_verification, write_csv, InstanceShape, VerifyConfig,
};

#[derive(Parser, Debug)]
#[command(name = "verify")]
#[command(about = "Cross-check the meal plan optimizer against brute force")]
struct Args {
    /// Number of random instances
    #[arg(long, default_value = "200")]
    iters: usize,

    /// Random seed for reproducibility
    #[arg(long, default_value = "123")]
    seed: u64,

    /// Catalog size per instance
    #[arg(long, default_value = "5")]
    items: usize,

    /// Days per instance
    #[arg(long, default_value = "3")]
    days: usize,

    /// Output CSV file for per-trial results
    #[arg(long, default_value = "verify_results.csv")]
    csv: PathBuf,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();

    if args.items == 0 || args.days == 0 {
        eprintln!("Error: --items and --days must be at least 1");
        std::process::exit(1);
    }

    let config = VerifyConfig {
        iterations: args.iters,
        seed: args.seed,
        shape: InstanceShape {
            items: args.items,
            days: args.days,
        },
    };

    println!(
        "Running {} trials ({} items, {} days, seed {})",
        config.iterations, args.items, args.days, config.seed
    );

    let report = match run_verification(&config) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    print_summary(&report);

    if let Err(e) = write_csv(&report.results, &args.csv) {
        eprintln!("Error writing CSV: {}", e);
    } else {
        println!("Wrote per-trial results to {:?}", args.csv);
    }

    if report.mismatches().next().is_some() {
        std::process::exit(1);
    }
}
