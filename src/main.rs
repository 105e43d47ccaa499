use std::net::SocketAddr;
use std::path::Path;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use meal_planner_rs::cli::{Cli, Command, PlanArgs};
use meal_planner_rs::config::{ConfigOverrides, FileConfig};
use meal_planner_rs::error::{PlannerError, Result};
use meal_planner_rs::interface::{
    collect_bounds, display_catalog_report, display_failure, display_plan, display_profiles,
    write_plan_csv, PlanExport,
};
use meal_planner_rs::models::{NutrientBounds, Profiles};
use meal_planner_rs::planner::optimize;
use meal_planner_rs::server::{run_server, ApiState};
use meal_planner_rs::state::{load_bounds, load_catalog, load_profiles, save_json};

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Plan(args) => cmd_plan(args),
        Command::Validate { catalog, bounds } => cmd_validate(&catalog, bounds.as_deref()),
        Command::Profiles { profiles } => cmd_profiles(&profiles),
        Command::Serve {
            bind,
            catalog,
            profiles,
            config,
        } => cmd_serve(&bind, catalog.as_deref(), profiles.as_deref(), config.as_deref()),
    }
}

/// Resolve bounds from a file, a named profile, or prompts.
fn resolve_bounds(args: &PlanArgs) -> Result<NutrientBounds> {
    if let Some(path) = &args.bounds {
        return load_bounds(path);
    }

    if let Some(name) = &args.profile {
        let profiles = load_profiles(&args.profiles)?;
        return match profiles.get(name) {
            Some(bounds) => Ok(bounds.clone()),
            None => Err(match profiles.suggest(name) {
                Some(hint) => PlannerError::InvalidInput(format!(
                    "unknown profile '{}' (did you mean '{}'?)",
                    name, hint
                )),
                None => PlannerError::ProfileNotFound(name.clone()),
            }),
        };
    }

    if args.interactive {
        let profiles = if args.profiles.exists() {
            load_profiles(&args.profiles)?
        } else {
            Profiles::default()
        };
        return collect_bounds(&profiles);
    }

    Err(PlannerError::InvalidInput(
        "no bounds given; use --bounds, --profile or --interactive".to_string(),
    ))
}

/// Generate a meal plan.
fn cmd_plan(args: PlanArgs) -> Result<()> {
    let config = FileConfig::load(args.config.as_deref())?
        .apply_overrides(&ConfigOverrides::from(args.overrides.clone()));

    let report = load_catalog(&args.catalog)?;
    println!(
        "Loaded {} meals ({} rejected)",
        report.accepted.len(),
        report.rejected.len()
    );

    let bounds = resolve_bounds(&args)?;
    println!(
        "Planning {} days x {} meals with {} bounded nutrients ({} aggregation)",
        config.days,
        config.meals_per_day,
        bounds.len(),
        config.aggregation
    );

    let solution = match optimize(&report.accepted, &bounds, &config) {
        Ok(solution) => solution,
        Err(failure) => {
            display_failure(&failure);
            return Err(failure.into());
        }
    };

    display_plan(&solution);
    if !report.rejected.is_empty() {
        println!(
            "{} catalog entries were skipped at load time; run 'validate' for details.",
            report.rejected.len()
        );
    }

    if let Some(path) = &args.json {
        save_json(path, &PlanExport::new(&solution))?;
        println!("Wrote plan to {}", path.display());
    }
    if let Some(path) = &args.csv {
        write_plan_csv(&solution.plan, path)?;
        println!("Wrote plan to {}", path.display());
    }

    Ok(())
}

/// Report catalog and bound problems without planning.
fn cmd_validate(catalog: &Path, bounds: Option<&Path>) -> Result<()> {
    let report = load_catalog(catalog)?;
    display_catalog_report(&report);

    if let Some(path) = bounds {
        let bounds = load_bounds(path)?;
        match bounds.validate() {
            Ok(()) => println!("Bounds OK ({} nutrients)", bounds.len()),
            Err(issues) => {
                println!("Bound problems:");
                for issue in &issues {
                    println!("  {}", issue);
                }
                return Err(PlannerError::invalid(&issues));
            }
        }
    }

    if report.is_empty() {
        return Err(PlannerError::InvalidInput(
            "catalog has no usable meals".to_string(),
        ));
    }
    Ok(())
}

fn cmd_profiles(path: &Path) -> Result<()> {
    let profiles = load_profiles(path)?;
    display_profiles(&profiles);
    Ok(())
}

fn cmd_serve(
    bind: &str,
    catalog: Option<&Path>,
    profiles: Option<&Path>,
    config: Option<&Path>,
) -> Result<()> {
    let addr: SocketAddr = bind
        .parse()
        .map_err(|_| PlannerError::InvalidInput(format!("invalid bind address '{}'", bind)))?;
    let config = FileConfig::load(config)?.meal_planning;
    config
        .validate()
        .map_err(|issues| PlannerError::invalid(&issues))?;
    let state = ApiState::load(catalog, profiles, config)?;

    let runtime = tokio::runtime::Runtime::new()?;
    runtime
        .block_on(run_server(state, addr))
        .map_err(|e| PlannerError::Server(e.to_string()))
}
