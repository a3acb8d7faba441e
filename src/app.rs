//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - sets up logging
//! - runs fits, error surfaces, or timing estimates
//! - prints reports and writes optional exports

use std::io;

use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, EstimateTimeArgs, FitArgs, SurfaceArgs};
use crate::domain::{FitConfig, FitRequest, ModelKind, WeibullSettings};
use crate::error::AppError;
use crate::fit::WeibullTimer;

pub mod pipeline;

/// Entry point for the `ashcalc` binary.
pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Fit(args) => handle_fit(&args),
        Command::Surface(args) => handle_surface(&args),
        Command::EstimateTime(args) => handle_estimate_time(&args),
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn handle_fit(args: &FitArgs) -> Result<(), AppError> {
    let config = fit_config_from_args(args)?;
    let reports = pipeline::run_fit(&config)?;

    for report in &reports {
        if config.json {
            println!("{}", crate::io::to_json_string(report)?);
        } else {
            println!("{}", crate::report::format_fit_summary(report));
        }
    }
    Ok(())
}

fn handle_surface(args: &SurfaceArgs) -> Result<(), AppError> {
    let surface = pipeline::run_surface(
        &args.file,
        args.model,
        (args.x_min, args.x_max),
        (args.y_min, args.y_max),
        args.resolution,
    )?;

    match &args.output {
        Some(path) => crate::io::write_json(path, &surface)?,
        None => println!("{}", crate::io::to_json_string(&surface)?),
    }
    if let Some((x, y, error)) = surface.minimum() {
        eprintln!(
            "Minimum ln(MRSE) {error:.4} at {} = {x:.4}, {} = {y:.4}",
            surface.x_name, surface.y_name
        );
    }
    Ok(())
}

fn handle_estimate_time(args: &EstimateTimeArgs) -> Result<(), AppError> {
    if args.isopachs == 0 || args.runs == 0 || args.iterations_per_run == 0 {
        return Err(AppError::new(
            2,
            "isopachs, runs and iterations per run must all be greater than 0",
        ));
    }
    let timer = WeibullTimer::calibrate()?;
    let estimate = timer.estimate(args.isopachs, args.runs, args.iterations_per_run);
    println!("Estimated time (s): {:.2}", estimate.as_secs_f64());
    Ok(())
}

/// Resolve CLI flags into a `FitConfig`.
pub fn fit_config_from_args(args: &FitArgs) -> Result<FitConfig, AppError> {
    let request = match args.model {
        ModelKind::Exponential => FitRequest::Exponential {
            segments: args.segments,
        },
        ModelKind::PowerLaw => FitRequest::PowerLaw {
            proximal_limit_km: args.proximal_limit,
            distal_limit_km: args.distal_limit,
        },
        ModelKind::Weibull => FitRequest::Weibull(WeibullSettings {
            runs: args.runs,
            iterations_per_run: args.iterations_per_run,
            lambda_bounds: (args.lambda_lower, args.lambda_upper),
            k_bounds: (args.k_lower, args.k_upper),
            seed: args.seed,
        }),
    };

    let single_output = args.export_json.is_some() || args.export_curve.is_some();
    if single_output && args.files.len() > 1 {
        return Err(AppError::new(
            2,
            "--export-json and --export-curve take a single input file",
        ));
    }
    if args.seed.is_some() && args.model != ModelKind::Weibull {
        warn!("--seed only affects the weibull model");
    }

    Ok(FitConfig {
        inputs: args.files.clone(),
        request,
        json: args.json,
        export_json: args.export_json.clone(),
        export_curve: args.export_curve.clone(),
        curve_points: args.curve_points,
    })
}
