//! Command-line parsing for the tephra volume calculator.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! fitting code. Defaults mirror the constants in `domain`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{
    DEFAULT_CURVE_POINTS, DEFAULT_DISTAL_LIMIT_KM, DEFAULT_EXPONENTIAL_SEGMENTS, DEFAULT_K_BOUNDS,
    DEFAULT_LAMBDA_BOUNDS, DEFAULT_PROXIMAL_LIMIT_KM, DEFAULT_WEIBULL_ITERATIONS, DEFAULT_WEIBULL_RUNS, ModelKind,
    SurfaceModel,
};
use crate::fit::DEFAULT_SURFACE_RESOLUTION;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "ashcalc", version, about = "Tephra volume estimation from isopach data")]
pub struct Cli {
    /// Enable debug logging (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit a thinning model to one or more isopach files and report the volume.
    Fit(FitArgs),
    /// Evaluate the log-MRSE error surface of a two-parameter model.
    Surface(SurfaceArgs),
    /// Estimate how long a Weibull fit will take on this machine.
    EstimateTime(EstimateTimeArgs),
}

/// Options for `ashcalc fit`.
#[derive(Debug, Args, Clone)]
pub struct FitArgs {
    /// Isopach files: `thickness_m,sqrt_area_km` per line, `#` comments.
    #[arg(required = true, value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Thinning model to fit.
    #[arg(short, long, value_enum, default_value_t = ModelKind::Exponential)]
    pub model: ModelKind,

    /// Number of exponential segments.
    #[arg(long, default_value_t = DEFAULT_EXPONENTIAL_SEGMENTS)]
    pub segments: usize,

    /// Power-law proximal integration limit (km from the vent).
    #[arg(long, default_value_t = DEFAULT_PROXIMAL_LIMIT_KM)]
    pub proximal_limit: f64,

    /// Power-law distal integration limit (km from the vent).
    #[arg(long, default_value_t = DEFAULT_DISTAL_LIMIT_KM)]
    pub distal_limit: f64,

    /// Weibull: number of hill-climbing restarts.
    #[arg(long, default_value_t = DEFAULT_WEIBULL_RUNS)]
    pub runs: usize,

    /// Weibull: iterations per restart.
    #[arg(long, default_value_t = DEFAULT_WEIBULL_ITERATIONS)]
    pub iterations_per_run: usize,

    /// Weibull: lower bound of the lambda search range.
    #[arg(long, default_value_t = DEFAULT_LAMBDA_BOUNDS.0)]
    pub lambda_lower: f64,

    /// Weibull: upper bound of the lambda search range.
    #[arg(long, default_value_t = DEFAULT_LAMBDA_BOUNDS.1)]
    pub lambda_upper: f64,

    /// Weibull: lower bound of the k search range.
    #[arg(long, default_value_t = DEFAULT_K_BOUNDS.0)]
    pub k_lower: f64,

    /// Weibull: upper bound of the k search range.
    #[arg(long, default_value_t = DEFAULT_K_BOUNDS.1)]
    pub k_upper: f64,

    /// Weibull: fixed random seed for reproducible fits.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Print the report as JSON instead of text.
    #[arg(long)]
    pub json: bool,

    /// Write the JSON report to a file (single input file only).
    #[arg(long, value_name = "PATH")]
    pub export_json: Option<PathBuf>,

    /// Write the sampled fitted curve to CSV (single input file only).
    #[arg(long, value_name = "PATH")]
    pub export_curve: Option<PathBuf>,

    /// Number of samples in the curve export.
    #[arg(long, default_value_t = DEFAULT_CURVE_POINTS)]
    pub curve_points: usize,
}

/// Options for `ashcalc surface`.
#[derive(Debug, Args, Clone)]
pub struct SurfaceArgs {
    /// Isopach file.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Model whose parameters span the surface: power-law (c, m) or weibull (lambda, k).
    #[arg(short, long, value_enum)]
    pub model: SurfaceModel,

    #[arg(long, allow_negative_numbers = true)]
    pub x_min: f64,

    #[arg(long, allow_negative_numbers = true)]
    pub x_max: f64,

    #[arg(long, allow_negative_numbers = true)]
    pub y_min: f64,

    #[arg(long, allow_negative_numbers = true)]
    pub y_max: f64,

    /// Grid points per axis (5..=100).
    #[arg(long, default_value_t = DEFAULT_SURFACE_RESOLUTION)]
    pub resolution: usize,

    /// Write the surface as JSON here instead of stdout.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// Options for `ashcalc estimate-time`.
#[derive(Debug, Args, Clone)]
pub struct EstimateTimeArgs {
    /// Number of isopachs in the deposit.
    #[arg(long)]
    pub isopachs: usize,

    #[arg(long, default_value_t = DEFAULT_WEIBULL_RUNS)]
    pub runs: usize,

    #[arg(long, default_value_t = DEFAULT_WEIBULL_ITERATIONS)]
    pub iterations_per_run: usize,
}
