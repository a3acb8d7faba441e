//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting
//! - exported to JSON reports
//! - rebuilt from CLI flags with sensible defaults

use std::f64::consts::PI;
use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::FitError;

/// Default number of exponential segments.
pub const DEFAULT_EXPONENTIAL_SEGMENTS: usize = 2;
/// Largest number of exponential segments accepted by [`crate::models::fit_exponential`].
pub const MAX_EXPONENTIAL_SEGMENTS: usize = 5;

/// Default power-law integration limits (km from the vent).
pub const DEFAULT_PROXIMAL_LIMIT_KM: f64 = 1.0;
pub const DEFAULT_DISTAL_LIMIT_KM: f64 = 300.0;

pub const DEFAULT_WEIBULL_RUNS: usize = 20;
pub const DEFAULT_WEIBULL_ITERATIONS: usize = 1000;
pub const DEFAULT_LAMBDA_BOUNDS: (f64, f64) = (0.0, 1000.0);
pub const DEFAULT_K_BOUNDS: (f64, f64) = (0.0, 2.0);

/// Number of samples written by the curve export.
pub const DEFAULT_CURVE_POINTS: usize = 100;

/// A single field measurement: deposit thickness enclosed by an area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Isopach {
    pub thickness_m: f64,
    pub sqrt_area_km: f64,
}

impl Isopach {
    pub fn new(thickness_m: f64, sqrt_area_km: f64) -> Self {
        Self {
            thickness_m,
            sqrt_area_km,
        }
    }

    /// Radius of the circle with the same area as the isopach.
    pub fn distance_from_vent_km(&self) -> f64 {
        self.sqrt_area_km / PI.sqrt()
    }
}

/// Check a deposit before any regression is attempted.
///
/// Requires at least two isopachs, strictly positive finite values, and
/// pairwise distinct thicknesses.
pub fn validate_isopachs(isopachs: &[Isopach]) -> Result<(), FitError> {
    if isopachs.len() < 2 {
        return Err(FitError::validation(format!(
            "at least 2 isopachs are required, got {}",
            isopachs.len()
        )));
    }

    for (i, iso) in isopachs.iter().enumerate() {
        if !(iso.thickness_m.is_finite() && iso.thickness_m > 0.0) {
            return Err(FitError::validation(format!(
                "isopach {} has invalid thickness {} (must be finite and > 0)",
                i + 1,
                iso.thickness_m
            )));
        }
        if !(iso.sqrt_area_km.is_finite() && iso.sqrt_area_km > 0.0) {
            return Err(FitError::validation(format!(
                "isopach {} has invalid sqrt(area) {} (must be finite and > 0)",
                i + 1,
                iso.sqrt_area_km
            )));
        }
    }

    let mut thicknesses: Vec<f64> = isopachs.iter().map(|i| i.thickness_m).collect();
    thicknesses.sort_by(|a, b| a.total_cmp(b));
    if let Some(pair) = thicknesses.windows(2).find(|w| w[0] == w[1]) {
        return Err(FitError::validation(format!(
            "isopachs must all have unique thicknesses ({} m appears more than once)",
            pair[0]
        )));
    }

    Ok(())
}

/// Thinning model families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    Exponential,
    PowerLaw,
    Weibull,
}

impl ModelKind {
    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            ModelKind::Exponential => "Exponential",
            ModelKind::PowerLaw => "Power Law",
            ModelKind::Weibull => "Weibull",
        }
    }
}

/// Models with a two-parameter error surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceModel {
    /// Axes `(c, m)`.
    PowerLaw,
    /// Axes `(lambda, k)`.
    Weibull,
}

impl SurfaceModel {
    pub fn axis_names(self) -> (&'static str, &'static str) {
        match self {
            SurfaceModel::PowerLaw => ("c", "m"),
            SurfaceModel::Weibull => ("lambda", "k"),
        }
    }
}

/// Search settings for the Weibull hill-climb.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeibullSettings {
    pub runs: usize,
    pub iterations_per_run: usize,
    pub lambda_bounds: (f64, f64),
    pub k_bounds: (f64, f64),
    /// Fixed seed for reproducible searches. `None` draws from entropy.
    pub seed: Option<u64>,
}

impl Default for WeibullSettings {
    fn default() -> Self {
        Self {
            runs: DEFAULT_WEIBULL_RUNS,
            iterations_per_run: DEFAULT_WEIBULL_ITERATIONS,
            lambda_bounds: DEFAULT_LAMBDA_BOUNDS,
            k_bounds: DEFAULT_K_BOUNDS,
            seed: None,
        }
    }
}

/// A request to fit one model, with that model's parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum FitRequest {
    Exponential {
        segments: usize,
    },
    PowerLaw {
        proximal_limit_km: f64,
        distal_limit_km: f64,
    },
    Weibull(WeibullSettings),
}

impl FitRequest {
    pub fn kind(&self) -> ModelKind {
        match self {
            FitRequest::Exponential { .. } => ModelKind::Exponential,
            FitRequest::PowerLaw { .. } => ModelKind::PowerLaw,
            FitRequest::Weibull(_) => ModelKind::Weibull,
        }
    }

    /// Default request for a model kind.
    pub fn default_for(kind: ModelKind) -> Self {
        match kind {
            ModelKind::Exponential => FitRequest::Exponential {
                segments: DEFAULT_EXPONENTIAL_SEGMENTS,
            },
            ModelKind::PowerLaw => FitRequest::PowerLaw {
                proximal_limit_km: DEFAULT_PROXIMAL_LIMIT_KM,
                distal_limit_km: DEFAULT_DISTAL_LIMIT_KM,
            },
            ModelKind::Weibull => FitRequest::Weibull(WeibullSettings::default()),
        }
    }

    /// Multi-line settings description used in text reports.
    pub fn settings_text(&self) -> String {
        match self {
            FitRequest::Exponential { segments } => {
                format!("Model: Exponential\nNumber of segments: {segments}")
            }
            FitRequest::PowerLaw {
                proximal_limit_km,
                distal_limit_km,
            } => format!(
                "Model: Power Law\nProximal limit: {proximal_limit_km}\nDistal limit: {distal_limit_km}"
            ),
            FitRequest::Weibull(s) => format!(
                "Model: Weibull\nNumber of runs: {}\nIterations per run: {}\nLambda bounds: {}, {}\nk bounds: {}, {}",
                s.runs,
                s.iterations_per_run,
                s.lambda_bounds.0,
                s.lambda_bounds.1,
                s.k_bounds.0,
                s.k_bounds.1
            ),
        }
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct FitConfig {
    pub inputs: Vec<PathBuf>,
    pub request: FitRequest,

    /// Print the report as JSON instead of text.
    pub json: bool,
    pub export_json: Option<PathBuf>,
    pub export_curve: Option<PathBuf>,
    pub curve_points: usize,
}
