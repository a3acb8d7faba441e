//! Error surfaces for the two-parameter models.
//!
//! The surface is `ln(mrse)` evaluated on a square grid over a user-chosen
//! parameter box. Rows are evaluated in parallel.

use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::domain::{Isopach, SurfaceModel, validate_isopachs};
use crate::error::FitError;
use crate::math::mean_relative_squared_error;
use crate::models::{calculate_theta, weibull_thickness};

pub const DEFAULT_SURFACE_RESOLUTION: usize = 50;
pub const MIN_SURFACE_RESOLUTION: usize = 5;
pub const MAX_SURFACE_RESOLUTION: usize = 100;

#[derive(Debug, Clone, Serialize)]
pub struct ErrorSurface {
    pub model: SurfaceModel,
    pub x_name: String,
    pub y_name: String,
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
    /// `errors[j][i]` is the error at `(xs[i], ys[j])`.
    ///
    /// Undefined cells are `NaN` (serialised as `null`).
    pub errors: Vec<Vec<f64>>,
}

impl ErrorSurface {
    /// Lowest defined cell, as `(x, y, error)`. An exact fit (`-∞`) wins.
    pub fn minimum(&self) -> Option<(f64, f64, f64)> {
        let mut best: Option<(f64, f64, f64)> = None;
        for (j, row) in self.errors.iter().enumerate() {
            for (i, &e) in row.iter().enumerate() {
                if !e.is_nan() && best.is_none_or(|(_, _, b)| e < b) {
                    best = Some((self.xs[i], self.ys[j], e));
                }
            }
        }
        best
    }
}

/// Evaluate `ln(mrse)` for `model` over `x_range × y_range`.
pub fn error_surface(
    isopachs: &[Isopach],
    model: SurfaceModel,
    x_range: (f64, f64),
    y_range: (f64, f64),
    resolution: usize,
) -> Result<ErrorSurface, FitError> {
    validate_isopachs(isopachs)?;
    if !(MIN_SURFACE_RESOLUTION..=MAX_SURFACE_RESOLUTION).contains(&resolution) {
        return Err(FitError::validation(format!(
            "resolution must be between {MIN_SURFACE_RESOLUTION} and {MAX_SURFACE_RESOLUTION}, got {resolution}"
        )));
    }
    let (x_name, y_name) = model.axis_names();
    check_range(x_name, x_range)?;
    check_range(y_name, y_range)?;

    let sqrt_areas: Vec<f64> = isopachs.iter().map(|i| i.sqrt_area_km).collect();
    let thicknesses: Vec<f64> = isopachs.iter().map(|i| i.thickness_m).collect();

    let xs = linspace(x_range, resolution);
    let ys = linspace(y_range, resolution);

    let errors: Vec<Vec<f64>> = ys
        .par_iter()
        .map(|&y| {
            xs.iter()
                .map(|&x| cell_error(model, &sqrt_areas, &thicknesses, x, y))
                .collect()
        })
        .collect();

    debug!(?model, resolution, "error surface evaluated");
    Ok(ErrorSurface {
        model,
        x_name: x_name.to_string(),
        y_name: y_name.to_string(),
        xs,
        ys,
        errors,
    })
}

fn cell_error(model: SurfaceModel, sqrt_areas: &[f64], thicknesses: &[f64], x: f64, y: f64) -> f64 {
    let mrse = match model {
        SurfaceModel::PowerLaw => {
            let (c, m) = (x, y);
            mean_relative_squared_error(sqrt_areas, thicknesses, |a| c * a.powf(-m))
        }
        SurfaceModel::Weibull => {
            let (lambda, k) = (x, y);
            let theta = calculate_theta(sqrt_areas, thicknesses, lambda, k);
            mean_relative_squared_error(sqrt_areas, thicknesses, |a| weibull_thickness(theta, lambda, k, a))
        }
    };
    mrse.ln()
}

fn check_range(name: &str, (lo, hi): (f64, f64)) -> Result<(), FitError> {
    if !(lo.is_finite() && hi.is_finite()) || lo >= hi {
        return Err(FitError::validation(format!(
            "range for {name} must be finite with min < max, got [{lo}, {hi}]"
        )));
    }
    Ok(())
}

fn linspace((lo, hi): (f64, f64), n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| lo + (hi - lo) * i as f64 / (n - 1) as f64)
        .collect()
}
