//! Shared pipeline logic behind the subcommands.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! read isopach file -> fit -> report -> optional exports
//!
//! The CLI layer can then focus on presentation.

use std::path::Path;

use tracing::info;

use crate::domain::{FitConfig, SurfaceModel};
use crate::error::AppError;
use crate::fit::{ErrorSurface, error_surface, fit_isopachs};
use crate::io::{read_isopach_file, write_curve_csv, write_json};
use crate::report::FitReport;

/// Fit every input file and write the configured exports.
///
/// Stops at the first file that fails to load or fit.
pub fn run_fit(config: &FitConfig) -> Result<Vec<FitReport>, AppError> {
    let mut reports = Vec::with_capacity(config.inputs.len());

    for path in &config.inputs {
        let file = read_isopach_file(path)?;
        let fit = fit_isopachs(&file.isopachs, &config.request)
            .map_err(|e| AppError::from(e).with_context(&path.display().to_string()))?;

        if let Some(out) = &config.export_curve {
            write_curve_csv(out, &fit, config.curve_points)?;
        }

        let report = FitReport::new(path.display().to_string(), &file.comments, config.request, fit);
        if let Some(out) = &config.export_json {
            write_json(out, &report)?;
        }
        reports.push(report);
    }

    info!(files = reports.len(), model = config.request.kind().display_name(), "fit run finished");
    Ok(reports)
}

/// Load one file and evaluate its error surface.
pub fn run_surface(
    path: &Path,
    model: SurfaceModel,
    x_range: (f64, f64),
    y_range: (f64, f64),
    resolution: usize,
) -> Result<ErrorSurface, AppError> {
    let file = read_isopach_file(path)?;
    Ok(error_surface(&file.isopachs, model, x_range, y_range, resolution)?)
}
