//! Fitted-curve export.
//!
//! The curve is sampled on an even √Area grid and written as CSV with columns
//! `sqrt_area_km,distance_km,thickness_m`, ready for external plotting.

use std::f64::consts::PI;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::error::AppError;
use crate::fit::ModelFit;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurvePoint {
    pub sqrt_area_km: f64,
    pub distance_km: f64,
    pub thickness_m: f64,
}

/// Sample `points` values of the fitted thickness function.
///
/// The grid spans the data's √Area range, or the integration limits for a
/// power law. Grid points outside the function's domain are skipped.
pub fn sample_curve(fit: &ModelFit, points: usize) -> Vec<CurvePoint> {
    let (lo, hi) = match fit {
        ModelFit::PowerLaw(p) => (p.proximal_limit_sqrt_area_km(), p.distal_limit_sqrt_area_km()),
        _ => data_range(fit),
    };
    let n = points.max(2);

    (0..n)
        .filter_map(|i| {
            let x = lo + (hi - lo) * i as f64 / (n - 1) as f64;
            fit.thickness(x).ok().map(|t| CurvePoint {
                sqrt_area_km: x,
                distance_km: x / PI.sqrt(),
                thickness_m: t,
            })
        })
        .collect()
}

fn data_range(fit: &ModelFit) -> (f64, f64) {
    fit.isopachs()
        .iter()
        .map(|i| i.sqrt_area_km)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| (lo.min(x), hi.max(x)))
}

/// Write the sampled curve to CSV.
pub fn write_curve_csv(path: &Path, fit: &ModelFit, points: usize) -> Result<(), AppError> {
    let curve = sample_curve(fit, points);

    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create curve CSV '{}': {e}", path.display())))?;
    for point in &curve {
        writer
            .serialize(point)
            .map_err(|e| AppError::new(2, format!("Failed to write curve CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush curve CSV '{}': {e}", path.display())))?;

    info!(file = %path.display(), points = curve.len(), "wrote curve CSV");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FitRequest, Isopach};
    use crate::fit::fit_isopachs;

    fn sample_isopachs() -> Vec<Isopach> {
        vec![
            Isopach::new(0.4, 16.25),
            Isopach::new(0.2, 30.63),
            Isopach::new(0.1, 58.87),
            Isopach::new(0.05, 95.75),
            Isopach::new(0.02, 181.56),
            Isopach::new(0.01, 275.1),
        ]
    }

    #[test]
    fn exponential_curve_spans_the_data() {
        let fit = fit_isopachs(&sample_isopachs(), &FitRequest::Exponential { segments: 2 }).unwrap();
        let curve = sample_curve(&fit, 100);
        assert_eq!(curve.len(), 100);
        assert_eq!(curve[0].sqrt_area_km, 16.25);
        assert!((curve[99].sqrt_area_km - 275.1).abs() < 1e-9);
        assert!(curve.windows(2).all(|w| w[1].thickness_m < w[0].thickness_m));
    }

    #[test]
    fn power_law_curve_spans_the_limits() {
        let fit = fit_isopachs(
            &sample_isopachs(),
            &FitRequest::PowerLaw {
                proximal_limit_km: 1.0,
                distal_limit_km: 300.0,
            },
        )
        .unwrap();
        let curve = sample_curve(&fit, 50);
        assert_eq!(curve.len(), 50);
        assert!((curve[0].distance_km - 1.0).abs() < 1e-9);
        assert!((curve[49].distance_km - 300.0).abs() < 1e-6);
    }

    #[test]
    fn writes_csv_with_header() {
        let fit = fit_isopachs(&sample_isopachs(), &FitRequest::Exponential { segments: 1 }).unwrap();
        let path = std::env::temp_dir().join(format!("ashcalc-curve-{}.csv", std::process::id()));
        write_curve_csv(&path, &fit, 10).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();

        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("sqrt_area_km,distance_km,thickness_m"));
        assert_eq!(lines.count(), 10);
    }
}
