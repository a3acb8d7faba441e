//! Piecewise-exponential thinning model.
//!
//! Model: `T(x) = c_i · exp(-m_i · x)` on segment `i`, with `x = √Area` (km).
//!
//! Each segment is a straight line in `(x, ln T)` space, so the fit is a
//! segmented regression of log-thickness against √Area. Volumes follow from
//! integrating `T(x) · 2x dx` segment by segment in closed form.

use std::f64::consts::{LN_2, PI};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{Isopach, MAX_EXPONENTIAL_SEGMENTS, validate_isopachs};
use crate::error::FitError;
use crate::math::{Line, fit_segmented, mean_relative_squared_error};

/// Fitted parameters of one exponential segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExponentialSegment {
    pub coefficient: f64,
    pub exponent: f64,
    /// Distance (km from the vent) over which thickness halves.
    pub half_thickness_km: f64,
    pub volume_km3: f64,
    pub start_km: f64,
    pub end_km: f64,
    /// Regression line in `(√Area, ln T)` space.
    pub line: Line,
}

impl ExponentialSegment {
    pub fn thickness(&self, x: f64) -> f64 {
        self.coefficient * (-self.exponent * x).exp()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExponentialFit {
    pub volume_km3: f64,
    pub segments: Vec<ExponentialSegment>,
    /// `n + 1` limits; `limits[0] = 0`, `limits[n] = +∞` for a fitted result.
    pub limits: Vec<f64>,
    pub isopachs: Vec<Isopach>,
    pub mrse: f64,
}

/// Fit an `segments`-piece exponential model.
pub fn fit_exponential(isopachs: &[Isopach], segments: usize) -> Result<ExponentialFit, FitError> {
    validate_isopachs(isopachs)?;
    if segments == 0 || segments > MAX_EXPONENTIAL_SEGMENTS {
        return Err(FitError::validation(format!(
            "the number of exponential segments must be 1 <= n <= {MAX_EXPONENTIAL_SEGMENTS}, got {segments}"
        )));
    }

    let xs: Vec<f64> = isopachs.iter().map(|i| i.sqrt_area_km).collect();
    let log_ts: Vec<f64> = isopachs.iter().map(|i| i.thickness_m.ln()).collect();

    let seg = fit_segmented(&xs, &log_ts, segments)?;

    let mut limits = seg.boundaries.clone();
    limits[0] = 0.0;
    limits[segments] = f64::INFINITY;

    let coefficients: Vec<f64> = seg.lines.iter().map(|l| l.intercept.exp()).collect();
    let exponents: Vec<f64> = seg.lines.iter().map(|l| -l.slope).collect();

    let mut fit = build(isopachs, &coefficients, &exponents, &limits, &seg.lines);

    // Points that a non-monotone boundary leaves unclaimed are scored with the
    // segment they were regressed in.
    let ts: Vec<f64> = seg.ys.iter().map(|y| y.exp()).collect();
    let predicted: Vec<f64> = seg
        .xs
        .iter()
        .enumerate()
        .map(|(idx, &x)| match fit.thickness(x) {
            Ok(t) => t,
            Err(_) => seg
                .group_of(idx)
                .map(|g| fit.segments[g].thickness(x))
                .unwrap_or(f64::NAN),
        })
        .collect();
    fit.mrse = mean_relative_squared_error(&predicted, &ts, |t| t);

    debug!(
        segments,
        volume_km3 = fit.volume_km3,
        mrse = fit.mrse,
        "exponential fit"
    );
    Ok(fit)
}

impl ExponentialFit {
    /// Rebuild a result from edited segment parameters.
    ///
    /// Limits must be non-negative and non-decreasing, with one more entry than
    /// there are segments.
    pub fn from_segments(
        isopachs: &[Isopach],
        coefficients: &[f64],
        exponents: &[f64],
        limits: &[f64],
    ) -> Result<Self, FitError> {
        let n = coefficients.len();
        if n == 0 || exponents.len() != n || limits.len() != n + 1 {
            return Err(FitError::validation(format!(
                "expected matching coefficients/exponents and {} limits, got {} / {} / {}",
                n + 1,
                n,
                exponents.len(),
                limits.len()
            )));
        }
        if limits[0] < 0.0 || limits.iter().any(|v| v.is_nan()) {
            return Err(FitError::validation("segment limits must be >= 0"));
        }
        if limits.windows(2).any(|w| w[1] < w[0]) {
            return Err(FitError::validation("segment limits must be non-decreasing"));
        }

        let lines: Vec<Line> = coefficients
            .iter()
            .zip(exponents)
            .map(|(c, m)| Line::new(-m, c.ln()))
            .collect();
        let mut fit = build(isopachs, coefficients, exponents, limits, &lines);

        let xs: Vec<f64> = isopachs.iter().map(|i| i.sqrt_area_km).collect();
        let ts: Vec<f64> = isopachs.iter().map(|i| i.thickness_m).collect();
        fit.mrse = mean_relative_squared_error(&xs, &ts, |x| fit.thickness(x).unwrap_or(f64::NAN));
        Ok(fit)
    }

    /// Thickness (m) at `x` km of √Area.
    pub fn thickness(&self, x: f64) -> Result<f64, FitError> {
        self.segments
            .iter()
            .zip(self.limits.windows(2))
            .find(|(_, w)| w[0] <= x && x < w[1])
            .map(|(seg, _)| seg.thickness(x))
            .ok_or_else(|| {
                FitError::domain(format!(
                    "x ({x}) is not in the domain of the function ({} to {})",
                    self.limits[0],
                    self.limits[self.limits.len() - 1]
                ))
            })
    }

    pub fn number_of_segments(&self) -> usize {
        self.segments.len()
    }
}

fn build(
    isopachs: &[Isopach],
    coefficients: &[f64],
    exponents: &[f64],
    limits: &[f64],
    lines: &[Line],
) -> ExponentialFit {
    let segments: Vec<ExponentialSegment> = (0..coefficients.len())
        .map(|i| {
            let (c, m) = (coefficients[i], exponents[i]);
            ExponentialSegment {
                coefficient: c,
                exponent: m,
                half_thickness_km: LN_2 / (m * PI.sqrt()),
                volume_km3: segment_volume(c, m, limits[i], limits[i + 1]),
                start_km: limits[i],
                end_km: limits[i + 1],
                line: lines[i],
            }
        })
        .collect();

    ExponentialFit {
        volume_km3: segments.iter().map(|s| s.volume_km3).sum(),
        segments,
        limits: limits.to_vec(),
        isopachs: isopachs.to_vec(),
        mrse: f64::NAN,
    }
}

/// Volume (km³) of one segment between two √Area limits (km).
pub fn segment_volume(coefficient: f64, exponent: f64, start_km: f64, end_km: f64) -> f64 {
    let scale = (2.0 * coefficient) / (1000.0 * exponent * exponent);
    let inner = (start_km * exponent + 1.0) * (-exponent * start_km).exp();
    let outer = if end_km == f64::INFINITY {
        0.0
    } else {
        (end_km * exponent + 1.0) * (-exponent * end_km).exp()
    };
    scale * (inner - outer)
}
