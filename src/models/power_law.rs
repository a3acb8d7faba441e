//! Power-law thinning model.
//!
//! Model: `T(x) = c · x^(-m)`, with `x = √Area` (km).
//!
//! The fit is a single regression in log-log space. The integral of
//! `T(x) · 2x dx` diverges at both ends for most exponents, so the volume is
//! taken between user-chosen proximal and distal limits. Limits are given as
//! distances from the vent (km) and converted to √Area (`× √π`) internally.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{Isopach, validate_isopachs};
use crate::error::FitError;
use crate::math::{Line, fit_line, mean_relative_squared_error};
use crate::models::exponential::fit_exponential;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerLawFit {
    pub volume_km3: f64,
    pub coefficient: f64,
    pub exponent: f64,
    /// Regression line in `(ln √Area, ln T)` space.
    pub line: Line,
    pub proximal_limit_km: f64,
    pub distal_limit_km: f64,
    /// Bonadonna & Houghton (2005) proximal limit (km from the vent).
    ///
    /// `None` when the two-segment exponential reference cannot be fitted.
    pub suggested_proximal_limit_km: Option<f64>,
    pub isopachs: Vec<Isopach>,
    pub mrse: f64,
}

/// Fit a power law and integrate it between the given vent distances (km).
pub fn fit_power_law(
    isopachs: &[Isopach],
    proximal_limit_km: f64,
    distal_limit_km: f64,
) -> Result<PowerLawFit, FitError> {
    validate_limits(proximal_limit_km, distal_limit_km)?;
    validate_isopachs(isopachs)?;

    let log_xs: Vec<f64> = isopachs.iter().map(|i| i.sqrt_area_km.ln()).collect();
    let log_ts: Vec<f64> = isopachs.iter().map(|i| i.thickness_m.ln()).collect();

    let line = fit_line(&log_xs, &log_ts).ok_or_else(|| {
        FitError::validation("power law regression needs at least 2 distinct sqrt(area) values")
    })?;

    let fit = PowerLawFit::build(
        isopachs,
        line.intercept.exp(),
        -line.slope,
        line,
        proximal_limit_km,
        distal_limit_km,
    );
    debug!(
        coefficient = fit.coefficient,
        exponent = fit.exponent,
        volume_km3 = fit.volume_km3,
        "power law fit"
    );
    Ok(fit)
}

impl PowerLawFit {
    fn build(
        isopachs: &[Isopach],
        coefficient: f64,
        exponent: f64,
        line: Line,
        proximal_limit_km: f64,
        distal_limit_km: f64,
    ) -> Self {
        let root_pi = PI.sqrt();
        let volume_km3 = power_law_volume(
            coefficient,
            exponent,
            proximal_limit_km * root_pi,
            distal_limit_km * root_pi,
        );

        let xs: Vec<f64> = isopachs.iter().map(|i| i.sqrt_area_km).collect();
        let ts: Vec<f64> = isopachs.iter().map(|i| i.thickness_m).collect();
        let mrse = mean_relative_squared_error(&xs, &ts, |x| coefficient * x.powf(-exponent));

        Self {
            volume_km3,
            coefficient,
            exponent,
            line,
            proximal_limit_km,
            distal_limit_km,
            suggested_proximal_limit_km: suggested_proximal_limit(isopachs, coefficient, exponent),
            isopachs: isopachs.to_vec(),
            mrse,
        }
    }

    /// Rebuild the result with edited parameters, keeping the data and limits.
    pub fn with_parameters(&self, coefficient: f64, exponent: f64) -> Result<Self, FitError> {
        if !(coefficient.is_finite() && coefficient > 0.0 && exponent.is_finite()) {
            return Err(FitError::validation(format!(
                "invalid power law parameters c={coefficient}, m={exponent}"
            )));
        }
        Ok(Self::build(
            &self.isopachs,
            coefficient,
            exponent,
            Line::new(-exponent, coefficient.ln()),
            self.proximal_limit_km,
            self.distal_limit_km,
        ))
    }

    pub fn proximal_limit_sqrt_area_km(&self) -> f64 {
        self.proximal_limit_km * PI.sqrt()
    }

    pub fn distal_limit_sqrt_area_km(&self) -> f64 {
        self.distal_limit_km * PI.sqrt()
    }

    /// Thickness (m) at `x` km of √Area, inside the integration limits only.
    pub fn thickness(&self, x: f64) -> Result<f64, FitError> {
        let (lo, hi) = (self.proximal_limit_sqrt_area_km(), self.distal_limit_sqrt_area_km());
        if lo <= x && x <= hi {
            Ok(self.coefficient * x.powf(-self.exponent))
        } else {
            Err(FitError::domain(format!(
                "x ({x}) is out of range of proximal and distal limits of integration ({lo} to {hi})"
            )))
        }
    }
}

fn validate_limits(proximal_limit_km: f64, distal_limit_km: f64) -> Result<(), FitError> {
    if proximal_limit_km.is_nan() || distal_limit_km.is_nan() {
        return Err(FitError::validation("limits of integration must be numbers"));
    }
    if proximal_limit_km < 0.0 || distal_limit_km < 0.0 {
        return Err(FitError::validation("distance limits must be greater than 0"));
    }
    if proximal_limit_km >= distal_limit_km {
        return Err(FitError::validation(format!(
            "the distal limit ({distal_limit_km}) must be greater than the proximal limit ({proximal_limit_km})"
        )));
    }
    Ok(())
}

/// Volume (km³) between two √Area limits (km).
pub fn power_law_volume(coefficient: f64, exponent: f64, proximal: f64, distal: f64) -> f64 {
    let p = 2.0 - exponent;
    if p == 0.0 {
        return 0.001 * 2.0 * coefficient * (distal / proximal).ln();
    }
    0.001 * 2.0 * coefficient * (distal.powf(p) - proximal.powf(p)) / p
}

/// Proximal integration limit suggested by Bonadonna & Houghton (2005).
///
/// The power law is matched against the proximal segment of a two-segment
/// exponential fit of the same data. Returned in km from the vent.
pub fn suggested_proximal_limit(isopachs: &[Isopach], coefficient: f64, exponent: f64) -> Option<f64> {
    match fit_exponential(isopachs, 2) {
        Ok(reference) => {
            let c1 = reference.segments[0].coefficient;
            let limit = (c1 / coefficient).powf(-1.0 / exponent) / PI.sqrt();
            limit.is_finite().then_some(limit)
        }
        Err(err) => {
            debug!(%err, "no two-segment exponential reference for the proximal limit");
            None
        }
    }
}
