//! Request dispatch: one entry point for every model family.

use serde::Serialize;
use tracing::info;

use crate::domain::{FitRequest, Isopach, ModelKind};
use crate::error::FitError;
use crate::models::{ExponentialFit, PowerLawFit, WeibullFit, fit_exponential, fit_power_law, fit_weibull};

/// The result of fitting any model.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum ModelFit {
    Exponential(ExponentialFit),
    PowerLaw(PowerLawFit),
    Weibull(WeibullFit),
}

impl ModelFit {
    pub fn kind(&self) -> ModelKind {
        match self {
            ModelFit::Exponential(_) => ModelKind::Exponential,
            ModelFit::PowerLaw(_) => ModelKind::PowerLaw,
            ModelFit::Weibull(_) => ModelKind::Weibull,
        }
    }

    pub fn volume_km3(&self) -> f64 {
        match self {
            ModelFit::Exponential(fit) => fit.volume_km3,
            ModelFit::PowerLaw(fit) => fit.volume_km3,
            ModelFit::Weibull(fit) => fit.volume_km3,
        }
    }

    pub fn mrse(&self) -> f64 {
        match self {
            ModelFit::Exponential(fit) => fit.mrse,
            ModelFit::PowerLaw(fit) => fit.mrse,
            ModelFit::Weibull(fit) => fit.mrse,
        }
    }

    pub fn isopachs(&self) -> &[Isopach] {
        match self {
            ModelFit::Exponential(fit) => &fit.isopachs,
            ModelFit::PowerLaw(fit) => &fit.isopachs,
            ModelFit::Weibull(fit) => &fit.isopachs,
        }
    }

    /// Thickness (m) at `x` km of √Area.
    ///
    /// Domain errors come from the exponential limits and the power-law
    /// integration limits; the Weibull curve is defined everywhere.
    pub fn thickness(&self, x: f64) -> Result<f64, FitError> {
        match self {
            ModelFit::Exponential(fit) => fit.thickness(x),
            ModelFit::PowerLaw(fit) => fit.thickness(x),
            ModelFit::Weibull(fit) => Ok(fit.thickness(x)),
        }
    }
}

/// Fit the model named by `request`.
pub fn fit_isopachs(isopachs: &[Isopach], request: &FitRequest) -> Result<ModelFit, FitError> {
    let fit = match *request {
        FitRequest::Exponential { segments } => ModelFit::Exponential(fit_exponential(isopachs, segments)?),
        FitRequest::PowerLaw {
            proximal_limit_km,
            distal_limit_km,
        } => ModelFit::PowerLaw(fit_power_law(isopachs, proximal_limit_km, distal_limit_km)?),
        FitRequest::Weibull(settings) => ModelFit::Weibull(fit_weibull(isopachs, &settings)?),
    };

    info!(
        model = fit.kind().display_name(),
        isopachs = isopachs.len(),
        volume_km3 = fit.volume_km3(),
        mrse = fit.mrse(),
        "fit complete"
    );
    Ok(fit)
}
