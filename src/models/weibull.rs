//! Weibull thinning model.
//!
//! Model: `T(x) = θ · (x/λ)^(k-2) · exp(-(x/λ)^k)`, with `x = √Area` (km).
//!
//! For fixed `(λ, k)` the best `θ` has a closed form, so only `(λ, k)` are
//! searched (by hill-climbing, see [`crate::fit::hill_climb`]). The volume
//! integral over `[0, ∞)` is closed form as well: `0.001 · 2θλ²/k` km³.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{Isopach, WeibullSettings, validate_isopachs};
use crate::error::FitError;
use crate::fit::hill_climb::{SearchSettings, search};
use crate::math::mean_relative_squared_error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeibullFit {
    pub volume_km3: f64,
    pub lambda: f64,
    pub k: f64,
    pub theta: f64,
    /// Score of `(λ, k)`; lower is better. Diagnostic only.
    pub best_score: f64,
    pub lambda_bounds: (f64, f64),
    pub k_bounds: (f64, f64),
    pub isopachs: Vec<Isopach>,
    pub mrse: f64,
}

/// Fit using `settings.seed`, or an entropy-seeded generator when unset.
pub fn fit_weibull(isopachs: &[Isopach], settings: &WeibullSettings) -> Result<WeibullFit, FitError> {
    let mut rng = match settings.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    fit_weibull_with_rng(isopachs, settings, &mut rng)
}

/// Fit with a caller-supplied random generator.
pub fn fit_weibull_with_rng<R: Rng + ?Sized>(
    isopachs: &[Isopach],
    settings: &WeibullSettings,
    rng: &mut R,
) -> Result<WeibullFit, FitError> {
    let search_settings = SearchSettings {
        runs: settings.runs,
        iterations_per_run: settings.iterations_per_run,
        x_bounds: settings.lambda_bounds,
        y_bounds: settings.k_bounds,
    };
    search_settings.validate()?;
    validate_isopachs(isopachs)?;

    let xs: Vec<f64> = isopachs.iter().map(|i| i.sqrt_area_km).collect();
    let ts: Vec<f64> = isopachs.iter().map(|i| i.thickness_m).collect();

    let best = search(|lambda, k| score(&xs, &ts, lambda, k), &search_settings, rng)?;
    let theta = calculate_theta(&xs, &ts, best.x, best.y);

    let mut fit = WeibullFit::build(isopachs, best.x, best.y, theta, settings);
    fit.best_score = best.score;
    debug!(
        lambda = fit.lambda,
        k = fit.k,
        theta = fit.theta,
        score = fit.best_score,
        "weibull fit"
    );
    Ok(fit)
}

impl WeibullFit {
    fn build(isopachs: &[Isopach], lambda: f64, k: f64, theta: f64, settings: &WeibullSettings) -> Self {
        let xs: Vec<f64> = isopachs.iter().map(|i| i.sqrt_area_km).collect();
        let ts: Vec<f64> = isopachs.iter().map(|i| i.thickness_m).collect();
        let mrse = mean_relative_squared_error(&xs, &ts, |x| weibull_thickness(theta, lambda, k, x));

        Self {
            volume_km3: weibull_volume(lambda, k, theta),
            lambda,
            k,
            theta,
            best_score: mrse.ln() + mrse,
            lambda_bounds: settings.lambda_bounds,
            k_bounds: settings.k_bounds,
            isopachs: isopachs.to_vec(),
            mrse,
        }
    }

    /// Rebuild the result with edited parameters.
    pub fn with_parameters(&self, lambda: f64, k: f64, theta: f64) -> Result<Self, FitError> {
        if ![lambda, k, theta].iter().all(|v| v.is_finite()) || lambda <= 0.0 || k == 0.0 {
            return Err(FitError::validation(format!(
                "invalid Weibull parameters lambda={lambda}, k={k}, theta={theta}"
            )));
        }
        let settings = WeibullSettings {
            lambda_bounds: self.lambda_bounds,
            k_bounds: self.k_bounds,
            ..WeibullSettings::default()
        };
        Ok(Self::build(&self.isopachs, lambda, k, theta, &settings))
    }

    /// Thickness (m) at `x` km of √Area. Never fails; see [`weibull_thickness`].
    pub fn thickness(&self, x: f64) -> f64 {
        weibull_thickness(self.theta, self.lambda, self.k, x)
    }
}

/// `θ (x/λ)^(k-2) exp(-(x/λ)^k)`, evaluated in log form.
///
/// Overflow or an undefined result maps to `0`: far-field thickness tends to zero.
pub fn weibull_thickness(theta: f64, lambda: f64, k: f64, x: f64) -> f64 {
    let r = x / lambda;
    let t = (theta.ln() + (k - 2.0) * r.ln() - r.powf(k)).exp();
    if t.is_finite() { t } else { 0.0 }
}

/// Least-squares optimal `θ` for fixed `(λ, k)` under relative error.
///
/// With `q_i = (x_i/λ)^(k-2) exp(-(x_i/λ)^k) / t_i`, this is `Σq / Σq²`.
/// Returns `0` when `λ == 0` and `1` when either sum vanishes.
pub fn calculate_theta(xs: &[f64], ts: &[f64], lambda: f64, k: f64) -> f64 {
    if lambda == 0.0 {
        return 0.0;
    }
    let (top, bottom) = xs
        .iter()
        .zip(ts.iter())
        .map(|(&x, &t)| {
            let r = x / lambda;
            (-t.ln() + (k - 2.0) * r.ln() - r.powf(k)).exp()
        })
        .fold((0.0, 0.0), |(top, bottom), q| (top + q, bottom + q * q));

    if top != 0.0 && bottom != 0.0 { top / bottom } else { 1.0 }
}

/// Search objective for `(λ, k)`: `ln(mrse) + mrse`.
///
/// `NaN` becomes `+∞` so undefined corners of the box never win.
pub fn score(xs: &[f64], ts: &[f64], lambda: f64, k: f64) -> f64 {
    let theta = calculate_theta(xs, ts, lambda, k);
    let mrse = mean_relative_squared_error(xs, ts, |x| weibull_thickness(theta, lambda, k, x));
    let s = mrse.ln() + mrse;
    if s.is_nan() { f64::INFINITY } else { s }
}

/// Total deposit volume (km³).
pub fn weibull_volume(lambda: f64, k: f64, theta: f64) -> f64 {
    0.001 * 2.0 * theta * lambda * lambda / k
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const LAMBDA: f64 = 50.0;
    const K: f64 = 1.2;
    const THETA: f64 = 2.0;

    fn synthetic() -> (Vec<f64>, Vec<f64>, Vec<Isopach>) {
        let xs = vec![10.0, 20.0, 40.0, 60.0, 90.0, 130.0, 180.0];
        let ts: Vec<f64> = xs.iter().map(|&x| weibull_thickness(THETA, LAMBDA, K, x)).collect();
        let isopachs = xs.iter().zip(&ts).map(|(&x, &t)| Isopach::new(t, x)).collect();
        (xs, ts, isopachs)
    }

    fn settings() -> WeibullSettings {
        WeibullSettings {
            runs: 5,
            iterations_per_run: 500,
            lambda_bounds: (1.0, 200.0),
            k_bounds: (0.5, 2.0),
            seed: Some(11),
        }
    }

    #[test]
    fn theta_is_zero_when_lambda_is_zero() {
        let (xs, ts, _) = synthetic();
        assert_eq!(calculate_theta(&xs, &ts, 0.0, 1.5), 0.0);
    }

    #[test]
    fn theta_is_exact_at_true_shape() {
        let (xs, ts, _) = synthetic();
        assert_relative_eq!(calculate_theta(&xs, &ts, LAMBDA, K), THETA, max_relative = 1e-10);
    }

    #[test]
    fn theta_defaults_to_one_when_sums_vanish() {
        // (x/λ)^k overflows the exponent, every q underflows to 0.
        assert_eq!(calculate_theta(&[1.0e6], &[1.0], 1.0, 2.0), 1.0);
    }

    #[test]
    fn thickness_maps_overflow_to_zero() {
        assert_eq!(weibull_thickness(1.0, 1.0, 1.5, f64::INFINITY), 0.0);
        assert_eq!(weibull_thickness(1.0, 0.0, 1.5, 1.0), 0.0);
        assert_eq!(weibull_thickness(-1.0, 10.0, 1.5, 1.0), 0.0);
        assert!(weibull_thickness(THETA, LAMBDA, K, 25.0) > 0.0);
    }

    #[test]
    fn search_recovers_synthetic_deposit() {
        let (_, _, isopachs) = synthetic();
        let fit = fit_weibull(&isopachs, &settings()).unwrap();

        let expected = weibull_volume(LAMBDA, K, THETA);
        assert_relative_eq!(fit.volume_km3, expected, max_relative = 0.05);
        assert!(fit.best_score < -5.0, "score {}", fit.best_score);
        assert!(fit.mrse < 1e-2);
        assert!((1.0..=200.0).contains(&fit.lambda));
        assert!((0.5..=2.0).contains(&fit.k));
    }

    #[test]
    fn seeded_search_is_reproducible() {
        let (_, _, isopachs) = synthetic();
        let a = fit_weibull(&isopachs, &settings()).unwrap();
        let b = fit_weibull(&isopachs, &settings()).unwrap();
        assert_eq!(a.lambda, b.lambda);
        assert_eq!(a.k, b.k);
        assert_eq!(a.best_score, b.best_score);
    }

    #[test]
    fn injected_rng_is_used() {
        let (_, _, isopachs) = synthetic();
        let s = settings();
        let a = fit_weibull_with_rng(&isopachs, &s, &mut StdRng::seed_from_u64(5)).unwrap();
        let b = fit_weibull_with_rng(&isopachs, &s, &mut StdRng::seed_from_u64(5)).unwrap();
        assert_eq!(a.lambda, b.lambda);
        assert_eq!(a.theta, b.theta);
    }

    #[test]
    fn validation_errors() {
        let (_, _, isopachs) = synthetic();
        let mut s = settings();
        s.runs = 0;
        assert!(fit_weibull(&isopachs, &s).unwrap_err().is_validation());

        let mut s = settings();
        s.iterations_per_run = 0;
        assert!(fit_weibull(&isopachs, &s).unwrap_err().is_validation());

        let mut s = settings();
        s.lambda_bounds = (100.0, 10.0);
        assert!(fit_weibull(&isopachs, &s).unwrap_err().is_validation());

        let dupes = vec![Isopach::new(1.0, 10.0), Isopach::new(1.0, 20.0)];
        assert!(fit_weibull(&dupes, &settings()).unwrap_err().is_validation());
    }

    #[test]
    fn volume_closed_form() {
        assert_relative_eq!(weibull_volume(100.0, 2.0, 1.0), 10.0, max_relative = 1e-12);
    }

    #[test]
    fn edited_parameters() {
        let (_, _, isopachs) = synthetic();
        let fit = fit_weibull(&isopachs, &settings()).unwrap();
        let exact = fit.with_parameters(LAMBDA, K, THETA).unwrap();
        assert!(exact.mrse < 1e-20);
        assert_relative_eq!(exact.volume_km3, weibull_volume(LAMBDA, K, THETA));
        assert!(fit.with_parameters(0.0, K, THETA).is_err());
    }
}
