//! Rough run-time estimate for the Weibull search.
//!
//! Search cost grows linearly in isopachs × iterations × runs. The unit cost
//! is measured once by timing a small search on 2 and on 100 synthetic
//! isopachs; the difference removes the fixed per-call overhead.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::domain::{Isopach, WeibullSettings};
use crate::error::FitError;
use crate::models::fit_weibull;

const CALIBRATION_ISOPACHS: usize = 100;
const CALIBRATION_RUNS: usize = 5;
const CALIBRATION_ITERATIONS: usize = 100;
const CALIBRATION_REPEATS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeibullTimer {
    /// Seconds per isopach per iteration per run.
    unit_cost_secs: f64,
}

impl WeibullTimer {
    pub fn from_unit_cost(unit_cost_secs: f64) -> Self {
        Self {
            unit_cost_secs: unit_cost_secs.max(0.0),
        }
    }

    /// Measure the unit cost on this machine. Takes a fraction of a second.
    pub fn calibrate() -> Result<Self, FitError> {
        let isopachs: Vec<Isopach> = (0..CALIBRATION_ISOPACHS)
            .map(|i| Isopach::new((i + 1) as f64, (i + 1) as f64))
            .collect();
        let settings = WeibullSettings {
            runs: CALIBRATION_RUNS,
            iterations_per_run: CALIBRATION_ITERATIONS,
            lambda_bounds: (0.0, 1000.0),
            k_bounds: (0.0, 10.0),
            seed: Some(0),
        };

        let small = time_fit(&isopachs[..2], &settings)?;
        let large = time_fit(&isopachs, &settings)?;

        let extra = large.saturating_sub(small).as_secs_f64();
        let work = ((CALIBRATION_ISOPACHS - 2) * CALIBRATION_RUNS * CALIBRATION_ITERATIONS) as f64;
        let timer = Self::from_unit_cost(extra / work);
        debug!(?small, ?large, unit_cost_secs = timer.unit_cost_secs, "weibull timer calibrated");
        Ok(timer)
    }

    pub fn unit_cost_secs(&self) -> f64 {
        self.unit_cost_secs
    }

    pub fn estimate(&self, isopachs: usize, runs: usize, iterations_per_run: usize) -> Duration {
        let work = isopachs as f64 * runs as f64 * iterations_per_run as f64;
        Duration::try_from_secs_f64(self.unit_cost_secs * work).unwrap_or(Duration::MAX)
    }
}

fn time_fit(isopachs: &[Isopach], settings: &WeibullSettings) -> Result<Duration, FitError> {
    let start = Instant::now();
    for _ in 0..CALIBRATION_REPEATS {
        fit_weibull(isopachs, settings)?;
    }
    Ok(start.elapsed() / CALIBRATION_REPEATS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimate_scales_linearly() {
        let timer = WeibullTimer::from_unit_cost(1e-6);
        assert!((timer.estimate(10, 20, 1000).as_secs_f64() - 0.2).abs() < 1e-9);
        assert_eq!(timer.estimate(0, 20, 1000), Duration::ZERO);
        let one = timer.estimate(5, 1, 100).as_secs_f64();
        let four = timer.estimate(5, 2, 200).as_secs_f64();
        assert!((four - 4.0 * one).abs() < 1e-12);
    }

    #[test]
    fn negative_cost_is_clamped() {
        assert_eq!(WeibullTimer::from_unit_cost(-1.0).estimate(10, 10, 10), Duration::ZERO);
    }

    #[test]
    fn calibration_produces_a_usable_timer() {
        let timer = WeibullTimer::calibrate().unwrap();
        assert!(timer.unit_cost_secs().is_finite());
        assert!(timer.unit_cost_secs() >= 0.0);
    }
}
