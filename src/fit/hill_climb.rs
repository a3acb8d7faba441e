//! Stochastic hill-climbing over a bounded 2-parameter box.
//!
//! Used for the Weibull model, whose `(λ, k)` cannot be recovered by a
//! linear regression. The search is a set of independent restarts:
//!
//! - each run starts at a uniform random point inside the bounds
//! - each iteration perturbs both coordinates by a uniform step whose maximum
//!   shrinks linearly from 10% of the bound width to zero over the run
//! - a proposal is accepted when it scores strictly lower, otherwise when a
//!   uniform draw `u` satisfies `u > exp(current - new)`; far worse proposals
//!   are taken almost always and equal scores never move the state
//! - the best point seen during the run (not the final state) is the run's result
//!
//! Randomness: the caller's generator only draws one seed per run; runs then
//! execute in parallel on their own `StdRng`s. A seeded caller therefore gets
//! the same answer regardless of thread scheduling.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::debug;

use crate::error::FitError;

/// Upper bound on redraws when a perturbation lands outside the box.
const MAX_REDRAWS: usize = 1000;

/// Fraction of the bound width used for the initial step size.
const STEP_FRACTION: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchSettings {
    pub runs: usize,
    pub iterations_per_run: usize,
    pub x_bounds: (f64, f64),
    pub y_bounds: (f64, f64),
}

/// Best point found by a search (lower score is better).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchOutcome {
    pub x: f64,
    pub y: f64,
    pub score: f64,
}

impl SearchSettings {
    pub fn validate(&self) -> Result<(), FitError> {
        if self.runs == 0 {
            return Err(FitError::validation("the number of runs must be greater than 0"));
        }
        if self.iterations_per_run == 0 {
            return Err(FitError::validation(
                "the number of iterations must be greater than 0",
            ));
        }
        for (name, (lo, hi)) in [("first", self.x_bounds), ("second", self.y_bounds)] {
            if !(lo.is_finite() && hi.is_finite()) {
                return Err(FitError::validation(format!(
                    "bounds for the {name} parameter must be finite, got [{lo}, {hi}]"
                )));
            }
            if lo >= hi {
                return Err(FitError::validation(format!(
                    "the upper bound for the {name} parameter ({hi}) must be greater than the lower bound ({lo})"
                )));
            }
        }
        Ok(())
    }
}

/// Minimize `score` over the settings' box.
///
/// `score` must be safe to call from several threads. `NaN` scores are
/// treated as `+∞`.
pub fn search<R, F>(score: F, settings: &SearchSettings, rng: &mut R) -> Result<SearchOutcome, FitError>
where
    R: Rng + ?Sized,
    F: Fn(f64, f64) -> f64 + Sync,
{
    settings.validate()?;

    let seeds: Vec<u64> = (0..settings.runs).map(|_| rng.r#gen()).collect();
    let outcomes: Vec<SearchOutcome> = seeds
        .par_iter()
        .map(|&seed| {
            let mut run_rng = StdRng::seed_from_u64(seed);
            perform_run(&score, settings, &mut run_rng)
        })
        .collect();

    // Deterministic selection: lowest score, ties go to the earliest run.
    let mut best = outcomes[0];
    for (run, outcome) in outcomes.iter().enumerate() {
        debug!(run, x = outcome.x, y = outcome.y, score = outcome.score, "hill-climb run");
        if outcome.score < best.score {
            best = *outcome;
        }
    }
    Ok(best)
}

fn perform_run<F>(score: &F, settings: &SearchSettings, rng: &mut StdRng) -> SearchOutcome
where
    F: Fn(f64, f64) -> f64,
{
    let (x_lo, x_hi) = settings.x_bounds;
    let (y_lo, y_hi) = settings.y_bounds;
    let iterations = settings.iterations_per_run;

    let mut x = rng.gen_range(x_lo..=x_hi);
    let mut y = rng.gen_range(y_lo..=y_hi);
    let mut current = sanitize(score(x, y));
    let mut best = SearchOutcome { x, y, score: current };

    for iteration in 0..iterations {
        let new_x = perturb(x, settings.x_bounds, iteration, iterations, rng);
        let new_y = perturb(y, settings.y_bounds, iteration, iterations, rng);
        let new_score = sanitize(score(new_x, new_y));

        if new_score < best.score {
            best = SearchOutcome {
                x: new_x,
                y: new_y,
                score: new_score,
            };
        }

        if new_score < current || rng.r#gen::<f64>() > (current - new_score).exp() {
            x = new_x;
            y = new_y;
            current = new_score;
        }
    }

    best
}

/// Propose a new coordinate inside `[lo, hi]`, never exactly zero.
///
/// Falls back to the current value if no valid draw turns up.
fn perturb<R: Rng + ?Sized>(
    value: f64,
    (lo, hi): (f64, f64),
    iteration: usize,
    iterations: usize,
    rng: &mut R,
) -> f64 {
    let delta = (1.0 - iteration as f64 / iterations as f64) * STEP_FRACTION * (hi - lo);
    for _ in 0..MAX_REDRAWS {
        let candidate = value + rng.gen_range(-delta..=delta);
        if lo <= candidate && candidate <= hi && candidate != 0.0 {
            return candidate;
        }
    }
    value
}

fn sanitize(score: f64) -> f64 {
    if score.is_nan() { f64::INFINITY } else { score }
}
