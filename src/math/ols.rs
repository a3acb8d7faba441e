//! Least squares line fitting and fit-quality scores.
//!
//! Every model in this crate reduces to fitting straight lines, either in
//! log-linear space (exponential), log-log space (power law) or as the
//! per-segment building block of the segmented regression.
//!
//! Implementation choices:
//! - The line is solved as a tiny least-squares problem `[1 x] β = y` with SVD,
//!   which copes with tall systems and near-collinear columns.
//! - Degenerate inputs (fewer than two distinct x values) are reported as `None`
//!   rather than producing a meaningless min-norm solution.

use nalgebra::{DMatrix, DVector};

use crate::math::geom::Line;

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-12, 1e-10, 1e-8] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Ordinary least squares line through `(xs[i], ys[i])`.
///
/// Returns `None` when the inputs differ in length, hold fewer than two
/// distinct x values, or contain non-finite numbers.
pub fn fit_line(xs: &[f64], ys: &[f64]) -> Option<Line> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    if xs.iter().chain(ys.iter()).any(|v| !v.is_finite()) {
        return None;
    }
    if xs.iter().all(|&x| x == xs[0]) {
        return None;
    }

    let n = xs.len();
    let design = DMatrix::from_fn(n, 2, |i, j| if j == 0 { 1.0 } else { xs[i] });
    let obs = DVector::from_column_slice(ys);

    let beta = solve_least_squares(&design, &obs)?;
    Some(Line::new(beta[1], beta[0]))
}

/// `Σ (f(x_i) - y_i)^2`.
pub fn residual_sum_of_squares(xs: &[f64], ys: &[f64], f: impl Fn(f64) -> f64) -> f64 {
    xs.iter()
        .zip(ys.iter())
        .map(|(&x, &y)| {
            let r = f(x) - y;
            r * r
        })
        .sum()
}

/// `mean_i(((f(x_i) - y_i) / y_i)^2)`.
///
/// Returns `NaN` for empty input.
pub fn mean_relative_squared_error(xs: &[f64], ys: &[f64], f: impl Fn(f64) -> f64) -> f64 {
    let n = xs.len().min(ys.len());
    if n == 0 {
        return f64::NAN;
    }
    let total: f64 = xs
        .iter()
        .zip(ys.iter())
        .map(|(&x, &y)| {
            let r = (f(x) - y) / y;
            r * r
        })
        .sum();
    total / n as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-10);
        assert!((beta[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn fit_line_recovers_exact_line() {
        let line = fit_line(&[1.0, 2.0, 3.0], &[3.0, 5.0, 7.0]).unwrap();
        assert_abs_diff_eq!(line.slope, 2.0, epsilon = 1e-10);
        assert_abs_diff_eq!(line.intercept, 1.0, epsilon = 1e-10);
    }

    #[test]
    fn fit_line_matches_closed_form_on_noisy_data() {
        let xs = [0.0, 1.0, 2.0, 3.0, 4.0];
        let ys = [1.1, 2.9, 5.2, 6.8, 9.1];
        let line = fit_line(&xs, &ys).unwrap();

        let n = xs.len() as f64;
        let mx = xs.iter().sum::<f64>() / n;
        let my = ys.iter().sum::<f64>() / n;
        let sxy: f64 = xs.iter().zip(&ys).map(|(x, y)| (x - mx) * (y - my)).sum();
        let sxx: f64 = xs.iter().map(|x| (x - mx) * (x - mx)).sum();
        let slope = sxy / sxx;

        assert_abs_diff_eq!(line.slope, slope, epsilon = 1e-10);
        assert_abs_diff_eq!(line.intercept, my - slope * mx, epsilon = 1e-10);
    }

    #[test]
    fn fit_line_rejects_degenerate_input() {
        assert!(fit_line(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]).is_none());
        assert!(fit_line(&[1.0], &[1.0]).is_none());
        assert!(fit_line(&[1.0, 2.0], &[1.0]).is_none());
    }

    #[test]
    fn scores() {
        let xs = [1.0, 2.0];
        let ys = [2.0, 4.0];
        let rss = residual_sum_of_squares(&xs, &ys, |x| x * 2.0 + 1.0);
        assert_abs_diff_eq!(rss, 2.0);

        // Relative errors 0.5 and 0.25.
        let mrse = mean_relative_squared_error(&xs, &ys, |x| x * 2.0 + 1.0);
        assert_abs_diff_eq!(mrse, (0.25 + 0.0625) / 2.0);
    }
}
