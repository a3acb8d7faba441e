//! Optimal piecewise-linear regression.
//!
//! Given points sorted by `x` and a segment count `k`, we look for the split of
//! the points into `k` contiguous groups (each with at least two points) that
//! minimizes the summed residual sum of squares of each group's own
//! least-squares line.
//!
//! The search has two stages:
//!
//! 1. fit a candidate line and its RSS for every contiguous sub-range `(i, j)`,
//!    `i < j` (parallel; there are only `O(n²)` of them)
//! 2. dynamic programming over prefix costs: `best[s][j]` is the cheapest way to
//!    cover points `0..=j` with `s` groups, so the optimum is `best[k][n-1]`
//!
//! Stage 2 is `O(n²k)` and returns the same optimum as enumerating every
//! partition.

use rayon::prelude::*;
use tracing::debug;

use crate::error::FitError;
use crate::math::geom::Line;
use crate::math::ols::{fit_line, residual_sum_of_squares};

/// Result of a segmented regression.
#[derive(Debug, Clone)]
pub struct SegmentedFit {
    /// One line per group, ordered by x.
    pub lines: Vec<Line>,
    /// `k + 1` boundaries; line `i` applies between `boundaries[i]` and `boundaries[i+1]`.
    pub boundaries: Vec<f64>,
    /// Inclusive index ranges of each group into the sorted data.
    pub ranges: Vec<(usize, usize)>,
    /// Summed RSS of the chosen partition.
    pub cost: f64,
    /// Data sorted by x (ties broken by y).
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
}

impl SegmentedFit {
    /// Index of the group containing sorted point `idx`.
    pub fn group_of(&self, idx: usize) -> Option<usize> {
        self.ranges.iter().position(|&(a, b)| a <= idx && idx <= b)
    }
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    start: usize,
    end: usize,
    line: Option<Line>,
    cost: f64,
}

/// Fit `segments` contiguous lines to `(xs, ys)`.
pub fn fit_segmented(xs: &[f64], ys: &[f64], segments: usize) -> Result<SegmentedFit, FitError> {
    if xs.len() != ys.len() {
        return Err(FitError::validation(format!(
            "x and y lengths differ ({} vs {})",
            xs.len(),
            ys.len()
        )));
    }
    if segments == 0 {
        return Err(FitError::validation("number of segments must be at least 1"));
    }

    let mut pairs: Vec<(f64, f64)> = xs.iter().copied().zip(ys.iter().copied()).collect();
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));
    let xs: Vec<f64> = pairs.iter().map(|p| p.0).collect();
    let ys: Vec<f64> = pairs.iter().map(|p| p.1).collect();

    let mut unique = xs.clone();
    unique.dedup();
    let m = unique.len();
    if m < segments * 2 {
        return Err(FitError::validation(format!(
            "cannot perform linear regression for {segments} segment{} with only {m} unique x-value{}",
            if segments == 1 { "" } else { "s" },
            if m == 1 { "" } else { "s" },
        )));
    }

    let n = xs.len();
    let index_pairs: Vec<(usize, usize)> = (1..n).flat_map(|j| (0..j).map(move |i| (i, j))).collect();
    let candidates: Vec<Candidate> = index_pairs
        .par_iter()
        .map(|&(i, j)| {
            let seg_x = &xs[i..=j];
            let seg_y = &ys[i..=j];
            let line = fit_line(seg_x, seg_y);
            let cost = match line {
                Some(l) => residual_sum_of_squares(seg_x, seg_y, |x| l.evaluate(x)),
                None => f64::INFINITY,
            };
            Candidate {
                start: i,
                end: j,
                line,
                cost: if cost.is_finite() { cost } else { f64::INFINITY },
            }
        })
        .collect();

    let mut cost = vec![vec![f64::INFINITY; n]; n];
    let mut lines: Vec<Vec<Option<Line>>> = vec![vec![None; n]; n];
    for c in &candidates {
        cost[c.start][c.end] = c.cost;
        lines[c.start][c.end] = c.line;
    }

    // best[s][j]: cheapest cover of points 0..=j by s groups.
    // start[s][j]: first index of the last group in that cover.
    let mut best = vec![vec![f64::INFINITY; n]; segments + 1];
    let mut start = vec![vec![0usize; n]; segments + 1];
    for j in 1..n {
        best[1][j] = cost[0][j];
    }
    for s in 2..=segments {
        for j in (2 * s - 1)..n {
            for a in (2 * (s - 1))..j {
                let total = best[s - 1][a - 1] + cost[a][j];
                if total < best[s][j] {
                    best[s][j] = total;
                    start[s][j] = a;
                }
            }
        }
    }

    let total = best[segments][n - 1];
    if !total.is_finite() {
        return Err(FitError::validation(format!(
            "no partition into {segments} segments has a well-defined regression line"
        )));
    }

    let mut ranges = Vec::with_capacity(segments);
    let mut end = n - 1;
    for s in (1..=segments).rev() {
        let a = if s == 1 { 0 } else { start[s][end] };
        ranges.push((a, end));
        if s > 1 {
            end = a - 1;
        }
    }
    ranges.reverse();

    let lines = ranges
        .iter()
        .map(|&(a, b)| {
            lines[a][b].ok_or_else(|| {
                FitError::validation(format!("segment {a}..={b} has no regression line"))
            })
        })
        .collect::<Result<Vec<Line>, FitError>>()?;

    let boundaries = segment_boundaries(&xs, &lines, &ranges);
    debug!(segments, cost = total, ?ranges, ?boundaries, "segmented regression");

    Ok(SegmentedFit {
        lines,
        boundaries,
        ranges,
        cost: total,
        xs,
        ys,
    })
}

/// Boundaries between consecutive segments.
///
/// An interior boundary is the intersection of the neighbouring lines unless
/// they are parallel or the outer line is steeper than the inner one (thinning
/// rate must not decrease outward); then it is the midpoint of the gap
/// between the two groups' data.
fn segment_boundaries(xs: &[f64], lines: &[Line], ranges: &[(usize, usize)]) -> Vec<f64> {
    let mut bounds = Vec::with_capacity(lines.len() + 1);
    bounds.push(xs[0]);
    for i in 0..lines.len().saturating_sub(1) {
        let (inner, outer) = (&lines[i], &lines[i + 1]);
        match inner.intersection(outer) {
            Some(p) if inner.slope <= outer.slope => bounds.push(p.x),
            _ => bounds.push((xs[ranges[i].1] + xs[ranges[i + 1].0]) / 2.0),
        }
    }
    bounds.push(xs[xs.len() - 1]);
    bounds
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn single_segment_is_plain_regression() {
        let xs = [3.0, 1.0, 2.0, 4.0];
        let ys = [7.0, 3.0, 5.0, 9.0];
        let fit = fit_segmented(&xs, &ys, 1).unwrap();
        assert_eq!(fit.lines.len(), 1);
        assert_abs_diff_eq!(fit.lines[0].slope, 2.0, epsilon = 1e-10);
        assert_abs_diff_eq!(fit.lines[0].intercept, 1.0, epsilon = 1e-10);
        assert_eq!(fit.boundaries, vec![1.0, 4.0]);
        assert_eq!(fit.ranges, vec![(0, 3)]);
    }

    #[test]
    fn finds_the_break_of_a_two_piece_line() {
        // y = -x on [0, 4], y = -4 - 0.25 (x - 4) beyond.
        let xs = [0.0, 1.0, 2.0, 3.0, 4.0, 6.0, 8.0, 10.0];
        let ys: Vec<f64> = xs
            .iter()
            .map(|&x| if x <= 4.0 { -x } else { -4.0 - 0.25 * (x - 4.0) })
            .collect();
        let fit = fit_segmented(&xs, &ys, 2).unwrap();

        assert_abs_diff_eq!(fit.cost, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(fit.lines[0].slope, -1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(fit.lines[1].slope, -0.25, epsilon = 1e-9);
        // The two lines meet at x = 4.
        assert_abs_diff_eq!(fit.boundaries[1], 4.0, epsilon = 1e-9);
        assert_eq!(fit.boundaries[0], 0.0);
        assert_eq!(fit.boundaries[2], 10.0);
    }

    #[test]
    fn matches_exhaustive_search_on_noisy_data() {
        let xs = [1.0, 2.0, 3.5, 4.0, 5.5, 7.0, 8.0, 9.5, 11.0];
        let ys = [0.2, -0.9, -2.1, -2.5, -3.0, -3.2, -3.9, -4.1, -4.6];
        let k = 3;
        let fit = fit_segmented(&xs, &ys, k).unwrap();

        // Brute force over all cut positions.
        let rss = |a: usize, b: usize| {
            let line = fit_line(&xs[a..=b], &ys[a..=b]).unwrap();
            residual_sum_of_squares(&xs[a..=b], &ys[a..=b], |x| line.evaluate(x))
        };
        let n = xs.len();
        let mut brute = f64::INFINITY;
        for c1 in 1..n {
            for c2 in (c1 + 2)..n {
                // groups: 0..=c1, c1+1..=c2, c2+1..=n-1
                if c2 + 3 > n {
                    continue;
                }
                let total = rss(0, c1) + rss(c1 + 1, c2) + rss(c2 + 1, n - 1);
                brute = brute.min(total);
            }
        }
        assert_abs_diff_eq!(fit.cost, brute, epsilon = 1e-9);

        // Groups cover the points exactly once, in order, each with >= 2 points.
        assert_eq!(fit.ranges.first().unwrap().0, 0);
        assert_eq!(fit.ranges.last().unwrap().1, n - 1);
        for w in fit.ranges.windows(2) {
            assert_eq!(w[0].1 + 1, w[1].0);
        }
        for &(a, b) in &fit.ranges {
            assert!(b > a);
        }
    }

    #[test]
    fn too_few_distinct_x_values_fails() {
        let err = fit_segmented(&[1.0, 1.0, 2.0], &[3.0, 2.0, 1.0], 2).unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("2 unique x-values"));
    }

    #[test]
    fn zero_segments_fails() {
        assert!(fit_segmented(&[1.0, 2.0], &[1.0, 2.0], 0).is_err());
    }

    #[test]
    fn midpoint_used_when_outer_segment_is_steeper() {
        // Shallow then steep: intersection is rejected.
        let xs = [0.0, 1.0, 2.0, 10.0, 11.0, 12.0];
        let ys = [0.0, -0.1, -0.2, -5.0, -7.0, -9.0];
        let fit = fit_segmented(&xs, &ys, 2).unwrap();
        assert_eq!(fit.ranges, vec![(0, 2), (3, 5)]);
        assert!(fit.lines[0].slope > fit.lines[1].slope);
        assert_abs_diff_eq!(fit.boundaries[1], 6.0, epsilon = 1e-12);
    }
}
