//! Straight lines and points in the regression plane.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub slope: f64,
    pub intercept: f64,
}

impl Line {
    pub fn new(slope: f64, intercept: f64) -> Self {
        Self { slope, intercept }
    }

    pub fn evaluate(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }

    /// Intersection with `other`, or `None` for parallel lines.
    ///
    /// Slopes are compared exactly.
    pub fn intersection(&self, other: &Line) -> Option<Point> {
        if self.slope == other.slope {
            return None;
        }
        let x = (other.intercept - self.intercept) / (self.slope - other.slope);
        Some(Point {
            x,
            y: self.evaluate(x),
        })
    }
}
