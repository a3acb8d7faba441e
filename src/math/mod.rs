//! Mathematical utilities: lines, least squares, and segmented regression.

pub mod geom;
pub mod ols;
pub mod segmented;

pub use geom::*;
pub use ols::*;
pub use segmented::*;
