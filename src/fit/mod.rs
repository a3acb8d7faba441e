//! Fitting orchestration.
//!
//! Responsibilities:
//!
//! - dispatch a `FitRequest` to the matching model (`dispatch`)
//! - stochastic search for models without a linear fit (`hill_climb`)
//! - error surfaces over two-parameter boxes (`surface`)
//! - run-time estimates for the Weibull search (`timing`)

pub mod dispatch;
pub mod hill_climb;
pub mod surface;
pub mod timing;

pub use dispatch::*;
pub use surface::*;
pub use timing::*;
