//! Thinning models: exponential, power law, Weibull.
//!
//! Each model is a fit function returning a serialisable result that owns a
//! copy of its isopachs, plus the pure helpers (thickness, volume) the fit
//! and the error surface share.

pub mod exponential;
pub mod power_law;
pub mod weibull;

pub use exponential::*;
pub use power_law::*;
pub use weibull::*;
