//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the isopach measurement (`Isopach`) and its validation
//! - model selection enums (`ModelKind`, `SurfaceModel`)
//! - fit requests and run configuration (`FitRequest`, `WeibullSettings`, `FitConfig`)

pub mod types;

pub use types::*;
