//! Input/output helpers.
//!
//! - isopach file parsing (`isopach_file`)
//! - JSON exports for reports and error surfaces (`export`)
//! - fitted-curve CSV export (`curve`)

pub mod curve;
pub mod export;
pub mod isopach_file;

pub use curve::*;
pub use export::*;
pub use isopach_file::*;
