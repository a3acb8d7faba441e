//! `ashcalc` library crate: tephra volume estimation from isopach data.
//!
//! The binary (`ashcalc`) is a thin wrapper around this library so that:
//!
//! - core fitting logic is testable without spawning processes
//! - the models can be driven from other front-ends

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod report;
