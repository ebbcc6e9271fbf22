//! Domain types used throughout the run.
//!
//! This module defines:
//!
//! - run settings read from the input file (`InputSettings`, `Tolerances`)
//! - the flags carried between step calls (`CarriedState`)
//! - the compared error measures (`Measure`)
//! - the frame labels shared by the monitor and the refit (`labels`)

pub mod labels;
pub mod types;

pub use types::*;
