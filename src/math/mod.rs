//! Mathematical utilities: summary statistics for energies, forces and virials.

pub mod stats;

pub use stats::*;
