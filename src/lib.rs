//! `hybrid-md` library crate.
//!
//! The binary (`hybrid-md`) is a thin wrapper around this library so that:
//!
//! - step decisions and refits are testable without spawning the binary
//! - an MD driver written in Rust can call the refit code directly, with its
//!   own `RefitState` and extra registered strategies

pub mod app;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod io;
pub mod math;
pub mod monitor;
pub mod refit;
pub mod report;
pub mod state;

#[cfg(test)]
mod testutil;
