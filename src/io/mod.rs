//! Input/output helpers.
//!
//! - extended-XYZ structure files (`xyz`)
//! - JSON settings and carried state (`state_file`)

pub mod state_file;
pub mod xyz;

pub use state_file::*;
pub use xyz::{Property, PropertyKind, Structure, read_frames, write_frames};
