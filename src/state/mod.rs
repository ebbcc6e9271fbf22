//! Run state.
//!
//! `RefitState` is everything a refit strategy may see of the run. `HybridMd`
//! is the state the binary builds from the seed files; tests and embedding
//! drivers can supply their own implementation.

use std::path::Path;

use crate::error::AppError;
use crate::io::Structure;

pub mod hybrid;

pub use hybrid::HybridMd;

pub trait RefitState {
    /// Structure file holding the frames collected in this run.
    fn xyz_filename(&self) -> &Path;

    /// Structures from earlier runs, appended after the run's own frames.
    fn previous_data(&self) -> Result<Vec<Structure>, AppError>;

    /// Dotted name of the refit strategy; `None` selects the default.
    fn refit_function_name(&self) -> Option<&str>;
}
