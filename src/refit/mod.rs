//! GAP model refitting.
//!
//! Responsibilities:
//!
//! - resolve the refit strategy named by the run (`registry`)
//! - build descriptor blocks and the kernel scale delta (`descriptors`)
//! - assemble and run the `gap_fit` call (`command`, `generic`)
//! - keep backups of earlier models and the tool's output (`artifacts`)
//!
//! A refit is strictly sequential: back up the model, write `train.xyz`, run
//! the tool, write the captured streams. A failure aborts the sequence and
//! leaves whatever was already done in place.

use std::path::PathBuf;

use log::debug;

use crate::config::FitCommand;
use crate::error::AppError;
use crate::io::{Structure, read_frames};
use crate::state::RefitState;

pub mod artifacts;
pub mod command;
pub mod descriptors;
pub mod generic;
pub mod registry;
pub mod strategies;

#[cfg(test)]
pub(crate) mod testing;

pub use command::{DEFAULT_SIGMA, GP_NAME, TRAIN_FILE};
pub use generic::refit_generic;
pub use registry::{RefitFn, RefitRegistry, refit};
pub use strategies::refit_turbo_si_c;

/// Where and how a fit runs.
#[derive(Debug, Clone)]
pub struct RefitContext {
    /// Directory holding the model, training file and captures.
    pub workdir: PathBuf,
    pub command: FitCommand,
}

impl RefitContext {
    pub fn new(workdir: impl Into<PathBuf>, command: FitCommand) -> Self {
        Self {
            workdir: workdir.into(),
            command,
        }
    }
}

/// What one successful fit produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FitRecord {
    /// Arguments passed to the fitting tool after its leading arguments.
    pub args: Vec<String>,
    pub model: PathBuf,
    /// Where the previous model went, if there was one.
    pub backup: Option<PathBuf>,
    pub training_file: PathBuf,
    pub n_structures: usize,
    pub stdout_file: PathBuf,
    pub stderr_file: PathBuf,
}

/// The run's own frames followed by the previous data.
pub fn load_training_set(state: &dyn RefitState) -> Result<Vec<Structure>, AppError> {
    let mut frames = read_frames(state.xyz_filename())?;
    let own = frames.len();
    frames.extend(state.previous_data()?);
    debug!(
        "training set: {own} frames from {}, {} previous",
        state.xyz_filename().display(),
        frames.len() - own
    );

    if frames.is_empty() {
        return Err(AppError::format("No training structures available for the refit."));
    }
    Ok(frames)
}
