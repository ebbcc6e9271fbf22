//! Read/write the YAML files of a run.
//!
//! - input settings (`<seed>.hybrid-md-input.yaml`), written by the user
//! - carried state (`<seed>.hybrid-md-state.yaml`), rewritten by every step

use std::fs::File;
use std::path::Path;

use crate::domain::{CarriedState, InputSettings};
use crate::error::AppError;

/// Read the run's input settings.
pub fn read_settings(path: &Path) -> Result<InputSettings, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::io(format!("Failed to open input settings '{}': {e}", path.display())))?;
    serde_yaml::from_reader(file)
        .map_err(|e| AppError::format(format!("Invalid input settings '{}': {e}", path.display())))
}

/// Write the carried state, replacing the previous one.
pub fn write_carried_state(path: &Path, state: &CarriedState) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create state file '{}': {e}", path.display())))?;
    serde_yaml::to_writer(file, state)
        .map_err(|e| AppError::io(format!("Failed to write state file '{}': {e}", path.display())))
}

/// Read the carried state written by the previous step call.
pub fn read_carried_state(path: &Path) -> Result<CarriedState, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::config(format!(
            "Failed to open state file '{}' (was `initialise` run?): {e}",
            path.display()
        ))
    })?;
    serde_yaml::from_reader(file)
        .map_err(|e| AppError::format(format!("Invalid state file '{}': {e}", path.display())))
}
