//! In-memory `RefitState` for tests.

use std::path::{Path, PathBuf};

use crate::error::AppError;
use crate::io::Structure;
use crate::state::RefitState;

pub struct MemoryState {
    xyz: PathBuf,
    previous: Vec<Structure>,
    refit_name: Option<String>,
}

impl MemoryState {
    pub fn new(xyz: PathBuf, previous: Vec<Structure>, refit_name: Option<&str>) -> Self {
        Self {
            xyz,
            previous,
            refit_name: refit_name.map(str::to_string),
        }
    }
}

impl RefitState for MemoryState {
    fn xyz_filename(&self) -> &Path {
        &self.xyz
    }

    fn previous_data(&self) -> Result<Vec<Structure>, AppError> {
        Ok(self.previous.clone())
    }

    fn refit_function_name(&self) -> Option<&str> {
        self.refit_name.as_deref()
    }
}
