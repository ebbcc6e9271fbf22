//! The `HybridMd` run state.
//!
//! All files of a run share a seed and live in one working directory:
//!
//! - `<seed>.hybrid-md-input.yaml`: settings (read only)
//! - `<seed>.hybrid-md-state.yaml`: flags carried between step calls
//! - `<seed>.hybrid-md-log`: error tables
//! - `<seed>.hybrid-md.xyz`: frames written by the MD code

use std::path::{Path, PathBuf};

use crate::domain::{CarriedState, InputSettings, Tolerances};
use crate::error::AppError;
use crate::io::{Structure, read_carried_state, read_frames, read_settings, write_carried_state};
use crate::state::RefitState;

#[derive(Debug, Clone)]
pub struct HybridMd {
    workdir: PathBuf,
    seed: String,
    md_iteration: Option<usize>,
    settings: InputSettings,
    xyz_filename: PathBuf,
    pub carried: CarriedState,
}

impl HybridMd {
    /// Build the state for `seed`, reading and validating its input settings.
    pub fn new(workdir: &Path, seed: &str, md_iteration: Option<usize>) -> Result<Self, AppError> {
        let input = input_path(workdir, seed);
        let settings = read_settings(&input)?;
        Self::from_settings(workdir, seed, md_iteration, settings)
    }

    pub fn from_settings(
        workdir: &Path,
        seed: &str,
        md_iteration: Option<usize>,
        settings: InputSettings,
    ) -> Result<Self, AppError> {
        validate_settings(&settings)?;
        Ok(Self {
            workdir: workdir.to_path_buf(),
            seed: seed.to_string(),
            md_iteration,
            settings,
            xyz_filename: workdir.join(format!("{seed}.hybrid-md.xyz")),
            carried: CarriedState::default(),
        })
    }

    pub fn md_iteration(&self) -> Option<usize> {
        self.md_iteration
    }

    pub fn settings(&self) -> &InputSettings {
        &self.settings
    }

    pub fn tolerances(&self) -> &Tolerances {
        &self.settings.tolerances
    }

    pub fn state_filename(&self) -> PathBuf {
        self.workdir.join(format!("{}.hybrid-md-state.yaml", self.seed))
    }

    pub fn log_filename(&self) -> PathBuf {
        self.workdir.join(format!("{}.hybrid-md-log", self.seed))
    }

    pub fn dump(&self) -> Result<(), AppError> {
        write_carried_state(&self.state_filename(), &self.carried)
    }

    pub fn load(&mut self) -> Result<(), AppError> {
        self.carried = read_carried_state(&self.state_filename())?;
        Ok(())
    }

    /// Clear the per-step flags at the start of a step.
    pub fn reset(&mut self) {
        self.carried.do_comparison = false;
        self.carried.do_update_model = false;
        self.carried.next_is_pre_step = true;
    }

    /// Every frame the MD code has written so far.
    pub fn read_trajectory(&self) -> Result<Vec<Structure>, AppError> {
        read_frames(&self.xyz_filename)
    }
}

impl RefitState for HybridMd {
    fn xyz_filename(&self) -> &Path {
        &self.xyz_filename
    }

    fn previous_data(&self) -> Result<Vec<Structure>, AppError> {
        let mut frames = Vec::new();
        for path in &self.settings.previous_data {
            let path = if path.is_absolute() {
                path.clone()
            } else {
                self.workdir.join(path)
            };
            frames.extend(read_frames(&path)?);
        }
        Ok(frames)
    }

    fn refit_function_name(&self) -> Option<&str> {
        self.settings.refit.as_deref().filter(|name| !name.is_empty())
    }
}

fn input_path(workdir: &Path, seed: &str) -> PathBuf {
    workdir.join(format!("{seed}.hybrid-md-input.yaml"))
}

fn validate_settings(settings: &InputSettings) -> Result<(), AppError> {
    if settings.num_initial_steps > 0 && !settings.can_update {
        return Err(AppError::config(
            "Requesting initial ab-initio steps but the model cannot be updated (can_update = false).",
        ));
    }
    if settings.check_interval == 0 {
        return Err(AppError::config("check_interval must be at least 1."));
    }
    if let Some(name) = settings.refit.as_deref() {
        if !name.is_empty() && !name.contains('.') {
            return Err(AppError::config(format!(
                "Refit function `{name}` must be given as `<module.path>.<function>`."
            )));
        }
    }
    Ok(())
}
