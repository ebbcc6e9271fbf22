//! Shared domain types.
//!
//! These types are serializable so they can be read from the run's input file
//! and carried between the `pre-step` and `post-step` calls of one MD step.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Error tolerances for the QM vs potential comparison.
///
/// A missing tolerance switches that check off.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Tolerances {
    /// Energy difference per atom (eV/atom).
    #[serde(default)]
    pub ediff: Option<f64>,
    /// Maximum force component difference (eV/Å).
    #[serde(default)]
    pub fmax: Option<f64>,
    /// Force component RMSE (eV/Å).
    #[serde(default)]
    pub frmse: Option<f64>,
    /// Maximum virial component difference (eV).
    #[serde(default)]
    pub vmax: Option<f64>,
}

/// Which tolerance a measure is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measure {
    Ediff,
    Fmax,
    Frmse,
    Vmax,
}

impl Measure {
    pub const ALL: [Measure; 4] = [Measure::Ediff, Measure::Fmax, Measure::Frmse, Measure::Vmax];

    pub fn label(self) -> &'static str {
        match self {
            Measure::Ediff => "|Ediff|",
            Measure::Fmax => "max |Fdiff|",
            Measure::Frmse => "force RMSE",
            Measure::Vmax => "max |Vdiff|",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Measure::Ediff => "eV/at",
            Measure::Fmax | Measure::Frmse => "eV/Å",
            Measure::Vmax => "eV",
        }
    }
}

impl Tolerances {
    pub fn get(&self, measure: Measure) -> Option<f64> {
        match measure {
            Measure::Ediff => self.ediff,
            Measure::Fmax => self.fmax,
            Measure::Frmse => self.frmse,
            Measure::Vmax => self.vmax,
        }
    }
}

/// Run settings, read from `<seed>.hybrid-md-input.yaml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputSettings {
    #[serde(default)]
    pub tolerances: Tolerances,
    /// If false the model is only measured, never refitted.
    #[serde(default)]
    pub can_update: bool,
    /// Every `check_interval`-th potential step is compared against QM.
    #[serde(default = "default_check_interval")]
    pub check_interval: usize,
    /// Ab-initio steps before the first model is fitted.
    #[serde(default)]
    pub num_initial_steps: usize,
    /// Dotted name of the refit strategy; `None` uses the generic one.
    #[serde(default)]
    pub refit: Option<String>,
    /// Extra structure files appended to every training set.
    #[serde(default)]
    pub previous_data: Vec<PathBuf>,
}

fn default_check_interval() -> usize {
    1
}

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            tolerances: Tolerances::default(),
            can_update: false,
            check_interval: default_check_interval(),
            num_initial_steps: 0,
            refit: None,
            previous_data: Vec::new(),
        }
    }
}

/// Flags carried from one binary invocation to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarriedState {
    #[serde(default)]
    pub do_comparison: bool,
    #[serde(default)]
    pub do_update_model: bool,
    #[serde(default = "default_true")]
    pub next_is_pre_step: bool,
    #[serde(default)]
    pub next_ab_initio: bool,
}

fn default_true() -> bool {
    true
}

impl Default for CarriedState {
    fn default() -> Self {
        Self {
            do_comparison: false,
            do_update_model: false,
            next_is_pre_step: true,
            next_ab_initio: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_defaults_fill_missing_keys() {
        let settings: InputSettings = serde_yaml::from_str("tolerances:\n  fmax: 0.5\n").unwrap();
        assert_eq!(settings.check_interval, 1);
        assert_eq!(settings.num_initial_steps, 0);
        assert!(!settings.can_update);
        assert_eq!(settings.tolerances.get(Measure::Fmax), Some(0.5));
        assert_eq!(settings.tolerances.get(Measure::Ediff), None);
        assert!(settings.refit.is_none());
    }

    #[test]
    fn carried_state_defaults_to_expecting_pre_step() {
        let state: CarriedState = serde_yaml::from_str("{}").unwrap();
        assert!(state.next_is_pre_step);
        assert_eq!(state, CarriedState::default());
    }
}
