//! QM vs potential error measures.
//!
//! The MD code writes both the QM reference (`QM_*`) and the potential's
//! prediction (`FF_*`) into every frame of the trajectory. The last frame
//! decides whether the tolerances are met; all frames feed the cumulative
//! RMSE report.

use crate::domain::labels::{FF_ENERGY, FF_FORCES, FF_VIRIAL, QM_ENERGY, QM_FORCES, QM_VIRIAL};
use crate::domain::{Measure, Tolerances};
use crate::error::AppError;
use crate::io::Structure;
use crate::math::{diff, max_abs, rmse};

/// Errors of the most recent frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepErrors {
    pub ediff: f64,
    pub fmax: f64,
    pub frmse: f64,
    /// Present only when the frames carry virials.
    pub vmax: Option<f64>,
}

impl StepErrors {
    pub fn get(&self, measure: Measure) -> Option<f64> {
        match measure {
            Measure::Ediff => Some(self.ediff),
            Measure::Fmax => Some(self.fmax),
            Measure::Frmse => Some(self.frmse),
            Measure::Vmax => self.vmax,
        }
    }
}

/// RMSE over every frame seen so far.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CumulativeErrors {
    pub count: usize,
    /// Per-atom energy RMSE.
    pub energy_rmse: f64,
    pub force_rmse: f64,
    pub virial_rmse: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErrorReport {
    pub last: StepErrors,
    pub cumulative: CumulativeErrors,
}

impl ErrorReport {
    /// Compute both the last-step and cumulative errors.
    pub fn from_frames(frames: &[Structure]) -> Result<Self, AppError> {
        let last_frame = frames
            .last()
            .ok_or_else(|| AppError::format("The trajectory has no frames to compare."))?;
        let use_virial = last_frame.has_info(QM_VIRIAL);

        let mut energy_diffs = Vec::with_capacity(frames.len());
        let mut force_diffs = Vec::new();
        let mut virial_diffs = Vec::new();
        let mut last = None;

        for frame in frames {
            let natoms = frame.natoms().max(1) as f64;
            let de = (frame.info_f64(FF_ENERGY)? - frame.info_f64(QM_ENERGY)?) / natoms;
            let df = diff(&frame.array_f64(FF_FORCES)?, &frame.array_f64(QM_FORCES)?);
            let dv = if use_virial {
                Some(diff(&frame.info_vec(FF_VIRIAL)?, &frame.info_vec(QM_VIRIAL)?))
            } else {
                None
            };

            last = Some(StepErrors {
                ediff: de.abs(),
                fmax: max_abs(&df).unwrap_or(0.0),
                frmse: rmse(&df).unwrap_or(0.0),
                vmax: dv.as_deref().map(|d| max_abs(d).unwrap_or(0.0)),
            });

            energy_diffs.push(de);
            force_diffs.extend(df);
            if let Some(dv) = dv {
                virial_diffs.extend(dv);
            }
        }

        let last = last.ok_or_else(|| AppError::format("The trajectory has no frames to compare."))?;
        let cumulative = CumulativeErrors {
            count: frames.len(),
            energy_rmse: rmse(&energy_diffs).unwrap_or(0.0),
            force_rmse: rmse(&force_diffs).unwrap_or(0.0),
            virial_rmse: if use_virial { rmse(&virial_diffs) } else { None },
        };

        Ok(Self { last, cumulative })
    }

    /// The tolerance a measure is checked against; virial checks need virials.
    pub fn tolerance(&self, tolerances: &Tolerances, measure: Measure) -> Option<f64> {
        match (measure, self.last.vmax) {
            (Measure::Vmax, None) => None,
            _ => tolerances.get(measure),
        }
    }

    /// True if every configured tolerance is met (`value < tolerance`).
    pub fn tolerances_met(&self, tolerances: &Tolerances) -> bool {
        Measure::ALL.iter().all(|&m| match (self.last.get(m), self.tolerance(tolerances, m)) {
            (Some(value), Some(tol)) => value < tol,
            _ => true,
        })
    }
}
