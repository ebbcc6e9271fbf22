//! Per-frame and per-atom labels written by the MD code.
//!
//! `QM_*` holds the ab-initio reference, `FF_*` the potential's prediction.
//! The `QM_*` labels are also the fitting targets passed to `gap_fit`.

pub const QM_ENERGY: &str = "QM_energy";
pub const FF_ENERGY: &str = "FF_energy";
pub const QM_FORCES: &str = "QM_forces";
pub const FF_FORCES: &str = "FF_forces";
pub const QM_VIRIAL: &str = "QM_virial";
pub const FF_VIRIAL: &str = "FF_virial";
