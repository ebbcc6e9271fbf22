//! GAP descriptor blocks.
//!
//! A descriptor block renders as `<name> key=value key=value flag ...`, the
//! syntax `gap_fit` expects inside `gap={...}`. Several blocks are joined by
//! `" : "` into one composite value.
//!
//! Every block built here declares `delta`, the kernel scale, which is
//! derived from the spread of the training energies (`energy_delta`).

use std::fmt;

use crate::domain::labels::QM_ENERGY;
use crate::error::AppError;
use crate::io::Structure;
use crate::math::population_std;

/// Separator between descriptor blocks in the `gap={...}` value.
pub const DESCRIPTOR_SEPARATOR: &str = " : ";

#[derive(Debug, Clone, PartialEq)]
pub struct DescriptorBlock {
    name: String,
    params: Vec<(String, Option<String>)>,
}

impl DescriptorBlock {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            params: Vec::new(),
        }
    }

    pub fn param(mut self, key: &str, value: impl fmt::Display) -> Self {
        self.params.push((key.to_string(), Some(value.to_string())));
        self
    }

    /// A bare keyword such as `compact_clusters`.
    pub fn flag(mut self, key: &str) -> Self {
        self.params.push((key.to_string(), None));
        self
    }
}

impl fmt::Display for DescriptorBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        for (key, value) in &self.params {
            match value {
                Some(v) => write!(f, " {key}={v}")?,
                None => write!(f, " {key}")?,
            }
        }
        Ok(())
    }
}

/// Join blocks into the composite descriptor string.
pub fn join_blocks(blocks: &[DescriptorBlock]) -> String {
    blocks
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(DESCRIPTOR_SEPARATOR)
}

/// `std(E / natoms) / 4` over the training set, population std.
pub fn energy_delta(frames: &[Structure]) -> Result<f64, AppError> {
    let mut per_atom = Vec::with_capacity(frames.len());
    for (idx, frame) in frames.iter().enumerate() {
        if frame.natoms() == 0 {
            return Err(AppError::format(format!("Training structure {idx} has no atoms.")));
        }
        per_atom.push(frame.info_f64(QM_ENERGY)? / frame.natoms() as f64);
    }
    let std = population_std(&per_atom)
        .ok_or_else(|| AppError::format("Cannot compute delta: the training set is empty."))?;
    Ok(std / 4.0)
}

/// Two-body distance term shared by the built-in strategies.
pub fn two_body(delta: f64) -> DescriptorBlock {
    DescriptorBlock::new("distance_Nb")
        .param("order", 2)
        .param("n_sparse", 20)
        .param("cutoff", "4.5")
        .param("cutoff_transition_width", "1.0")
        .flag("compact_clusters")
        .param("covariance_type", "ard_se")
        .param("theta_uniform", "1.0")
        .param("sparse_method", "uniform")
        .param("f0", "0.0")
        .param("add_species", "T")
        .param("delta", delta)
}

/// Single-species SOAP term of the generic strategy.
pub fn soap(delta: f64) -> DescriptorBlock {
    DescriptorBlock::new("soap")
        .param("n_sparse", 200)
        .param("n_max", 8)
        .param("l_max", 4)
        .param("cutoff", "4.0")
        .param("cutoff_transition_width", "1.0")
        .param("atom_sigma", "0.5")
        .param("add_species", "True")
        .param("delta", delta)
        .param("covariance_type", "dot_product")
        .param("zeta", 4)
        .param("sparse_method", "cur_points")
}

/// Two-species (C, Si) turbo-SOAP term centred on species `central_index`.
pub fn soap_turbo_si_c(central_index: usize, n_sparse: usize, delta: f64) -> DescriptorBlock {
    DescriptorBlock::new("soap_turbo")
        .param("central_index", central_index)
        .param("n_sparse", n_sparse)
        .param("delta", delta)
        .param("n_species", 2)
        .param("species_Z", "{6 14}")
        .param("rcut_hard", "4.5")
        .param("rcut_soft", "3.5")
        .param("alpha_max", "{10 10}")
        .param("l_max", 6)
        .param("atom_sigma_r", "{0.3 0.3}")
        .param("atom_sigma_t", "{0.3 0.3}")
        .param("atom_sigma_r_scaling", "{0.10 0.10}")
        .param("atom_sigma_t_scaling", "{0.10 0.10}")
        .param("amplitude_scaling", "{1. 1.}")
        .param("radial_enhancement", 1)
        .param("basis", "poly3gauss")
        .param("scaling_mode", "polynomial")
        .param("central_weight", "{1. 1.}")
        .param("f0", "0.0")
        .param("covariance_type", "dot_product")
        .param("zeta", 4)
        .param("sparse_method", "cur_points")
        .param("add_species", "F")
}
