//! Specialized refit strategies.
//!
//! Each strategy has the registry signature and ends in `refit_generic` with
//! its own descriptor and sigma strings.

use crate::error::AppError;
use crate::refit::descriptors::{energy_delta, join_blocks, soap_turbo_si_c, two_body};
use crate::refit::{FitRecord, RefitContext, load_training_set, refit_generic};
use crate::state::RefitState;

const TURBO_SOAP_N_SPARSE: usize = 200;

/// Sigma for the SiC model; currently the same values as the generic fit.
const TURBO_SI_C_SIGMA: &str = "0.005 0.050 0.1 1.0";

/// Two-body + turbo-SOAP descriptors for a silicon carbide system.
pub fn turbo_si_c_descriptors(delta: f64) -> String {
    join_blocks(&[
        two_body(delta),
        soap_turbo_si_c(1, TURBO_SOAP_N_SPARSE, delta),
        soap_turbo_si_c(2, TURBO_SOAP_N_SPARSE, delta),
    ])
}

pub fn refit_turbo_si_c(state: &dyn RefitState, ctx: &RefitContext) -> Result<FitRecord, AppError> {
    let frames = load_training_set(state)?;
    let delta = energy_delta(&frames)?;

    refit_generic(
        state,
        ctx,
        Some(turbo_si_c_descriptors(delta)),
        Some(TURBO_SI_C_SIGMA.to_string()),
    )
}

/// The generic strategy with no overrides, in registry form.
pub fn refit_default(state: &dyn RefitState, ctx: &RefitContext) -> Result<FitRecord, AppError> {
    refit_generic(state, ctx, None, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FitCommand;
    use crate::io::{Structure, write_frames};
    use crate::refit::descriptors::DESCRIPTOR_SEPARATOR;
    use crate::refit::testing::MemoryState;

    #[test]
    fn turbo_descriptors_have_three_blocks_with_delta() {
        let desc = turbo_si_c_descriptors(0.25);
        let blocks: Vec<&str> = desc.split(DESCRIPTOR_SEPARATOR).collect();
        assert_eq!(blocks.len(), 3);
        assert!(blocks[0].starts_with("distance_Nb"));
        assert!(blocks[1].starts_with("soap_turbo central_index=1 n_sparse=200 delta=0.25"));
        assert!(blocks[2].starts_with("soap_turbo central_index=2 n_sparse=200 delta=0.25"));
        assert!(blocks.iter().all(|b| b.contains("delta=0.25")));
    }

    #[test]
    fn turbo_strategy_passes_its_descriptors_to_the_tool() {
        let dir = tempfile::tempdir().unwrap();
        let xyz = dir.path().join("sic.hybrid-md.xyz");
        let mut a = Structure::from_atoms(&["Si", "C"], &[[0.0, 0.0, 0.0], [1.9, 0.0, 0.0]]);
        a.set_info("QM_energy", "-10.0");
        let mut b = a.clone();
        b.set_info("QM_energy", "-12.0");
        write_frames(&xyz, &[a, b]).unwrap();

        let state = MemoryState::new(xyz, Vec::new(), None);
        let cmd = FitCommand::new("true", Vec::new());
        let record = refit_turbo_si_c(&state, &RefitContext::new(dir.path(), cmd)).unwrap();

        // Per-atom energies -5 and -6: std 0.5, delta 0.125.
        let gap = record.args.last().unwrap();
        assert!(gap.contains("soap_turbo central_index=2"), "{gap}");
        assert_eq!(gap.matches("delta=0.125").count(), 3);
        assert!(record.args.contains(&format!("default_sigma={{{TURBO_SI_C_SIGMA}}}")));
    }

    #[test]
    fn turbo_sigma_matches_the_generic_regularisation() {
        assert_eq!(TURBO_SI_C_SIGMA, crate::refit::DEFAULT_SIGMA);
    }
}
