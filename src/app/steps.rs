//! Step logic shared by the `initialise`, `pre-step`, `post-step` and `refit`
//! commands.
//!
//! Each function loads the run state from disk, decides, and writes the state
//! back; the caller only turns the returned outcome into output and an exit
//! code.

use std::path::Path;

use log::info;

use crate::domain::InputSettings;
use crate::error::AppError;
use crate::monitor::ErrorReport;
use crate::refit::{FitRecord, RefitContext, RefitRegistry};
use crate::report::{append_to_log, format_cumulative_table, format_error_table};
use crate::state::HybridMd;

/// What the MD code should do in the coming step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreStepDecision {
    pub do_ab_initio: bool,
    pub next_ab_initio: bool,
    pub do_update_cell: bool,
    pub use_pw_forces: bool,
    pub do_comparison: bool,
    pub do_update_model: bool,
}

impl PreStepDecision {
    /// Bit-encoded answer: 1 ab-initio now, 2 ab-initio next, 4 update cell,
    /// 8 use ab-initio forces in MD.
    pub fn exit_code(&self) -> u8 {
        [
            (1, self.do_ab_initio),
            (2, self.next_ab_initio),
            (4, self.do_update_cell),
            (8, self.use_pw_forces),
        ]
        .iter()
        .filter(|(_, on)| *on)
        .map(|(bit, _)| bit)
        .sum()
    }
}

/// Decide a pre-step from the iteration number alone.
pub fn decide_pre_step(md_iteration: usize, settings: &InputSettings) -> PreStepDecision {
    let initial = settings.num_initial_steps;
    let mut d = PreStepDecision::default();

    if md_iteration < initial {
        // No model yet: ab-initio until the initial phase is over.
        d.do_ab_initio = true;
        d.next_ab_initio = true;
    } else if md_iteration == initial {
        // Last initial step: fit the first model on its result.
        d.do_ab_initio = true;
        d.do_update_model = true;
    } else if (md_iteration - initial) % settings.check_interval == 0 {
        d.do_ab_initio = true;
        d.do_update_cell = true;
        d.do_comparison = true;
    }
    d
}

/// Start a run; `true` means the first step is ab-initio.
pub fn initialise(workdir: &Path, seed: &str) -> Result<(HybridMd, bool), AppError> {
    let mut state = HybridMd::new(workdir, seed, None)?;
    state.carried.next_is_pre_step = true;
    state.dump()?;
    let ab_initio_first = state.settings().num_initial_steps > 0;
    Ok((state, ab_initio_first))
}

pub fn pre_step(workdir: &Path, seed: &str, md_iteration: usize) -> Result<PreStepDecision, AppError> {
    let mut state = HybridMd::new(workdir, seed, Some(md_iteration))?;
    state.load()?;
    if !state.carried.next_is_pre_step {
        return Err(AppError::config(
            "Hybrid MD steps called in the wrong order, expected post-step",
        ));
    }
    state.reset();

    let decision = decide_pre_step(md_iteration, state.settings());
    if decision.do_update_model && !state.settings().can_update {
        return Err(AppError::config(
            "Tried to update model, but input settings do not allow it!",
        ));
    }

    state.carried.next_ab_initio = decision.next_ab_initio;
    state.carried.next_is_pre_step = false;
    state.carried.do_comparison = decision.do_comparison;
    state.carried.do_update_model = decision.do_update_model;
    state.dump()?;

    Ok(decision)
}

/// Result of a post-step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostStepOutcome {
    /// `None` when this was not a comparison step.
    pub tolerances_met: Option<bool>,
    pub fit: Option<FitRecord>,
}

impl PostStepOutcome {
    /// 1 if the model was updated, else 0.
    pub fn exit_code(&self) -> u8 {
        u8::from(self.fit.is_some())
    }
}

/// `make_ctx` is only called when the model is refitted.
pub fn post_step<F>(
    workdir: &Path,
    seed: &str,
    md_iteration: usize,
    registry: &RefitRegistry,
    make_ctx: F,
) -> Result<PostStepOutcome, AppError>
where
    F: FnOnce() -> Result<RefitContext, AppError>,
{
    let mut state = HybridMd::new(workdir, seed, Some(md_iteration))?;
    state.load()?;
    if state.carried.next_is_pre_step {
        return Err(AppError::config(
            "Hybrid MD steps called in the wrong order, expected pre-step",
        ));
    }

    let mut tolerances_met = None;
    if state.carried.do_comparison {
        let frames = state.read_trajectory()?;
        let report = ErrorReport::from_frames(&frames)?;
        let met = report.tolerances_met(state.tolerances());
        if !met && state.settings().can_update {
            state.carried.do_update_model = true;
        }
        tolerances_met = Some(met);

        let mut text = format_error_table(
            state.md_iteration(),
            &report,
            state.tolerances(),
            state.carried.do_update_model,
        );
        text.push_str(&format_cumulative_table(&report.cumulative));
        append_to_log(&state.log_filename(), &text)?;
    }

    let fit = if state.carried.do_update_model {
        info!("updating model at MD iteration {md_iteration}");
        let ctx = make_ctx()?;
        Some(registry.resolve_and_run(&state, &ctx)?)
    } else {
        None
    };

    state.carried.next_is_pre_step = true;
    state.dump()?;

    Ok(PostStepOutcome { tolerances_met, fit })
}

/// Refit once, outside the step protocol.
pub fn refit_now(workdir: &Path, seed: &str, registry: &RefitRegistry, ctx: &RefitContext) -> Result<FitRecord, AppError> {
    let state = HybridMd::new(workdir, seed, None)?;
    registry.resolve_and_run(&state, ctx)
}
