//! The generic refit: a two-body + SOAP model that works as a first try for
//! any system. Specialized strategies reuse it by passing their own
//! descriptor and sigma strings.

use log::info;

use crate::error::AppError;
use crate::io::write_frames;
use crate::refit::artifacts::{backup_model, write_capture};
use crate::refit::command::{DEFAULT_SIGMA, GP_NAME, TRAIN_FILE, build_fit_args};
use crate::refit::descriptors::{energy_delta, join_blocks, soap, two_body};
use crate::refit::{FitRecord, RefitContext, load_training_set};
use crate::state::RefitState;

/// Refit `GAP.xml` in `ctx.workdir`.
///
/// `descriptor_strs` is the composite descriptor value without the enclosing
/// braces, blocks separated by `" : "`. `default_sigma` is four numbers
/// separated by spaces. Either falls back to the generic choice when `None`.
pub fn refit_generic(
    state: &dyn RefitState,
    ctx: &RefitContext,
    descriptor_strs: Option<String>,
    default_sigma: Option<String>,
) -> Result<FitRecord, AppError> {
    let default_sigma = default_sigma.unwrap_or_else(|| DEFAULT_SIGMA.to_string());
    let frames = load_training_set(state)?;

    let descriptor_strs = match descriptor_strs {
        Some(d) => d,
        None => {
            let delta = energy_delta(&frames)?;
            join_blocks(&[two_body(delta), soap(delta)])
        }
    };

    let backup = backup_model(&ctx.workdir, GP_NAME)?;

    let training_file = ctx.workdir.join(TRAIN_FILE);
    write_frames(&training_file, &frames)?;

    let args = build_fit_args(&default_sigma, &descriptor_strs);
    info!("fitting {GP_NAME} on {} structures", frames.len());
    let output = ctx.command.run(&ctx.workdir, &args)?;

    let stdout_file = write_capture(&ctx.workdir, "stdout", GP_NAME, &output.stdout)?;
    let stderr_file = write_capture(&ctx.workdir, "stderr", GP_NAME, &output.stderr)?;
    info!("fit finished, output in {}", stdout_file.display());

    Ok(FitRecord {
        args,
        model: ctx.workdir.join(GP_NAME),
        backup,
        training_file,
        n_structures: frames.len(),
        stdout_file,
        stderr_file,
    })
}
