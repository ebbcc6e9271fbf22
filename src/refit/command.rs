//! `gap_fit` argument list and process execution.
//!
//! Arguments are passed to the child as discrete `key=value` strings; no shell
//! is involved, so descriptor text needs no quoting. Composite values keep the
//! tool's brace syntax: `default_sigma={...}` and `gap={...}`.

use std::path::Path;
use std::process::Command;

use log::{debug, warn};

use crate::config::FitCommand;
use crate::error::AppError;
use crate::domain::labels::{QM_ENERGY, QM_FORCES, QM_VIRIAL};

/// Canonical model file name.
pub const GP_NAME: &str = "GAP.xml";
/// Training set handed to `gap_fit`; rewritten on every fit.
pub const TRAIN_FILE: &str = "train.xyz";
/// Energy, force, virial and hessian regularization.
pub const DEFAULT_SIGMA: &str = "0.005 0.050 0.1 1.0";

/// Captured output of a successful fit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FitOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Build the `gap_fit` arguments for the given sigma and descriptor strings.
pub fn build_fit_args(default_sigma: &str, descriptor_strs: &str) -> Vec<String> {
    vec![
        format!("at_file={TRAIN_FILE}"),
        format!("gp_file={GP_NAME}"),
        format!("energy_parameter_name={QM_ENERGY}"),
        format!("force_parameter_name={QM_FORCES}"),
        format!("virial_parameter_name={QM_VIRIAL}"),
        "sparse_jitter=1.0e-8".to_string(),
        "do_copy_at_file=F".to_string(),
        "sparse_separate_file=F".to_string(),
        format!("default_sigma={{{}}}", default_sigma.trim()),
        "e0_method=average".to_string(),
        format!("gap={{{}}}", descriptor_strs.trim()),
    ]
}

impl FitCommand {
    /// Run the tool in `workdir` and wait for it; non-zero exit is an error.
    pub fn run(&self, workdir: &Path, args: &[String]) -> Result<FitOutput, AppError> {
        debug!("running {} {:?} {:?}", self.program, self.leading_args, args);

        let output = Command::new(&self.program)
            .args(&self.leading_args)
            .args(args)
            .current_dir(workdir)
            .output()
            .map_err(|e| AppError::io(format!("Failed to start fitting tool '{}': {e}", self.program)))?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            warn!("{} exited with {}", self.program, output.status);
            return Err(AppError::fit_failed(output.status.code(), stdout, stderr));
        }

        Ok(FitOutput { stdout, stderr })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn sh(script: &str) -> FitCommand {
        FitCommand::new("sh", vec!["-c".to_string(), script.to_string(), "gap_fit".to_string()])
    }

    #[test]
    fn args_use_fixed_flags_and_brace_values() {
        let args = build_fit_args(DEFAULT_SIGMA, "a x=1 : b y=2");
        assert_eq!(args[0], "at_file=train.xyz");
        assert_eq!(args[1], "gp_file=GAP.xml");
        assert!(args.contains(&"energy_parameter_name=QM_energy".to_string()));
        assert!(args.contains(&"default_sigma={0.005 0.050 0.1 1.0}".to_string()));
        assert!(args.contains(&"e0_method=average".to_string()));
        assert_eq!(args.last().unwrap(), "gap={a x=1 : b y=2}");
    }

    #[test]
    fn run_captures_both_streams() {
        let dir = tempfile::tempdir().unwrap();
        let out = sh("echo fitted \"$1\"; echo note >&2")
            .run(dir.path(), &["at_file=train.xyz".to_string()])
            .unwrap();
        assert_eq!(out.stdout, "fitted at_file=train.xyz\n");
        assert_eq!(out.stderr, "note\n");
    }

    #[test]
    fn nonzero_exit_carries_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let err = sh("echo partial; echo 'SYSTEM ABORT: bad sparse' >&2; exit 2")
            .run(dir.path(), &[])
            .unwrap_err();
        assert!(err.to_string().contains("SYSTEM ABORT: bad sparse"));
        match err.kind() {
            ErrorKind::FitFailed { status, stdout, .. } => {
                assert_eq!(*status, Some(2));
                assert_eq!(stdout, "partial\n");
            }
            _ => panic!("expected FitFailed"),
        }
    }

    #[test]
    fn missing_program_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = FitCommand::new("definitely-not-gap-fit-xyz", Vec::new())
            .run(dir.path(), &[])
            .unwrap_err();
        assert_eq!(err.exit_code(), 74);
    }
}
