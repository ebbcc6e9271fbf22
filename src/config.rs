//! Environment configuration.
//!
//! The only setting taken from the environment is the fitting tool itself.
//! `HYBRID_MD_GAP_FIT` holds a whitespace-separated program plus leading
//! arguments (e.g. `mpirun -np 4 gap_fit`); unset means plain `gap_fit`.
//! A `.env` file in the working directory is honoured.

use crate::error::AppError;

pub const GAP_FIT_ENV: &str = "HYBRID_MD_GAP_FIT";
const DEFAULT_PROGRAM: &str = "gap_fit";

/// How to launch the external fitting tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FitCommand {
    pub program: String,
    /// Passed before the generated `key=value` arguments.
    pub leading_args: Vec<String>,
}

impl Default for FitCommand {
    fn default() -> Self {
        Self {
            program: DEFAULT_PROGRAM.to_string(),
            leading_args: Vec::new(),
        }
    }
}

impl FitCommand {
    pub fn new(program: impl Into<String>, leading_args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            leading_args,
        }
    }

    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        match std::env::var(GAP_FIT_ENV) {
            Ok(value) => Self::parse(&value),
            Err(std::env::VarError::NotPresent) => Ok(Self::default()),
            Err(std::env::VarError::NotUnicode(_)) => {
                Err(AppError::config(format!("{GAP_FIT_ENV} is not valid UTF-8.")))
            }
        }
    }

    /// Split a command line on whitespace; no shell quoting is interpreted.
    pub fn parse(value: &str) -> Result<Self, AppError> {
        let mut parts = value.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .ok_or_else(|| AppError::config(format!("{GAP_FIT_ENV} is set but empty.")))?;
        Ok(Self {
            program,
            leading_args: parts.collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_splits_program_and_leading_args() {
        let cmd = FitCommand::parse("mpirun -np 4 gap_fit").unwrap();
        assert_eq!(cmd.program, "mpirun");
        assert_eq!(cmd.leading_args, vec!["-np", "4", "gap_fit"]);
    }

    #[test]
    fn empty_value_is_a_configuration_error() {
        let err = FitCommand::parse("   ").unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn default_is_plain_gap_fit() {
        let cmd = FitCommand::default();
        assert_eq!(cmd.program, "gap_fit");
        assert!(cmd.leading_args.is_empty());
    }
}
