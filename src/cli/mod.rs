//! Command-line parsing for the Hybrid-MD driver.
//!
//! The MD code calls the binary around every MD step and reads the answer
//! from the exit status, so every subcommand takes the run's seed and the
//! step commands take the MD iteration.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "hybrid-md", version, about = "Hybrid MD decision making and on-the-fly GAP refitting")]
pub struct Cli {
    /// Directory holding the run's files (defaults to the current directory).
    #[arg(long, global = true, value_name = "DIR")]
    pub workdir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start a run. Exit 0: start with the potential, 1: start with ab-initio.
    Initialise(SeedArgs),
    /// Called before each MD step. Exit status is bit-encoded:
    /// 1 ab-initio now, 2 ab-initio next, 4 update cell, 8 ab-initio forces in MD.
    PreStep(StepArgs),
    /// Called after each MD step. Exit 0: nothing changed, 1: model updated.
    PostStep(StepArgs),
    /// Refit the model once, outside the step protocol.
    Refit(SeedArgs),
}

#[derive(Debug, Parser, Clone)]
pub struct SeedArgs {
    /// Seed shared by the run's files (`<seed>.hybrid-md-*`).
    pub seed: String,
}

#[derive(Debug, Parser, Clone)]
pub struct StepArgs {
    /// Seed shared by the run's files (`<seed>.hybrid-md-*`).
    pub seed: String,

    /// Current MD iteration.
    pub md_iteration: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_step_commands() {
        let cli = Cli::parse_from(["hybrid-md", "pre-step", "sic", "12"]);
        match cli.command {
            Command::PreStep(args) => {
                assert_eq!(args.seed, "sic");
                assert_eq!(args.md_iteration, 12);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(cli.workdir.is_none());
    }

    #[test]
    fn workdir_is_global() {
        let cli = Cli::parse_from(["hybrid-md", "initialise", "sic", "--workdir", "/tmp/run"]);
        assert_eq!(cli.workdir, Some(PathBuf::from("/tmp/run")));
        assert!(matches!(cli.command, Command::Initialise(_)));
    }

    #[test]
    fn negative_iteration_is_rejected() {
        assert!(Cli::try_parse_from(["hybrid-md", "post-step", "sic", "-1"]).is_err());
    }
}
