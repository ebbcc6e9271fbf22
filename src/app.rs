//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - sets up logging
//! - parses CLI arguments
//! - runs one step of the Hybrid-MD protocol
//! - prints the one-line step summary the MD driver logs
//! - returns the step's answer as the exit status

use std::path::{Path, PathBuf};

use clap::Parser;

use crate::cli::{Command, SeedArgs, StepArgs};
use crate::config::FitCommand;
use crate::error::AppError;
use crate::refit::{RefitContext, RefitRegistry};

pub mod steps;

/// Entry point for the `hybrid-md` binary; returns the exit status.
pub fn run() -> Result<u8, AppError> {
    init_logging();

    let cli = crate::cli::Cli::parse();
    let workdir = cli.workdir.unwrap_or_else(|| PathBuf::from("."));

    match cli.command {
        Command::Initialise(args) => handle_initialise(&workdir, args),
        Command::PreStep(args) => handle_pre_step(&workdir, args),
        Command::PostStep(args) => handle_post_step(&workdir, args),
        Command::Refit(args) => handle_refit(&workdir, args),
    }
}

fn init_logging() {
    // Step summaries go to stdout; diagnostics stay on stderr.
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .try_init();
}

fn refit_context(workdir: &Path) -> Result<RefitContext, AppError> {
    Ok(RefitContext::new(workdir, FitCommand::from_env()?))
}

fn handle_initialise(workdir: &Path, args: SeedArgs) -> Result<u8, AppError> {
    let (state, ab_initio_first) = steps::initialise(workdir, &args.seed)?;
    let code = u8::from(ab_initio_first);
    println!(
        "Hybrid-MD: INIT Step, exit: {code}  -- num_initial_steps {}",
        state.settings().num_initial_steps
    );
    Ok(code)
}

fn handle_pre_step(workdir: &Path, args: StepArgs) -> Result<u8, AppError> {
    let d = steps::pre_step(workdir, &args.seed, args.md_iteration)?;
    let code = d.exit_code();
    println!(
        "Hybrid-MD:  PRE Step, exit:{code:4}, md_iteration:{:3}  --> {} {} {} {}",
        args.md_iteration,
        d.do_ab_initio,
        d.next_ab_initio,
        d.do_update_cell,
        d.use_pw_forces,
    );
    Ok(code)
}

fn handle_post_step(workdir: &Path, args: StepArgs) -> Result<u8, AppError> {
    let registry = RefitRegistry::with_builtins();
    let outcome = steps::post_step(workdir, &args.seed, args.md_iteration, &registry, || {
        refit_context(workdir)
    })?;
    let code = outcome.exit_code();
    println!(
        "Hybrid-MD: POST Step, exit:{code:4}, md_iteration:{:3}",
        args.md_iteration
    );
    Ok(code)
}

fn handle_refit(workdir: &Path, args: SeedArgs) -> Result<u8, AppError> {
    let ctx = refit_context(workdir)?;
    let registry = RefitRegistry::with_builtins();
    let record = steps::refit_now(workdir, &args.seed, &registry, &ctx)?;
    println!(
        "Hybrid-MD: REFIT, {} structures -> {}",
        record.n_structures,
        record.model.display()
    );
    Ok(0)
}
