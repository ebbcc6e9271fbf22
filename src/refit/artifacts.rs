//! Timestamped files around a fit: model backups and captured output.
//!
//! Names embed the unix time with microsecond resolution, e.g.
//! `save__1718031234.567890__GAP.xml`. If a name is already taken the
//! timestamp is advanced one microsecond at a time, so existing files are
//! never overwritten.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use log::info;

use crate::error::AppError;

/// Format microseconds since the epoch as `<secs>.<micros>`.
pub fn unix_time(micros: i64) -> String {
    format!("{}.{:06}", micros.div_euclid(1_000_000), micros.rem_euclid(1_000_000))
}

/// First non-existing path `workdir/name(ts)` at or after the current time.
pub fn unique_timestamped(workdir: &Path, name: impl Fn(&str) -> String) -> PathBuf {
    let mut micros = Utc::now().timestamp_micros();
    loop {
        let candidate = workdir.join(name(&unix_time(micros)));
        if !candidate.exists() {
            return candidate;
        }
        micros += 1;
    }
}

/// Move an existing model out of the way; returns the backup path.
pub fn backup_model(workdir: &Path, gp_name: &str) -> Result<Option<PathBuf>, AppError> {
    let model = workdir.join(gp_name);
    if !model.is_file() {
        return Ok(None);
    }

    let backup = unique_timestamped(workdir, |ts| format!("save__{ts}__{gp_name}"));
    fs::rename(&model, &backup).map_err(|e| {
        AppError::io(format!(
            "Failed to back up '{}' to '{}': {e}",
            model.display(),
            backup.display()
        ))
    })?;
    info!("backed up previous model to {}", backup.display());
    Ok(Some(backup))
}

/// Write one captured stream (`stdout` / `stderr`) of the fit.
pub fn write_capture(workdir: &Path, stream: &str, gp_name: &str, text: &str) -> Result<PathBuf, AppError> {
    let path = unique_timestamped(workdir, |ts| format!("{stream}_{gp_name}_at_{ts}__.txt"));
    fs::write(&path, text)
        .map_err(|e| AppError::io(format!("Failed to write '{}': {e}", path.display())))?;
    Ok(path)
}
