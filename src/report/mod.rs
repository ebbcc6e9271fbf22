//! Reporting utilities: error tables appended to the run log.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use crate::error::AppError;

pub mod format;

pub use format::*;

/// Append text to the run log, creating it on first use.
pub fn append_to_log(path: &Path, text: &str) -> Result<(), AppError> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| AppError::io(format!("Failed to open log '{}': {e}", path.display())))?;
    file.write_all(text.as_bytes())
        .map_err(|e| AppError::io(format!("Failed to write log '{}': {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_keeps_earlier_tables() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("run.hybrid-md-log");
        append_to_log(&log, "first\n").unwrap();
        append_to_log(&log, "second\n").unwrap();
        assert_eq!(std::fs::read_to_string(log).unwrap(), "first\nsecond\n");
    }
}
