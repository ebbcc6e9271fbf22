//! Application error type.
//!
//! Every fallible operation in the crate returns `AppError`. The kind decides
//! the process exit code; exit codes start at 64 so they never collide with
//! the step answers (0..=15) the binary reports to the MD driver.

/// Failure class of an `AppError`.
#[derive(Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad settings, unknown refit strategy, out-of-order step calls.
    Configuration,
    /// Filesystem or process spawning failure.
    Io,
    /// Malformed structure/settings file or missing data label.
    Format,
    /// The external fitting tool exited unsuccessfully.
    FitFailed {
        status: Option<i32>,
        stdout: String,
        stderr: String,
    },
}

impl ErrorKind {
    fn exit_code(&self) -> u8 {
        match self {
            ErrorKind::Configuration => 78,
            ErrorKind::Io => 74,
            ErrorKind::Format => 65,
            ErrorKind::FitFailed { .. } => 70,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            ErrorKind::Configuration => "Configuration",
            ErrorKind::Io => "Io",
            ErrorKind::Format => "Format",
            ErrorKind::FitFailed { .. } => "FitFailed",
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    kind: ErrorKind,
    message: String,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Io, message)
    }

    pub fn format(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Format, message)
    }

    /// Non-zero exit of the fitting tool; the message embeds its stderr.
    pub fn fit_failed(status: Option<i32>, stdout: String, stderr: String) -> Self {
        let code = status.map_or_else(|| "signal".to_string(), |c| c.to_string());
        let message = format!("gap_fit failed (exit status {code}):\n{}", stderr.trim_end());
        Self::new(
            ErrorKind::FitFailed {
                status,
                stdout,
                stderr,
            },
            message,
        )
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn is_configuration(&self) -> bool {
        self.kind == ErrorKind::Configuration
    }

    pub fn exit_code(&self) -> u8 {
        self.kind.exit_code()
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("kind", &self.kind.label())
            .field("exit_code", &self.exit_code())
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
