//! Structured error handling and exit codes.

use serde::Serialize;
use thiserror::Error;

use crate::config::ConfigError;
use crate::duplicates::FinderError;
use crate::output::AuditError;

/// Exit codes for the dedoopsie application.
///
/// - 0: Success (completed normally, duplicates found)
/// - 1: General error (unexpected failure)
/// - 2: No duplicates found (completed normally, no duplicates)
/// - 3: Partial success (some files were skipped or failed to move)
/// - 4: Wet mode refused (confirmation missing, nothing was touched)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Success: Run completed and duplicates were found.
    Success = 0,
    /// General error: An unexpected error occurred.
    GeneralError = 1,
    /// No duplicates: Run completed but no duplicates were found.
    NoDuplicates = 2,
    /// Partial success: Run completed with skipped files or failed moves.
    PartialSuccess = 3,
    /// Wet mode was requested without both confirmations.
    WetModeRefused = 4,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "DD000",
            Self::GeneralError => "DD001",
            Self::NoDuplicates => "DD002",
            Self::PartialSuccess => "DD003",
            Self::WetModeRefused => "DD004",
        }
    }
}

/// Wet mode was requested but not confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error(
    "wet mode requires --yes-really and {}={}",
    crate::app::CONFIRM_ENV_VAR,
    crate::app::CONFIRM_VALUE
)]
pub struct WetModeRefused;

/// Code for a missing or unusable source root.
pub const CODE_SOURCE_ROOT: &str = "DD010";
/// Code for an audit log that cannot be created or written.
pub const CODE_AUDIT_LOG: &str = "DD011";
/// Code for invalid configuration.
pub const CODE_CONFIG: &str = "DD012";

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "DD001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message
    pub message: String,
    /// Messages of the underlying causes, outermost first
    pub causes: Vec<String>,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: error_code_for(err, exit_code).to_string(),
            exit_code: exit_code.as_i32(),
            message: err.to_string(),
            causes: err.chain().skip(1).map(ToString::to_string).collect(),
        }
    }
}

/// Pick the exit code for a fatal error.
#[must_use]
pub fn exit_code_for(err: &anyhow::Error) -> ExitCode {
    if err.downcast_ref::<WetModeRefused>().is_some() {
        ExitCode::WetModeRefused
    } else {
        ExitCode::GeneralError
    }
}

/// Machine-readable code for a fatal error.
///
/// Fatal causes the run can name get their own code; anything else falls
/// back to the exit code's prefix.
#[must_use]
pub fn error_code_for(err: &anyhow::Error, exit_code: ExitCode) -> &'static str {
    for cause in err.chain() {
        if cause.downcast_ref::<FinderError>().is_some() {
            return CODE_SOURCE_ROOT;
        }
        if cause.downcast_ref::<AuditError>().is_some() {
            return CODE_AUDIT_LOG;
        }
        if cause.downcast_ref::<ConfigError>().is_some() {
            return CODE_CONFIG;
        }
    }
    exit_code.code_prefix()
}
