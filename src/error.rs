//! Structured error handling and exit codes.

use serde::Serialize;

/// Exit codes for the fileinventory application.
///
/// - 0: Success (rows exported)
/// - 1: General error (unexpected failure)
/// - 2: No files found (nothing matched, nothing exported)
/// - 3: Transport failure (network share became unreachable during the walk)
/// - 130: Interrupted by user (Ctrl+C)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Success: rows were exported.
    Success = 0,
    /// General error: An unexpected error occurred.
    GeneralError = 1,
    /// No files: the scan completed but found nothing to export.
    NoFiles = 2,
    /// Transport failure: too many consecutive errors on a network share.
    TransportFailure = 3,
    /// Interrupted: Scan was interrupted by user (Ctrl+C).
    Interrupted = 130,
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
            Self::Success => "FI000",
            Self::GeneralError => "FI001",
            Self::NoFiles => "FI002",
            Self::TransportFailure => "FI003",
            Self::Interrupted => "FI130",
        }
    }

    /// Exit code for an error returned by the application.
    #[must_use]
    pub fn for_error(err: &anyhow::Error) -> Self {
        let transport = err.chain().any(|cause| {
            matches!(
                cause.downcast_ref::<crate::scanner::ScanError>(),
                Some(crate::scanner::ScanError::TransportFailure { .. })
            )
        });
        if transport {
            Self::TransportFailure
        } else {
            Self::GeneralError
        }
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "FI001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message
    pub message: String,
    /// Whether the operation was interrupted
    pub interrupted: bool,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: format!("{err:#}"),
            interrupted: exit_code == ExitCode::Interrupted,
        }
    }
}
