#![deny(missing_docs)]

//! # CLI Errors
//!
//! Error types for the CLI crate.

use derive_more::{Display, From};
use validgen_core::AppError;

/// Main error enum for CLI operations.
#[derive(Debug, Display, From)]
pub enum CliError {
    /// IO Error wrapper.
    #[display("IO Error: {}", _0)]
    Io(std::io::Error),

    /// Failure reported by the analysis or generation core.
    #[display("{}", _0)]
    Core(AppError),

    /// The route table could not be serialized.
    #[from(ignore)]
    #[display("Output Error: {}", _0)]
    Output(String),
}

/// Manual implementation of the standard Error trait.
///
/// Implemented by hand so `source()` does not need every variant payload to
/// be an error itself.
impl std::error::Error for CliError {}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Output(e.to_string())
    }
}

impl From<serde_yaml::Error> for CliError {
    fn from(e: serde_yaml::Error) -> Self {
        CliError::Output(e.to_string())
    }
}

/// Result type alias.
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_error_passes_through() {
        let err: CliError = AppError::Registration("no namespace".into()).into();
        assert_eq!(err.to_string(), "Registration Error: no namespace");
    }

    #[test]
    fn test_io_error_display() {
        let err: CliError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert_eq!(err.to_string(), "IO Error: gone");
    }
}
