//! # Error Handling
//!
//! Provides the unified `AppError` enum used across the workspace.
//!
//! Every variant is fatal for the run that produced it. Recoverable conditions
//! (unresolved include operands, unknown parameter types, bad default values)
//! are logged through `tracing` instead and never reach this type.

use derive_more::{Display, From};
use std::path::PathBuf;

/// The Global Error Enum.
///
/// We use `derive_more` for boilerplate.
/// Note: String errors default to `General`.
#[derive(Debug, Display, From)]
pub enum AppError {
    /// Wrapper for standard IO errors.
    #[display("IO Error: {_0}")]
    Io(std::io::Error),

    /// A Go source file (or package directory) could not be read or parsed.
    #[from(ignore)]
    #[display("Parse Error in '{}': {message}", path.display())]
    Parse {
        /// The offending file or directory.
        path: PathBuf,
        /// What went wrong.
        message: String,
    },

    /// A malformed `@router` or `@Param` tag on a controller method.
    #[from(ignore)]
    #[display("Annotation Error on {controller}_{function}: {message}")]
    Annotation {
        /// Receiver type of the documented method.
        controller: String,
        /// Name of the documented method.
        function: String,
        /// What went wrong.
        message: String,
    },

    /// The route registration entry point does not have the expected shape.
    #[from(ignore)]
    #[display("Registration Error: {_0}")]
    Registration(String),

    /// A required environment setting (GOPATH, GOROOT, ...) is missing.
    #[from(ignore)]
    #[display("Missing Environment: {_0}")]
    MissingEnvironment(String),

    /// Failures reported by the snapshot store.
    #[from(ignore)]
    #[display("Store Error: {_0}")]
    Store(String),

    /// Invalid configuration file or values.
    #[from(ignore)]
    #[display("Config Error: {_0}")]
    Config(String),

    /// Generic errors.
    #[display("General Error: {_0}")]
    General(String),
}

/// Manual implementation of the standard Error trait.
impl std::error::Error for AppError {}

/// Helper type alias for Result using AppError.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Shorthand for a parse failure attached to a path.
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        AppError::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Shorthand for an annotation failure on `controller.function`.
    pub fn annotation(controller: &str, function: &str, message: impl Into<String>) -> Self {
        AppError::Annotation {
            controller: controller.to_string(),
            function: function.to_string(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_io_conversion() {
        let io_err = Error::new(ErrorKind::Other, "test");
        let app_err: AppError = io_err.into();
        assert!(matches!(app_err, AppError::Io(_)));
    }

    #[test]
    fn test_string_conversion() {
        let msg = String::from("something wrong");
        let app_err: AppError = msg.into();
        match app_err {
            AppError::General(s) => assert_eq!(s, "something wrong"),
            _ => panic!("String should convert to AppError::General"),
        }
    }

    #[test]
    fn test_annotation_display_names_controller_and_function() {
        let err = AppError::annotation(
            "UserController",
            "Get",
            "@Param should have at least 4 params",
        );
        assert_eq!(
            err.to_string(),
            "Annotation Error on UserController_Get: @Param should have at least 4 params"
        );
    }

    #[test]
    fn test_parse_display_includes_path() {
        let err = AppError::parse("controllers/user.go", "syntax error at line 3");
        let text = err.to_string();
        assert!(text.contains("controllers/user.go"));
        assert!(text.contains("syntax error at line 3"));
    }
}
