//! Error types for the ACL generator
//!
//! This module defines the error hierarchy for the acl_gen crate using `thiserror`.
//! All fallible operations return `Result<T, AclGenError>`.
//!
//! # Error Variants
//!
//! - [`AclGenError::ProjectNotFound`]: no `package.json` at the project root
//! - [`AclGenError::ProjectLoad`]: a project file exists but cannot be interpreted
//! - [`AclGenError::ModelNotFound`]: the selected model has no definition file
//! - [`AclGenError::Validation`]: a model rejected an ACL entry
//! - [`AclGenError::InvalidAnswer`]: a prompt answer is not a valid token
//! - [`AclGenError::Prompt`]: the interactive prompt failed
//! - [`AclGenError::HelperNotFound`]: no method discovery helper is available
//! - [`AclGenError::Discovery`]: the discovery helper misbehaved
//! - [`AclGenError::Process`]: the discovery helper exited with a non-zero code
//! - [`AclGenError::JsonDecode`]: JSON parsing errors (auto-converts from `serde_json::Error`)
//! - [`AclGenError::Io`]: filesystem and process I/O (auto-converts from `std::io::Error`)
//!
//! # Example
//!
//! ```rust
//! use acl_gen::error::AclGenError;
//!
//! fn example() -> Result<(), AclGenError> {
//!     // Auto-conversion from std::io::Error
//!     let _file = std::fs::read_to_string("/nonexistent")?;
//!
//!     // Manual construction
//!     return Err(AclGenError::ModelNotFound("Car".to_string()));
//! }
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// The main error type for all acl_gen operations
///
/// Discovery-related variants never reach the user: the generator falls back
/// to the default method catalog. `Validation` is reported once per run, and
/// everything else aborts the run.
#[derive(Error, Debug)]
pub enum AclGenError {
    /// The directory does not look like a project (no `package.json`)
    #[error("No project found at {0}: package.json is missing")]
    ProjectNotFound(PathBuf),

    /// A project file could not be interpreted
    #[error("Failed to load project: {0}")]
    ProjectLoad(String),

    /// The named model has no definition in the project
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// A model definition refused the ACL entry
    #[error("Invalid ACL for model {model}: {reason}")]
    Validation {
        /// Name of the model whose write path rejected the entry
        model: String,
        /// Human-readable validation failure
        reason: String,
    },

    /// A prompt produced a value outside the allowed token set
    #[error("Invalid answer for {question}: {value}")]
    InvalidAnswer {
        /// Question name (e.g. "permission")
        question: String,
        /// The rejected value
        value: String,
    },

    /// The interactive prompt could not be displayed or read
    #[error("Prompt failed: {0}")]
    Prompt(String),

    /// No method discovery helper could be located
    #[error("Method discovery helper not found. Install node, set ACL_GEN_DISCOVERY_HELPER or pass --discovery-helper.")]
    HelperNotFound,

    /// The discovery helper replied with something other than a method list
    #[error("Method discovery failed: {0}")]
    Discovery(String),

    /// The discovery helper exited with a non-zero exit code
    #[error("Discovery helper exited with code {code}: {stderr}")]
    Process {
        /// The exit code returned by the helper
        code: i32,
        /// Standard error output from the failed helper
        stderr: String,
    },

    /// Failed to parse JSON
    #[error("Failed to parse JSON: {0}")]
    JsonDecode(#[from] serde_json::Error),

    /// I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<dialoguer::Error> for AclGenError {
    fn from(err: dialoguer::Error) -> Self {
        AclGenError::Prompt(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_not_found_message() {
        let err = AclGenError::ProjectNotFound(PathBuf::from("/tmp/app"));
        assert_eq!(
            err.to_string(),
            "No project found at /tmp/app: package.json is missing"
        );
    }

    #[test]
    fn test_validation_message() {
        let err = AclGenError::Validation {
            model: "Car".to_string(),
            reason: "principalId is required".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid ACL for model Car: principalId is required"
        );
    }

    #[test]
    fn test_invalid_answer_message() {
        let err = AclGenError::InvalidAnswer {
            question: "permission".to_string(),
            value: "MAYBE".to_string(),
        };
        assert!(err.to_string().contains("permission"));
        assert!(err.to_string().contains("MAYBE"));
    }

    #[test]
    fn test_process_error_message() {
        let err = AclGenError::Process {
            code: 1,
            stderr: "cannot find module".to_string(),
        };
        assert!(err.to_string().contains("code 1"));
        assert!(err.to_string().contains("cannot find module"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: AclGenError = io_err.into();
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_result_with_question_mark_json() {
        fn parse_json() -> Result<serde_json::Value, AclGenError> {
            Ok(serde_json::from_str("{ invalid }")?)
        }

        let result = parse_json();
        assert!(matches!(result.unwrap_err(), AclGenError::JsonDecode(_)));
    }
}
