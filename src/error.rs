//! Crate-level error type and `Result` alias for stable, structured error handling.
//! Setup failures (working directory, runtime environment, configuration) and
//! evaluator failures are kept apart so callers can map them to exit codes.
use std::path::PathBuf;

use thiserror::Error;

use crate::types::{ExitState, LanguageCode};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config file {path:?}: {reason}")]
    InvalidConfig { path: PathBuf, reason: String },

    #[error("Invalid argument: {arg}={value}")]
    InvalidArgument { arg: &'static str, value: String },

    #[error("Language list is empty, nothing to evaluate")]
    EmptyLanguages,

    #[error("Cannot enter working directory {path:?}: {source}")]
    WorkingDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot activate runtime environment {path:?}: {reason}")]
    EnvironmentActivation { path: PathBuf, reason: String },

    #[error("Failed to start evaluator `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Evaluation for {language} failed: {exit}")]
    EvaluatorFailed {
        language: LanguageCode,
        exit: ExitState,
    },
}

impl Error {
    /// Exit status a shell running the same sweep would report for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::EvaluatorFailed { exit, .. } => exit.shell_code(),
            Error::Spawn { source, .. } => match source.kind() {
                std::io::ErrorKind::NotFound => 127,
                _ => 126,
            },
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluator_failure_keeps_child_code() {
        let err = Error::EvaluatorFailed {
            language: LanguageCode::new("xquad.de"),
            exit: ExitState::Code(3),
        };
        assert_eq!(err.exit_code(), 3);
        assert_eq!(err.to_string(), "Evaluation for xquad.de failed: exit code 3");
    }

    #[test]
    fn spawn_failures_follow_shell_conventions() {
        let missing = Error::Spawn {
            program: "nope".into(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        let denied = Error::Spawn {
            program: "nope".into(),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert_eq!(missing.exit_code(), 127);
        assert_eq!(denied.exit_code(), 126);
        assert_eq!(Error::EmptyLanguages.exit_code(), 1);
    }
}
