//! Shared types and enums used across the sweep driver.
//! Includes `LanguageCode`, the default `XQUAD_LANGUAGES`, `FailurePolicy`
//! and `ExitState`.
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// The XQuAD configurations evaluated by default, in execution order.
pub const XQUAD_LANGUAGES: [&str; 12] = [
    "xquad.en", "xquad.ar", "xquad.de", "xquad.zh", "xquad.vi", "xquad.es", "xquad.hi",
    "xquad.el", "xquad.th", "xquad.tr", "xquad.ru", "xquad.ro",
];

/// Dataset configuration name handed to the evaluator as `--language`.
/// Forwarded verbatim; the evaluator decides whether it is valid.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LanguageCode(String);

impl LanguageCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The default twelve XQuAD languages
    pub fn xquad_defaults() -> Vec<LanguageCode> {
        XQUAD_LANGUAGES.iter().map(|code| LanguageCode::new(*code)).collect()
    }
}

impl std::fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for LanguageCode {
    fn from(code: &str) -> Self {
        LanguageCode::new(code)
    }
}

/// What the sweep does after an evaluator run fails
#[derive(
    Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Abort the remaining languages on the first failure
    #[default]
    FailFast,
    /// Record the failure and keep going with the next language
    Continue,
}

impl std::fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailurePolicy::FailFast => write!(f, "fail-fast"),
            FailurePolicy::Continue => write!(f, "continue"),
        }
    }
}

/// How an evaluator process ended
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ExitState {
    Success,
    Code(i32),
    Signal(i32),
}

impl ExitState {
    pub fn from_status(status: std::process::ExitStatus) -> Self {
        if status.success() {
            return ExitState::Success;
        }
        if let Some(code) = status.code() {
            return ExitState::Code(code);
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return ExitState::Signal(signal);
            }
        }
        ExitState::Code(1)
    }

    pub fn success(&self) -> bool {
        matches!(self, ExitState::Success)
    }

    /// Status as a POSIX shell reports it: signals map to 128 + signo
    pub fn shell_code(&self) -> i32 {
        match self {
            ExitState::Success => 0,
            ExitState::Code(code) => *code,
            ExitState::Signal(signal) => 128 + signal,
        }
    }
}

impl std::fmt::Display for ExitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExitState::Success => write!(f, "success"),
            ExitState::Code(code) => write!(f, "exit code {}", code),
            ExitState::Signal(signal) => write!(f, "killed by signal {}", signal),
        }
    }
}
