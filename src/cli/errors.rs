use thiserror::Error;

/// Application-specific errors for the CLI
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Sweep(#[from] xquad_sweep::Error),

    #[error("Invalid language list: {value:?}")]
    InvalidLanguages { value: String },

    #[error("Failed to initialize logging: {0}")]
    Logging(String),
}

impl AppError {
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Sweep(e) => e.exit_code(),
            _ => 1,
        }
    }
}
