//! Error types.
//!
//! Two layers:
//!
//! - [`FitError`] is what the fitting core returns. It separates bad inputs
//!   (caught before any numeric work) from thickness-function domain errors.
//! - [`AppError`] is what the binary reports: a message plus the process exit code.

use thiserror::Error;

/// Error returned by the fitting core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FitError {
    /// Bad parameters, bad isopachs, or an infeasible segmentation.
    #[error("invalid input: {0}")]
    Validation(String),
    /// A thickness function was evaluated outside of its model's domain.
    #[error("out of domain: {0}")]
    Domain(String),
}

impl FitError {
    pub fn validation(message: impl Into<String>) -> Self {
        FitError::Validation(message.into())
    }

    pub fn domain(message: impl Into<String>) -> Self {
        FitError::Domain(message.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, FitError::Validation(_))
    }

    pub fn is_domain(&self) -> bool {
        matches!(self, FitError::Domain(_))
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    /// Prefix the message, keeping the exit code.
    pub fn with_context(self, context: &str) -> Self {
        Self {
            exit_code: self.exit_code,
            message: format!("{context}: {}", self.message),
        }
    }
}

impl From<FitError> for AppError {
    fn from(err: FitError) -> Self {
        let exit_code = match err {
            FitError::Validation(_) => 2,
            FitError::Domain(_) => 4,
        };
        AppError::new(exit_code, err.to_string())
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
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
