use serde::{Deserialize, Serialize};
use std::fmt;

/// Single structured error shape used across extraction layers.
///
/// The public extraction entry point never returns one of these; recoverable
/// failures are downgraded to `ExtractionWarning` entries on the result. The
/// error form exists for the internal fallible steps (strict/repaired block
/// parsing) so failure reasons carry a stable code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppError {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
}

impl AppError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {}
