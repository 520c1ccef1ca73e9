//! Error types for acceptance runs

use hrm_common::Role;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("Element not found: {locator} (waited {waited_ms} ms)")]
    ElementNotFound { locator: String, waited_ms: u64 },

    #[error("Timeout waiting for: {0}")]
    Timeout(String),

    #[error("Authentication failed for {role}: {reason}")]
    AuthenticationFailed { role: Role, reason: String },

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Unexpected state: {context} (observed {observed})")]
    UnexpectedState { context: String, observed: String },

    #[error("Application unreachable at {url} after {attempts} attempts")]
    AppUnreachable { url: String, attempts: usize },

    #[error("Playwright not found. Install with: npx playwright install")]
    PlaywrightNotFound,

    #[error("Playwright error: {0}")]
    Playwright(String),

    #[error("Configuration error: {0}")]
    Config(#[source] hrm_common::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl E2eError {
    /// The element or state did not show up inside its wait window
    pub fn is_absence(&self) -> bool {
        matches!(self, E2eError::ElementNotFound { .. } | E2eError::Timeout(_))
    }

    pub fn unexpected(context: impl Into<String>, observed: impl ToString) -> Self {
        E2eError::UnexpectedState {
            context: context.into(),
            observed: observed.to_string(),
        }
    }
}

impl From<hrm_common::Error> for E2eError {
    fn from(e: hrm_common::Error) -> Self {
        if e.is_validation() {
            E2eError::ValidationFailed(e.to_string())
        } else {
            E2eError::Config(e)
        }
    }
}

pub type E2eResult<T> = Result<T, E2eError>;
