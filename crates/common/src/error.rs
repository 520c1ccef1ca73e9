//! Error types for the HRM harness model

use thiserror::Error;

/// Result type alias using the harness model Error
pub type Result<T> = std::result::Result<T, Error>;

/// Model and configuration errors
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid date range: from {from} is after to {to}")]
    InvalidDateRange { from: String, to: String },

    #[error("Invalid employee: {0}")]
    InvalidEmployee(String),

    #[error("Unknown {kind}: {value}")]
    UnknownVariant { kind: &'static str, value: String },
}

impl Error {
    /// Business-rule violations a page refuses to submit, as opposed to
    /// infrastructure failures.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::InvalidDateRange { .. } | Error::InvalidEmployee(_) | Error::UnknownVariant { .. }
        )
    }
}
