//! HRM Acceptance Common Library
//!
//! Domain model, configuration and synthetic data shared by the harness.

pub mod config;
pub mod datagen;
pub mod error;
pub mod types;

pub use config::{ConsistencyConfig, HarnessConfig, RoleTable, WaitConfig};
pub use datagen::TestDataGenerator;
pub use error::{Error, Result};
pub use types::*;

/// Harness version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
