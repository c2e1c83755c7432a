//! # Stratus Config
//!
//! Layered configuration for the Stratus cache layer: TOML files,
//! `.env`, and `STRATUS_`-prefixed environment variables.

pub mod app_config;
pub mod loader;
pub mod validation;

pub use app_config::*;
pub use loader::*;
pub use validation::*;
