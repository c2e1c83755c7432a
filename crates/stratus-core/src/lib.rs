//! # Stratus Core
//!
//! Core types, error taxonomy, and validation helpers for the Stratus
//! cache-aside data-access layer. This crate provides the foundational
//! abstractions shared by the cache engine and the service layer.

pub mod domain;
pub mod error;
pub mod result;
pub mod telemetry;
pub mod validation;

pub use domain::*;
pub use error::*;
pub use result::*;
pub use validation::*;
