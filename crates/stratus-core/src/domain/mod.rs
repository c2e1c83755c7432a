//! Domain model.

pub mod user;

pub use user::*;
