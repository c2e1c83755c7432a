//! # Stratus Service
//!
//! Service facade over the cache-aside engine: validated request DTOs, the
//! cached user service, hot-key access tracking, and the refresh-ahead
//! scheduler.

pub mod bootstrap;
pub mod cached_user_service;
pub mod dto;
pub mod refresher;
pub mod repository;
pub mod tracker;
pub mod user_service;

pub use bootstrap::*;
pub use cached_user_service::*;
pub use dto::*;
pub use refresher::*;
pub use repository::*;
pub use tracker::*;
pub use user_service::*;
