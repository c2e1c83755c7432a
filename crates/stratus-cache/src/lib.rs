//! # Stratus Cache
//!
//! Cache-aside data-access layer fronting a Redis-compatible key-value
//! store. The engine collapses concurrent identical loads into a single
//! loader invocation (single-flight), enforces TTL expiry independent of
//! store-side eviction, and degrades to recomputation when the store is
//! unreachable.

pub mod clock;
pub mod codec;
pub mod engine;
pub mod entry;
pub mod key;
pub mod metrics;
pub mod store;

pub use clock::*;
pub use engine::*;
pub use entry::*;
pub use key::*;
pub use metrics::*;
pub use store::*;
