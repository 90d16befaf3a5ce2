//! State shared between refresh cycles
//!
//! # Components
//!
//! - `RateLimiter`: advisory guard on how often the listing is fetched
//! - `SnapshotStore`: atomically swapped snapshot read by the display layer

mod rate_limiter;
mod snapshot;

// Re-export main types
pub use rate_limiter::{is_fetch_allowed, RateLimiter};
pub use snapshot::SnapshotStore;
