//! Search execution core: query normalization, concurrent platform
//! fan-out, result merging and filtering, TTL caching with single-flight
//! deduplication, and snapshot export.
//!
//! The entry point is [`SearchOrchestrator`]; everything else is the
//! pipeline it coordinates.

pub mod cache;
pub mod error;
pub mod filter;
pub mod merge;
pub mod normalize;
pub mod orchestrator;
pub mod snapshot;

pub use cache::{CacheEntry, SearchCache};
pub use error::SearchError;
pub use merge::{MergedSet, PlatformOutcome};
pub use normalize::{normalize, CanonicalQuery, Fingerprint};
pub use orchestrator::{SearchLimits, SearchOrchestrator, SearchResults};
pub use snapshot::{MentionSnapshot, MentionSnapshotStore, SnapshotError};
