//! Result cache for docvault document listings.
//!
//! Listings are memoized per `(viewer, filter key, filter value, limit)` in a
//! [`CacheBackend`] and dropped by owner-scoped key-pattern deletion whenever
//! that owner creates or deletes a document.
//!
//! Caching is best-effort: [`ResultCache`] never surfaces a backend failure
//! to its caller. Failed reads become misses, failed writes and failed
//! invalidations are logged and dropped.

pub mod backend;
pub mod error;
pub mod memory;
pub mod result;

pub use backend::CacheBackend;
pub use error::{CacheError, CacheResult};
pub use memory::InMemoryCache;
pub use result::{escape_component, listing_key, owner_pattern, ResultCache, KEY_PREFIX};
