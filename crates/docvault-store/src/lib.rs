//! Durable record and blob storage for docvault.
//!
//! The core never talks to a database driver directly. It reaches user,
//! session and document records through the [`CredentialStore`] and
//! [`DocumentStore`] contracts, and blob payloads through [`BlobStore`].
//!
//! # Storage Backends
//!
//! - [`InMemoryCredentialStore`] / [`InMemoryDocumentStore`]: `HashMap`-based
//!   stores for tests and single-process deployments
//! - [`FsBlobStore`]: blob files under a root directory
//!
//! # Design Rules
//!
//! 1. Every operation is a single round-trip.
//! 2. "Not found" is reported structurally (`Option` / `bool`), never as an
//!    error, so it stays distinct from backend failure.
//! 3. Uniqueness (login, session token, document id) is enforced here and
//!    reported as [`StoreError::Conflict`].
//! 4. Document listing always applies the visibility predicate carried by the
//!    [`DocumentQuery`].

pub mod blob;
pub mod error;
pub mod memory;
pub mod query;
pub mod traits;

pub use blob::{BlobStore, FsBlobStore};
pub use error::{StoreError, StoreResult};
pub use memory::{InMemoryCredentialStore, InMemoryDocumentStore};
pub use query::{AttributeFilter, DocumentOrdering, DocumentQuery, VisibilityPredicate};
pub use traits::{CredentialStore, DocumentStore, SessionRecord};
