//! Foundation types for docvault.
//!
//! Every other docvault crate depends on `docvault-types`. The types here are
//! plain data: they carry no storage or transport concerns.
//!
//! # Key Types
//!
//! - [`User`]: A registered account (login plus password digest)
//! - [`Session`]: A bearer token bound to a user until `expires_at`
//! - [`Document`]: An uploaded document with its visibility metadata
//! - [`DocumentMeta`]: Client-supplied metadata for a new document
//! - [`UserId`], [`DocumentId`], [`SessionToken`]: Opaque identifiers

pub mod document;
pub mod error;
pub mod ids;
pub mod user;

pub use document::{Document, DocumentMeta};
pub use error::TypeError;
pub use ids::{DocumentId, SessionToken, UserId};
pub use user::{Session, User};

/// Timestamps are UTC throughout the workspace.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
