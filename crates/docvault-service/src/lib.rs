//! Access-control core for docvault.
//!
//! Composes the credential, document, cache and blob collaborators into the
//! operations the outside world sees:
//!
//! - [`SessionManager`]: registration, authentication, token validation,
//!   logout
//! - [`QueryEngine`]: visibility-scoped, filtered, ordered, limited listings
//! - [`DocumentCoordinator`]: create / get / list / delete with owner-scoped
//!   cache invalidation
//!
//! Collaborators are supplied as generic constructor parameters, so every
//! call is statically dispatched. Every store and cache call is bounded by a
//! per-operation timeout; an elapsed timeout is a [`ServiceError::Transient`].

pub mod coordinator;
pub mod error;
pub mod query;
pub mod session;
pub mod timeout;
pub mod validate;

pub use coordinator::{DocumentCoordinator, FetchedDocument};
pub use error::{InputError, ServiceError, ServiceResult};
pub use query::{build_visibility_predicate, QueryEngine};
pub use session::SessionManager;
pub use validate::CredentialValidator;
