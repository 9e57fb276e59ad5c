//! HTTP server for docvault.
//!
//! Exposes registration, login/logout and document create/list/get/delete as
//! a JSON envelope API on top of `docvault-service`.

pub mod auth;
pub mod config;
pub mod error;
pub mod handler;
pub mod response;
pub mod router;
pub mod server;
pub mod state;

pub use auth::{Credentials, Identity};
pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use response::{DocumentView, Envelope, ErrorBody};
pub use server::DocvaultServer;
pub use state::{AppState, SharedState};
