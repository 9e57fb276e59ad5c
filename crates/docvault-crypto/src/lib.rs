//! Cryptographic primitives for docvault.
//!
//! Provides Argon2id password digests behind the [`PasswordHasher`] trait and
//! session token generation from the OS random source.
//!
//! All crypto operations wrap established libraries.

pub mod error;
pub mod password;
pub mod token;

pub use error::{CryptoError, CryptoResult};
pub use password::{Argon2Hasher, PasswordHasher};
pub use token::{generate_token, TOKEN_BYTES};
