use docvault_types::SessionToken;
use rand::rngs::OsRng;
use rand::RngCore;

/// Entropy per session token, in bytes.
pub const TOKEN_BYTES: usize = 32;

/// Mint a new session token: [`TOKEN_BYTES`] bytes from the OS random
/// source, hex-encoded.
pub fn generate_token() -> SessionToken {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    SessionToken::new(hex::encode(bytes))
}
