//! Session key derivation
//!
//! `SessionKey = SHA-256(clientRandom ∥ serverRandom ∥ premaster)`
//!
//! Both peers compute this independently. The concatenation order is fixed;
//! swapping any two inputs yields a different key and the ready confirmation
//! fails.

use std::fmt;

use sha2::{Digest, Sha256};
use zeroize::Zeroize;

/// Size of each handshake random and of the premaster secret.
pub const HANDSHAKE_SECRET_SIZE: usize = 16;

/// Size of the derived session key.
pub const SESSION_KEY_SIZE: usize = 32;

/// Client-chosen secret carried to the server under RSA-OAEP.
///
/// Zeroized on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct PremasterSecret {
    bytes: [u8; HANDSHAKE_SECRET_SIZE],
}

impl PremasterSecret {
    /// Wrap raw secret bytes.
    pub fn from_bytes(bytes: [u8; HANDSHAKE_SECRET_SIZE]) -> Self {
        Self { bytes }
    }

    /// Raw secret bytes.
    pub fn as_bytes(&self) -> &[u8; HANDSHAKE_SECRET_SIZE] {
        &self.bytes
    }
}

impl Drop for PremasterSecret {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl fmt::Debug for PremasterSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PremasterSecret([REDACTED])")
    }
}

/// Symmetric key for one connection's secure phase.
///
/// Never transmitted. Zeroized on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionKey {
    bytes: [u8; SESSION_KEY_SIZE],
}

impl SessionKey {
    /// Wrap raw key bytes.
    pub fn from_bytes(bytes: [u8; SESSION_KEY_SIZE]) -> Self {
        Self { bytes }
    }

    /// 32-byte key for the AEAD.
    pub fn as_bytes(&self) -> &[u8; SESSION_KEY_SIZE] {
        &self.bytes
    }
}

impl Drop for SessionKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionKey([REDACTED])")
    }
}

/// Derive the session key from the handshake inputs.
///
/// Pure and deterministic: the same three inputs always produce the same key.
pub fn derive_session_key(
    client_random: &[u8; HANDSHAKE_SECRET_SIZE],
    server_random: &[u8; HANDSHAKE_SECRET_SIZE],
    premaster: &PremasterSecret,
) -> SessionKey {
    let mut hasher = Sha256::new();
    hasher.update(client_random);
    hasher.update(server_random);
    hasher.update(premaster.as_bytes());

    SessionKey::from_bytes(hasher.finalize().into())
}
