//! Environment abstraction for randomness.
//!
//! Decouples protocol logic from the OS entropy source. Production uses
//! [`SystemEnv`]; tests substitute seeded or deliberately failing sources to
//! pin handshake randoms and exercise the error paths.

use thiserror::Error;

/// Randomness source failure.
#[derive(Debug, Clone, Error)]
#[error("random source failed: {reason}")]
pub struct EntropyError {
    /// Description from the source
    pub reason: String,
}

/// Abstract environment providing randomness.
///
/// # Safety
///
/// Implementations MUST use cryptographically secure entropy in production.
/// Handshake randoms, premaster secrets and per-message nonces all come from
/// here.
pub trait Environment: Clone + Send + Sync + 'static {
    /// Fills the provided buffer with random bytes.
    fn random_bytes(&self, buffer: &mut [u8]) -> Result<(), EntropyError>;

    /// Generates a random fixed-size array.
    fn random_array<const N: usize>(&self) -> Result<[u8; N], EntropyError> {
        let mut bytes = [0u8; N];
        self.random_bytes(&mut bytes)?;
        Ok(bytes)
    }
}

/// Production environment backed by the OS RNG (getrandom).
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnv;

impl SystemEnv {
    /// Create a new system environment.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Environment for SystemEnv {
    fn random_bytes(&self, buffer: &mut [u8]) -> Result<(), EntropyError> {
        getrandom::fill(buffer).map_err(|e| EntropyError { reason: e.to_string() })
    }
}
