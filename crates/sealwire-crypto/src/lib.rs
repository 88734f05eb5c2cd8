//! Sealwire Cryptographic Primitives
//!
//! Cryptographic building blocks for the sealwire handshake and secure
//! channel. Symmetric operations are pure functions with deterministic
//! outputs: callers provide nonces so that tests can pin them. RSA operations
//! draw their padding randomness from the OS.
//!
//! # Key Lifecycle
//!
//! ```text
//! Server start ──► RSA-2048 keypair (process lifetime, read-only)
//!
//! Per connection:
//!   clientRandom (16) ─┐
//!   serverRandom (16) ─┼─► SHA-256 ─► Session Key (32)
//!   premaster    (16) ─┘                  │
//!     ▲                                   ▼
//!     └─ RSA-OAEP(SHA-256) in transit   AES-256-GCM
//!                                         │
//!                                         ▼
//!                             nonce(12) ∥ ciphertext ∥ tag(16)
//! ```
//!
//! The premaster and session key are zeroized on drop. The randoms are
//! public and need no special handling.
//!
//! # Security
//!
//! Confidentiality and Integrity:
//! - AES-256-GCM AEAD; any modified bit fails authentication
//! - Unauthenticated plaintext is never returned
//!
//! Nonces:
//! - Drawn at random per message (96 bits), not from a counter
//! - Collision probability follows the birthday bound in the number of
//!   messages sent under one session key
//!
//! Not Provided:
//! - Server authentication. The public key is accepted as received
//!   (trust on first use); an active attacker can substitute their own
//! - Forward secrecy. Recording a session and later obtaining the RSA private
//!   key reveals the premaster and therefore the session key

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod cipher;
mod error;
mod keypair;
mod session_key;

pub use cipher::{NONCE_SIZE, SessionCipher, TAG_SIZE};
pub use error::CryptoError;
pub use keypair::{RSA_KEY_BITS, ServerKeypair, ServerPublicKey};
pub use session_key::{
    HANDSHAKE_SECRET_SIZE, PremasterSecret, SESSION_KEY_SIZE, SessionKey, derive_session_key,
};
