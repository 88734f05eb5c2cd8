//! Sealwire session core
//!
//! Turns a plaintext byte stream into an authenticated, encrypted message
//! channel. The crate is transport-agnostic: it works over anything that
//! implements [`MessageChannel`], which includes [`sealwire_proto::Framed`]
//! around a TCP stream or an in-memory duplex.
//!
//! # Layers
//!
//! ```text
//! ┌──────────────────────────────┐
//! │ application (file transfer)  │
//! ├──────────────────────────────┤
//! │ SecureChannel                │  nonce ∥ ciphertext ∥ tag
//! ├──────────────────────────────┤
//! │ Framed<S>                    │  u32 BE length ∥ payload
//! ├──────────────────────────────┤
//! │ byte stream (TCP)            │
//! └──────────────────────────────┘
//! ```
//!
//! [`connect`] and [`accept`] run the handshake and return the secure layer.
//! The individual steps live in [`handshake`] for callers that need to drive
//! them one at a time.
//!
//! # Errors
//!
//! Every fallible operation returns [`SessionError`]. Match on
//! [`SessionError::kind`]; the display form carries the chain of operations
//! that were running when the failure happened.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod channel;
pub mod env;
pub mod error;
pub mod handshake;
pub mod secure;
pub mod session;

pub use channel::MessageChannel;
pub use env::{EntropyError, Environment, SystemEnv};
pub use error::{ErrorKind, Result, ResultExt, SessionError};
pub use secure::SecureChannel;
pub use session::{accept, connect};
