//! Sealwire wire protocol.
//!
//! Everything that touches raw bytes on the stream lives here: the
//! length-prefixed framing layer and the plaintext handshake payloads that
//! travel over it before a session key exists.
//!
//! # Wire Format
//!
//! ```text
//! ┌──────────────────────┬───────────────────────────┐
//! │ length: u32 (BE)     │ payload: `length` bytes   │
//! └──────────────────────┴───────────────────────────┘
//! ```
//!
//! `length` never exceeds [`MAX_MESSAGE_SIZE`] (10 MiB). Both the sender and
//! the receiver enforce the ceiling, so a hostile length prefix is rejected
//! before any payload memory is allocated.
//!
//! This crate knows nothing about cryptography. Encrypted traffic is just
//! another opaque payload from its point of view.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod errors;
pub mod frame;
pub mod payloads;

pub use errors::{ProtocolError, Result};
pub use frame::{Framed, LENGTH_PREFIX_SIZE, MAX_MESSAGE_SIZE};
pub use payloads::{ClientHello, RANDOM_SIZE, READY_MESSAGE, ServerHello};
