//! Wire-level error types.

use std::io;

use thiserror::Error;

/// Result alias for wire operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors raised while framing messages or parsing handshake payloads.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Message exceeds the framing ceiling.
    ///
    /// Raised by the sender before anything is written and by the receiver
    /// as soon as the length prefix is decoded.
    #[error("message too large: {size} bytes (max {max})")]
    MessageTooLarge {
        /// Size claimed or requested
        size: usize,
        /// Maximum allowed size
        max: usize,
    },

    /// Stream ended before a complete prefix or payload arrived.
    #[error("short read: expected {expected} bytes, got {actual}")]
    ShortRead {
        /// Bytes the frame required
        expected: usize,
        /// Bytes actually read before end of stream
        actual: usize,
    },

    /// Server hello carries no key material after the random.
    #[error("hello too short: {len} bytes, need more than {min}")]
    HelloTooShort {
        /// Received payload length
        len: usize,
        /// Length that must be exceeded
        min: usize,
    },

    /// Client hello is not exactly one random.
    #[error("malformed hello: expected {expected} bytes, got {actual}")]
    MalformedHello {
        /// Required payload length
        expected: usize,
        /// Received payload length
        actual: usize,
    },

    /// Underlying stream failed.
    #[error("transport error: {0}")]
    Transport(#[from] io::Error),
}
