//! Server error types.

use std::{fmt, io};

use sealwire_crypto::CryptoError;

/// Errors that stop the server.
///
/// Per-connection failures never surface here; they are logged by the
/// connection task and the acceptor keeps running.
#[derive(Debug)]
pub enum ServerError {
    /// Configuration error (unusable bind address, etc.).
    ///
    /// Fatal at startup. Fix configuration and restart.
    Config(String),

    /// Listener could not be bound.
    Bind {
        /// Address that was requested
        address: String,
        /// Underlying socket error
        source: io::Error,
    },

    /// Key generation or encoding failed at startup.
    Crypto(CryptoError),

    /// Transport/network error on the listener.
    Transport(io::Error),

    /// Internal error (background task panicked or was cancelled).
    ///
    /// Indicates a bug.
    Internal(String),
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "configuration error: {msg}"),
            Self::Bind { address, source } => write!(f, "failed to bind {address}: {source}"),
            Self::Crypto(err) => write!(f, "key error: {err}"),
            Self::Transport(err) => write!(f, "transport error: {err}"),
            Self::Internal(msg) => write!(f, "internal error: {msg}"),
        }
    }
}

impl std::error::Error for ServerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Bind { source, .. } => Some(source),
            Self::Crypto(err) => Some(err),
            Self::Transport(err) => Some(err),
            Self::Config(_) | Self::Internal(_) => None,
        }
    }
}

impl From<CryptoError> for ServerError {
    fn from(err: CryptoError) -> Self {
        Self::Crypto(err)
    }
}

impl From<io::Error> for ServerError {
    fn from(err: io::Error) -> Self {
        Self::Transport(err)
    }
}
