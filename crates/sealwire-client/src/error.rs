//! Client error types.

use std::{io, path::PathBuf, time::Duration};

use sealwire_core::SessionError;
use thiserror::Error;

/// Errors that end a client run.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Invalid input (file path without a name, empty server address).
    #[error("configuration error: {0}")]
    Config(String),

    /// Server did not accept the connection in time.
    #[error("timed out connecting to {address} after {timeout:?}")]
    ConnectTimeout {
        /// Server address
        address: String,
        /// Dial limit that elapsed
        timeout: Duration,
    },

    /// Connection was refused or the address could not be resolved.
    #[error("failed to connect to {address}: {source}")]
    Connect {
        /// Server address
        address: String,
        /// Underlying socket error
        source: io::Error,
    },

    /// File to send could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    ReadFile {
        /// Path that was requested
        path: PathBuf,
        /// Underlying filesystem error
        source: io::Error,
    },

    /// Handshake or transfer failed.
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl ClientError {
    /// Returns true if the failure happened before any bytes were exchanged
    /// with the server.
    pub fn is_dial_failure(&self) -> bool {
        matches!(self, Self::ConnectTimeout { .. } | Self::Connect { .. })
    }
}
