//! Error types for session establishment and secure messaging.
//!
//! One tagged error type, [`SessionError`], travels through every layer. It
//! carries:
//!
//! - an [`ErrorKind`] that callers match on (never parse the message),
//! - the chain of operations that were running when it happened, added by
//!   each layer as the error moves up (`"client handshake"` →
//!   `"receive server hello"` → `"read frame"`),
//! - an optional lower-level cause exposed through
//!   [`std::error::Error::source`].
//!
//! Layer-local errors ([`ProtocolError`], [`CryptoError`], [`EntropyError`])
//! convert into exactly one kind each. Adding context never changes the kind.

use std::{borrow::Cow, error::Error as StdError, fmt};

use sealwire_crypto::CryptoError;
use sealwire_proto::ProtocolError;

use crate::env::EntropyError;

/// Result alias for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;

/// Classification of a session failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Underlying stream I/O failed
    Transport,
    /// Message exceeds the 10 MiB framing ceiling
    OversizedMessage,
    /// Stream ended before a full message arrived
    ShortRead,
    /// Secure message too short to hold a nonce
    TruncatedCiphertext,
    /// Hello payload malformed (server hello without key material)
    ShortHello,
    /// Server public key could not be decoded as RSA
    InvalidPublicKey,
    /// Ready confirmation failed
    HandshakeFailed,
    /// Local cryptographic operation or randomness source failed
    CryptoFailure,
    /// Secure message failed authentication
    DecryptionFailed,
}

impl ErrorKind {
    /// Short, stable name of the kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Transport => "transport error",
            Self::OversizedMessage => "oversized message",
            Self::ShortRead => "short read",
            Self::TruncatedCiphertext => "truncated ciphertext",
            Self::ShortHello => "short hello",
            Self::InvalidPublicKey => "invalid public key",
            Self::HandshakeFailed => "handshake failed",
            Self::CryptoFailure => "crypto failure",
            Self::DecryptionFailed => "decryption failed",
        }
    }

    /// Returns true for framing-layer protocol violations.
    pub fn is_framing(self) -> bool {
        matches!(self, Self::OversizedMessage | Self::ShortRead | Self::TruncatedCiphertext)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tagged session error with operation context and cause chain.
#[derive(Debug)]
pub struct SessionError {
    kind: ErrorKind,
    /// Innermost operation first
    context: Vec<Cow<'static, str>>,
    detail: Option<String>,
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

impl SessionError {
    /// Create an error of `kind` with no cause.
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, context: Vec::new(), detail: None, source: None }
    }

    /// Create an error of `kind` caused by `source`.
    pub fn with_source(
        kind: ErrorKind,
        source: impl Into<Box<dyn StdError + Send + Sync + 'static>>,
    ) -> Self {
        Self { kind, context: Vec::new(), detail: None, source: Some(source.into()) }
    }

    /// Attach a human-readable detail.
    #[must_use]
    pub fn detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Record the operation that was running when this error passed through.
    #[must_use]
    pub fn context(mut self, operation: impl Into<Cow<'static, str>>) -> Self {
        self.context.push(operation.into());
        self
    }

    /// Kind of failure.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Operations this error passed through, outermost first.
    pub fn operations(&self) -> impl Iterator<Item = &str> {
        self.context.iter().rev().map(AsRef::as_ref)
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for operation in self.operations() {
            write!(f, "{operation}: ")?;
        }

        write!(f, "{}", self.kind)?;

        if let Some(detail) = &self.detail {
            write!(f, " ({detail})")?;
        }

        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }

        Ok(())
    }
}

impl StdError for SessionError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source.as_deref().map(|e| e as &(dyn StdError + 'static))
    }
}

impl From<ProtocolError> for SessionError {
    fn from(err: ProtocolError) -> Self {
        let kind = match &err {
            ProtocolError::MessageTooLarge { .. } => ErrorKind::OversizedMessage,
            ProtocolError::ShortRead { .. } => ErrorKind::ShortRead,
            ProtocolError::HelloTooShort { .. } | ProtocolError::MalformedHello { .. } => {
                ErrorKind::ShortHello
            },
            ProtocolError::Transport(_) => ErrorKind::Transport,
        };
        Self::with_source(kind, err)
    }
}

impl From<CryptoError> for SessionError {
    fn from(err: CryptoError) -> Self {
        let kind = match &err {
            CryptoError::TruncatedCiphertext { .. } => ErrorKind::TruncatedCiphertext,
            CryptoError::DecryptionFailed { .. } => ErrorKind::DecryptionFailed,
            CryptoError::InvalidPublicKey { .. } => ErrorKind::InvalidPublicKey,
            CryptoError::EncryptionFailed { .. }
            | CryptoError::KeyEncoding { .. }
            | CryptoError::KeyGeneration { .. }
            | CryptoError::PremasterEncryption { .. }
            | CryptoError::PremasterDecryption { .. }
            | CryptoError::InvalidPremasterLength { .. } => ErrorKind::CryptoFailure,
        };
        Self::with_source(kind, err)
    }
}

impl From<EntropyError> for SessionError {
    fn from(err: EntropyError) -> Self {
        Self::with_source(ErrorKind::CryptoFailure, err)
    }
}

/// Attach operation context to any result whose error converts into
/// [`SessionError`].
pub trait ResultExt<T> {
    /// Convert the error and record `operation` on it.
    fn context(self, operation: impl Into<Cow<'static, str>>) -> Result<T>;
}

impl<T, E: Into<SessionError>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, operation: impl Into<Cow<'static, str>>) -> Result<T> {
        self.map_err(|e| e.into().context(operation))
    }
}
