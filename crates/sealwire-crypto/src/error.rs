//! Error types for cryptographic operations

use thiserror::Error;

/// Errors from cryptographic operations
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Sealed message is too short to contain a nonce
    #[error("ciphertext truncated: {len} bytes, need at least {min}")]
    TruncatedCiphertext {
        /// Received length
        len: usize,
        /// Minimum length (the nonce size)
        min: usize,
    },

    /// Decryption failed (authentication tag mismatch)
    #[error("decryption failed: {reason}")]
    DecryptionFailed {
        /// Reason for decryption failure
        reason: String,
    },

    /// AEAD encryption failed
    #[error("encryption failed: {reason}")]
    EncryptionFailed {
        /// Reason for encryption failure
        reason: String,
    },

    /// Received bytes are not a DER-encoded RSA public key
    #[error("invalid public key: {reason}")]
    InvalidPublicKey {
        /// Decoder error
        reason: String,
    },

    /// Public key could not be serialized
    #[error("public key encoding failed: {reason}")]
    KeyEncoding {
        /// Encoder error
        reason: String,
    },

    /// RSA key generation failed
    #[error("key generation failed: {reason}")]
    KeyGeneration {
        /// Generator error
        reason: String,
    },

    /// RSA-OAEP encryption of the premaster failed
    #[error("premaster encryption failed: {reason}")]
    PremasterEncryption {
        /// RSA error
        reason: String,
    },

    /// RSA-OAEP decryption of the premaster failed (padding check, wrong key)
    #[error("premaster decryption failed: {reason}")]
    PremasterDecryption {
        /// RSA error
        reason: String,
    },

    /// Premaster decrypted to the wrong number of bytes
    #[error("invalid premaster length: expected {expected}, got {actual}")]
    InvalidPremasterLength {
        /// Expected length
        expected: usize,
        /// Actual length
        actual: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = CryptoError::TruncatedCiphertext { len: 5, min: 12 };
        assert_eq!(err.to_string(), "ciphertext truncated: 5 bytes, need at least 12");
    }
}
