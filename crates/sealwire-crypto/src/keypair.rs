//! RSA key transport for the premaster secret.
//!
//! The server holds one RSA-2048 keypair for its whole lifetime. Clients
//! receive the public half as DER SubjectPublicKeyInfo and use it to encrypt a
//! premaster with RSA-OAEP(SHA-256).

use std::fmt;

use rand::rngs::OsRng;
use rsa::{
    Oaep, RsaPrivateKey, RsaPublicKey,
    pkcs8::{DecodePublicKey, EncodePublicKey, LineEnding},
    traits::PublicKeyParts,
};
use sha2::Sha256;
use zeroize::Zeroize;

use crate::{
    error::CryptoError,
    session_key::{HANDSHAKE_SECRET_SIZE, PremasterSecret},
};

/// Modulus size of the server key.
pub const RSA_KEY_BITS: usize = 2048;

/// Server's long-lived RSA keypair.
///
/// Immutable after construction, so one instance can be shared by reference
/// across every connection.
pub struct ServerKeypair {
    private: RsaPrivateKey,
    public: ServerPublicKey,
    /// Cached DER encoding sent in every Server Hello
    public_der: Vec<u8>,
}

impl ServerKeypair {
    /// Generate a fresh RSA-2048 keypair from the OS RNG.
    ///
    /// CPU-heavy; run it off the async executor.
    pub fn generate() -> Result<Self, CryptoError> {
        Self::generate_with_bits(RSA_KEY_BITS)
    }

    /// Generate a keypair with a custom modulus size.
    pub fn generate_with_bits(bits: usize) -> Result<Self, CryptoError> {
        let private = RsaPrivateKey::new(&mut OsRng, bits)
            .map_err(|e| CryptoError::KeyGeneration { reason: e.to_string() })?;

        Self::from_private_key(private)
    }

    /// Build from an existing private key.
    pub fn from_private_key(private: RsaPrivateKey) -> Result<Self, CryptoError> {
        let public = ServerPublicKey { key: private.to_public_key() };
        let public_der = public.to_der()?;

        Ok(Self { private, public, public_der })
    }

    /// Public half.
    pub fn public_key(&self) -> &ServerPublicKey {
        &self.public
    }

    /// DER SubjectPublicKeyInfo of the public half.
    pub fn public_key_der(&self) -> &[u8] {
        &self.public_der
    }

    /// Decrypt a client's key exchange.
    ///
    /// # Errors
    ///
    /// - `PremasterDecryption`: OAEP padding check failed or ciphertext has the
    ///   wrong size for this key
    /// - `InvalidPremasterLength`: plaintext is not 16 bytes
    pub fn decrypt_premaster(&self, ciphertext: &[u8]) -> Result<PremasterSecret, CryptoError> {
        let mut plaintext = self
            .private
            .decrypt_blinded(&mut OsRng, Oaep::new::<Sha256>(), ciphertext)
            .map_err(|e| CryptoError::PremasterDecryption { reason: e.to_string() })?;

        let result = <[u8; HANDSHAKE_SECRET_SIZE]>::try_from(plaintext.as_slice())
            .map(PremasterSecret::from_bytes)
            .map_err(|_| CryptoError::InvalidPremasterLength {
                expected: HANDSHAKE_SECRET_SIZE,
                actual: plaintext.len(),
            });

        plaintext.zeroize();
        result
    }
}

impl fmt::Debug for ServerKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerKeypair")
            .field("public", &self.public)
            .field("private", &"[REDACTED]")
            .finish()
    }
}

/// Server public key as seen by a client.
#[derive(Clone, PartialEq, Eq)]
pub struct ServerPublicKey {
    key: RsaPublicKey,
}

impl ServerPublicKey {
    /// Decode DER SubjectPublicKeyInfo.
    ///
    /// # Errors
    ///
    /// - `InvalidPublicKey` if the bytes are not valid DER or the key
    ///   algorithm is not RSA
    pub fn from_der(der: &[u8]) -> Result<Self, CryptoError> {
        let key = RsaPublicKey::from_public_key_der(der)
            .map_err(|e| CryptoError::InvalidPublicKey { reason: e.to_string() })?;

        Ok(Self { key })
    }

    /// Encode as DER SubjectPublicKeyInfo.
    pub fn to_der(&self) -> Result<Vec<u8>, CryptoError> {
        self.key
            .to_public_key_der()
            .map(|doc| doc.as_bytes().to_vec())
            .map_err(|e| CryptoError::KeyEncoding { reason: e.to_string() })
    }

    /// Encode as PEM (`-----BEGIN PUBLIC KEY-----`).
    pub fn to_pem(&self) -> Result<String, CryptoError> {
        self.key
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| CryptoError::KeyEncoding { reason: e.to_string() })
    }

    /// Modulus size in bytes; also the size of every OAEP ciphertext.
    pub fn size(&self) -> usize {
        self.key.size()
    }

    /// Encrypt a premaster with RSA-OAEP(SHA-256).
    pub fn encrypt_premaster(&self, premaster: &PremasterSecret) -> Result<Vec<u8>, CryptoError> {
        self.key
            .encrypt(&mut OsRng, Oaep::new::<Sha256>(), premaster.as_bytes())
            .map_err(|e| CryptoError::PremasterEncryption { reason: e.to_string() })
    }
}

impl fmt::Debug for ServerPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerPublicKey").field("bits", &(self.size() * 8)).finish()
    }
}
