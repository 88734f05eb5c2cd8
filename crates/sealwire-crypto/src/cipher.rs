//! Message sealing using AES-256-GCM
//!
//! All functions are pure - nonces must be provided by the caller. Sealed
//! layout: `nonce (12) ∥ ciphertext ∥ tag (16)`, no associated data.

use std::fmt;

use aes_gcm::{
    Aes256Gcm, Key, Nonce,
    aead::{Aead, KeyInit},
};

use crate::{error::CryptoError, session_key::SessionKey};

/// GCM nonce size (12 bytes)
pub const NONCE_SIZE: usize = 12;

/// GCM authentication tag size (16 bytes)
pub const TAG_SIZE: usize = 16;

/// AEAD keyed by a session key.
pub struct SessionCipher {
    cipher: Aes256Gcm,
}

impl SessionCipher {
    /// Key a cipher with the session key.
    pub fn new(key: &SessionKey) -> Self {
        Self { cipher: Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes())) }
    }

    /// Seal `plaintext` under `nonce`.
    ///
    /// Returns `nonce ∥ ciphertext ∥ tag`.
    ///
    /// # Security
    ///
    /// The caller MUST NOT reuse a nonce under the same key. Reuse leaks the
    /// XOR of the two plaintexts and allows tag forgery.
    pub fn seal(&self, nonce: [u8; NONCE_SIZE], plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let ciphertext = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext)
            .map_err(|e| CryptoError::EncryptionFailed { reason: e.to_string() })?;

        let mut sealed = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        sealed.extend_from_slice(&nonce);
        sealed.extend_from_slice(&ciphertext);

        Ok(sealed)
    }

    /// Verify and decrypt a sealed message.
    ///
    /// # Errors
    ///
    /// - `TruncatedCiphertext`: shorter than the nonce
    /// - `DecryptionFailed`: tag mismatch, tampering, or wrong key
    pub fn open(&self, sealed: &[u8]) -> Result<Vec<u8>, CryptoError> {
        if sealed.len() < NONCE_SIZE {
            return Err(CryptoError::TruncatedCiphertext { len: sealed.len(), min: NONCE_SIZE });
        }

        let (nonce, ciphertext) = sealed.split_at(NONCE_SIZE);

        self.cipher.decrypt(Nonce::from_slice(nonce), ciphertext).map_err(|_| {
            CryptoError::DecryptionFailed { reason: "authentication failed".to_string() }
        })
    }
}

impl fmt::Debug for SessionCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCipher").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn test_cipher(seed: u8) -> SessionCipher {
        let mut key = [0u8; 32];
        for (i, byte) in key.iter_mut().enumerate() {
            *byte = (i as u8).wrapping_add(seed);
        }
        SessionCipher::new(&SessionKey::from_bytes(key))
    }

    #[test]
    fn seal_open_roundtrip() {
        let cipher = test_cipher(0);
        let sealed = cipher.seal([0xAB; NONCE_SIZE], b"Hello, World!").unwrap();

        assert_eq!(cipher.open(&sealed).unwrap(), b"Hello, World!");
    }

    #[test]
    fn sealed_layout() {
        let cipher = test_cipher(0);
        let nonce = [0x11; NONCE_SIZE];
        let plaintext = b"test message";

        let sealed = cipher.seal(nonce, plaintext).unwrap();

        assert_eq!(&sealed[..NONCE_SIZE], &nonce);
        assert_eq!(sealed.len(), NONCE_SIZE + plaintext.len() + TAG_SIZE);
    }

    #[test]
    fn empty_plaintext_roundtrip() {
        let cipher = test_cipher(0);
        let sealed = cipher.seal([0; NONCE_SIZE], b"").unwrap();

        assert_eq!(sealed.len(), NONCE_SIZE + TAG_SIZE);
        assert_eq!(cipher.open(&sealed).unwrap(), b"");
    }

    #[test]
    fn different_nonces_produce_different_ciphertexts() {
        let cipher = test_cipher(0);

        let first = cipher.seal([0x00; NONCE_SIZE], b"same").unwrap();
        let second = cipher.seal([0xFF; NONCE_SIZE], b"same").unwrap();

        assert_ne!(first[NONCE_SIZE..], second[NONCE_SIZE..]);
    }

    #[test]
    fn wrong_key_fails_decryption() {
        let sealed = test_cipher(0).seal([0; NONCE_SIZE], b"secret message").unwrap();

        let result = test_cipher(1).open(&sealed);

        assert!(matches!(
            result,
            Err(CryptoError::DecryptionFailed { reason }) if reason.contains("authentication")
        ));
    }

    #[test]
    fn shorter_than_nonce_is_truncated() {
        let cipher = test_cipher(0);

        let result = cipher.open(&[0u8; NONCE_SIZE - 1]);

        assert!(matches!(result, Err(CryptoError::TruncatedCiphertext { len: 11, min: 12 })));
    }

    #[test]
    fn nonce_without_tag_fails_authentication() {
        let cipher = test_cipher(0);

        let result = cipher.open(&[0u8; NONCE_SIZE + TAG_SIZE - 1]);

        assert!(matches!(result, Err(CryptoError::DecryptionFailed { .. })));
    }

    #[test]
    fn every_single_bit_flip_is_detected() {
        let cipher = test_cipher(7);
        let sealed = cipher.seal([0x5C; NONCE_SIZE], b"attack at dawn").unwrap();

        // Covers nonce, ciphertext and tag
        for byte in 0..sealed.len() {
            for bit in 0..8 {
                let mut tampered = sealed.clone();
                tampered[byte] ^= 1 << bit;

                assert!(
                    matches!(cipher.open(&tampered), Err(CryptoError::DecryptionFailed { .. })),
                    "flip of byte {byte} bit {bit} was not detected"
                );
            }
        }
    }

    #[test]
    fn opens_message_sealed_by_plain_aes_256_gcm() {
        let key = [7u8; 32];
        let nonce = [1u8; NONCE_SIZE];
        let ciphertext = Aes256Gcm::new_from_slice(&key)
            .unwrap()
            .encrypt(Nonce::from_slice(&nonce), b"ready".as_slice())
            .unwrap();
        let mut sealed = nonce.to_vec();
        sealed.extend_from_slice(&ciphertext);

        let cipher = SessionCipher::new(&SessionKey::from_bytes(key));

        assert_eq!(cipher.open(&sealed).unwrap(), b"ready");
        assert_eq!(cipher.seal(nonce, b"ready").unwrap(), sealed);
    }

    #[test]
    fn matches_nist_gcm_vector() {
        // AES-256-GCM, all-zero key and nonce, 16 zero bytes of plaintext
        let cipher = SessionCipher::new(&SessionKey::from_bytes([0u8; 32]));
        let expected_ciphertext = [
            0xce, 0xa7, 0x40, 0x3d, 0x4d, 0x60, 0x6b, 0x6e, 0x07, 0x4e, 0xc5, 0xd3, 0xba, 0xf3,
            0x9d, 0x18,
        ];
        let expected_tag = [
            0xd0, 0xd1, 0xc8, 0xa7, 0x99, 0x99, 0x6b, 0xf0, 0x26, 0x5b, 0x98, 0xb5, 0xd4, 0x8a,
            0xb9, 0x19,
        ];

        let sealed = cipher.seal([0u8; NONCE_SIZE], &[0u8; 16]).unwrap();

        assert_eq!(&sealed[NONCE_SIZE..NONCE_SIZE + 16], &expected_ciphertext);
        assert_eq!(&sealed[NONCE_SIZE + 16..], &expected_tag);
    }

    proptest! {
        #[test]
        fn prop_seal_open_roundtrip(
            plaintext in prop::collection::vec(any::<u8>(), 0..2048),
            nonce in any::<[u8; NONCE_SIZE]>(),
            seed in any::<u8>(),
        ) {
            let cipher = test_cipher(seed);
            let sealed = cipher.seal(nonce, &plaintext).unwrap();

            prop_assert_eq!(cipher.open(&sealed).unwrap(), plaintext);
        }
    }
}
