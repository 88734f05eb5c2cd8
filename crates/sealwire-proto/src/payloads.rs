//! Plaintext handshake payloads.
//!
//! These are the only messages that cross the wire unencrypted. The client key
//! exchange is an opaque RSA ciphertext and needs no structure here.

use bytes::{BufMut, Bytes, BytesMut};

use crate::errors::{ProtocolError, Result};

/// Size of the per-handshake randoms and of the premaster secret.
pub const RANDOM_SIZE: usize = 16;

/// Plaintext both peers exchange under the new session key to confirm it.
pub const READY_MESSAGE: &[u8] = b"ready";

/// Client Hello: the client's random, nothing else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientHello {
    /// Client random
    pub random: [u8; RANDOM_SIZE],
}

impl ClientHello {
    /// Encode to wire bytes.
    pub fn encode(&self) -> Bytes {
        Bytes::copy_from_slice(&self.random)
    }

    /// Decode from a received payload.
    ///
    /// # Errors
    ///
    /// - `MalformedHello` unless the payload is exactly [`RANDOM_SIZE`] bytes
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let random = <[u8; RANDOM_SIZE]>::try_from(bytes).map_err(|_| {
            ProtocolError::MalformedHello { expected: RANDOM_SIZE, actual: bytes.len() }
        })?;

        Ok(Self { random })
    }
}

/// Server Hello: the server's random followed by its DER-encoded public key.
///
/// The key bytes are not validated here; decoding them is a cryptographic
/// concern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerHello {
    /// Server random
    pub random: [u8; RANDOM_SIZE],
    /// DER SubjectPublicKeyInfo of the server key
    pub public_key: Bytes,
}

impl ServerHello {
    /// Encode to wire bytes: `random ∥ public_key`.
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(RANDOM_SIZE + self.public_key.len());
        buf.put_slice(&self.random);
        buf.put_slice(&self.public_key);
        buf.freeze()
    }

    /// Decode from a received payload.
    ///
    /// # Errors
    ///
    /// - `HelloTooShort` if the payload is [`RANDOM_SIZE`] bytes or fewer,
    ///   i.e. carries no key material
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() <= RANDOM_SIZE {
            return Err(ProtocolError::HelloTooShort { len: bytes.len(), min: RANDOM_SIZE });
        }

        let (random, public_key) = bytes.split_at(RANDOM_SIZE);
        let random = <[u8; RANDOM_SIZE]>::try_from(random)
            .map_err(|_| ProtocolError::HelloTooShort { len: bytes.len(), min: RANDOM_SIZE })?;

        Ok(Self { random, public_key: Bytes::copy_from_slice(public_key) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_hello_splits_random_from_key() {
        let hello = ServerHello { random: [7; RANDOM_SIZE], public_key: Bytes::from_static(b"DER") };

        let wire = hello.encode();
        assert_eq!(wire.len(), RANDOM_SIZE + 3);

        let parsed = ServerHello::decode(&wire).unwrap();
        assert_eq!(parsed, hello);
    }

    #[test]
    fn server_hello_without_key_is_too_short() {
        let result = ServerHello::decode(&[0u8; RANDOM_SIZE]);
        assert!(matches!(result, Err(ProtocolError::HelloTooShort { len: 16, min: 16 })));

        let result = ServerHello::decode(&[]);
        assert!(matches!(result, Err(ProtocolError::HelloTooShort { len: 0, .. })));
    }

    #[test]
    fn client_hello_requires_exact_length() {
        assert!(ClientHello::decode(&[1u8; RANDOM_SIZE]).is_ok());

        let result = ClientHello::decode(&[1u8; RANDOM_SIZE + 1]);
        assert!(matches!(result, Err(ProtocolError::MalformedHello { expected: 16, actual: 17 })));

        let result = ClientHello::decode(&[1u8; 3]);
        assert!(matches!(result, Err(ProtocolError::MalformedHello { actual: 3, .. })));
    }
}
