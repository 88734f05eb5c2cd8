//! Authenticated encryption over a message channel.
//!
//! [`SecureChannel`] composes an inner [`MessageChannel`] with a session key.
//! Each outbound message gets a fresh random nonce and is sealed as
//! `nonce ∥ ciphertext ∥ tag`; each inbound message is verified before any
//! plaintext is returned. The inner channel still enforces the framing
//! ceiling, so the largest plaintext is `MAX_MESSAGE_SIZE - 28` bytes.
//!
//! # Nonces
//!
//! Nonces are drawn at random, not counted. With 96-bit nonces the collision
//! probability stays negligible well past any realistic number of messages on
//! one connection; every connection also has its own key.

use async_trait::async_trait;
use bytes::Bytes;
use sealwire_crypto::{NONCE_SIZE, SessionCipher, SessionKey};

use crate::{
    channel::MessageChannel,
    env::{Environment, SystemEnv},
    error::{Result, ResultExt},
};

/// Message channel whose payloads are sealed with the session key.
pub struct SecureChannel<C, E = SystemEnv> {
    inner: C,
    cipher: SessionCipher,
    env: E,
}

impl<C, E> SecureChannel<C, E> {
    /// Wrap `inner`, sealing every message with `key`.
    ///
    /// The key is consumed into the cipher state; the caller may drop its
    /// copy immediately.
    pub fn new(inner: C, key: &SessionKey, env: E) -> Self {
        Self { inner, cipher: SessionCipher::new(key), env }
    }

    /// Inner channel.
    pub fn get_ref(&self) -> &C {
        &self.inner
    }

    /// Inner channel, mutably.
    ///
    /// Messages sent through it directly bypass encryption.
    pub fn get_mut(&mut self) -> &mut C {
        &mut self.inner
    }

    /// Unwrap the inner channel, discarding the key.
    pub fn into_inner(self) -> C {
        self.inner
    }
}

impl<C, E> std::fmt::Debug for SecureChannel<C, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecureChannel").field("cipher", &self.cipher).finish_non_exhaustive()
    }
}

#[async_trait]
impl<C, E> MessageChannel for SecureChannel<C, E>
where
    C: MessageChannel,
    E: Environment,
{
    async fn send(&mut self, plaintext: &[u8]) -> Result<()> {
        let nonce: [u8; NONCE_SIZE] = self.env.random_array().context("generate nonce")?;
        let sealed = self.cipher.seal(nonce, plaintext).context("seal message")?;

        self.inner.send(&sealed).await
    }

    async fn receive(&mut self) -> Result<Bytes> {
        let sealed = self.inner.receive().await?;
        let plaintext = self.cipher.open(&sealed).context("open sealed message")?;

        Ok(Bytes::from(plaintext))
    }
}
