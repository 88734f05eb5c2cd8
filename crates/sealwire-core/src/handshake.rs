//! Individual handshake steps.
//!
//! ```text
//! Client                                   Server
//!   | -- ClientHello (16 random) ----------> |
//!   | <-------- ServerHello (16 random ∥ DER) |
//!   | -- KeyExchange (RSA-OAEP premaster) -> |
//!   |        both: derive session key        |
//!   | == "ready" (sealed) ==================> |
//!   | <================== "ready" (sealed) == |
//! ```
//!
//! Each step is a standalone function so that tests can drive one side by
//! hand and inject malformed messages. [`crate::session`] composes them in
//! order. Randoms and the received server key are logged at debug level;
//! premaster and session key never are.

use bytes::Bytes;
use sealwire_crypto::{PremasterSecret, ServerKeypair, ServerPublicKey};
use sealwire_proto::{ClientHello, RANDOM_SIZE, READY_MESSAGE, ServerHello};
use tracing::debug;

use crate::{
    channel::MessageChannel,
    env::Environment,
    error::{ErrorKind, Result, ResultExt, SessionError},
};

/// Client step 1: send a fresh client random.
pub async fn send_client_hello<C, E>(channel: &mut C, env: &E) -> Result<[u8; RANDOM_SIZE]>
where
    C: MessageChannel,
    E: Environment,
{
    let random: [u8; RANDOM_SIZE] = env.random_array().context("generate client random")?;
    channel.send(&ClientHello { random }.encode()).await?;

    debug!(client_random = %hex::encode(random), "sent client hello");
    Ok(random)
}

/// Server step 1: receive the client random.
///
/// # Errors
///
/// - `ShortHello` unless the payload is exactly 16 bytes
pub async fn receive_client_hello<C>(channel: &mut C) -> Result<[u8; RANDOM_SIZE]>
where
    C: MessageChannel,
{
    let payload = channel.receive().await?;
    let hello = ClientHello::decode(&payload)?;

    debug!(client_random = %hex::encode(hello.random), "received client hello");
    Ok(hello.random)
}

/// Server step 2: send a fresh server random and the public key.
pub async fn send_server_hello<C, E>(
    channel: &mut C,
    env: &E,
    keypair: &ServerKeypair,
) -> Result<[u8; RANDOM_SIZE]>
where
    C: MessageChannel,
    E: Environment,
{
    let random: [u8; RANDOM_SIZE] = env.random_array().context("generate server random")?;
    let hello = ServerHello { random, public_key: Bytes::copy_from_slice(keypair.public_key_der()) };
    channel.send(&hello.encode()).await?;

    debug!(server_random = %hex::encode(random), "sent server hello");
    Ok(random)
}

/// Client step 2: receive the server random and decode its public key.
///
/// The key is accepted as-is; there is no certificate or pinning check. Its
/// PEM form is logged at debug level.
///
/// # Errors
///
/// - `ShortHello` if the payload carries no key bytes
/// - `InvalidPublicKey` if the key bytes are not an RSA SubjectPublicKeyInfo
pub async fn receive_server_hello<C>(
    channel: &mut C,
) -> Result<([u8; RANDOM_SIZE], ServerPublicKey)>
where
    C: MessageChannel,
{
    let payload = channel.receive().await?;
    let hello = ServerHello::decode(&payload)?;
    let public_key = ServerPublicKey::from_der(&hello.public_key)?;

    debug!(
        server_random = %hex::encode(hello.random),
        key_bits = public_key.size() * 8,
        "received server hello"
    );

    // Unauthenticated key; shown so operators can compare it out of band
    let pem = public_key.to_pem().context("encode server public key")?;
    debug!("server public key:\n{pem}");

    Ok((hello.random, public_key))
}

/// Client step 3: send a fresh premaster encrypted to the server key.
///
/// Returns the premaster for key derivation.
pub async fn send_key_exchange<C, E>(
    channel: &mut C,
    env: &E,
    public_key: &ServerPublicKey,
) -> Result<PremasterSecret>
where
    C: MessageChannel,
    E: Environment,
{
    let premaster = PremasterSecret::from_bytes(env.random_array().context("generate premaster")?);
    let ciphertext = public_key.encrypt_premaster(&premaster)?;
    channel.send(&ciphertext).await?;

    debug!(ciphertext_len = ciphertext.len(), "sent key exchange");
    Ok(premaster)
}

/// Server step 3: receive and decrypt the premaster.
///
/// # Errors
///
/// - `CryptoFailure` if decryption fails or the plaintext is not 16 bytes
pub async fn receive_key_exchange<C>(
    channel: &mut C,
    keypair: &ServerKeypair,
) -> Result<PremasterSecret>
where
    C: MessageChannel,
{
    let ciphertext = channel.receive().await?;
    let premaster = keypair.decrypt_premaster(&ciphertext)?;

    debug!(ciphertext_len = ciphertext.len(), "received key exchange");
    Ok(premaster)
}

/// Send the ready confirmation. `channel` must already be secured.
pub async fn send_ready<C>(channel: &mut C) -> Result<()>
where
    C: MessageChannel,
{
    channel.send(READY_MESSAGE).await
}

/// Await the ready confirmation. `channel` must already be secured.
///
/// # Errors
///
/// - `HandshakeFailed` on any failure: the receive itself (wrong key shows up
///   here as an authentication failure, kept as the source) or a plaintext
///   other than `"ready"`
pub async fn expect_ready<C>(channel: &mut C) -> Result<()>
where
    C: MessageChannel,
{
    let message = channel
        .receive()
        .await
        .map_err(|e| SessionError::with_source(ErrorKind::HandshakeFailed, e))?;

    if &message[..] != READY_MESSAGE {
        return Err(SessionError::new(ErrorKind::HandshakeFailed)
            .detail(format!("unexpected confirmation of {} bytes", message.len())));
    }

    Ok(())
}
