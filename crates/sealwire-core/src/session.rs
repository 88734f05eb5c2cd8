//! Full handshakes for each role.
//!
//! [`connect`] and [`accept`] take ownership of a plaintext channel, run every
//! handshake step in order and hand back a [`SecureChannel`] wrapping it. Both
//! ends have to agree on who speaks first during confirmation: the client
//! sends its ready message and then waits, the server waits and then replies.
//! Any failure aborts the handshake; the caller drops the channel, which
//! closes the connection.

use sealwire_crypto::{ServerKeypair, derive_session_key};
use tracing::{debug, instrument};

use crate::{
    channel::MessageChannel,
    env::Environment,
    error::{Result, ResultExt},
    handshake,
    secure::SecureChannel,
};

/// Run the client side of the handshake over `channel`.
///
/// # Errors
///
/// Any step's error, tagged with the step name under `"client handshake"`.
pub async fn connect<C, E>(channel: C, env: E) -> Result<SecureChannel<C, E>>
where
    C: MessageChannel,
    E: Environment,
{
    client_handshake(channel, env).await.context("client handshake")
}

/// Run the server side of the handshake over `channel`.
///
/// # Errors
///
/// Any step's error, tagged with the step name under `"server handshake"`.
pub async fn accept<C, E>(
    channel: C,
    keypair: &ServerKeypair,
    env: E,
) -> Result<SecureChannel<C, E>>
where
    C: MessageChannel,
    E: Environment,
{
    server_handshake(channel, keypair, env).await.context("server handshake")
}

#[instrument(level = "debug", skip_all)]
async fn client_handshake<C, E>(mut channel: C, env: E) -> Result<SecureChannel<C, E>>
where
    C: MessageChannel,
    E: Environment,
{
    let client_random =
        handshake::send_client_hello(&mut channel, &env).await.context("send client hello")?;
    let (server_random, public_key) =
        handshake::receive_server_hello(&mut channel).await.context("receive server hello")?;
    let premaster = handshake::send_key_exchange(&mut channel, &env, &public_key)
        .await
        .context("send key exchange")?;

    let session_key = derive_session_key(&client_random, &server_random, &premaster);
    drop(premaster);
    let mut secure = SecureChannel::new(channel, &session_key, env);
    drop(session_key);

    handshake::send_ready(&mut secure).await.context("send ready")?;
    handshake::expect_ready(&mut secure).await.context("receive ready")?;

    debug!("client handshake complete");
    Ok(secure)
}

#[instrument(level = "debug", skip_all)]
async fn server_handshake<C, E>(
    mut channel: C,
    keypair: &ServerKeypair,
    env: E,
) -> Result<SecureChannel<C, E>>
where
    C: MessageChannel,
    E: Environment,
{
    let client_random =
        handshake::receive_client_hello(&mut channel).await.context("receive client hello")?;
    let server_random = handshake::send_server_hello(&mut channel, &env, keypair)
        .await
        .context("send server hello")?;
    let premaster = handshake::receive_key_exchange(&mut channel, keypair)
        .await
        .context("receive key exchange")?;

    let session_key = derive_session_key(&client_random, &server_random, &premaster);
    drop(premaster);
    let mut secure = SecureChannel::new(channel, &session_key, env);
    drop(session_key);

    handshake::expect_ready(&mut secure).await.context("receive ready")?;
    handshake::send_ready(&mut secure).await.context("send ready")?;

    debug!("server handshake complete");
    Ok(secure)
}
