//! Message channel abstraction.
//!
//! Everything above framing (handshake steps, the secure channel, the
//! transfer protocol) talks to a [`MessageChannel`] rather than to a concrete
//! stream. A secure channel is itself a message channel, so callers use the
//! same two operations before and after the handshake.

use async_trait::async_trait;
use bytes::Bytes;
use sealwire_proto::Framed;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::error::{Result, ResultExt};

/// Bidirectional channel that preserves message boundaries.
///
/// One `send` on one end corresponds to exactly one `receive` on the other.
/// Not safe for concurrent use; the `&mut self` receivers enforce a single
/// caller at a time.
#[async_trait]
pub trait MessageChannel: Send {
    /// Send one complete message.
    async fn send(&mut self, payload: &[u8]) -> Result<()>;

    /// Receive one complete message.
    async fn receive(&mut self) -> Result<Bytes>;
}

#[async_trait]
impl<S> MessageChannel for Framed<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn send(&mut self, payload: &[u8]) -> Result<()> {
        self.write_message(payload).await.context("write frame")
    }

    async fn receive(&mut self) -> Result<Bytes> {
        self.read_message().await.context("read frame")
    }
}
