//! Length-prefixed message framing.
//!
//! A [`Framed`] turns a reliable byte stream into discrete messages. Each
//! message is a 4-byte big-endian length followed by exactly that many bytes.
//! There is no other delimiter, no batching, and no header beyond the length.
//!
//! # Invariants
//!
//! - Size Limit: No message larger than [`MAX_MESSAGE_SIZE`] is ever written
//!   or accepted. The sender checks before writing; the receiver checks the
//!   prefix before allocating.
//!
//! - Exact Read: A message is yielded only after all `length` bytes have
//!   arrived. A stream that ends early yields [`ProtocolError::ShortRead`],
//!   never a partial message.
//!
//! After any read error the stream position is undefined and the connection
//! must be dropped.

use bytes::{BufMut, Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::errors::{ProtocolError, Result};

/// Size of the length prefix in bytes.
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Largest payload a single message may carry (10 MiB).
pub const MAX_MESSAGE_SIZE: usize = 10 * 1024 * 1024;

/// Encode one message into `dst`.
///
/// Writes `[length: u32 BE][payload]`. Nothing is written on error.
pub fn encode(payload: &[u8], dst: &mut impl BufMut) -> Result<()> {
    let length = checked_length(payload.len())?;

    dst.put_u32(length);
    dst.put_slice(payload);

    Ok(())
}

/// Decode and validate a length prefix.
pub fn decode_length(prefix: [u8; LENGTH_PREFIX_SIZE]) -> Result<usize> {
    let length = u32::from_be_bytes(prefix) as usize;

    if length > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::MessageTooLarge { size: length, max: MAX_MESSAGE_SIZE });
    }

    Ok(length)
}

fn checked_length(len: usize) -> Result<u32> {
    if len > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::MessageTooLarge { size: len, max: MAX_MESSAGE_SIZE });
    }

    // MAX_MESSAGE_SIZE < u32::MAX, so the cast is lossless past the check
    Ok(len as u32)
}

/// Message framing over a byte stream.
///
/// Owns the stream for the lifetime of the connection. Reading requires
/// `S: AsyncRead`, writing requires `S: AsyncWrite`; a TCP stream or an
/// in-memory duplex satisfies both.
#[derive(Debug)]
pub struct Framed<S> {
    stream: S,
}

impl<S> Framed<S> {
    /// Wrap a stream.
    pub fn new(stream: S) -> Self {
        Self { stream }
    }

    /// Underlying stream.
    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    /// Underlying stream, mutably.
    ///
    /// Writing to it directly desynchronizes the framing.
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.stream
    }

    /// Unwrap the stream.
    pub fn into_inner(self) -> S {
        self.stream
    }
}

impl<S: AsyncWrite + Unpin> Framed<S> {
    /// Send one message.
    ///
    /// The prefix and payload go out in a single write followed by a flush.
    ///
    /// # Errors
    ///
    /// - `MessageTooLarge` if `payload` exceeds [`MAX_MESSAGE_SIZE`]; nothing
    ///   is written.
    /// - `Transport` if the stream fails.
    pub async fn write_message(&mut self, payload: &[u8]) -> Result<()> {
        let mut buf = BytesMut::with_capacity(LENGTH_PREFIX_SIZE + payload.len());
        encode(payload, &mut buf)?;

        self.stream.write_all(&buf).await?;
        self.stream.flush().await?;

        Ok(())
    }
}

impl<S: AsyncRead + Unpin> Framed<S> {
    /// Receive one message.
    ///
    /// Suspends until the full message has arrived.
    ///
    /// # Errors
    ///
    /// - `MessageTooLarge` if the prefix exceeds [`MAX_MESSAGE_SIZE`].
    /// - `ShortRead` if the stream ends inside the prefix or payload.
    /// - `Transport` if the stream fails.
    pub async fn read_message(&mut self) -> Result<Bytes> {
        let mut prefix = [0u8; LENGTH_PREFIX_SIZE];
        read_full(&mut self.stream, &mut prefix).await?;

        let length = decode_length(prefix)?;

        let mut payload = BytesMut::zeroed(length);
        read_full(&mut self.stream, &mut payload).await?;

        Ok(payload.freeze())
    }
}

/// Fill `buf` completely, reporting how far we got if the stream ends.
async fn read_full<R: AsyncRead + Unpin>(reader: &mut R, buf: &mut [u8]) -> Result<()> {
    let mut filled = 0;

    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..]).await?;
        if n == 0 {
            return Err(ProtocolError::ShortRead { expected: buf.len(), actual: filled });
        }
        filled += n;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[tokio::test]
    async fn message_round_trip() {
        let mut framed = Framed::new(Cursor::new(Vec::new()));
        framed.write_message(b"hello").await.unwrap();
        framed.write_message(b"").await.unwrap();
        framed.write_message(b"world").await.unwrap();

        let mut cursor = framed.into_inner();
        cursor.set_position(0);
        let mut framed = Framed::new(cursor);

        assert_eq!(&framed.read_message().await.unwrap()[..], b"hello");
        assert_eq!(&framed.read_message().await.unwrap()[..], b"");
        assert_eq!(&framed.read_message().await.unwrap()[..], b"world");
    }

    #[test]
    fn encode_layout() {
        let mut buf = Vec::new();
        encode(&[0xAA, 0xBB, 0xCC], &mut buf).unwrap();

        assert_eq!(buf, vec![0x00, 0x00, 0x00, 0x03, 0xAA, 0xBB, 0xCC]);
    }

    #[test]
    fn decode_length_enforces_ceiling() {
        assert_eq!(decode_length((MAX_MESSAGE_SIZE as u32).to_be_bytes()).unwrap(), MAX_MESSAGE_SIZE);

        let result = decode_length((MAX_MESSAGE_SIZE as u32 + 1).to_be_bytes());
        assert!(matches!(result, Err(ProtocolError::MessageTooLarge { .. })));
    }

    #[tokio::test]
    async fn reject_truncated_payload() {
        // Prefix claims 100 bytes, stream carries 10
        let mut wire = 100u32.to_be_bytes().to_vec();
        wire.extend_from_slice(&[0u8; 10]);

        let mut framed = Framed::new(&wire[..]);
        let result = framed.read_message().await;

        assert!(matches!(result, Err(ProtocolError::ShortRead { expected: 100, actual: 10 })));
    }

    #[tokio::test]
    async fn reject_truncated_prefix() {
        let wire = [0u8, 0];

        let mut framed = Framed::new(&wire[..]);
        let result = framed.read_message().await;

        assert!(matches!(result, Err(ProtocolError::ShortRead { expected: 4, actual: 2 })));
    }

    #[tokio::test]
    async fn write_to_closed_peer_is_transport_error() {
        let (client, server) = tokio::io::duplex(64);
        drop(server);

        let mut framed = Framed::new(client);
        let result = framed.write_message(b"anyone there?").await;

        assert!(matches!(result, Err(ProtocolError::Transport(_))));
    }
}
