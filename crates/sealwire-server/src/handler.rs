//! File receiving over an established secure channel.
//!
//! The client sends exactly two messages, the file name and then the file
//! contents. The server writes the contents to its output and answers with a
//! single human-readable receipt.
//!
//! The output is shared by every connection. A transfer holds its lock only
//! while writing, so each file lands as one contiguous block and slow clients
//! never block the others while their contents are still in flight.

use sealwire_core::{ErrorKind, MessageChannel, Result, ResultExt, SessionError};
use tokio::{
    io::{AsyncWrite, AsyncWriteExt},
    sync::Mutex,
};

/// File received from one client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedFile {
    /// Name as sent by the client, lossily decoded as UTF-8
    pub name: String,
    /// Size of the contents in bytes
    pub size: usize,
}

impl ReceivedFile {
    /// Receipt text sent back to the client.
    pub fn receipt(&self) -> String {
        format!("received file {} ({} bytes)", self.name, self.size)
    }
}

/// Receive one file, copy its contents to `output`, and send the receipt.
///
/// # Errors
///
/// Any channel error, or `Transport` if writing to `output` fails. The
/// receipt is only sent after the contents reach `output`.
pub async fn handle_transfer<C, W>(channel: &mut C, output: &Mutex<W>) -> Result<ReceivedFile>
where
    C: MessageChannel,
    W: AsyncWrite + Unpin + Send,
{
    let name = channel.receive().await.context("receive file name")?;
    let name = String::from_utf8_lossy(&name).into_owned();

    let contents = channel.receive().await.context("receive file contents")?;

    {
        let mut output = output.lock().await;
        write_contents(&mut *output, &contents).await.context("write file contents")?;
    }

    let file = ReceivedFile { name, size: contents.len() };
    channel.send(file.receipt().as_bytes()).await.context("send receipt")?;

    Ok(file)
}

async fn write_contents<W>(output: &mut W, contents: &[u8]) -> Result<()>
where
    W: AsyncWrite + Unpin + Send,
{
    output.write_all(contents).await.map_err(|e| SessionError::with_source(ErrorKind::Transport, e))?;
    output.flush().await.map_err(|e| SessionError::with_source(ErrorKind::Transport, e))
}

#[cfg(test)]
mod tests {
    use std::{
        io,
        pin::Pin,
        task::{Context, Poll},
    };

    use sealwire_core::{SecureChannel, SystemEnv};
    use sealwire_crypto::SessionKey;
    use sealwire_proto::Framed;
    use tokio::io::{DuplexStream, duplex};

    use super::*;

    type Secure = SecureChannel<Framed<DuplexStream>>;

    fn secure_pair() -> (Secure, Secure) {
        let key = SessionKey::from_bytes([9; 32]);
        let (a, b) = duplex(64 * 1024);
        (
            SecureChannel::new(Framed::new(a), &key, SystemEnv),
            SecureChannel::new(Framed::new(b), &key, SystemEnv),
        )
    }

    struct BrokenOutput;

    impl AsyncWrite for BrokenOutput {
        fn poll_write(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &[u8],
        ) -> Poll<io::Result<usize>> {
            Poll::Ready(Err(io::ErrorKind::BrokenPipe.into()))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    /// Accepts a few bytes per write and yields in between, like a pipe
    /// that is slower than the sender.
    #[derive(Default)]
    struct TrickleOutput {
        written: Vec<u8>,
        ready: bool,
    }

    impl AsyncWrite for TrickleOutput {
        fn poll_write(
            mut self: Pin<&mut Self>,
            cx: &mut Context<'_>,
            buf: &[u8],
        ) -> Poll<io::Result<usize>> {
            if !self.ready {
                self.ready = true;
                cx.waker().wake_by_ref();
                return Poll::Pending;
            }
            self.ready = false;

            let n = buf.len().min(7);
            self.written.extend_from_slice(&buf[..n]);
            Poll::Ready(Ok(n))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    #[test]
    fn receipt_format() {
        let file = ReceivedFile { name: "report.txt".to_string(), size: 11 };
        assert_eq!(file.receipt(), "received file report.txt (11 bytes)");
    }

    #[tokio::test]
    async fn transfer_writes_contents_and_replies() {
        let (mut client, mut server) = secure_pair();
        let output = Mutex::new(Vec::new());

        client.send(b"report.txt").await.unwrap();
        client.send(b"hello world").await.unwrap();

        let file = handle_transfer(&mut server, &output).await.unwrap();

        assert_eq!(file, ReceivedFile { name: "report.txt".to_string(), size: 11 });
        assert_eq!(output.into_inner(), b"hello world");
        assert_eq!(&client.receive().await.unwrap()[..], b"received file report.txt (11 bytes)");
    }

    #[tokio::test]
    async fn empty_file_is_accepted() {
        let (mut client, mut server) = secure_pair();
        let output = Mutex::new(Vec::new());

        client.send(b"empty").await.unwrap();
        client.send(b"").await.unwrap();

        let file = handle_transfer(&mut server, &output).await.unwrap();

        assert_eq!(file.size, 0);
        assert!(output.into_inner().is_empty());
        assert_eq!(&client.receive().await.unwrap()[..], b"received file empty (0 bytes)");
    }

    #[tokio::test]
    async fn invalid_utf8_name_is_replaced() {
        let (mut client, mut server) = secure_pair();
        let output = Mutex::new(Vec::new());

        client.send(&[b'a', 0xFF, b'b']).await.unwrap();
        client.send(b"x").await.unwrap();

        let file = handle_transfer(&mut server, &output).await.unwrap();

        assert_eq!(file.name, "a\u{FFFD}b");
    }

    #[tokio::test]
    async fn client_leaving_after_name_is_short_read() {
        let (mut client, mut server) = secure_pair();
        let output = Mutex::new(Vec::new());

        client.send(b"report.txt").await.unwrap();
        drop(client);

        let err = handle_transfer(&mut server, &output).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ShortRead);
        assert_eq!(err.operations().next(), Some("receive file contents"));
    }

    #[tokio::test]
    async fn output_failure_sends_no_receipt() {
        let (mut client, mut server) = secure_pair();

        client.send(b"report.txt").await.unwrap();
        client.send(b"hello world").await.unwrap();

        let err = handle_transfer(&mut server, &Mutex::new(BrokenOutput)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(err.operations().next(), Some("write file contents"));

        drop(server);
        assert_eq!(client.receive().await.unwrap_err().kind(), ErrorKind::ShortRead);
    }

    #[tokio::test]
    async fn concurrent_transfers_do_not_interleave_output() {
        let (mut first_client, mut first_server) = secure_pair();
        let (mut second_client, mut second_server) = secure_pair();
        let output = Mutex::new(TrickleOutput::default());

        first_client.send(b"a.bin").await.unwrap();
        first_client.send(&[b'a'; 100]).await.unwrap();
        second_client.send(b"b.bin").await.unwrap();
        second_client.send(&[b'b'; 100]).await.unwrap();

        let (first, second) = tokio::join!(
            handle_transfer(&mut first_server, &output),
            handle_transfer(&mut second_server, &output),
        );
        first.unwrap();
        second.unwrap();

        let written = output.into_inner().written;
        assert_eq!(written.len(), 200);
        let boundaries = written.windows(2).filter(|pair| pair[0] != pair[1]).count();
        assert_eq!(boundaries, 1, "output interleaved: {}", String::from_utf8_lossy(&written));
    }
}
