//! Sealwire client.
//!
//! Dials a sealwire server, runs the client handshake, and sends one file as
//! two secure messages: its name, then its contents. The server answers with
//! a single receipt string.
//!
//! Only the dial is time-bounded. Once connected, every step waits for the
//! server as long as it takes.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod error;

use std::{
    future::Future,
    io,
    path::{Path, PathBuf},
    time::Duration,
};

pub use error::ClientError;
use sealwire_core::{MessageChannel, ResultExt, SecureChannel, SystemEnv};
use sealwire_proto::Framed;
use tokio::net::TcpStream;
use tracing::{debug, info};

/// Server address used when none is given.
pub const DEFAULT_SERVER_ADDRESS: &str = "localhost:8080";

/// Dial limit used when none is given.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Secure channel over a TCP connection.
pub type Connection = SecureChannel<Framed<TcpStream>>;

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server address (e.g., "localhost:8080")
    pub server_address: String,
    /// Upper bound on establishing the TCP connection
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_address: DEFAULT_SERVER_ADDRESS.to_string(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

/// Open a TCP connection within the configured timeout.
///
/// # Errors
///
/// - `Config` if the address is empty
/// - `ConnectTimeout` if the limit elapses first
/// - `Connect` if the connection is refused or the name does not resolve
pub async fn dial(config: &ClientConfig) -> Result<TcpStream, ClientError> {
    if config.server_address.trim().is_empty() {
        return Err(ClientError::Config("server address is empty".to_string()));
    }

    let stream = bounded(
        &config.server_address,
        config.connect_timeout,
        TcpStream::connect(config.server_address.as_str()),
    )
    .await?;

    debug!("Connected to {}", config.server_address);
    Ok(stream)
}

/// Dial and run the client handshake.
pub async fn connect(config: &ClientConfig) -> Result<Connection, ClientError> {
    let stream = dial(config).await?;
    let channel = sealwire_core::connect(Framed::new(stream), SystemEnv).await?;

    info!("Secure channel established with {}", config.server_address);
    Ok(channel)
}

/// Send one file over an established channel and return the server's receipt.
pub async fn send_file<C>(channel: &mut C, name: &str, contents: &[u8]) -> Result<String, ClientError>
where
    C: MessageChannel,
{
    channel.send(name.as_bytes()).await.context("send file name")?;
    channel.send(contents).await.context("send file contents")?;

    let receipt = channel.receive().await.context("receive receipt")?;
    Ok(String::from_utf8_lossy(&receipt).into_owned())
}

/// Final path component, which is all the server gets to see.
///
/// # Errors
///
/// - `Config` if the path has no file name (e.g. `/` or `..`)
pub fn file_name(path: &Path) -> Result<String, ClientError> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| ClientError::Config(format!("{} has no file name", path.display())))
}

/// Read `path`, send it to the configured server, and return the receipt.
pub async fn run(config: &ClientConfig, path: &Path) -> Result<String, ClientError> {
    let name = file_name(path)?;
    let contents = tokio::fs::read(path)
        .await
        .map_err(|source| ClientError::ReadFile { path: PathBuf::from(path), source })?;

    info!("Sending {} ({} bytes) to {}", name, contents.len(), config.server_address);

    let mut channel = connect(config).await?;
    let receipt = send_file(&mut channel, &name, &contents).await?;

    info!("Server replied: {}", receipt);
    Ok(receipt)
}

async fn bounded<F, T>(address: &str, limit: Duration, attempt: F) -> Result<T, ClientError>
where
    F: Future<Output = io::Result<T>>,
{
    match tokio::time::timeout(limit, attempt).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(source)) => Err(ClientError::Connect { address: address.to_string(), source }),
        Err(_) => Err(ClientError::ConnectTimeout { address: address.to_string(), timeout: limit }),
    }
}
