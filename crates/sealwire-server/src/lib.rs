//! Sealwire server.
//!
//! Production runtime around [`sealwire_core`]: a TCP listener, one task per
//! connection, and a cooperative shutdown path.
//!
//! # Architecture
//!
//! ```text
//!              ┌───────────────┐
//!   TCP ──────▶│   acceptor    │◀── ShutdownSignal
//!              └──────┬────────┘
//!                     │ spawn (JoinSet)
//!        ┌────────────┼────────────┐
//!        ▼            ▼            ▼
//!   connection    connection   connection      accept() handshake,
//!    task          task         task           then handle_transfer()
//! ```
//!
//! Connections share two things: the server keypair, which is immutable and
//! held behind an [`Arc`], and stdout, behind an async mutex so that each
//! received file is written as one contiguous block.
//!
//! # Shutdown
//!
//! Once the signal fires the acceptor stops, the listener is closed, and
//! [`Server::run`] waits for every connection already in flight. There is no
//! forced cancellation: a peer that stalls mid-transfer holds up shutdown.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod error;
pub mod handler;
pub mod shutdown;

use std::{net::SocketAddr, sync::Arc};

pub use error::ServerError;
pub use handler::{ReceivedFile, handle_transfer};
use sealwire_core::{ErrorKind, SessionError, SystemEnv};
use sealwire_crypto::ServerKeypair;
use sealwire_proto::Framed;
pub use shutdown::{ShutdownSignal, ShutdownTrigger};
use tokio::{
    io::Stdout,
    net::{TcpListener, TcpStream},
    sync::Mutex,
    task::{JoinError, JoinSet},
};
use tracing::{Instrument, Level, debug, error, info, info_span, warn};

/// Port the server listens on by default.
pub const DEFAULT_PORT: u16 = 8080;

/// Server configuration for the production runtime.
#[derive(Debug, Clone)]
pub struct ServerRuntimeConfig {
    /// Address to bind to (e.g., "0.0.0.0:8080")
    pub bind_address: String,
}

impl Default for ServerRuntimeConfig {
    fn default() -> Self {
        Self { bind_address: format!("0.0.0.0:{DEFAULT_PORT}") }
    }
}

/// Generate the server keypair on the blocking pool.
///
/// RSA-2048 generation takes long enough to stall an executor thread.
pub async fn generate_keypair() -> Result<Arc<ServerKeypair>, ServerError> {
    let keypair = tokio::task::spawn_blocking(ServerKeypair::generate)
        .await
        .map_err(|e| ServerError::Internal(format!("key generation task failed: {e}")))??;

    Ok(Arc::new(keypair))
}

/// Production sealwire server.
pub struct Server {
    listener: TcpListener,
    keypair: Arc<ServerKeypair>,
}

impl Server {
    /// Bind the listener.
    ///
    /// # Errors
    ///
    /// - `Config` if the bind address is empty
    /// - `Bind` if the socket cannot be bound
    pub async fn bind(
        config: ServerRuntimeConfig,
        keypair: Arc<ServerKeypair>,
    ) -> Result<Self, ServerError> {
        if config.bind_address.trim().is_empty() {
            return Err(ServerError::Config("bind address is empty".to_string()));
        }

        let listener = TcpListener::bind(&config.bind_address)
            .await
            .map_err(|source| ServerError::Bind { address: config.bind_address, source })?;

        Ok(Self { listener, keypair })
    }

    /// Local address the server is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections until `shutdown` fires, then drain.
    ///
    /// Returns only after every connection task has finished. Per-connection
    /// failures are logged and never returned.
    pub async fn run(self, mut shutdown: ShutdownSignal) -> Result<(), ServerError> {
        let Self { listener, keypair } = self;
        info!("Server accepting connections on {}", listener.local_addr()?);

        let output = Arc::new(Mutex::new(tokio::io::stdout()));
        let mut connections = JoinSet::new();

        loop {
            tokio::select! {
                biased;

                () = shutdown.wait() => {
                    info!("Shutdown requested, no longer accepting connections");
                    break;
                },
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        let keypair = Arc::clone(&keypair);
                        let output = Arc::clone(&output);
                        let span = info_span!("connection", %peer);
                        connections
                            .spawn(serve_connection(stream, keypair, output).instrument(span));
                    },
                    Err(e) if shutdown.is_triggered() => {
                        debug!("Accept interrupted by shutdown: {}", e);
                        break;
                    },
                    Err(e) => {
                        error!("Accept error: {}", e);
                    },
                },
                Some(joined) = connections.join_next(), if !connections.is_empty() => {
                    log_join(joined);
                },
            }
        }

        drop(listener);

        if !connections.is_empty() {
            info!("Waiting for {} connection(s) to finish", connections.len());
        }
        while let Some(joined) = connections.join_next().await {
            log_join(joined);
        }

        info!("Server stopped");
        Ok(())
    }
}

/// Handshake and receive one file. Never fails; errors end the connection.
async fn serve_connection(
    stream: TcpStream,
    keypair: Arc<ServerKeypair>,
    output: Arc<Mutex<Stdout>>,
) {
    debug!("Connection accepted");

    let mut channel = match sealwire_core::accept(Framed::new(stream), &keypair, SystemEnv).await
    {
        Ok(channel) => channel,
        Err(e) => {
            log_failure("Handshake", &e);
            return;
        },
    };

    match handle_transfer(&mut channel, &*output).await {
        Ok(file) => info!(name = %file.name, size = file.size, "File received"),
        Err(e) => log_failure("Transfer", &e),
    }
}

/// Peers that hang up or send malformed frames are routine on an open port;
/// anything else is worth a warning.
fn failure_level(err: &SessionError) -> Level {
    let kind = err.kind();
    if kind.is_framing() || kind == ErrorKind::Transport { Level::INFO } else { Level::WARN }
}

fn log_failure(stage: &str, err: &SessionError) {
    if failure_level(err) == Level::WARN {
        warn!(kind = %err.kind(), "{} failed: {}", stage, err);
    } else {
        info!(kind = %err.kind(), "{} failed: {}", stage, err);
    }
}

fn log_join(joined: Result<(), JoinError>) {
    if let Err(e) = joined {
        if e.is_panic() {
            error!("Connection task panicked: {}", e);
        } else {
            debug!("Connection task cancelled: {}", e);
        }
    }
}
