//! Sealwire server binary.
//!
//! # Usage
//!
//! ```bash
//! # Listen on all interfaces, port 8080
//! sealwire-server
//!
//! # Custom address with verbose handshake logging
//! sealwire-server --bind 127.0.0.1:9000 --log-level debug
//! ```
//!
//! Received file contents are written to stdout; logs go to stderr.

use clap::Parser;
use sealwire_server::{Server, ServerRuntimeConfig, generate_keypair, shutdown};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Sealwire file receiving server
#[derive(Parser, Debug)]
#[command(name = "sealwire-server")]
#[command(about = "Receives files over an encrypted TCP channel")]
#[command(version)]
struct Args {
    /// Address to bind to
    #[arg(short, long, default_value = "0.0.0.0:8080")]
    bind: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    tracing::info!("Sealwire server starting");
    tracing::info!("Generating server keypair");

    let keypair = generate_keypair().await?;
    tracing::info!("Server public key:\n{}", keypair.public_key().to_pem()?);

    let config = ServerRuntimeConfig { bind_address: args.bind };
    tracing::info!("Binding to {}", config.bind_address);

    let server = Server::bind(config, keypair).await?;
    tracing::info!("Server listening on {}", server.local_addr()?);

    let (trigger, signal) = shutdown::channel();
    tokio::spawn(async move {
        wait_for_termination().await;
        trigger.trigger();
    });

    server.run(signal).await?;

    Ok(())
}

/// Resolve on SIGINT or, on unix, SIGTERM.
async fn wait_for_termination() {
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Cannot listen for interrupt: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            },
            Err(e) => {
                tracing::warn!("Cannot listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = interrupt => tracing::info!("Interrupt received"),
        () = terminate => tracing::info!("Termination signal received"),
    }
}
