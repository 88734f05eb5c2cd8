//! Sealwire client binary.
//!
//! # Usage
//!
//! ```bash
//! # Send a file to a server on this machine
//! sealwire-client report.txt
//!
//! # Remote server with a tighter dial limit
//! sealwire-client report.txt --server files.internal:8080 --connect-timeout-ms 2000
//! ```

use std::{path::PathBuf, time::Duration};

use clap::Parser;
use sealwire_client::{ClientConfig, run};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Sealwire file sending client
#[derive(Parser, Debug)]
#[command(name = "sealwire-client")]
#[command(about = "Sends a file over an encrypted TCP channel")]
#[command(version)]
struct Args {
    /// File to send
    file: PathBuf,

    /// Server address
    #[arg(short, long, default_value = "localhost:8080")]
    server: String,

    /// Dial timeout in milliseconds
    #[arg(long, default_value = "5000")]
    connect_timeout_ms: u64,

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

    let config = ClientConfig {
        server_address: args.server,
        connect_timeout: Duration::from_millis(args.connect_timeout_ms),
    };

    run(&config, &args.file).await?;

    Ok(())
}
