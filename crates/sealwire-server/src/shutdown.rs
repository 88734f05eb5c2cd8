//! Shutdown signalling between the process and the acceptor.
//!
//! The flag only moves from "running" to "stopping". Dropping the trigger
//! without firing it also counts as a shutdown request, so an acceptor can
//! never outlive whoever controls it.

use tokio::sync::watch;

/// Create a linked trigger/signal pair.
pub fn channel() -> (ShutdownTrigger, ShutdownSignal) {
    let (tx, rx) = watch::channel(false);
    (ShutdownTrigger { tx }, ShutdownSignal { rx })
}

/// Sending half, held by whatever decides the process should stop.
#[derive(Debug)]
pub struct ShutdownTrigger {
    tx: watch::Sender<bool>,
}

impl ShutdownTrigger {
    /// Request shutdown. Idempotent.
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }
}

/// Receiving half, observed by the acceptor.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// Whether shutdown has been requested.
    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow() || self.rx.has_changed().is_err()
    }

    /// Resolve once shutdown has been requested.
    pub async fn wait(&mut self) {
        // Err means the trigger was dropped, which also means stop
        let _ = self.rx.wait_for(|&stopping| stopping).await;
    }
}
