//! Shutdown coordination.
//!
//! Stopping the service has two halves: the listener stops accepting and
//! drains connections, and every batch still fanning out is cancelled so the
//! drain does not wait for batch deadlines. [`Shutdown::trigger`] does both.

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

pub struct Shutdown {
    /// Wakes the server's graceful-shutdown future.
    tx: broadcast::Sender<()>,
    /// Root of every batch scope handed out by [`Shutdown::batch_scope`].
    batches: CancellationToken,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self {
            tx,
            batches: CancellationToken::new(),
        }
    }

    /// Subscribe to the stop-accepting signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Parent scope for fetch batches; cancelled by [`Shutdown::trigger`].
    pub fn batch_scope(&self) -> CancellationToken {
        self.batches.child_token()
    }

    /// Cancel in-flight batches, then tell the server to stop accepting.
    pub fn trigger(&self) {
        tracing::info!("Cancelling in-flight batches");
        self.batches.cancel();
        let _ = self.tx.send(());
    }

    pub fn is_triggered(&self) -> bool {
        self.batches.is_cancelled()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
