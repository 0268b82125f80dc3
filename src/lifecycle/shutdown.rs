//! Shutdown coordination.

use std::future::Future;

use tokio::sync::broadcast;

/// Fans a single stop request out to the server and anything else that
/// needs to drain before telemetry is flushed.
#[derive(Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// A future that resolves once [`Shutdown::trigger`] is called.
    ///
    /// Registration happens here rather than on first poll, so a trigger
    /// between this call and the first poll is not lost.
    pub fn signalled(&self) -> impl Future<Output = ()> + Send + 'static {
        let mut rx = self.tx.subscribe();
        async move {
            let _ = rx.recv().await;
        }
    }

    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
