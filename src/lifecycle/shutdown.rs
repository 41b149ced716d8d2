//! Shutdown coordination.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::broadcast;

/// One-shot stop signal shared by the listener, the signal handler and tests.
///
/// A trigger is latched, so listeners that subscribe after it still stop.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
    triggered: Arc<AtomicBool>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self {
            tx,
            triggered: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Future resolving once shutdown has been requested.
    pub fn signalled(&self) -> impl Future<Output = ()> + Send + 'static {
        let mut rx = self.tx.subscribe();
        let triggered = self.triggered.clone();
        async move {
            if triggered.load(Ordering::Acquire) {
                return;
            }
            let _ = rx.recv().await;
        }
    }

    /// Request shutdown. Repeated calls are no-ops.
    pub fn trigger(&self) {
        if self.triggered.swap(true, Ordering::AcqRel) {
            return;
        }
        tracing::debug!(listeners = self.tx.receiver_count(), "Shutdown requested");
        let _ = self.tx.send(());
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::Acquire)
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_trigger_reaches_every_listener() {
        let shutdown = Shutdown::new();
        let a = tokio::spawn(shutdown.signalled());
        let b = tokio::spawn(shutdown.signalled());

        shutdown.trigger();
        a.await.unwrap();
        b.await.unwrap();
        assert!(shutdown.is_triggered());
    }

    #[tokio::test]
    async fn test_late_listener_sees_earlier_trigger() {
        let shutdown = Shutdown::default();
        shutdown.trigger();
        shutdown.trigger();

        tokio::time::timeout(Duration::from_millis(100), shutdown.signalled())
            .await
            .expect("latched trigger");
    }

    #[tokio::test]
    async fn test_untriggered_listener_stays_pending() {
        let shutdown = Shutdown::new();
        let waited = tokio::time::timeout(Duration::from_millis(20), shutdown.signalled()).await;
        assert!(waited.is_err());
        assert!(!shutdown.is_triggered());
    }
}
