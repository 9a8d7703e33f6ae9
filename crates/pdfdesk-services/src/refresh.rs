//! Listing refresh notification.

use std::sync::Arc;
use tokio::sync::watch;

/// Tells listing views that the set of stored files changed.
///
/// Each [`notify`](Self::notify) bumps a generation counter; subscribers
/// re-fetch whenever the value they last saw is stale.
#[derive(Clone, Debug)]
pub struct RefreshSignal {
    tx: Arc<watch::Sender<u64>>,
}

impl RefreshSignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0);
        Self { tx: Arc::new(tx) }
    }

    pub fn notify(&self) {
        self.tx.send_modify(|generation| *generation += 1);
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.tx.subscribe()
    }

    /// Number of notifications sent so far.
    pub fn generation(&self) -> u64 {
        *self.tx.borrow()
    }
}

impl Default for RefreshSignal {
    fn default() -> Self {
        Self::new()
    }
}
