use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

/// Current wallet account as a watch stream. The provider's account list is
/// pushed through [`AccountWatch::accounts_changed`]; subscribers see the
/// new current account without reconnecting.
#[derive(Debug, Clone)]
pub struct AccountWatch {
    tx: Arc<watch::Sender<Option<String>>>,
}

impl Default for AccountWatch {
    fn default() -> Self {
        Self::new()
    }
}

impl AccountWatch {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        AccountWatch { tx: Arc::new(tx) }
    }

    /// Takes the zeroth account as the current user. An empty list
    /// disconnects.
    pub fn accounts_changed(&self, accounts: &[String]) -> Option<String> {
        let current = accounts.first().cloned();
        let previous = self.tx.send_replace(current.clone());
        if previous != current {
            info!(account = ?current, "Wallet account changed");
        }
        current
    }

    pub fn current(&self) -> Option<String> {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.tx.subscribe()
    }
}
