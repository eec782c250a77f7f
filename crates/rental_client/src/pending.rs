//! Submitted ledger calls awaiting settlement.

use std::time::Duration;

use tokio::sync::oneshot;
use tokio::time;
use tracing::warn;

use crate::error::ClientError;

/// Handle returned for every submitted call. Dropping it does not withdraw
/// the submission; the ledger settles it either way.
#[derive(Debug)]
pub struct Pending<T> {
    call: &'static str,
    rx: oneshot::Receiver<Result<T, ClientError>>,
}

/// Ledger side of a [`Pending`].
#[derive(Debug)]
pub struct Settler<T> {
    tx: oneshot::Sender<Result<T, ClientError>>,
}

impl<T> Pending<T> {
    pub fn channel(call: &'static str) -> (Settler<T>, Pending<T>) {
        let (tx, rx) = oneshot::channel();
        (Settler { tx }, Pending { call, rx })
    }

    /// A call the ledger settled synchronously.
    pub fn settled(call: &'static str, result: Result<T, ClientError>) -> Self {
        let (settler, pending) = Self::channel(call);
        settler.settle(result);
        pending
    }

    pub fn call(&self) -> &'static str {
        self.call
    }

    pub async fn wait(self, timeout: Duration) -> Result<T, ClientError> {
        let call = self.call;
        match time::timeout(timeout, self.rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(ClientError::Dropped { call }),
            Err(_) => {
                warn!(call, ?timeout, "Call not confirmed in time");
                Err(ClientError::ConfirmationTimeout { call, after: timeout })
            }
        }
    }
}

impl<T> Settler<T> {
    pub fn settle(self, result: Result<T, ClientError>) {
        // the caller may have stopped waiting
        let _ = self.tx.send(result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn settled_calls_resolve_immediately() {
        let pending = Pending::settled("approve", Ok(7u64));
        assert_eq!(pending.call(), "approve");
        assert_eq!(pending.wait(Duration::from_secs(1)).await, Ok(7));

        let failed: Pending<()> = Pending::settled("end_rental", Err(ClientError::NoAccount));
        assert_eq!(failed.wait(Duration::from_secs(1)).await, Err(ClientError::NoAccount));
    }

    #[tokio::test]
    async fn settles_from_another_task() {
        let (settler, pending) = Pending::channel("start_rental");
        tokio::spawn(async move {
            time::sleep(Duration::from_millis(10)).await;
            settler.settle(Ok("done"));
        });
        assert_eq!(pending.wait(Duration::from_secs(5)).await, Ok("done"));
    }

    #[tokio::test]
    async fn times_out_without_settlement() {
        let (_settler, pending) = Pending::<()>::channel("approve");
        let after = Duration::from_millis(20);
        assert_eq!(
            pending.wait(after).await,
            Err(ClientError::ConfirmationTimeout { call: "approve", after })
        );
    }

    #[tokio::test]
    async fn dropped_settler_is_reported() {
        let (settler, pending) = Pending::<()>::channel("cancel_request");
        drop(settler);
        assert_eq!(
            pending.wait(Duration::from_secs(1)).await,
            Err(ClientError::Dropped { call: "cancel_request" })
        );
    }
}
