// Polling snapshot listener
//
// The cloud has no push channel, so live subscriptions are poll-based: a
// background task fetches the collection on an interval and delivers a
// snapshot whenever the contents change. Delivery errors are forwarded to
// the consumer and polling continues -- retry lives here, not in the
// consumer.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::cloud::client::CloudClient;
use crate::cloud::{Document, OrderBy};
use crate::error::Error;

const SNAPSHOT_CHANNEL_SIZE: usize = 16;

/// One snapshot delivery: the full collection contents, or the error that
/// prevented fetching them (the previous snapshot remains valid).
pub type SnapshotResult = Result<Vec<Document>, Error>;

/// Handle to a live collection subscription.
///
/// Consume with [`recv`](Self::recv); tear down with
/// [`shutdown`](Self::shutdown). Cancellation is explicit -- dropping the
/// handle stops delivery (the channel closes) but only `shutdown` joins
/// the polling task.
pub struct SnapshotListener {
    rx: mpsc::Receiver<SnapshotResult>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl SnapshotListener {
    pub(crate) fn new(
        rx: mpsc::Receiver<SnapshotResult>,
        cancel: CancellationToken,
        task: JoinHandle<()>,
    ) -> Self {
        Self {
            rx,
            cancel,
            task: Some(task),
        }
    }

    /// Build a listener fed directly from a channel, with no backing task.
    ///
    /// This is the seam for in-memory store implementations and tests: the
    /// sender side plays the role of the cloud.
    pub fn from_channel(rx: mpsc::Receiver<SnapshotResult>) -> Self {
        Self {
            rx,
            cancel: CancellationToken::new(),
            task: None,
        }
    }

    /// Wait for the next snapshot delivery.
    ///
    /// Returns `None` once the subscription has ended (cancelled, or the
    /// sender side went away).
    pub async fn recv(&mut self) -> Option<SnapshotResult> {
        self.rx.recv().await
    }

    /// Cancel the subscription and join the polling task.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        self.rx.close();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl CloudClient {
    /// Open a live subscription to a user's collection.
    ///
    /// Spawns a polling task that fetches every `poll_interval` and
    /// delivers a snapshot when the contents differ from the previous
    /// delivery (the first fetch is always delivered). Fetch failures are
    /// delivered as `Err` and polling continues.
    pub fn listen(
        &self,
        user_id: &str,
        collection: &str,
        order: Option<OrderBy>,
        poll_interval: Duration,
    ) -> SnapshotListener {
        let (tx, rx) = mpsc::channel(SNAPSHOT_CHANNEL_SIZE);
        let cancel = CancellationToken::new();

        let client = self.clone();
        let user_id = user_id.to_owned();
        let collection = collection.to_owned();
        let task_cancel = cancel.clone();

        let task = tokio::spawn(async move {
            poll_loop(
                client,
                user_id,
                collection,
                order,
                poll_interval,
                tx,
                task_cancel,
            )
            .await;
        });

        SnapshotListener::new(rx, cancel, task)
    }
}

#[allow(clippy::too_many_arguments)]
async fn poll_loop(
    client: CloudClient,
    user_id: String,
    collection: String,
    order: Option<OrderBy>,
    poll_interval: Duration,
    tx: mpsc::Sender<SnapshotResult>,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(poll_interval);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let mut last: Option<Vec<Document>> = None;

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = interval.tick() => {
                match client.list_documents(&user_id, &collection, order.as_ref()).await {
                    Ok(documents) => {
                        if last.as_ref() == Some(&documents) {
                            continue; // unchanged -- no delivery
                        }
                        last = Some(documents.clone());
                        if tx.send(Ok(documents)).await.is_err() {
                            break; // consumer gone
                        }
                    }
                    Err(e) => {
                        warn!(collection, error = %e, "snapshot fetch failed");
                        if tx.send(Err(e)).await.is_err() {
                            break;
                        }
                    }
                }
            }
        }
    }

    debug!(collection, "snapshot listener stopped");
}
