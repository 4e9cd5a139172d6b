#![forbid(unsafe_code)]

use navet_core::ids::UserId;
use navet_core::model::{PushSubscription, User};
use navet_core::org::OrgTree;
use navet_core::scope::Scope;
use navet_storage::SqliteStore;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread::JoinHandle;

use crate::error::EngineError;

/// The message handed to the external push transport, serialized as JSON.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct PushPayload {
    pub title: String,
    pub message: String,
    pub link: String,
    pub related_id: Option<String>,
}

#[derive(Debug)]
pub enum DeliveryError {
    /// The endpoint is permanently dead; the subscription should be pruned.
    Gone,
    Failed(String),
}

impl std::fmt::Display for DeliveryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Gone => write!(f, "endpoint gone"),
            Self::Failed(reason) => write!(f, "delivery failed: {reason}"),
        }
    }
}

impl std::error::Error for DeliveryError {}

/// External push delivery. Implementations wrap whatever wire protocol the
/// deployment uses; the dispatcher only cares about success, permanent
/// failure (prune), and transient failure (log and move on).
pub trait PushTransport: Send + Sync {
    fn deliver(
        &self,
        subscription: &PushSubscription,
        payload_json: &str,
    ) -> Result<(), DeliveryError>;
}

#[derive(Clone, Debug)]
pub struct DeliveryJob {
    pub user_id: UserId,
    pub payload: PushPayload,
}

/// Every user whose station membership matches the post's scope, excluding
/// the author. Users without a station are never notified.
pub fn notify_set(
    tree: &OrgTree,
    users: &[User],
    scope: Scope,
    target: &str,
    author_id: UserId,
) -> Vec<UserId> {
    users
        .iter()
        .filter(|user| user.id != author_id)
        .filter(|user| {
            let Some(station) = user.station.as_deref() else {
                return false;
            };
            match scope {
                Scope::Station => station == target,
                Scope::Area => tree.station_area(station).as_deref() == Some(target),
                Scope::Region => tree.station_region(station).as_deref() == Some(target),
            }
        })
        .map(|user| user.id)
        .collect()
}

/// Asynchronous delivery queue: notification fan-out enqueues jobs, a worker
/// thread drains them. Fire-and-forget relative to the transaction that
/// triggered the fan-out; delivery failures never reach the caller.
pub struct NotificationDispatcher {
    sender: Option<Sender<DeliveryJob>>,
    worker: Option<JoinHandle<()>>,
}

impl NotificationDispatcher {
    /// Spawns the worker with its own store connection for subscription
    /// lookup and pruning.
    pub fn spawn(
        storage_dir: impl AsRef<Path>,
        transport: Arc<dyn PushTransport>,
    ) -> Result<Self, EngineError> {
        let store = SqliteStore::open(storage_dir)?;
        let (sender, receiver) = channel();
        let worker = std::thread::spawn(move || worker_loop(store, transport, receiver));
        Ok(Self {
            sender: Some(sender),
            worker: Some(worker),
        })
    }

    /// No worker; enqueued jobs are dropped. For tests and embeddings that
    /// do not deliver pushes.
    pub fn disconnected() -> Self {
        Self {
            sender: None,
            worker: None,
        }
    }

    /// Best effort: a closed queue means deliveries are skipped, which
    /// at-least-once semantics tolerate.
    pub fn enqueue(&self, job: DeliveryJob) {
        if let Some(sender) = &self.sender {
            let _ = sender.send(job);
        }
    }

    /// Closes the queue and waits for in-flight deliveries to finish.
    pub fn shutdown(mut self) {
        self.close_and_join();
    }

    fn close_and_join(&mut self) {
        drop(self.sender.take());
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl Drop for NotificationDispatcher {
    fn drop(&mut self) {
        self.close_and_join();
    }
}

fn worker_loop(
    mut store: SqliteStore,
    transport: Arc<dyn PushTransport>,
    receiver: Receiver<DeliveryJob>,
) {
    while let Ok(job) = receiver.recv() {
        let payload_json = match serde_json::to_string(&job.payload) {
            Ok(json) => json,
            Err(err) => {
                tracing::warn!(error = %err, "push payload serialization failed");
                continue;
            }
        };
        let subscriptions = match store.push_subscriptions_for_user(job.user_id) {
            Ok(subscriptions) => subscriptions,
            Err(err) => {
                tracing::warn!(user = %job.user_id, error = %err, "subscription lookup failed");
                continue;
            }
        };
        for subscription in subscriptions {
            match transport.deliver(&subscription, &payload_json) {
                Ok(()) => {
                    tracing::debug!(user = %job.user_id, "push delivered");
                }
                Err(DeliveryError::Gone) => {
                    tracing::warn!(endpoint = %subscription.endpoint, "endpoint gone, pruning subscription");
                    if let Err(err) = store.push_subscription_remove(&subscription.endpoint) {
                        tracing::warn!(error = %err, "subscription prune failed");
                    }
                }
                Err(DeliveryError::Failed(reason)) => {
                    tracing::warn!(endpoint = %subscription.endpoint, reason = %reason, "push delivery failed");
                }
            }
        }
    }
}
