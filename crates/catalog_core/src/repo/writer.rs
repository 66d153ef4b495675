//! Background persistence writer.
//!
//! # Responsibility
//! - Serialize full-collection snapshots and write them to the key-value store.
//! - Keep writes strictly sequential: one write in flight at a time.
//!
//! # Invariants
//! - Snapshots are consumed in the order they were queued.
//! - When several snapshots are queued, only the newest is written.
//! - A failed write is recorded and dropped; it never blocks later writes.

use super::codec::encode_products;
use crate::model::product::Product;
use crate::store::KeyValueStore;
use log::{debug, error, info};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// Durability counters for the persisted collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistenceStatus {
    /// Revision of the newest snapshot that reached the store.
    pub persisted_revision: u64,
    pub successful_writes: u64,
    pub failed_writes: u64,
    /// Snapshots skipped because a newer one was queued behind them.
    pub coalesced_snapshots: u64,
    pub last_error: Option<String>,
}

enum WriterCommand {
    Persist {
        revision: u64,
        snapshot: Vec<Product>,
    },
    Flush(oneshot::Sender<PersistenceStatus>),
}

pub(crate) struct PersistenceWriter {
    sender: Mutex<Option<mpsc::UnboundedSender<WriterCommand>>>,
    task: Mutex<Option<JoinHandle<()>>>,
    status: Arc<Mutex<PersistenceStatus>>,
}

impl PersistenceWriter {
    /// Spawns the writer task on the current Tokio runtime.
    ///
    /// # Panics
    /// Panics when called outside a Tokio runtime context.
    pub(crate) fn spawn(store: Arc<dyn KeyValueStore>, key: String) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let status = Arc::new(Mutex::new(PersistenceStatus::default()));
        let task = tokio::spawn(run_writer(store, key, receiver, Arc::clone(&status)));

        Self {
            sender: Mutex::new(Some(sender)),
            task: Mutex::new(Some(task)),
            status,
        }
    }

    /// Queues a snapshot without waiting for it to be written.
    ///
    /// Returns `false` once the writer has been shut down.
    pub(crate) fn schedule(&self, revision: u64, snapshot: Vec<Product>) -> bool {
        lock(&self.sender).as_ref().is_some_and(|sender| {
            sender
                .send(WriterCommand::Persist { revision, snapshot })
                .is_ok()
        })
    }

    /// Waits until every snapshot queued before this call has been handled.
    pub(crate) async fn flush(&self) -> PersistenceStatus {
        let (reply, receiver) = oneshot::channel();
        let queued = lock(&self.sender)
            .as_ref()
            .is_some_and(|sender| sender.send(WriterCommand::Flush(reply)).is_ok());
        if !queued {
            return self.status();
        }
        match receiver.await {
            Ok(status) => status,
            Err(_) => self.status(),
        }
    }

    pub(crate) fn status(&self) -> PersistenceStatus {
        lock(&self.status).clone()
    }

    /// Closes the queue, lets pending writes finish and joins the task.
    pub(crate) async fn shutdown(&self) -> PersistenceStatus {
        drop(lock(&self.sender).take());
        let task = lock(&self.task).take();
        if let Some(task) = task {
            if let Err(err) = task.await {
                error!("event=persist_writer module=repo status=error error={err}");
            }
        }
        self.status()
    }
}

async fn run_writer(
    store: Arc<dyn KeyValueStore>,
    key: String,
    mut receiver: mpsc::UnboundedReceiver<WriterCommand>,
    status: Arc<Mutex<PersistenceStatus>>,
) {
    debug!("event=persist_writer module=repo status=start");

    while let Some(command) = receiver.recv().await {
        let mut batch = Batch::default();
        batch.absorb(command);
        while let Ok(next) = receiver.try_recv() {
            batch.absorb(next);
        }

        if batch.coalesced > 0 {
            lock(&status).coalesced_snapshots += batch.coalesced;
        }
        if let Some((revision, snapshot)) = batch.pending {
            write_snapshot(&store, &key, revision, snapshot, &status).await;
        }
        if !batch.waiters.is_empty() {
            let current = lock(&status).clone();
            for waiter in batch.waiters {
                let _ = waiter.send(current.clone());
            }
        }
    }

    debug!("event=persist_writer module=repo status=stopped");
}

#[derive(Default)]
struct Batch {
    pending: Option<(u64, Vec<Product>)>,
    waiters: Vec<oneshot::Sender<PersistenceStatus>>,
    coalesced: u64,
}

impl Batch {
    fn absorb(&mut self, command: WriterCommand) {
        match command {
            WriterCommand::Persist { revision, snapshot } => {
                if self.pending.replace((revision, snapshot)).is_some() {
                    self.coalesced += 1;
                }
            }
            WriterCommand::Flush(waiter) => self.waiters.push(waiter),
        }
    }
}

async fn write_snapshot(
    store: &Arc<dyn KeyValueStore>,
    key: &str,
    revision: u64,
    snapshot: Vec<Product>,
    status: &Mutex<PersistenceStatus>,
) {
    let started_at = Instant::now();
    let count = snapshot.len();
    let payload = match encode_products(&snapshot) {
        Ok(payload) => payload,
        Err(err) => {
            record_failure(status, revision, err.to_string());
            return;
        }
    };

    let store = Arc::clone(store);
    let key = key.to_string();
    let result = tokio::task::spawn_blocking(move || store.write(&key, &payload)).await;

    match result {
        Ok(Ok(())) => {
            let mut current = lock(status);
            current.persisted_revision = revision;
            current.successful_writes += 1;
            info!(
                "event=persist_write module=repo status=ok revision={} count={} duration_ms={}",
                revision,
                count,
                started_at.elapsed().as_millis()
            );
        }
        Ok(Err(err)) => record_failure(status, revision, err.to_string()),
        Err(err) => record_failure(status, revision, format!("write task failed: {err}")),
    }
}

fn record_failure(status: &Mutex<PersistenceStatus>, revision: u64, message: String) {
    error!(
        "event=persist_write module=repo status=error revision={} error={}",
        revision, message
    );
    let mut current = lock(status);
    current.failed_writes += 1;
    current.last_error = Some(message);
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
