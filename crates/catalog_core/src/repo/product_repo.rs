//! Product repository: the authoritative in-memory catalog.
//!
//! # Responsibility
//! - Own the product collection and serve list/get/create/update/delete.
//! - Load persisted state once (hydration) and mirror every later mutation
//!   to the key-value store through the background writer.
//! - Notify subscribers after each change.
//!
//! # Invariants
//! - Product ids are unique within the collection at all times.
//! - No persistence write is scheduled before hydration completes, so seed
//!   data can never overwrite persisted data that has not been read yet.
//! - Persistence snapshots and listener snapshots are both queued while the
//!   state lock is held, so writes land and listeners fire in mutation order.
//! - Listeners never run while the state lock is held.
//! - Store failures never fail or roll back an in-memory mutation.

use super::codec::decode_products;
use super::observer::{ListenerRegistry, NotificationQueue, SubscriptionId};
use super::seed::seed_products;
use super::writer::{PersistenceStatus, PersistenceWriter};
use crate::model::product::{Product, ProductDraft, ProductId};
use crate::store::KeyValueStore;
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tokio::sync::OnceCell;
use uuid::Uuid;

/// Storage key holding the serialized collection.
pub const DEFAULT_STORAGE_KEY: &str = "@catalog/products";

const MAX_ID_ATTEMPTS: usize = 8;

pub type RepoResult<T> = Result<T, RepoError>;

/// Logical repository failure reported to callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoError {
    NotFound(ProductId),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "product not found: {id}"),
        }
    }
}

impl Error for RepoError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryConfig {
    pub storage_key: String,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
        }
    }
}

/// Source of candidate ids for newly created products.
///
/// Candidates are checked against the collection, so a source is not
/// required to be collision-free.
pub trait IdSource: Send + Sync {
    fn next_id(&self) -> ProductId;
}

/// Random UUID v4 ids in simple (hyphen-less) form.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIdSource;

impl IdSource for UuidIdSource {
    fn next_id(&self) -> ProductId {
        Uuid::new_v4().simple().to_string()
    }
}

/// How hydration resolved the initial collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HydrationOutcome {
    /// Persisted collection replaced the seed.
    Restored { count: usize },
    /// Nothing persisted yet; seed kept.
    Seeded,
    /// Persisted payload could not be decoded; seed kept.
    RecoveredFromMalformed,
    /// Store read failed; seed kept and nothing written back.
    RecoveredFromReadError,
}

struct RepositoryState {
    products: Vec<Product>,
    hydrated: bool,
    revision: u64,
}

struct Shared {
    state: Mutex<RepositoryState>,
    listeners: Mutex<ListenerRegistry>,
    notifications: Mutex<NotificationQueue>,
    hydration: OnceCell<HydrationOutcome>,
    writer: PersistenceWriter,
    store: Arc<dyn KeyValueStore>,
    config: RepositoryConfig,
    ids: Box<dyn IdSource>,
}

/// Shared handle to the product repository.
///
/// Clones refer to the same collection; construct one per process and pass
/// it to collaborators.
#[derive(Clone)]
pub struct ProductRepository {
    shared: Arc<Shared>,
}

impl ProductRepository {
    /// Creates a repository holding the seed collection and spawns its
    /// persistence writer. Call `hydrate` to load persisted state.
    ///
    /// # Panics
    /// Panics when called outside a Tokio runtime context.
    pub fn new(store: Arc<dyn KeyValueStore>, config: RepositoryConfig) -> Self {
        Self::with_id_source(store, config, Box::new(UuidIdSource))
    }

    pub fn with_id_source(
        store: Arc<dyn KeyValueStore>,
        config: RepositoryConfig,
        ids: Box<dyn IdSource>,
    ) -> Self {
        let writer = PersistenceWriter::spawn(Arc::clone(&store), config.storage_key.clone());
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(RepositoryState {
                    products: seed_products(),
                    hydrated: false,
                    revision: 0,
                }),
                listeners: Mutex::new(ListenerRegistry::default()),
                notifications: Mutex::new(NotificationQueue::default()),
                hydration: OnceCell::new(),
                writer,
                store,
                config,
                ids,
            }),
        }
    }

    /// Loads the persisted collection, once per repository.
    ///
    /// Concurrent and repeated callers all observe the first load's outcome.
    /// Every failure path keeps the seed collection.
    pub async fn hydrate(&self) -> HydrationOutcome {
        *self
            .shared
            .hydration
            .get_or_init(|| self.load_persisted())
            .await
    }

    pub fn is_hydrated(&self) -> bool {
        self.state().hydrated
    }

    /// Returns a snapshot of the collection in stored order.
    pub fn list(&self) -> Vec<Product> {
        self.state().products.clone()
    }

    pub fn get(&self, id: &str) -> Option<Product> {
        self.state()
            .products
            .iter()
            .find(|product| product.id == id)
            .cloned()
    }

    /// Appends a new product with a freshly assigned unique id.
    pub fn create(&self, draft: ProductDraft) -> Product {
        let mut state = self.state();
        let id = allocate_id(&state.products, self.shared.ids.as_ref());
        let product = Product::from_draft(id, draft);
        state.products.push(product.clone());
        self.commit(&mut state, "create");
        drop(state);

        self.deliver_notifications();
        product
    }

    /// Replaces name/image/description of an existing product in place.
    pub fn update(&self, id: &str, draft: ProductDraft) -> RepoResult<Product> {
        let mut state = self.state();
        let Some(product) = state.products.iter_mut().find(|product| product.id == id) else {
            return Err(RepoError::NotFound(id.to_string()));
        };
        product.apply_draft(draft);
        let updated = product.clone();
        self.commit(&mut state, "update");
        drop(state);

        self.deliver_notifications();
        Ok(updated)
    }

    /// Removes the product with `id` and returns it.
    pub fn delete(&self, id: &str) -> RepoResult<Product> {
        let mut state = self.state();
        let Some(position) = state.products.iter().position(|product| product.id == id) else {
            return Err(RepoError::NotFound(id.to_string()));
        };
        let removed = state.products.remove(position);
        self.commit(&mut state, "delete");
        drop(state);

        self.deliver_notifications();
        Ok(removed)
    }

    /// Registers a listener invoked with the new collection after each change.
    pub fn subscribe(
        &self,
        listener: impl Fn(&[Product]) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.listeners().add(Arc::new(listener))
    }

    /// Returns `false` when the subscription was already removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.listeners().remove(id)
    }

    /// Waits for every write scheduled so far to land (or fail).
    pub async fn flush(&self) -> PersistenceStatus {
        self.shared.writer.flush().await
    }

    pub fn persistence_status(&self) -> PersistenceStatus {
        self.shared.writer.status()
    }

    /// Drains pending writes and stops the writer.
    ///
    /// Later mutations still apply in memory but are no longer persisted.
    pub async fn shutdown(&self) -> PersistenceStatus {
        let status = self.shared.writer.shutdown().await;
        info!(
            "event=repo_shutdown module=repo status=ok persisted_revision={} failed_writes={}",
            status.persisted_revision, status.failed_writes
        );
        status
    }

    async fn load_persisted(&self) -> HydrationOutcome {
        let started_at = Instant::now();
        info!("event=repo_hydrate module=repo status=start");

        let store = Arc::clone(&self.shared.store);
        let key = self.shared.config.storage_key.clone();
        let read = tokio::task::spawn_blocking(move || store.read(&key)).await;

        let (outcome, restored) = match read {
            Ok(Ok(Some(raw))) if !raw.trim().is_empty() => match decode_products(&raw) {
                Ok(products) => (
                    HydrationOutcome::Restored {
                        count: products.len(),
                    },
                    Some(products),
                ),
                Err(err) => {
                    warn!("event=repo_hydrate module=repo status=fallback reason=malformed error={err}");
                    (HydrationOutcome::RecoveredFromMalformed, None)
                }
            },
            Ok(Ok(_)) => (HydrationOutcome::Seeded, None),
            Ok(Err(err)) => {
                warn!("event=repo_hydrate module=repo status=fallback reason=read_failed error={err}");
                (HydrationOutcome::RecoveredFromReadError, None)
            }
            Err(err) => {
                warn!("event=repo_hydrate module=repo status=fallback reason=read_task_failed error={err}");
                (HydrationOutcome::RecoveredFromReadError, None)
            }
        };

        let count = {
            let mut state = self.state();
            if let Some(products) = restored {
                state.products = products;
                state.revision += 1;
                self.enqueue_notification(state.products.clone());
            }
            state.hydrated = true;
            // Bring an empty or unreadable-format blob in line with memory.
            // After a read error the blob may still be good, so leave it.
            if matches!(
                outcome,
                HydrationOutcome::Seeded | HydrationOutcome::RecoveredFromMalformed
            ) {
                self.schedule_persist(state.revision, state.products.clone());
            }
            state.products.len()
        };

        self.deliver_notifications();
        info!(
            "event=repo_hydrate module=repo status=ok outcome={:?} count={} duration_ms={}",
            outcome,
            count,
            started_at.elapsed().as_millis()
        );
        outcome
    }

    fn commit(&self, state: &mut RepositoryState, op: &'static str) {
        state.revision += 1;
        let snapshot = state.products.clone();
        if state.hydrated {
            self.schedule_persist(state.revision, snapshot.clone());
        } else {
            debug!(
                "event=persist_schedule module=repo status=skipped reason=not_hydrated op={op}"
            );
        }
        debug!(
            "event=product_{op} module=repo status=ok revision={} count={}",
            state.revision,
            snapshot.len()
        );
        self.enqueue_notification(snapshot);
    }

    fn schedule_persist(&self, revision: u64, snapshot: Vec<Product>) {
        if !self.shared.writer.schedule(revision, snapshot) {
            warn!(
                "event=persist_schedule module=repo status=skipped reason=writer_stopped revision={revision}"
            );
        }
    }

    /// Must be called with the state lock held.
    fn enqueue_notification(&self, snapshot: Vec<Product>) {
        self.notifications().push(snapshot);
    }

    /// Drains queued snapshots to the current listeners.
    ///
    /// Returns at once if another caller is already draining; that caller
    /// delivers this caller's snapshots too, after the ones queued before.
    fn deliver_notifications(&self) {
        if !self.notifications().begin() {
            return;
        }
        let guard = DrainGuard { repo: self };
        loop {
            let Some(snapshot) = guard.repo.notifications().next() else {
                break;
            };
            let listeners = guard.repo.listeners().snapshot();
            for listener in listeners {
                listener(&snapshot);
            }
        }
    }

    fn state(&self) -> MutexGuard<'_, RepositoryState> {
        self.shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn listeners(&self) -> MutexGuard<'_, ListenerRegistry> {
        self.shared
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn notifications(&self) -> MutexGuard<'_, NotificationQueue> {
        self.shared
            .notifications
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Hands the drain role back if a listener panics mid-delivery.
struct DrainGuard<'a> {
    repo: &'a ProductRepository,
}

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.repo.notifications().abort();
        }
    }
}

fn allocate_id(existing: &[Product], ids: &dyn IdSource) -> ProductId {
    for _ in 0..MAX_ID_ATTEMPTS {
        let candidate = ids.next_id();
        if !candidate.is_empty() && !contains_id(existing, &candidate) {
            return candidate;
        }
        warn!("event=product_id_collision module=repo status=retry");
    }

    loop {
        let candidate = UuidIdSource.next_id();
        if !contains_id(existing, &candidate) {
            return candidate;
        }
    }
}

fn contains_id(products: &[Product], id: &str) -> bool {
    products.iter().any(|product| product.id == id)
}

#[cfg(test)]
mod tests {
    use super::{allocate_id, IdSource};
    use crate::repo::seed::seed_products;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Sequence {
        values: Vec<&'static str>,
        cursor: AtomicUsize,
    }

    impl IdSource for Sequence {
        fn next_id(&self) -> String {
            let index = self.cursor.fetch_add(1, Ordering::SeqCst);
            self.values[index.min(self.values.len() - 1)].to_string()
        }
    }

    #[test]
    fn allocate_id_skips_existing_and_empty_candidates() {
        let ids = Sequence {
            values: vec!["1", "", "2", "fresh"],
            cursor: AtomicUsize::new(0),
        };
        assert_eq!(allocate_id(&seed_products(), &ids), "fresh");
    }

    #[test]
    fn allocate_id_falls_back_when_source_keeps_colliding() {
        let ids = Sequence {
            values: vec!["1"],
            cursor: AtomicUsize::new(0),
        };
        let id = allocate_id(&seed_products(), &ids);
        assert_ne!(id, "1");
        assert_eq!(id.len(), 32);
    }
}
