//! Change subscriptions for repository snapshots.

use crate::model::product::Product;
use std::collections::VecDeque;
use std::sync::Arc;

/// Callback receiving the full collection after a change.
pub type ProductListener = Arc<dyn Fn(&[Product]) + Send + Sync>;

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Default)]
pub(crate) struct ListenerRegistry {
    next_id: u64,
    listeners: Vec<(SubscriptionId, ProductListener)>,
}

impl ListenerRegistry {
    pub(crate) fn add(&mut self, listener: ProductListener) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.listeners.push((id, listener));
        id
    }

    pub(crate) fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    /// Clones the current listeners so they can run without the registry
    /// lock held; a listener may then subscribe or unsubscribe re-entrantly.
    pub(crate) fn snapshot(&self) -> Vec<ProductListener> {
        self.listeners
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect()
    }
}

/// Snapshots waiting to be delivered, in revision order.
///
/// Snapshots are pushed while the repository state lock is held, so queue
/// order is mutation order. At most one thread drains the queue at a time;
/// a mutation made while another thread is delivering is handed to that
/// thread instead of racing it.
#[derive(Default)]
pub(crate) struct NotificationQueue {
    pending: VecDeque<Vec<Product>>,
    delivering: bool,
}

impl NotificationQueue {
    pub(crate) fn push(&mut self, snapshot: Vec<Product>) {
        self.pending.push_back(snapshot);
    }

    /// Claims the drain role; `false` when another caller already holds it.
    pub(crate) fn begin(&mut self) -> bool {
        if self.delivering {
            return false;
        }
        self.delivering = true;
        true
    }

    /// Pops the next snapshot, releasing the drain role once empty.
    pub(crate) fn next(&mut self) -> Option<Vec<Product>> {
        let next = self.pending.pop_front();
        if next.is_none() {
            self.delivering = false;
        }
        next
    }

    /// Releases the drain role after a listener panicked mid-delivery.
    pub(crate) fn abort(&mut self) {
        self.delivering = false;
    }
}

#[cfg(test)]
mod tests {
    use super::NotificationQueue;

    #[test]
    fn only_one_drainer_until_queue_is_empty() {
        let mut queue = NotificationQueue::default();
        queue.push(Vec::new());
        assert!(queue.begin());
        assert!(!queue.begin());

        assert!(queue.next().is_some());
        assert!(queue.next().is_none());
        assert!(queue.begin());
    }
}
