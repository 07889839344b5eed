//! Lifecycle notifications for code embedding the editor.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Editor lifecycle moments a host can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LifecycleEvent {
    Mount,
    Load,
    Save,
    SaveAs,
}

/// Token returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

pub type Callback<T> = Box<dyn FnMut(&T, LifecycleEvent)>;

/// Callbacks keyed by event, run in subscription order.
pub struct Subscriptions<T> {
    next_id: u64,
    entries: Vec<(SubscriptionId, LifecycleEvent, Callback<T>)>,
}

impl<T> Default for Subscriptions<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }
}

impl<T> fmt::Debug for Subscriptions<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let events: Vec<_> = self.entries.iter().map(|(id, event, _)| (id, event)).collect();
        f.debug_struct("Subscriptions").field("entries", &events).finish()
    }
}

impl<T> Subscriptions<T> {
    pub fn subscribe(&mut self, event: LifecycleEvent, callback: Callback<T>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, event, callback));
        id
    }

    /// Remove a subscription. Returns false if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _, _)| *entry != id);
        self.entries.len() != before
    }

    /// Run every callback subscribed to `event`.
    pub fn notify(&mut self, target: &T, event: LifecycleEvent) {
        log::debug!("Lifecycle event {event:?}");
        for (_, subscribed, callback) in &mut self.entries {
            if *subscribed == event {
                callback(target, event);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
