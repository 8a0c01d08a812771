//! # In-process publish/subscribe core.
//!
//! [`Bus`] maps a wire key to an ordered list of callbacks and fans a payload out
//! to them synchronously, in registration order.
//!
//! ## Architecture
//! ```text
//! publish("persistState", data)
//!     │  (snapshot under lock, then release)
//!     ├──► callback #1 (data)   returns
//!     ├──► callback #2 (data)   returns
//!     └──► callback #N (data)   returns
//! ```
//!
//! ## Rules
//! - **Synchronous fan-out**: each callback returns before the next one is called.
//! - **No isolation**: a panicking callback unwinds into `publish`. The manager only
//!   installs callbacks that hand work off to a tracked task, so this never happens
//!   in practice.
//! - **Snapshot delivery**: callbacks added or removed while a publish is running
//!   take effect on the next publish.
//! - **No-op misses**: unsubscribing an unknown handle or publishing to a key with
//!   no subscribers does nothing.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use super::event::EventData;

/// Callback installed into the bus.
pub type Callback = Arc<dyn Fn(&EventData) + Send + Sync>;

/// Handle returned by [`Bus::subscribe`], used to remove the callback later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Keyed callback lists with synchronous fan-out.
pub struct Bus {
    subs: Mutex<HashMap<&'static str, Vec<(SubscriptionId, Callback)>>>,
    next_id: AtomicU64,
}

impl Bus {
    /// Creates an empty bus.
    pub fn new() -> Self {
        Self {
            subs: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Appends `callback` to the list for `key`.
    pub fn subscribe(&self, key: &'static str, callback: Callback) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subs.lock().entry(key).or_default().push((id, callback));
        id
    }

    /// Removes one callback. Returns `false` if it was not registered under `key`.
    pub fn unsubscribe(&self, key: &'static str, id: SubscriptionId) -> bool {
        let mut subs = self.subs.lock();
        let Some(list) = subs.get_mut(key) else {
            return false;
        };
        let before = list.len();
        list.retain(|(sid, _)| *sid != id);
        let removed = list.len() != before;
        if list.is_empty() {
            subs.remove(key);
        }
        removed
    }

    /// Removes every callback for `key`, returning how many were removed.
    pub fn unsubscribe_all(&self, key: &'static str) -> usize {
        self.subs.lock().remove(key).map_or(0, |list| list.len())
    }

    /// Removes every callback for every key.
    pub fn clear(&self) {
        self.subs.lock().clear();
    }

    /// Calls every callback registered for `key`, in registration order.
    pub fn publish(&self, key: &'static str, data: &EventData) {
        let snapshot: Vec<Callback> = {
            let subs = self.subs.lock();
            match subs.get(key) {
                Some(list) => list.iter().map(|(_, cb)| Arc::clone(cb)).collect(),
                None => return,
            }
        };
        for cb in snapshot {
            cb(data);
        }
    }

    /// Number of callbacks registered for `key`.
    pub fn len(&self, key: &'static str) -> usize {
        self.subs.lock().get(key).map_or(0, Vec::len)
    }

    /// Returns `true` if no key has any callback.
    pub fn is_empty(&self) -> bool {
        self.subs.lock().is_empty()
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn recorder(log: &Arc<Mutex<Vec<String>>>, tag: &'static str) -> Callback {
        let log = Arc::clone(log);
        Arc::new(move |data: &EventData| log.lock().push(format!("{tag}:{data}")))
    }

    #[test]
    fn test_publish_preserves_registration_order() {
        let bus = Bus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        bus.subscribe("exit", recorder(&log, "a"));
        bus.subscribe("exit", recorder(&log, "b"));
        bus.subscribe("aborting", recorder(&log, "other"));

        bus.publish("exit", &json!(1));

        assert_eq!(*log.lock(), vec!["a:1".to_string(), "b:1".to_string()]);
    }

    #[test]
    fn test_misses_are_noops() {
        let bus = Bus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let id = bus.subscribe("exit", recorder(&log, "a"));

        bus.publish("migrating", &json!(null));
        assert!(!bus.unsubscribe("migrating", id));
        assert!(bus.unsubscribe("exit", id));
        assert!(!bus.unsubscribe("exit", id));
        assert_eq!(bus.unsubscribe_all("exit"), 0);

        bus.publish("exit", &json!(null));
        assert!(log.lock().is_empty());
        assert!(bus.is_empty());
    }

    #[test]
    fn test_unsubscribe_all_only_touches_one_key() {
        let bus = Bus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        bus.subscribe("exit", recorder(&log, "a"));
        bus.subscribe("exit", recorder(&log, "b"));
        bus.subscribe("aborting", recorder(&log, "c"));

        assert_eq!(bus.unsubscribe_all("exit"), 2);
        assert_eq!(bus.len("exit"), 0);
        assert_eq!(bus.len("aborting"), 1);
    }

    #[test]
    fn test_callback_may_subscribe_during_publish() {
        let bus = Arc::new(Bus::new());
        let log = Arc::new(Mutex::new(Vec::new()));
        let inner_bus = Arc::clone(&bus);
        let inner_log = Arc::clone(&log);
        bus.subscribe(
            "exit",
            Arc::new(move |_data: &EventData| {
                inner_bus.subscribe("exit", recorder(&inner_log, "late"));
            }),
        );

        bus.publish("exit", &json!(0));
        assert!(log.lock().is_empty());

        bus.publish("exit", &json!(1));
        assert_eq!(*log.lock(), vec!["late:1".to_string()]);
    }
}
