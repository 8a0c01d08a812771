//! # EventManager: registration, fire-and-forget dispatch and graceful drain.
//!
//! The [`EventManager`] owns the publish/subscribe [`Bus`], the registration table
//! and the [`TaskTracker`]. Listeners never run on the emitter's stack: every
//! publish spawns one tracked task per installed wrapper.
//!
//! ## High-level architecture
//! ```text
//! Registration:
//!   on(event, listener)
//!     └─► Invoker::new(listener)   (classify; InvalidListenerSignature on failure)
//!     └─► wrapper = dispatch_wrapper(event, invoker)
//!     └─► lock table ─► Bus.subscribe(event.as_str(), wrapper) ─► record id ─► unlock
//!
//! Dispatch (two phases):
//!   emit(event, data) ─► Bus.publish(key, &data)
//!                           ├─► wrapper #1 ─► TaskTracker.spawn(run_listener(..))  returns
//!                           ├─► wrapper #2 ─► TaskTracker.spawn(run_listener(..))  returns
//!                           └─► wrapper #N ─► ...
//!                        (phase 1: synchronous, decides what runs and records a handle)
//!
//!   tracked task #k ─► Invoker.invoke(data)
//!                        ├─ Ok      ─► Completed
//!                        ├─ Err/panic ─► error!(event_name, listener_name) ─► Failed
//!                        └─ aborted ─► Cancelled
//!                        (phase 2: scheduled, performs the work)
//!
//! Shutdown:
//!   close(timeout) ─► drain(tracker, timeout)  (fixpoint; cancel on deadline)
//!                  ─► Bus.clear() + table.clear()
//! ```
//!
//! ## Rules
//! - The registration table and the bus change together under one lock, so every
//!   recorded wrapper is installed and every installed wrapper is recorded.
//! - `emit`, `on` and `off` never suspend.
//! - Listener failures stay inside their task; nothing is returned to `emit`.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use eventvisor::{Config, EventKind, EventManager, Listener, ListenerError};
//! use serde_json::json;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let manager = EventManager::new(Config::default());
//!
//!     let persist = Listener::async1("persist", |data| async move {
//!         tokio::time::sleep(Duration::from_millis(10)).await;
//!         println!("persisting {data}");
//!         Ok::<(), ListenerError>(())
//!     });
//!     manager.on(EventKind::PersistState, &persist)?;
//!
//!     manager.emit(EventKind::PersistState, json!({ "isMigrating": false }));
//!     let outcome = manager.close(None).await;
//!     assert!(!outcome.timed_out());
//!     Ok(())
//! }
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;

use crate::core::{
    config::Config,
    drain::{self, DrainOutcome},
    runner,
    tracker::{TaskTracker, TrackedTask},
};
use crate::error::ManagerError;
use crate::events::{Bus, Callback, EventData, EventKind, SubscriptionId};
use crate::listeners::{Invoker, Listener, ListenerId};

/// Wrappers installed per (event, listener) pair, in `on` order.
type Registrations = HashMap<EventKind, HashMap<ListenerId, Vec<SubscriptionId>>>;

/// In-process event manager.
pub struct EventManager {
    cfg: Config,
    bus: Bus,
    registrations: Mutex<Registrations>,
    tracker: Arc<TaskTracker>,
}

impl EventManager {
    /// Creates a manager with no listeners and nothing in flight.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            bus: Bus::new(),
            registrations: Mutex::new(HashMap::new()),
            tracker: TaskTracker::new(),
        }
    }

    /// Configuration this manager was built with.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Registers `listener` for `event`.
    ///
    /// Registering the same listener twice installs two independent wrappers;
    /// both run on each publish. Returns the id of the installed wrapper.
    ///
    /// Fails with [`ManagerError::InvalidListenerSignature`] if the listener takes
    /// neither 0 nor 1 argument; nothing is registered in that case.
    pub fn on(&self, event: EventKind, listener: &Listener) -> Result<SubscriptionId, ManagerError> {
        let invoker = Invoker::new(listener)?;
        let wrapper = self.dispatch_wrapper(event, invoker);

        let mut regs = self.registrations.lock();
        let id = self.bus.subscribe(event.as_str(), wrapper);
        regs.entry(event)
            .or_default()
            .entry(listener.id())
            .or_default()
            .push(id);
        Ok(id)
    }

    /// Removes `listener` from `event`, or every listener of `event` when `None`.
    ///
    /// Removing something that was never registered does nothing.
    pub fn off(&self, event: EventKind, listener: Option<&Listener>) {
        let mut regs = self.registrations.lock();
        match listener {
            Some(listener) => {
                let Some(by_listener) = regs.get_mut(&event) else {
                    return;
                };
                let Some(ids) = by_listener.remove(&listener.id()) else {
                    return;
                };
                for id in ids {
                    self.bus.unsubscribe(event.as_str(), id);
                }
                if by_listener.is_empty() {
                    regs.remove(&event);
                }
            }
            None => {
                regs.remove(&event);
                self.bus.unsubscribe_all(event.as_str());
            }
        }
    }

    /// Publishes `data` to every listener of `event`.
    ///
    /// Returns as soon as one task per listener has been spawned; listener
    /// execution time never shows up here.
    ///
    /// # Panics
    /// Panics when called outside a tokio runtime and at least one listener is
    /// registered for `event`.
    pub fn emit(&self, event: EventKind, data: EventData) {
        self.bus.publish(event.as_str(), &data);
    }

    /// Serializes `payload` and publishes it like [`emit`](Self::emit).
    pub fn emit_serialized<T>(&self, event: EventKind, payload: &T) -> Result<(), ManagerError>
    where
        T: Serialize + ?Sized,
    {
        let data = serde_json::to_value(payload)?;
        self.emit(event, data);
        Ok(())
    }

    /// Waits for every in-flight listener, including ones spawned while waiting.
    ///
    /// With `Some(timeout)`, whatever is still running after `timeout` is
    /// cancelled and awaited before this returns. Registrations are untouched.
    pub async fn wait_for_listeners(&self, timeout: Option<Duration>) -> DrainOutcome {
        drain::drain(&self.tracker, timeout).await
    }

    /// Drains in-flight listeners, then removes every registration.
    ///
    /// Calling it again is a no-op that returns [`DrainOutcome::Drained`].
    pub async fn close(&self, timeout: Option<Duration>) -> DrainOutcome {
        let outcome = self.wait_for_listeners(timeout).await;

        let mut regs = self.registrations.lock();
        self.bus.clear();
        regs.clear();
        drop(regs);

        tracing::debug!(?outcome, "event manager closed");
        outcome
    }

    /// [`close`](Self::close) bounded by [`Config::drain_limit`].
    pub async fn shutdown(&self) -> DrainOutcome {
        self.close(self.cfg.drain_limit()).await
    }

    /// Number of wrappers installed for `event`.
    pub fn listener_count(&self, event: EventKind) -> usize {
        self.bus.len(event.as_str())
    }

    /// Number of listener tasks currently in flight.
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Handles to the listener tasks currently in flight.
    pub fn tasks(&self) -> Vec<TrackedTask> {
        self.tracker.snapshot()
    }

    /// Builds the callback installed into the bus for one registration.
    fn dispatch_wrapper(&self, event: EventKind, invoker: Invoker) -> Callback {
        let tracker = Arc::clone(&self.tracker);
        let listener_name: Arc<str> = Arc::from(invoker.listener().name());

        Arc::new(move |data: &EventData| {
            tracker.spawn(
                event,
                Arc::clone(&listener_name),
                runner::run_listener(invoker.clone(), event, data.clone()),
            );
        })
    }
}

impl Default for EventManager {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listeners::Signature;

    #[test]
    fn test_registration_table_tracks_bus() {
        let manager = EventManager::default();
        let a = Listener::sync0("a", || Ok(()));
        let b = Listener::sync1("b", |_| Ok(()));

        manager.on(EventKind::Exit, &a).unwrap();
        manager.on(EventKind::Exit, &a).unwrap();
        manager.on(EventKind::Exit, &b).unwrap();
        assert_eq!(manager.listener_count(EventKind::Exit), 3);
        assert_eq!(manager.registrations.lock()[&EventKind::Exit][&a.id()].len(), 2);

        manager.off(EventKind::Exit, Some(&a));
        assert_eq!(manager.listener_count(EventKind::Exit), 1);
        assert!(!manager.registrations.lock()[&EventKind::Exit].contains_key(&a.id()));

        manager.off(EventKind::Exit, Some(&b));
        assert_eq!(manager.listener_count(EventKind::Exit), 0);
        assert!(manager.registrations.lock().is_empty());
    }

    #[test]
    fn test_rejected_listener_leaves_no_state() {
        let manager = EventManager::default();
        let pair = Listener::dynamic_sync("pair", Signature::positional(2, 0), |_| Ok(()));

        let err = manager.on(EventKind::Migrating, &pair).unwrap_err();
        assert!(matches!(err, ManagerError::InvalidListenerSignature { .. }));
        assert_eq!(manager.listener_count(EventKind::Migrating), 0);
        assert!(manager.registrations.lock().is_empty());
    }

    #[test]
    fn test_off_unknown_is_noop() {
        let manager = EventManager::default();
        let a = Listener::sync0("a", || Ok(()));
        let stranger = Listener::sync0("stranger", || Ok(()));
        manager.on(EventKind::Aborting, &a).unwrap();

        manager.off(EventKind::Aborting, Some(&stranger));
        manager.off(EventKind::Exit, Some(&a));
        manager.off(EventKind::Exit, None);

        assert_eq!(manager.listener_count(EventKind::Aborting), 1);
    }

    #[test]
    fn test_emit_without_listeners_needs_no_runtime() {
        let manager = EventManager::default();
        manager.emit(EventKind::SystemInfo, serde_json::json!({}));
        assert_eq!(manager.in_flight(), 0);
    }
}
