//! # eventvisor
//!
//! **Eventvisor** is an in-process, asynchronous event manager for lifecycle
//! signals (state persistence requests, system telemetry, migration/abort/exit
//! notifications).
//!
//! Producers publish without waiting for consumers; every listener call runs in
//! its own tracked task, failures are isolated and logged, and shutdown waits
//! for in-flight listener work before releasing anything.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │   Listener   │   │   Listener   │   │   Listener   │
//!     │ (sync, 0 arg)│   │(async, 1 arg)│   │ (impl Listen)│
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  EventManager                                                     │
//! │  - Invoker (classifies calling convention at registration)        │
//! │  - Registration table (event → listener id → wrapper ids)         │
//! │  - Bus (key → ordered wrappers, synchronous fan-out)              │
//! │  - TaskTracker (in-flight listener tasks)                         │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        │ emit(event, data)│                  │ close(timeout)
//!        ▼                  ▼                  ▼
//!   wrapper #1         wrapper #N         drain: snapshot ─► wait ─► repeat
//!   spawn task         spawn task                until empty (or cancel
//!        │                  │                    on deadline)
//!        ▼                  ▼
//!   run_listener       run_listener
//!   (log failures)     (log failures)
//! ```
//!
//! ### Lifecycle of one dispatch
//! ```text
//! emit(event, data)
//!   └─► Bus.publish(event.as_str(), &data)
//!         └─► for each wrapper (registration order):
//!               TaskTracker.spawn(run_listener(invoker, event, data))   ← returns at once
//!
//! tracked task:
//!   ├─► Invoker.invoke(data)   (0 or 1 argument, sync or async)
//!   ├─► Ok      ─► TaskExit::Completed
//!   ├─► Err     ─► error!(event_name, listener_name) ─► TaskExit::Failed
//!   ├─► panic   ─► error!(event_name, listener_name) ─► TaskExit::Failed
//!   └─► aborted ─► TaskExit::Cancelled
//!   finally: removed from TaskTracker
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types                                  |
//! |-------------------|--------------------------------------------------------------|--------------------------------------------|
//! | **Events**        | Closed set of lifecycle signals with stable wire ids.        | [`EventKind`], [`EventData`]               |
//! | **Listeners**     | Sync/async, 0/1 argument, struct listeners.                  | [`Listener`], [`Listen`], [`Signature`]    |
//! | **Dispatch**      | Non-blocking emit, one tracked task per listener call.       | [`EventManager`], [`TrackedTask`]          |
//! | **Shutdown**      | Fixpoint drain with optional deadline and cancellation.      | [`DrainOutcome`], [`Config`]               |
//! | **Errors**        | Typed errors for registration and listener execution.        | [`ManagerError`], [`ListenerError`]        |
//! | **Payloads**      | Typed payloads for the well-known events.                    | [`PersistStatePayload`], [`SystemInfoPayload`] |
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use eventvisor::{EventKind, EventManager, Listener, ListenerError};
//! use serde_json::json;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let manager = EventManager::default();
//!
//!     let on_abort = Listener::sync0("on_abort", || {
//!         println!("aborting");
//!         Ok(())
//!     });
//!     let broken = Listener::sync1("broken", |_data| Err(ListenerError::fail("boom")));
//!     manager.on(EventKind::Aborting, &on_abort)?;
//!     manager.on(EventKind::Aborting, &broken)?;
//!
//!     // Returns immediately; `broken` is logged, `on_abort` still runs.
//!     manager.emit(EventKind::Aborting, json!(null));
//!
//!     let outcome = manager.close(Some(Duration::from_secs(5))).await;
//!     assert!(!outcome.timed_out());
//!     Ok(())
//! }
//! ```
mod core;
mod error;
mod events;
mod listeners;

// ---- Public re-exports ----

pub use crate::core::{Config, DrainOutcome, EventManager, TaskExit, TaskId, TaskTracker, TrackedTask};
pub use error::{ListenerError, ManagerError};
pub use events::{
    Bus, Callback, ClientInfo, EventData, EventKind, PersistStatePayload, SubscriptionId,
    SystemInfoPayload,
};
pub use listeners::{
    BoxListenerFuture, CallingConvention, Invoker, Listen, Listener, ListenerId, ListenerResult,
    Signature, classify,
};
