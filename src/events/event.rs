//! # Lifecycle events carried by the manager.
//!
//! The [`EventKind`] enum is a closed set of signals:
//! - **State**: [`EventKind::PersistState`] asks listeners to persist their state
//! - **Telemetry**: [`EventKind::SystemInfo`] carries a periodic resource snapshot
//! - **Termination**: [`EventKind::Migrating`], [`EventKind::Aborting`], [`EventKind::Exit`]
//!
//! Each kind maps to a stable wire id used as the dispatch key. The ids are shared
//! with out-of-process collaborators and must not change.
//!
//! ## Example
//! ```rust
//! use eventvisor::EventKind;
//!
//! let kind: EventKind = "persistState".parse().unwrap();
//! assert_eq!(kind, EventKind::PersistState);
//! assert_eq!(kind.as_str(), "persistState");
//! assert_eq!(EventKind::Exit.to_string(), "exit");
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::ManagerError;

/// Payload delivered to one-argument listeners.
///
/// Arbitrary JSON-like data; typed payloads live in [`payload`](super::payload).
pub type EventData = serde_json::Value;

/// Classification of lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Listeners should persist their state now.
    ///
    /// Wire id: `persistState`.
    PersistState,

    /// Periodic system resource snapshot.
    ///
    /// Wire id: `systemInfo`.
    SystemInfo,

    /// The process is about to be migrated to another host.
    ///
    /// Wire id: `migrating`.
    Migrating,

    /// The process is being aborted.
    ///
    /// Wire id: `aborting`.
    Aborting,

    /// The process is exiting.
    ///
    /// Wire id: `exit`.
    Exit,
}

impl EventKind {
    /// Every kind, in declaration order.
    pub const ALL: [EventKind; 5] = [
        EventKind::PersistState,
        EventKind::SystemInfo,
        EventKind::Migrating,
        EventKind::Aborting,
        EventKind::Exit,
    ];

    /// Returns the stable wire id.
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            EventKind::PersistState => "persistState",
            EventKind::SystemInfo => "systemInfo",
            EventKind::Migrating => "migrating",
            EventKind::Aborting => "aborting",
            EventKind::Exit => "exit",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = ManagerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ManagerError::UnknownEvent { name: s.to_string() })
    }
}
