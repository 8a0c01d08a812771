//! Lifecycle events: kinds, payloads and the publish/subscribe core.
//!
//! ## Contents
//! - [`EventKind`], [`EventData`] event classification, wire ids and payload type
//! - [`PersistStatePayload`], [`SystemInfoPayload`] typed payloads for producers
//! - [`Bus`] keyed callback lists with synchronous fan-out
//!
//! ## Quick reference
//! - **Publishers**: external collaborators (persistence timer, resource sampler,
//!   platform signals) through [`EventManager::emit`](crate::EventManager::emit).
//! - **Consumers**: dispatch wrappers installed by the manager; each one spawns a
//!   tracked task per publish.

mod bus;
mod event;
mod payload;

pub use bus::{Bus, Callback, SubscriptionId};
pub use event::{EventData, EventKind};
pub use payload::{ClientInfo, PersistStatePayload, SystemInfoPayload};
