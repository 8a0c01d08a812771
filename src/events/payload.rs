//! # Typed payloads for the well-known events.
//!
//! Producers outside the manager (the persistence timer, the resource sampler)
//! publish these shapes. They serialize in camelCase to match the wire format
//! the other components expect.
//!
//! ```rust
//! use eventvisor::PersistStatePayload;
//!
//! let value = serde_json::to_value(PersistStatePayload { is_migrating: true }).unwrap();
//! assert_eq!(value, serde_json::json!({ "isMigrating": true }));
//! ```

use serde::{Deserialize, Serialize};

/// Payload of [`EventKind::PersistState`](crate::EventKind::PersistState).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistStatePayload {
    /// Set when the state is persisted because of an upcoming migration.
    pub is_migrating: bool,
}

/// Overload summary for one resource.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInfo {
    /// Whether the overloaded ratio exceeded the limit.
    pub is_overloaded: bool,
    /// Configured maximum overloaded ratio.
    pub limit_ratio: f64,
    /// Observed overloaded ratio in the sampled window.
    pub actual_ratio: f64,
}

/// Payload of [`EventKind::SystemInfo`](crate::EventKind::SystemInfo).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemInfoPayload {
    /// No resource is overloaded.
    pub is_system_idle: bool,
    pub mem_info: ClientInfo,
    pub event_loop_info: ClientInfo,
    pub cpu_info: ClientInfo,
    pub client_info: ClientInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mem_current_bytes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_current_usage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_cpu_overloaded: Option<bool>,
    /// Sample time, milliseconds since the Unix epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<u64>,
}
