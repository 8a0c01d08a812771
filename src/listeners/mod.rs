//! # Listener abstractions and the calling-convention adapter.
//!
//! This module provides the listener-related types:
//! - [`Listener`] - caller-supplied callback with a stable [`ListenerId`]
//! - [`Listen`] - trait for struct listeners
//! - [`Signature`], [`CallingConvention`] - registration-time classification
//! - [`Invoker`] - uniform `invoke(data) -> future` shim used by the manager

mod invoke;
mod listener;
mod signature;

pub use invoke::Invoker;
pub use listener::{BoxListenerFuture, Listen, Listener, ListenerId, ListenerResult};
pub use signature::{CallingConvention, Signature, classify};
