//! Error types used by the event manager and by listeners.
//!
//! This module defines two main error enums:
//!
//! - [`ManagerError`]: errors surfaced to callers of the manager itself
//!   (registration-time validation, payload encoding, wire id parsing).
//! - [`ListenerError`]: errors raised by listener bodies. These never reach
//!   the emitter: they are caught inside the listener's tracked task and logged.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging.

use thiserror::Error;

use crate::listeners::Signature;

/// # Errors surfaced by the event manager.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ManagerError {
    /// The listener cannot be called with either zero or one argument.
    ///
    /// Returned synchronously from [`EventManager::on`](crate::EventManager::on);
    /// nothing is registered when this happens.
    #[error("listener {listener:?} must accept 0 or 1 arguments, got signature {signature:?}")]
    InvalidListenerSignature {
        /// Name of the rejected listener.
        listener: String,
        /// The signature that failed classification.
        signature: Signature,
    },

    /// A wire id did not match any known [`EventKind`](crate::EventKind).
    #[error("unknown event {name:?}")]
    UnknownEvent {
        /// The rejected wire id.
        name: String,
    },

    /// A typed payload could not be converted into event data.
    #[error("payload encoding failed: {0}")]
    Payload(#[from] serde_json::Error),
}

impl ManagerError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use eventvisor::ManagerError;
    ///
    /// let err = ManagerError::UnknownEvent { name: "reboot".into() };
    /// assert_eq!(err.as_label(), "manager_unknown_event");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ManagerError::InvalidListenerSignature { .. } => "manager_invalid_listener_signature",
            ManagerError::UnknownEvent { .. } => "manager_unknown_event",
            ManagerError::Payload(_) => "manager_payload",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ManagerError::InvalidListenerSignature { listener, signature } => {
                format!("invalid listener signature: listener={listener} signature={signature:?}")
            }
            ManagerError::UnknownEvent { name } => format!("unknown event: {name}"),
            ManagerError::Payload(err) => format!("payload: {err}"),
        }
    }
}

/// # Errors produced by listener execution.
///
/// A failing listener is isolated: the error is logged with the event and
/// listener name attached, and neither the emitter nor sibling listeners see it.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ListenerError {
    /// Listener body returned an error.
    #[error("listener failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Listener body panicked.
    #[error("listener panicked: {info}")]
    Panicked {
        /// Panic payload rendered as text.
        info: String,
    },
}

impl ListenerError {
    /// Builds a [`ListenerError::Fail`] from anything printable.
    ///
    /// # Example
    /// ```
    /// use eventvisor::ListenerError;
    ///
    /// let err = ListenerError::fail("disk full");
    /// assert_eq!(err.to_string(), "listener failed: disk full");
    /// ```
    pub fn fail(error: impl std::fmt::Display) -> Self {
        ListenerError::Fail {
            error: error.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ListenerError::Fail { .. } => "listener_failed",
            ListenerError::Panicked { .. } => "listener_panicked",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ListenerError::Fail { error } => format!("error: {error}"),
            ListenerError::Panicked { info } => format!("panic: {info}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_are_stable() {
        let sig = ManagerError::InvalidListenerSignature {
            listener: "two_args".into(),
            signature: Signature::positional(2, 0),
        };
        assert_eq!(sig.as_label(), "manager_invalid_listener_signature");
        assert!(sig.to_string().contains("two_args"));

        assert_eq!(ListenerError::fail("x").as_label(), "listener_failed");
        let panicked = ListenerError::Panicked { info: "boom".into() };
        assert_eq!(panicked.as_label(), "listener_panicked");
        assert_eq!(panicked.as_message(), "panic: boom");
    }

    #[test]
    fn test_payload_error_converts() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: ManagerError = json_err.into();
        assert_eq!(err.as_label(), "manager_payload");
    }
}
