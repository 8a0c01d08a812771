//! # Calling-convention shim.
//!
//! [`Invoker`] is built once per registration. It freezes the listener's
//! [`CallingConvention`] and exposes a single shape, `invoke(data) -> future`,
//! whatever the listener looks like.
//!
//! ```text
//! Arity0Sync  ── body(None)        ── ready(result)
//! Arity1Sync  ── body(Some(data))  ── ready(result)
//! Arity0Async ── body(None)        ── future (awaited by the caller)
//! Arity1Async ── body(Some(data))  ── future (awaited by the caller)
//! ```
//!
//! No error handling and no spawning here: the manager wraps `invoke` in a
//! tracked task that does both.

use std::future;

use crate::error::ManagerError;
use crate::events::EventData;
use crate::listeners::listener::{Body, BoxListenerFuture, Listener};
use crate::listeners::signature::{CallingConvention, classify};

/// Uniform asynchronous entry point for one listener.
#[derive(Clone, Debug)]
pub struct Invoker {
    listener: Listener,
    convention: CallingConvention,
}

impl Invoker {
    /// Classifies `listener`, failing with
    /// [`ManagerError::InvalidListenerSignature`] if it takes neither 0 nor 1 argument.
    pub fn new(listener: &Listener) -> Result<Self, ManagerError> {
        let convention = classify(listener.name(), listener.signature(), listener.is_async())?;
        Ok(Self {
            listener: listener.clone(),
            convention,
        })
    }

    /// The resolved calling convention.
    #[inline]
    pub fn convention(&self) -> CallingConvention {
        self.convention
    }

    /// The wrapped listener.
    #[inline]
    pub fn listener(&self) -> &Listener {
        &self.listener
    }

    /// Calls the listener with the arity resolved at registration.
    ///
    /// A synchronous body runs to completion inside this call; an asynchronous
    /// body runs when the returned future is awaited.
    pub fn invoke(&self, data: EventData) -> BoxListenerFuture {
        let arg = (self.convention.arity() == 1).then_some(data);
        match self.listener.body() {
            Body::Sync(f) => Box::pin(future::ready(f(arg))),
            Body::Async(f) => f(arg),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;
    use serde_json::json;

    use super::*;
    use crate::error::ListenerError;
    use crate::listeners::Signature;

    type Calls = Arc<Mutex<Vec<Option<EventData>>>>;

    fn dynamic(calls: &Calls, signature: Signature) -> Listener {
        let calls = Arc::clone(calls);
        Listener::dynamic_sync("dynamic", signature, move |arg| {
            calls.lock().push(arg);
            Ok(())
        })
    }

    #[tokio::test]
    async fn test_sync_listeners_receive_resolved_arity() {
        let calls: Calls = Arc::new(Mutex::new(Vec::new()));

        let zero = Invoker::new(&dynamic(&calls, Signature::nullary())).unwrap();
        let one = Invoker::new(&dynamic(&calls, Signature::positional(0, 1))).unwrap();
        assert_eq!(zero.convention(), CallingConvention::Arity0Sync);
        assert_eq!(one.convention(), CallingConvention::Arity1Sync);

        zero.invoke(json!({"data": 1})).await.unwrap();
        one.invoke(json!({"data": 2})).await.unwrap();

        assert_eq!(*calls.lock(), vec![None, Some(json!({"data": 2}))]);
    }

    #[tokio::test]
    async fn test_sync_body_runs_before_future_is_polled() {
        let calls: Calls = Arc::new(Mutex::new(Vec::new()));
        let invoker = Invoker::new(&dynamic(&calls, Signature::unary())).unwrap();

        let fut = invoker.invoke(json!(7));
        assert_eq!(calls.lock().len(), 1);
        fut.await.unwrap();
    }

    #[tokio::test]
    async fn test_async_body_runs_when_awaited() {
        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);
        let listener = Listener::async1("store", move |data| {
            let sink = Arc::clone(&sink);
            async move {
                tokio::task::yield_now().await;
                *sink.lock() = Some(data);
                Ok::<(), ListenerError>(())
            }
        });
        let invoker = Invoker::new(&listener).unwrap();
        assert_eq!(invoker.convention(), CallingConvention::Arity1Async);

        let fut = invoker.invoke(json!("payload"));
        assert!(seen.lock().is_none());
        fut.await.unwrap();
        assert_eq!(*seen.lock(), Some(json!("payload")));
    }

    #[tokio::test]
    async fn test_errors_pass_through_untouched() {
        let listener = Listener::async0("broken", || async {
            Err::<(), _>(ListenerError::fail("nope"))
        });
        let invoker = Invoker::new(&listener).unwrap();
        assert_eq!(invoker.convention(), CallingConvention::Arity0Async);

        let err = invoker.invoke(json!(null)).await.unwrap_err();
        assert_eq!(err, ListenerError::fail("nope"));
    }

    #[test]
    fn test_rejects_two_argument_listener() {
        let listener = Listener::dynamic_sync("pair", Signature::positional(2, 0), |_| Ok(()));
        let err = Invoker::new(&listener).unwrap_err();
        assert_eq!(err.as_label(), "manager_invalid_listener_signature");
    }
}
