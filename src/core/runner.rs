//! # Run a single listener invocation.
//!
//! [`run_listener`] is the body of every tracked task: it calls the listener
//! through its [`Invoker`], isolates failures and reports how the call ended.
//!
//! ## Outcome mapping
//! ```text
//! invoke() → Ok(())          → TaskExit::Completed
//! invoke() → Err(e)          → log error (event_name, listener_name) → TaskExit::Failed
//! invoke() panics            → ListenerError::Panicked → log → TaskExit::Failed
//! task aborted at an .await  → future dropped; the tracker reports TaskExit::Cancelled
//! ```
//!
//! ## Rules
//! - Errors and panics never leave this function, so they never reach `emit`,
//!   the bus, or sibling listeners.
//! - Cancellation is **not** intercepted here: an abort drops this future, and
//!   whoever awaits the tracked task observes `Cancelled`.
//!
//! **Warning**: `AssertUnwindSafe` is used, which can leave shared state inconsistent
//! if a listener panics while holding a lock.

use std::any::Any;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;

use crate::core::tracker::TaskExit;
use crate::error::ListenerError;
use crate::events::{EventData, EventKind};
use crate::listeners::Invoker;

/// Invokes the listener once with `data` and classifies the result.
pub(crate) async fn run_listener(invoker: Invoker, event: EventKind, data: EventData) -> TaskExit {
    let call = invoker.clone();
    let result = match AssertUnwindSafe(async move { call.invoke(data).await })
        .catch_unwind()
        .await
    {
        Ok(res) => res,
        Err(panic) => Err(ListenerError::Panicked {
            info: panic_message(panic.as_ref()),
        }),
    };

    match result {
        Ok(()) => TaskExit::Completed,
        Err(err) => {
            tracing::error!(
                event_name = %event,
                listener_name = invoker.listener().name(),
                kind = err.as_label(),
                error = %err,
                "exception in event listener"
            );
            TaskExit::Failed
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::listeners::Listener;

    #[tokio::test]
    async fn test_success_and_failure_are_classified() {
        let ok = Invoker::new(&Listener::sync0("ok", || Ok(()))).unwrap();
        let bad = Invoker::new(&Listener::sync1("bad", |_| Err(ListenerError::fail("x")))).unwrap();

        assert_eq!(
            run_listener(ok, EventKind::Exit, json!(null)).await,
            TaskExit::Completed
        );
        assert_eq!(
            run_listener(bad, EventKind::Exit, json!(null)).await,
            TaskExit::Failed
        );
    }

    fn explode() -> Result<(), ListenerError> {
        panic!("later")
    }

    #[tokio::test]
    async fn test_panics_are_contained() {
        let sync_panic = Invoker::new(&Listener::sync0("sync_panic", || panic!("boom"))).unwrap();
        let async_panic = Invoker::new(&Listener::async1("async_panic", |_| async {
            tokio::task::yield_now().await;
            explode()
        }))
        .unwrap();

        assert_eq!(
            run_listener(sync_panic, EventKind::Aborting, json!(1)).await,
            TaskExit::Failed
        );
        assert_eq!(
            run_listener(async_panic, EventKind::Aborting, json!(1)).await,
            TaskExit::Failed
        );
    }

    #[test]
    fn test_panic_message_variants() {
        let owned: Box<dyn Any + Send> = Box::new(String::from("owned"));
        let borrowed: Box<dyn Any + Send> = Box::new("static");
        let other: Box<dyn Any + Send> = Box::new(42_u8);

        assert_eq!(panic_message(owned.as_ref()), "owned");
        assert_eq!(panic_message(borrowed.as_ref()), "static");
        assert_eq!(panic_message(other.as_ref()), "unknown panic");
    }
}
