//! # Listener handles and their constructors.
//!
//! A [`Listener`] pairs a callable with a name, a stable [`ListenerId`] and a
//! declared [`Signature`]. Cloning a listener keeps its id, so the clone can be
//! passed to [`EventManager::off`](crate::EventManager::off) to remove it.
//!
//! Four typed constructors cover the calling conventions directly:
//!
//! | constructor         | body                                  |
//! |---------------------|---------------------------------------|
//! | [`Listener::sync0`]  | `Fn() -> ListenerResult`              |
//! | [`Listener::sync1`]  | `Fn(EventData) -> ListenerResult`     |
//! | [`Listener::async0`] | `Fn() -> impl Future<ListenerResult>` |
//! | [`Listener::async1`] | `Fn(EventData) -> impl Future<..>`    |
//!
//! Struct listeners implement [`Listen`]; callbacks whose parameter list is only
//! known at runtime use [`Listener::dynamic_sync`] / [`Listener::dynamic_async`].
//!
//! ## Example
//! ```rust
//! use eventvisor::{Listener, ListenerError};
//!
//! let log = Listener::sync1("log", |data| {
//!     println!("got {data}");
//!     Ok(())
//! });
//! let flush = Listener::async0("flush", || async {
//!     Err::<(), _>(ListenerError::fail("nothing to flush"))
//! });
//! assert_ne!(log.id(), flush.id());
//! assert_eq!(log.clone().id(), log.id());
//! ```

use std::borrow::Cow;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;

use crate::error::ListenerError;
use crate::events::EventData;
use crate::listeners::signature::Signature;

/// Process-wide counter for listener identities.
static LISTENER_SEQ: AtomicU64 = AtomicU64::new(1);

/// Outcome of one listener call.
pub type ListenerResult = Result<(), ListenerError>;

/// Boxed future returned by asynchronous listener bodies.
pub type BoxListenerFuture = Pin<Box<dyn Future<Output = ListenerResult> + Send + 'static>>;

type SyncBody = dyn Fn(Option<EventData>) -> ListenerResult + Send + Sync;
type AsyncBody = dyn Fn(Option<EventData>) -> BoxListenerFuture + Send + Sync;

/// Identity of a listener, shared by all of its clones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// Normalized callable. `None` means "called without arguments".
pub(crate) enum Body {
    Sync(Box<SyncBody>),
    Async(Box<AsyncBody>),
}

struct Inner {
    id: ListenerId,
    name: Cow<'static, str>,
    signature: Signature,
    body: Body,
}

/// Caller-supplied callback registered against an event kind.
#[derive(Clone)]
pub struct Listener {
    inner: Arc<Inner>,
}

impl Listener {
    fn from_body(name: Cow<'static, str>, signature: Signature, body: Body) -> Self {
        Self {
            inner: Arc::new(Inner {
                id: ListenerId(LISTENER_SEQ.fetch_add(1, Ordering::Relaxed)),
                name,
                signature,
                body,
            }),
        }
    }

    /// Synchronous listener that ignores the payload.
    pub fn sync0<F>(name: impl Into<Cow<'static, str>>, f: F) -> Self
    where
        F: Fn() -> ListenerResult + Send + Sync + 'static,
    {
        Self::from_body(
            name.into(),
            Signature::nullary(),
            Body::Sync(Box::new(move |_: Option<EventData>| f())),
        )
    }

    /// Synchronous listener that receives the payload.
    pub fn sync1<F>(name: impl Into<Cow<'static, str>>, f: F) -> Self
    where
        F: Fn(EventData) -> ListenerResult + Send + Sync + 'static,
    {
        Self::from_body(
            name.into(),
            Signature::unary(),
            Body::Sync(Box::new(move |data: Option<EventData>| {
                f(data.unwrap_or_default())
            })),
        )
    }

    /// Asynchronous listener that ignores the payload.
    pub fn async0<F, Fut>(name: impl Into<Cow<'static, str>>, f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ListenerResult> + Send + 'static,
    {
        Self::from_body(
            name.into(),
            Signature::nullary(),
            Body::Async(Box::new(
                move |_: Option<EventData>| -> BoxListenerFuture { Box::pin(f()) },
            )),
        )
    }

    /// Asynchronous listener that receives the payload.
    pub fn async1<F, Fut>(name: impl Into<Cow<'static, str>>, f: F) -> Self
    where
        F: Fn(EventData) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ListenerResult> + Send + 'static,
    {
        Self::from_body(
            name.into(),
            Signature::unary(),
            Body::Async(Box::new(
                move |data: Option<EventData>| -> BoxListenerFuture {
                    Box::pin(f(data.unwrap_or_default()))
                },
            )),
        )
    }

    /// Adapts a struct listener. It is called asynchronously with the payload.
    pub fn from_listen(listen: Arc<dyn Listen>) -> Self {
        let name = listen.name().to_string();
        Self::from_body(
            name.into(),
            Signature::unary(),
            Body::Async(Box::new(move |data: Option<EventData>| -> BoxListenerFuture {
                let listen = Arc::clone(&listen);
                Box::pin(async move { listen.on_event(data.unwrap_or_default()).await })
            })),
        )
    }

    /// Synchronous listener with a parameter list known only at runtime.
    ///
    /// The body receives `Some(payload)` or `None` depending on how the signature
    /// classifies at registration.
    pub fn dynamic_sync<F>(name: impl Into<Cow<'static, str>>, signature: Signature, f: F) -> Self
    where
        F: Fn(Option<EventData>) -> ListenerResult + Send + Sync + 'static,
    {
        Self::from_body(name.into(), signature, Body::Sync(Box::new(f)))
    }

    /// Asynchronous listener with a parameter list known only at runtime.
    pub fn dynamic_async<F, Fut>(
        name: impl Into<Cow<'static, str>>,
        signature: Signature,
        f: F,
    ) -> Self
    where
        F: Fn(Option<EventData>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ListenerResult> + Send + 'static,
    {
        Self::from_body(
            name.into(),
            signature,
            Body::Async(Box::new(
                move |data: Option<EventData>| -> BoxListenerFuture { Box::pin(f(data)) },
            )),
        )
    }

    /// Stable identity, shared by clones.
    #[inline]
    pub fn id(&self) -> ListenerId {
        self.inner.id
    }

    /// Human-readable name (for logs).
    #[inline]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Declared parameter list.
    #[inline]
    pub fn signature(&self) -> Signature {
        self.inner.signature
    }

    /// Whether the body returns a future.
    #[inline]
    pub fn is_async(&self) -> bool {
        matches!(self.inner.body, Body::Async(_))
    }

    pub(crate) fn body(&self) -> &Body {
        &self.inner.body
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("id", &self.inner.id)
            .field("name", &self.inner.name)
            .field("signature", &self.inner.signature)
            .field("is_async", &self.is_async())
            .finish()
    }
}

/// Contract for struct listeners.
///
/// Runs inside a tracked task; returning an error or panicking is logged and
/// does not affect other listeners.
#[async_trait]
pub trait Listen: Send + Sync + 'static {
    /// Handle one event payload.
    async fn on_event(&self, data: EventData) -> ListenerResult;

    /// Human-readable name (for logs).
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}
