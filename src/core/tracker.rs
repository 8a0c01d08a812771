//! # Tracked-task registry.
//!
//! Every listener invocation runs in its own tokio task. [`TaskTracker`] holds a
//! handle to each one from the moment it is spawned until it finishes, which is
//! what the shutdown drain waits on.
//!
//! ## Architecture
//! ```text
//! dispatch wrapper ──► TaskTracker::spawn(work)
//!                         ├─► tokio::spawn(guarded work)
//!                         ├─► lock; insert handle unless already finished; unlock
//!                         └─► return TrackedTask (non-blocking)
//!
//! guarded work:  exit = work.await
//!                ExitGuard::drop ─► lock; remove(id); publish exit; unlock
//!                (runs on completion, failure and abort alike)
//!
//! drain ──► snapshot() ──► TrackedTask::wait() / cancel()
//! ```
//!
//! ## Rules
//! - Insertion and removal+publish each happen under the registry lock, so a
//!   task is either inserted before its guard runs or never inserted at all.
//! - Removal happens before the exit status is published: a waiter that has seen
//!   a task finish never finds it in a later snapshot.
//! - Removing an absent id is a no-op (cancellation and completion may race).
//! - The lock is held only across insert/remove/snapshot, never across `.await`.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::AbortHandle;

use crate::events::EventKind;

/// Identity of a tracked task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

/// How a tracked task ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskExit {
    /// Listener returned `Ok`.
    Completed,
    /// Listener returned an error or panicked (already logged).
    Failed,
    /// Task was aborted before it finished.
    Cancelled,
}

/// Handle to one in-flight listener invocation.
///
/// Cheap to clone; every clone observes the same task.
#[derive(Clone)]
pub struct TrackedTask {
    id: TaskId,
    event: EventKind,
    listener: Arc<str>,
    exit: watch::Receiver<Option<TaskExit>>,
    abort: AbortHandle,
}

impl TrackedTask {
    #[inline]
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Event whose publication spawned this task.
    #[inline]
    pub fn event(&self) -> EventKind {
        self.event
    }

    #[inline]
    pub fn listener_name(&self) -> &str {
        &self.listener
    }

    /// Returns `true` once the exit status is known.
    pub fn is_finished(&self) -> bool {
        self.exit.borrow().is_some()
    }

    /// Requests cancellation. Takes effect at the task's next suspension point.
    pub fn cancel(&self) {
        self.abort.abort();
    }

    /// Waits until the task has finished and has left the registry.
    ///
    /// A cancelled task reports [`TaskExit::Cancelled`]; it is up to the caller
    /// to decide whether that is expected.
    pub async fn wait(&self) -> TaskExit {
        let mut rx = self.exit.clone();
        let exit = match rx.wait_for(Option::is_some).await {
            Ok(exit) => (*exit).unwrap_or(TaskExit::Cancelled),
            Err(_) => TaskExit::Cancelled,
        };
        exit
    }
}

impl fmt::Debug for TrackedTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackedTask")
            .field("id", &self.id)
            .field("event", &self.event)
            .field("listener", &self.listener)
            .field("finished", &self.is_finished())
            .finish()
    }
}

/// Set of in-flight listener tasks.
pub struct TaskTracker {
    tasks: Mutex<HashMap<TaskId, TrackedTask>>,
    next_id: AtomicU64,
}

impl TaskTracker {
    /// Creates an empty tracker.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            tasks: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        })
    }

    /// Spawns `work` on the current tokio runtime and tracks it until it ends.
    ///
    /// # Panics
    /// Panics when called outside a tokio runtime, like [`tokio::spawn`].
    pub fn spawn<F>(self: &Arc<Self>, event: EventKind, listener: Arc<str>, work: F) -> TrackedTask
    where
        F: Future<Output = TaskExit> + Send + 'static,
    {
        let id = TaskId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (tx, rx) = watch::channel(None);
        let guard = ExitGuard {
            id,
            tracker: Arc::downgrade(self),
            tx,
            exit: None,
        };

        let join = tokio::spawn(async move {
            let mut guard = guard;
            guard.exit = Some(work.await);
        });
        let task = TrackedTask {
            id,
            event,
            listener,
            exit: rx,
            abort: join.abort_handle(),
        };

        let mut tasks = self.tasks.lock();
        if !task.is_finished() {
            tasks.insert(id, task.clone());
        }
        task
    }

    /// Drops a handle from the registry. Returns `false` if it was absent.
    pub fn remove(&self, id: TaskId) -> bool {
        self.tasks.lock().remove(&id).is_some()
    }

    /// Current membership, in no particular order.
    pub fn snapshot(&self) -> Vec<TrackedTask> {
        self.tasks.lock().values().cloned().collect()
    }

    /// Number of tasks currently tracked.
    pub fn len(&self) -> usize {
        self.tasks.lock().len()
    }

    /// Returns `true` if nothing is in flight.
    pub fn is_empty(&self) -> bool {
        self.tasks.lock().is_empty()
    }
}

/// Lives inside the spawned task; its drop is the task's `finally`.
struct ExitGuard {
    id: TaskId,
    tracker: Weak<TaskTracker>,
    tx: watch::Sender<Option<TaskExit>>,
    exit: Option<TaskExit>,
}

impl Drop for ExitGuard {
    fn drop(&mut self) {
        let exit = Some(self.exit.unwrap_or(TaskExit::Cancelled));
        match self.tracker.upgrade() {
            Some(tracker) => {
                let mut tasks = tracker.tasks.lock();
                tasks.remove(&self.id);
                self.tx.send_replace(exit);
            }
            None => {
                self.tx.send_replace(exit);
            }
        }
    }
}
