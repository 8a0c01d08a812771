//! # Shutdown barrier over the tracked-task registry.
//!
//! [`drain`] waits until no listener task is in flight, optionally bounded by a
//! deadline after which the stragglers are cancelled.
//!
//! ## Flow
//! ```text
//! drain(tracker, timeout)
//!   │
//!   ├─ None ──────► wait_until_idle()                         ─► Drained
//!   │
//!   └─ Some(limit) ► timeout(limit, wait_until_idle())
//!                      ├─ Ok  ─────────────────────────────────► Drained
//!                      └─ Err ─► warn! ─► cancel_outstanding() ─► TimedOut { cancelled }
//!
//! wait_until_idle:      loop { snap = snapshot(); if empty break; join_all(wait) }
//! cancel_outstanding:   loop { snap = snapshot(); if empty break; cancel all; join_all(wait) }
//! ```
//!
//! ## Rules
//! - **Fixpoint**: a single snapshot is never enough. A listener may emit again
//!   (or otherwise spawn tracked work) while the barrier is waiting, so the loop
//!   re-snapshots until it comes back empty.
//! - **Bounded**: the deadline covers every iteration, not each one.
//! - **No leftovers**: after a timeout, every cancelled task is awaited before
//!   returning. The resulting `Cancelled` exits are expected and dropped here.

use std::time::Duration;

use futures::future::join_all;
use tokio::time;

use crate::core::tracker::{TaskExit, TaskTracker};

/// How a drain ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainOutcome {
    /// Every tracked task finished on its own.
    Drained,
    /// The deadline passed; `cancelled` tasks were cancelled and awaited.
    TimedOut {
        /// Number of tasks that were still in flight and got cancelled.
        cancelled: usize,
    },
}

impl DrainOutcome {
    /// Returns `true` if the deadline was hit.
    #[inline]
    pub fn timed_out(&self) -> bool {
        matches!(self, DrainOutcome::TimedOut { .. })
    }
}

/// Waits for the tracker to become empty, bounded by `timeout` if given.
pub(crate) async fn drain(tracker: &TaskTracker, timeout: Option<Duration>) -> DrainOutcome {
    tracing::debug!(pending = tracker.len(), "waiting for all event listeners to complete");

    let Some(limit) = timeout else {
        wait_until_idle(tracker).await;
        return DrainOutcome::Drained;
    };

    match time::timeout(limit, wait_until_idle(tracker)).await {
        Ok(()) => DrainOutcome::Drained,
        Err(_elapsed) => {
            tracing::warn!(
                pending = tracker.len(),
                timeout = ?limit,
                "timed out waiting for event listeners to complete; unfinished listeners will be cancelled"
            );
            let cancelled = cancel_outstanding(tracker).await;
            DrainOutcome::TimedOut { cancelled }
        }
    }
}

async fn wait_until_idle(tracker: &TaskTracker) {
    loop {
        let pending = tracker.snapshot();
        if pending.is_empty() {
            return;
        }
        tracing::debug!(pending = pending.len(), "waiting for listener tasks");
        join_all(pending.iter().map(|task| task.wait())).await;
    }
}

async fn cancel_outstanding(tracker: &TaskTracker) -> usize {
    let mut cancelled = 0;
    loop {
        let pending = tracker.snapshot();
        if pending.is_empty() {
            return cancelled;
        }
        for task in &pending {
            task.cancel();
        }
        cancelled += pending.len();

        let exits = join_all(pending.iter().map(|task| task.wait())).await;
        for (task, exit) in pending.iter().zip(exits) {
            match exit {
                TaskExit::Cancelled => tracing::debug!(
                    event_name = %task.event(),
                    listener_name = task.listener_name(),
                    "listener task cancelled"
                ),
                other => tracing::debug!(
                    event_name = %task.event(),
                    listener_name = task.listener_name(),
                    exit = ?other,
                    "listener task finished before cancellation took effect"
                ),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Instant;

    use super::*;
    use crate::core::tracker::TrackedTask;
    use crate::events::EventKind;

    fn sleeper(tracker: &Arc<TaskTracker>, ms: u64) -> TrackedTask {
        tracker.spawn(EventKind::Exit, Arc::from("sleeper"), async move {
            time::sleep(Duration::from_millis(ms)).await;
            TaskExit::Completed
        })
    }

    #[tokio::test]
    async fn test_empty_tracker_drains_immediately() {
        let tracker = TaskTracker::new();
        assert_eq!(drain(&tracker, None).await, DrainOutcome::Drained);
        assert_eq!(
            drain(&tracker, Some(Duration::ZERO)).await,
            DrainOutcome::Drained
        );
    }

    #[tokio::test]
    async fn test_waits_for_work_spawned_during_the_wait() {
        let tracker = TaskTracker::new();
        let inner = Arc::clone(&tracker);
        let child_done = Arc::new(parking_lot::Mutex::new(false));
        let flag = Arc::clone(&child_done);

        tracker.spawn(EventKind::PersistState, Arc::from("parent"), async move {
            time::sleep(Duration::from_millis(20)).await;
            inner.spawn(EventKind::PersistState, Arc::from("child"), async move {
                time::sleep(Duration::from_millis(50)).await;
                *flag.lock() = true;
                TaskExit::Completed
            });
            TaskExit::Completed
        });

        assert_eq!(drain(&tracker, None).await, DrainOutcome::Drained);
        assert!(*child_done.lock());
        assert!(tracker.is_empty());
    }

    #[tokio::test]
    async fn test_deadline_cancels_stragglers() {
        let tracker = TaskTracker::new();
        let fast = sleeper(&tracker, 10);
        let slow = sleeper(&tracker, 60_000);

        let started = Instant::now();
        let outcome = drain(&tracker, Some(Duration::from_millis(100))).await;

        assert_eq!(outcome, DrainOutcome::TimedOut { cancelled: 1 });
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(fast.wait().await, TaskExit::Completed);
        assert_eq!(slow.wait().await, TaskExit::Cancelled);
        assert!(tracker.is_empty());
    }
}
