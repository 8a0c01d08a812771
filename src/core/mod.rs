//! Runtime core: dispatch, task tracking and shutdown.
//!
//! The public entry point is [`EventManager`], which registers listeners,
//! dispatches events without blocking and drains in-flight work on close.
//!
//! Internal modules:
//! - [`manager`]: registration table, dispatch wrappers, close/shutdown;
//! - [`runner`]: runs one listener call with failure isolation and logging;
//! - [`tracker`]: set of in-flight listener tasks;
//! - [`drain`]: fixpoint shutdown barrier with optional deadline;
//! - [`config`]: manager settings.

mod config;
mod drain;
mod manager;
mod runner;
mod tracker;

pub use config::Config;
pub use drain::DrainOutcome;
pub use manager::EventManager;
pub use tracker::{TaskExit, TaskId, TaskTracker, TrackedTask};
