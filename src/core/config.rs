//! # Event manager configuration.
//!
//! Provides [`Config`] settings for [`EventManager`](crate::EventManager).
//!
//! ## Sentinel values
//! - `drain_timeout = 0s` → unbounded drain (wait for every listener)

use std::time::Duration;

/// Configuration for the event manager.
///
/// ## Field semantics
/// - `drain_timeout`: bound applied by [`EventManager::shutdown`](crate::EventManager::shutdown)
///   (`0s` = wait until every in-flight listener has finished)
///
/// ## Notes
/// Fields are public. Prefer the accessors to avoid sprinkling sentinel checks.
#[derive(Clone, Debug)]
pub struct Config {
    /// Maximum time `shutdown()` waits for in-flight listeners.
    ///
    /// When the bound is hit:
    /// - a warning is logged
    /// - remaining listener tasks are cancelled and awaited
    pub drain_timeout: Duration,
}

impl Config {
    /// Returns the drain bound as an `Option`.
    ///
    /// - `None` → wait until idle
    /// - `Some(d)` → cancel whatever is still running after `d`
    #[inline]
    pub fn drain_limit(&self) -> Option<Duration> {
        if self.drain_timeout == Duration::ZERO {
            None
        } else {
            Some(self.drain_timeout)
        }
    }

    /// Returns a copy with `drain_timeout` replaced.
    #[must_use]
    pub fn with_drain_timeout(mut self, timeout: Duration) -> Self {
        self.drain_timeout = timeout;
        self
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `drain_timeout = 0s` (unbounded)
    fn default() -> Self {
        Self {
            drain_timeout: Duration::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_means_unbounded() {
        assert_eq!(Config::default().drain_limit(), None);

        let cfg = Config::default().with_drain_timeout(Duration::from_secs(3));
        assert_eq!(cfg.drain_limit(), Some(Duration::from_secs(3)));
    }
}
