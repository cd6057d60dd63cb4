//! Bounded polling of the product's status text.
//!
//! The product does part of its work in the background and only reports
//! progress through a human-readable status report. [`StatusPoller`] fetches
//! that report repeatedly until it contains a target substring or a wall-clock
//! budget runs out. Matching is plain substring containment so incidental
//! formatting changes in the report do not break the harness.
//!
//! ```
//! use vfs_harness::poll::StatusPoller;
//! use std::time::Duration;
//!
//! let poller = StatusPoller::with_interval(Duration::from_millis(1));
//! let mut calls = 0u32;
//! let converged = poller
//!     .wait_for_status(
//!         || {
//!             calls += 1;
//!             Ok(format!("Background operations: {}\n", 2 - calls.min(2)))
//!         },
//!         50,
//!         "Background operations: 0",
//!     )
//!     .unwrap();
//! assert!(converged);
//! ```

use crate::defaults;
use crate::error::Result;
use log::{debug, warn};
use std::thread;
use std::time::Duration;

#[cfg(windows)]
const LINE_ENDING: &str = "\r\n";
#[cfg(not(windows))]
const LINE_ENDING: &str = "\n";

/// Status line reported once no background operation is pending.
pub fn zero_background_operations() -> String {
    format!("Background operations: 0{}", LINE_ENDING)
}

/// Status line reported while `process_name` holds the product lock.
pub fn lock_held_by(prefix: &str, process_name: &str) -> String {
    format!("{} {}", prefix, process_name)
}

/// Result of one polling run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollOutcome {
    /// The last fetched status contained the target.
    pub converged: bool,
    /// Accumulated sleep time.
    pub elapsed: Duration,
    /// Number of status fetches performed.
    pub attempts: u32,
}

/// Smallest quantum a poller sleeps for; shorter intervals are raised to it.
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Fixed-quantum status poller.
#[derive(Debug, Clone, Copy)]
pub struct StatusPoller {
    interval: Duration,
}

impl Default for StatusPoller {
    fn default() -> Self {
        Self::with_interval(Duration::from_millis(defaults::POLL_INTERVAL_MS))
    }
}

impl StatusPoller {
    /// A poller sleeping `interval` between fetches, at least [`MIN_INTERVAL`].
    ///
    /// The budget is consumed one quantum per fetch, so a zero quantum would
    /// never exhaust it.
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval: interval.max(MIN_INTERVAL),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Poll until the status contains `target` or `max_wait_ms` elapses.
    ///
    /// Returns `Ok(false)` on timeout. Errors from `fetch_status` are
    /// propagated immediately.
    pub fn wait_for_status<F>(&self, fetch_status: F, max_wait_ms: u64, target: &str) -> Result<bool>
    where
        F: FnMut() -> Result<String>,
    {
        Ok(self.poll(fetch_status, max_wait_ms, target)?.converged)
    }

    /// Same loop as [`wait_for_status`](Self::wait_for_status), with bookkeeping.
    ///
    /// The loop sleeps one quantum before every fetch and keeps going while
    /// the elapsed time is within the budget and the last status does not
    /// contain `target`. At least one fetch always happens, even with a zero
    /// budget. A match found on the fetch that also exhausts the budget still
    /// counts as converged.
    pub fn poll<F>(&self, mut fetch_status: F, max_wait_ms: u64, target: &str) -> Result<PollOutcome>
    where
        F: FnMut() -> Result<String>,
    {
        let max_wait = Duration::from_millis(max_wait_ms);
        let mut elapsed = Duration::ZERO;
        let mut attempts = 0;
        let mut status: Option<String> = None;

        while elapsed <= max_wait && !contains(status.as_deref(), target) {
            thread::sleep(self.interval);
            status = Some(fetch_status()?);
            elapsed += self.interval;
            attempts += 1;
        }

        let converged = contains(status.as_deref(), target);
        if converged {
            debug!("Status converged on {:?} after {:?}", target.trim_end(), elapsed);
        } else {
            warn!(
                "Status did not contain {:?} within {} ms ({} attempts)",
                target.trim_end(),
                max_wait_ms,
                attempts
            );
        }

        Ok(PollOutcome {
            converged,
            elapsed,
            attempts,
        })
    }
}

fn contains(status: Option<&str>, target: &str) -> bool {
    status.is_some_and(|status| status.contains(target))
}
