//! Removal of enlistment directories at teardown.
//!
//! Deleting a virtualized working tree is platform dependent. Where the
//! filesystem keeps tombstones and reparse points, files can stay locked for a
//! while after unmount and deletion has to be retried. Elsewhere recursive
//! deletion of a freshly unmounted enlistment is not reliable, so the harness
//! reports it as deferred instead of pretending it happened.

use crate::config::{DeletionMode, HarnessConfig};
use crate::error::{Error, Result};
use log::{debug, warn};
use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// What happened to a directory handed to an eraser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EraseOutcome {
    /// The directory is gone.
    Removed,
    /// Nothing was deleted; the caller owns cleanup.
    Deferred,
}

/// Capability to delete an enlistment directory tree.
pub trait DirectoryEraser: Send + Sync {
    fn erase(&self, path: &Path) -> Result<EraseOutcome>;
}

/// Deletes recursively, retrying transient failures.
#[derive(Debug, Clone)]
pub struct RetryingEraser {
    attempts: u32,
    delay: Duration,
}

impl RetryingEraser {
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            delay,
        }
    }
}

impl DirectoryEraser for RetryingEraser {
    fn erase(&self, path: &Path) -> Result<EraseOutcome> {
        let mut attempt = 1;
        loop {
            match fs::remove_dir_all(path) {
                Ok(()) => return Ok(EraseOutcome::Removed),
                Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(EraseOutcome::Removed),
                Err(e) if attempt >= self.attempts => {
                    return Err(Error::Erase {
                        path: path.to_path_buf(),
                        attempts: attempt,
                        source: e,
                    });
                }
                Err(e) => {
                    debug!(
                        "Deleting {} failed (attempt {}/{}): {}",
                        path.display(),
                        attempt,
                        self.attempts,
                        e
                    );
                    thread::sleep(self.delay);
                    attempt += 1;
                }
            }
        }
    }
}

/// Leaves the directory in place and says so.
#[derive(Debug, Default, Clone)]
pub struct DeferredEraser;

impl DirectoryEraser for DeferredEraser {
    fn erase(&self, path: &Path) -> Result<EraseOutcome> {
        warn!(
            "Deletion of {} deferred: this platform has no reliable enlistment removal",
            path.display()
        );
        Ok(EraseOutcome::Deferred)
    }
}

/// Whether the host filesystem has tombstone/reparse-point semantics.
pub fn platform_has_tombstones() -> bool {
    cfg!(windows)
}

/// Eraser matching the host platform.
pub fn platform_default(config: &HarnessConfig) -> Arc<dyn DirectoryEraser> {
    if platform_has_tombstones() {
        Arc::new(retrying(config))
    } else {
        Arc::new(DeferredEraser)
    }
}

/// Eraser selected by the `deletion` configuration key.
pub fn from_config(config: &HarnessConfig) -> Arc<dyn DirectoryEraser> {
    match config.deletion {
        DeletionMode::Auto => platform_default(config),
        DeletionMode::Retrying => Arc::new(retrying(config)),
        DeletionMode::Deferred => Arc::new(DeferredEraser),
    }
}

fn retrying(config: &HarnessConfig) -> RetryingEraser {
    RetryingEraser::new(
        config.delete_attempts,
        Duration::from_millis(config.delete_retry_delay_ms),
    )
}
