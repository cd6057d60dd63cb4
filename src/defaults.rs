//! Default values for harness configuration.
//!
//! This module provides centralized default values used by the
//! configuration layer and the CLI, ensuring consistency and avoiding
//! duplication.

use std::path::PathBuf;

/// Repository cloned by functional tests unless overridden.
pub const REPO_TO_CLONE: &str = "https://gvfs.visualstudio.com/ci/_git/ForTests";

/// Commit-ish checked out in new enlistments unless overridden.
pub const COMMITISH: &str = "FunctionalTests/20180214";

/// Executable name of the product under test.
pub const PRODUCT_BINARY: &str = "gvfs";

/// Name of the product's control directory inside an enlistment.
pub const CONTROL_DIR: &str = ".gvfs";

/// Name of the object-cache directory, both per-enlistment and shared.
pub const CACHE_DIR: &str = ".gvfsCache";

/// Prefix of the status line reporting who holds the product lock.
pub const LOCK_STATUS_PREFIX: &str = "GVFS Lock: Held by";

/// Sleep between two status fetches while polling.
pub const POLL_INTERVAL_MS: u64 = 100;

/// Default budget for a single convergence wait.
pub const MAX_WAIT_MS: u64 = 5000;

/// Attempts made by the retrying eraser before giving up.
pub const DELETE_ATTEMPTS: u32 = 10;

/// Pause between two deletion attempts.
pub const DELETE_RETRY_DELAY_MS: u64 = 500;

/// Returns the default base directory for enlistments.
///
/// Uses `~/VfsFunctionalTests/enlistment`, falling back to the system
/// temporary directory when no home directory can be determined. The shared
/// object cache lives next to the `enlistment` directory, so it survives
/// cleanup of individual enlistments between runs.
pub fn default_enlistment_root() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("VfsFunctionalTests")
        .join("enlistment")
}
