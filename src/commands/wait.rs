//! # Wait Command Implementation
//!
//! Polls the product's status until background operations have drained or,
//! with `--lock`, until the lock is held by the given command.
//!
//! ## Exit Codes
//!
//! - `0`: the status converged within the budget
//! - `1`: the budget ran out, or the status command itself failed

use anyhow::{Context, Result};
use clap::Args;
use log::info;
use std::path::PathBuf;

use vfs_harness::config::HarnessConfig;

/// Wait for background operations or a lock to settle
#[derive(Args, Debug)]
pub struct WaitArgs {
    /// Root of an existing enlistment.
    #[arg(long, value_name = "ROOT")]
    pub enlistment: PathBuf,

    /// Wait until the lock is held by this command instead.
    #[arg(long, value_name = "CMD")]
    pub lock: Option<String>,

    /// Give up after this many milliseconds. Defaults to the configured wait.
    #[arg(long, value_name = "MS")]
    pub max_wait_ms: Option<u64>,
}

/// Execute the `wait` command.
pub fn execute(args: WaitArgs, config: HarnessConfig) -> Result<()> {
    let max_wait_ms = args.max_wait_ms.unwrap_or(config.default_max_wait_ms);
    let enlistment = super::attach(config, &args.enlistment, None)?;

    let converged = match args.lock.as_deref() {
        Some(command) => enlistment.wait_for_lock(command, max_wait_ms),
        None => enlistment.wait_for_background_operations(max_wait_ms),
    }
    .with_context(|| format!("Failed to query status of {}", args.enlistment.display()))?;

    if !converged {
        // Propagated as an error so main exits with code 1.
        anyhow::bail!(
            "Status of {} did not settle within {} ms",
            args.enlistment.display(),
            max_wait_ms
        );
    }

    info!("Status of {} settled", args.enlistment.display());
    Ok(())
}
