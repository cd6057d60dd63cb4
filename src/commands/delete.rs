//! # Delete Command Implementation
//!
//! Emits the product's logs, optionally unmounts, then removes the
//! enlistment directory. On platforms where removal is deferred the command
//! says so instead of pretending the directory is gone.

use anyhow::{Context, Result};
use clap::Args;
use log::{info, warn};
use std::path::PathBuf;

use vfs_harness::config::HarnessConfig;
use vfs_harness::eraser::EraseOutcome;

/// Tear down an enlistment
#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Root of an existing enlistment.
    #[arg(long, value_name = "ROOT")]
    pub enlistment: PathBuf,

    /// Unmount before deleting.
    #[arg(long)]
    pub unmount: bool,
}

/// Execute the `delete` command.
pub fn execute(args: DeleteArgs, config: HarnessConfig) -> Result<()> {
    let mut enlistment = super::attach(config, &args.enlistment, None)?;

    let outcome = if args.unmount {
        enlistment.unmount_and_delete_all()
    } else {
        enlistment.delete_enlistment()
    }
    .with_context(|| format!("Failed to delete {}", args.enlistment.display()))?;

    match outcome {
        EraseOutcome::Removed => info!("Removed {}", args.enlistment.display()),
        EraseOutcome::Deferred => warn!(
            "Deletion of {} was deferred; the directory is still on disk",
            args.enlistment.display()
        ),
    }
    Ok(())
}
