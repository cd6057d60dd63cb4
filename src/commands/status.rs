//! # Status Command Implementation

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use vfs_harness::config::HarnessConfig;

/// Print the product status of an enlistment
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Root of an existing enlistment.
    #[arg(long, value_name = "ROOT")]
    pub enlistment: PathBuf,
}

/// Execute the `status` command.
pub fn execute(args: StatusArgs, config: HarnessConfig) -> Result<()> {
    let enlistment = super::attach(config, &args.enlistment, None)?;
    let status = enlistment
        .status()
        .with_context(|| format!("Failed to query status of {}", args.enlistment.display()))?;
    print!("{status}");
    Ok(())
}
