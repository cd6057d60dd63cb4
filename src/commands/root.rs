//! # Root Command Implementation
//!
//! Prints a fresh, collision-free enlistment root under the configured
//! enlistment base. Nothing is created on disk.

use anyhow::Result;
use clap::Args;

use vfs_harness::config::HarnessConfig;
use vfs_harness::topology::PathTopology;

/// Print a fresh unique enlistment root
#[derive(Args, Debug)]
pub struct RootArgs {
    /// Produce a root whose final component contains a space.
    #[arg(long)]
    pub with_spaces: bool,
}

/// Execute the `root` command.
pub fn execute(args: RootArgs, config: &HarnessConfig) -> Result<()> {
    let topology = PathTopology::new(config);
    let root = if args.with_spaces {
        topology.unique_enlistment_root_with_spaces()
    } else {
        topology.unique_enlistment_root()
    };
    println!("{}", root.display());
    Ok(())
}
