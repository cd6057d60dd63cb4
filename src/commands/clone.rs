//! # Clone Command Implementation
//!
//! Clones and mounts a new enlistment through the product, configures git
//! for testing and hydrates the root `.gitignore`. On success the enlistment
//! root is printed on stdout; the enlistment stays mounted.
//!
//! If setup fails the product's logs are written to stderr before the error
//! is reported.

use anyhow::{Context, Result};
use clap::Args;
use log::info;
use std::path::PathBuf;

use vfs_harness::config::HarnessConfig;
use vfs_harness::harness::Harness;

/// Clone and mount a new enlistment
#[derive(Args, Debug)]
pub struct CloneArgs {
    /// Branch, tag or commit to check out. Defaults to the configured one.
    #[arg(long, value_name = "REF")]
    pub commitish: Option<String>,

    /// Explicit object cache root.
    #[arg(long, value_name = "DIR", conflicts_with_all = ["per_repo_cache", "with_spaces"])]
    pub cache_root: Option<PathBuf>,

    /// Give the enlistment its own object cache.
    #[arg(long)]
    pub per_repo_cache: bool,

    /// Use an enlistment root containing a space (implies a per-repo cache).
    #[arg(long)]
    pub with_spaces: bool,
}

/// Execute the `clone` command.
pub fn execute(args: CloneArgs, config: HarnessConfig) -> Result<()> {
    let harness = Harness::new(config)?;
    let commitish = args.commitish.as_deref();

    let enlistment = if args.with_spaces {
        harness.clone_and_mount_with_spaces_in_path(commitish)
    } else if args.per_repo_cache {
        harness.clone_and_mount_with_per_repo_cache(commitish)
    } else {
        harness.clone_and_mount(commitish, args.cache_root.as_deref())
    }
    .context("Failed to create enlistment")?;

    info!(
        "Enlistment ready at {} (cache {})",
        enlistment.root().display(),
        enlistment.local_cache_root().display()
    );
    println!("{}", enlistment.root().display());
    Ok(())
}
