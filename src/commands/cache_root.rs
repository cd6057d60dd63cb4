//! # Cache-Root Command Implementation
//!
//! Prints the object cache root an enlistment would be given, following the
//! same resolution the harness uses when cloning: an explicit root wins,
//! then the configured one, then the shared or per-enlistment cache.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use vfs_harness::config::HarnessConfig;
use vfs_harness::topology::PathTopology;

/// Print the object cache root an enlistment would use
#[derive(Args, Debug)]
pub struct CacheRootArgs {
    /// Enlistment root to resolve the cache for.
    #[arg(long, value_name = "ROOT")]
    pub enlistment: PathBuf,

    /// Explicit cache root; returned unchanged when given.
    #[arg(long, value_name = "DIR")]
    pub cache_root: Option<PathBuf>,

    /// Place the cache inside the enlistment instead of sharing it.
    #[arg(long)]
    pub no_shared_cache: bool,
}

/// Execute the `cache-root` command.
pub fn execute(args: CacheRootArgs, config: &HarnessConfig) -> Result<()> {
    let topology = PathTopology::new(config);
    let explicit = args
        .cache_root
        .as_deref()
        .or(config.local_cache_root.as_deref());
    let cache_root = topology.resolve_cache_root(
        &args.enlistment,
        explicit,
        args.no_shared_cache || config.no_shared_cache,
    );
    println!("{}", cache_root.display());
    Ok(())
}
