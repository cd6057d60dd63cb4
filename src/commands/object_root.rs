//! # Object-Root Command Implementation
//!
//! Inspects a populated cache root and prints the object directory the
//! product created inside it, or its `pack` subdirectory with `--pack`.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use vfs_harness::cache_root;

/// Print the object (or pack) directory inside a cache root
#[derive(Args, Debug)]
pub struct ObjectRootArgs {
    /// The cache root to inspect.
    #[arg(value_name = "CACHE_ROOT")]
    pub cache_root: PathBuf,

    /// Print the pack directory instead of the object root.
    #[arg(long)]
    pub pack: bool,
}

/// Execute the `object-root` command.
pub fn execute(args: ObjectRootArgs) -> Result<()> {
    let path = if args.pack {
        cache_root::pack_root(&args.cache_root)
    } else {
        cache_root::object_root(&args.cache_root)
    }
    .with_context(|| format!("Failed to inspect {}", args.cache_root.display()))?;
    println!("{}", path.display());
    Ok(())
}
