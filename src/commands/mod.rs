//! # CLI Command Implementations
//!
//! Each subcommand of `vfs-harness` lives in its own file with an `Args`
//! struct derived with `clap` and an `execute` function that calls into the
//! `vfs_harness` library.
//!
//! Commands that print a path print exactly one line on stdout so they can
//! be captured by shell scripts; everything else goes through the logger.

pub mod cache_root;
pub mod clone;
pub mod delete;
pub mod object_root;
pub mod root;
pub mod status;
pub mod wait;

use anyhow::Result;
use std::path::Path;
use vfs_harness::config::HarnessConfig;
use vfs_harness::enlistment::Enlistment;
use vfs_harness::harness::Harness;

/// Re-attach to an enlistment created by an earlier `clone`.
pub(crate) fn attach(
    config: HarnessConfig,
    enlistment: &Path,
    cache_root: Option<&Path>,
) -> Result<Enlistment> {
    Ok(Harness::new(config)?.attach(enlistment, cache_root))
}
