//! # VFS Functional Test Harness
//!
//! This library drives a virtual-filesystem product through its command-line
//! verbs so functional tests can run against isolated enlistments and wait
//! for the product's asynchronous background work to settle. It backs the
//! `vfs-harness` command-line tool and can be linked directly into test
//! suites.
//!
//! ## Quick Example
//!
//! ```
//! use vfs_harness::topology::PathTopology;
//!
//! let config = vfs_harness::config::parse("enlistment-root: /tests/enlistment").unwrap();
//! let topology = PathTopology::new(&config);
//!
//! let root = topology.unique_enlistment_root();
//! assert!(root.starts_with("/tests/enlistment"));
//!
//! // The shared cache is reused by every enlistment of the run.
//! let cache = topology.resolve_cache_root(&root, None, config.no_shared_cache);
//! assert_eq!(cache, topology.shared_cache_root());
//! ```
//!
//! ## Core Concepts
//!
//! - **Topology (`topology`)**: unique enlistment roots and the choice
//!   between a shared and a per-enlistment object cache.
//! - **Cache layout (`cache_root`)**: structural discovery of the object and
//!   pack directories the product creates inside a cache root.
//! - **Polling (`poll`)**: bounded waiting until the product's status text
//!   contains a given line.
//! - **Lifecycle (`enlistment`, `harness`)**: clone, mount, configure,
//!   hydrate, and later unmount and delete an enlistment.
//! - **Collaborators (`process`, `git`, `eraser`, `diagnostics`)**: traits
//!   for the product executable, git, directory removal and log collection,
//!   each with a default implementation and replaceable in tests.
//!
//! ## Configuration
//!
//! Every setting lives in an explicit [`config::HarnessConfig`] value that is
//! passed to the topology and the harness; nothing is read from global state
//! behind the caller's back.

pub mod cache_root;
pub mod config;
pub mod defaults;
pub mod diagnostics;
pub mod enlistment;
pub mod eraser;
pub mod error;
pub mod git;
pub mod harness;
pub mod poll;
pub mod process;
pub mod topology;

#[cfg(test)]
mod topology_proptest;
