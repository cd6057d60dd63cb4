//! # Error Handling
//!
//! This module defines the centralized error type for the harness. It uses
//! the `thiserror` library to describe every failure mode the lifecycle can
//! hit, with enough context (paths, commands, captured output) to diagnose a
//! broken test run from the message alone.
//!
//! ## Taxonomy
//!
//! - **Setup failures** (`Setup`): anything that went wrong while cloning,
//!   mounting or configuring an enlistment. The product's logs have already
//!   been emitted by the time this error reaches the caller, and the original
//!   failure is kept as the `source`.
//! - **Layout failures** (`CacheLayout`): the cache root does not have the
//!   shape the product is contracted to produce. These are environment or
//!   programming errors and are never retried.
//! - **Deletion failures** (`Erase`): a retrying eraser ran out of attempts.
//! - **Collaborator failures** (`ProductCommand`, `GitCommand`): a process
//!   exited unsuccessfully.
//!
//! A convergence timeout is deliberately absent: polling reports `false`
//! and lets the caller decide whether that fails the test.

use std::path::PathBuf;
use thiserror::Error;

use crate::enlistment::EnlistmentState;

/// Main error type for harness operations
#[derive(Error, Debug)]
pub enum Error {
    /// Cloning, mounting or post-clone configuration failed.
    ///
    /// Product logs were emitted before this error was produced.
    #[error("Enlistment setup failed for {}: {source}", root.display())]
    Setup {
        root: PathBuf,
        #[source]
        source: Box<Error>,
    },

    /// The cache root does not contain exactly one instance directory and
    /// one sibling entry.
    #[error("Unexpected cache layout in {}: {message}", cache_root.display())]
    CacheLayout { cache_root: PathBuf, message: String },

    /// A product command exited unsuccessfully.
    #[error("Product command failed: {command}\n{output}")]
    ProductCommand { command: String, output: String },

    /// A git command exited unsuccessfully.
    #[error("Git command failed in {}: {command} - {stderr}", repo.display())]
    GitCommand {
        command: String,
        repo: PathBuf,
        stderr: String,
    },

    /// The enlistment root already exists on disk.
    #[error("Enlistment root already exists: {}", root.display())]
    EnlistmentExists { root: PathBuf },

    /// A lifecycle operation was requested in a state that does not allow it.
    #[error("Cannot {operation} enlistment in state {state:?}")]
    InvalidState {
        operation: &'static str,
        state: EnlistmentState,
    },

    /// Directory removal kept failing after every retry.
    #[error("Failed to delete {} after {attempts} attempts: {source}", path.display())]
    Erase {
        path: PathBuf,
        attempts: u32,
        #[source]
        source: std::io::Error,
    },

    /// An error occurred with a path-related operation.
    #[error("Path operation error: {message}")]
    Path { message: String },

    /// The harness configuration could not be parsed or is inconsistent.
    #[error("Configuration error: {message}")]
    ConfigParse { message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
