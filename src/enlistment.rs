//! # Enlistment Lifecycle
//!
//! An [`Enlistment`] is one isolated instance of the product under test,
//! rooted at a directory nobody else uses. It owns the enlistment's identity
//! (root, repository, commit-ish, cache root) and sequences the product's
//! verbs through the lifecycle:
//!
//! ```text
//! Unbuilt -> Cloning -> Mounted <-> Unmounted -> Deleted
//! ```
//!
//! Whether the working tree is really mounted is known only to the product;
//! the state kept here records which lifecycle step last completed, so that a
//! deleted enlistment cannot be used again by mistake.
//!
//! Enlistments are normally created through [`crate::harness::Harness`],
//! which picks a unique root and the right object cache.

use crate::cache_root;
use crate::diagnostics::LogEmitter;
use crate::eraser::{DirectoryEraser, EraseOutcome};
use crate::error::{Error, Result};
use crate::git::{self, GitOperations};
use crate::poll::{self, StatusPoller};
use crate::process::VfsProduct;
use log::{error, info};
use std::fs;
use std::io;
use std::path::{Path, PathBuf, MAIN_SEPARATOR_STR};
use std::sync::Arc;

/// Working tree directory inside an enlistment.
pub const SRC_DIR: &str = "src";
/// Product logs inside the control directory.
pub const LOGS_DIR: &str = "logs";
/// Product diagnostics inside the control directory.
pub const DIAGNOSTICS_DIR: &str = "diagnostics";
/// Loose object store relative to the working tree.
pub const OBJECTS_ROOT: [&str; 2] = [".git", "objects"];
/// Ignore-rules file hydrated during setup.
pub const ROOT_GITIGNORE: &str = ".gitignore";

/// Last lifecycle step an enlistment completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnlistmentState {
    Unbuilt,
    Cloning,
    Mounted,
    Unmounted,
    Deleted,
}

/// Identity and settings an enlistment is built from.
#[derive(Debug, Clone)]
pub struct EnlistmentSpec {
    pub root: PathBuf,
    pub repo_url: String,
    pub commitish: String,
    pub local_cache_root: PathBuf,
    pub control_dir: String,
    pub lock_status_prefix: String,
}

/// Collaborators shared by every enlistment of a harness.
#[derive(Clone)]
pub struct Collaborators {
    pub git: Arc<dyn GitOperations>,
    pub eraser: Arc<dyn DirectoryEraser>,
    pub emitter: Arc<dyn LogEmitter>,
}

/// One isolated instance of the product under test.
pub struct Enlistment {
    spec: EnlistmentSpec,
    product: Box<dyn VfsProduct>,
    collaborators: Collaborators,
    poller: StatusPoller,
    state: EnlistmentState,
}

impl std::fmt::Debug for Enlistment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Enlistment")
            .field("spec", &self.spec)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Enlistment {
    pub fn new(
        spec: EnlistmentSpec,
        product: Box<dyn VfsProduct>,
        collaborators: Collaborators,
        poller: StatusPoller,
    ) -> Self {
        Self {
            spec,
            product,
            collaborators,
            poller,
            state: EnlistmentState::Unbuilt,
        }
    }

    /// Re-attach to an enlistment that was set up earlier.
    ///
    /// The product is assumed to have it mounted.
    pub fn attach(
        spec: EnlistmentSpec,
        product: Box<dyn VfsProduct>,
        collaborators: Collaborators,
        poller: StatusPoller,
    ) -> Self {
        Self {
            state: EnlistmentState::Mounted,
            ..Self::new(spec, product, collaborators, poller)
        }
    }

    pub fn state(&self) -> EnlistmentState {
        self.state
    }

    pub fn root(&self) -> &Path {
        &self.spec.root
    }

    pub fn repo_url(&self) -> &str {
        &self.spec.repo_url
    }

    pub fn commitish(&self) -> &str {
        &self.spec.commitish
    }

    pub fn local_cache_root(&self) -> &Path {
        &self.spec.local_cache_root
    }

    /// The working tree, `<root>/src`.
    pub fn repo_root(&self) -> PathBuf {
        self.spec.root.join(SRC_DIR)
    }

    /// The product's control directory, `<root>/<control-dir>`.
    pub fn control_root(&self) -> PathBuf {
        self.spec.root.join(&self.spec.control_dir)
    }

    pub fn logs_root(&self) -> PathBuf {
        self.control_root().join(LOGS_DIR)
    }

    pub fn diagnostics_root(&self) -> PathBuf {
        self.control_root().join(DIAGNOSTICS_DIR)
    }

    /// Clone, mount and configure the enlistment.
    ///
    /// The sequence is: product clone, product mount, git post-clone
    /// configuration, then a synchronous read of the root `.gitignore` so it
    /// is hydrated before any assertion runs instead of whenever the
    /// product's background status scan gets to it.
    ///
    /// If any step fails, the product's logs are emitted first and the
    /// failure is then returned as [`Error::Setup`] with the original error
    /// as its source.
    pub fn clone_and_mount(&mut self) -> Result<()> {
        if self.state != EnlistmentState::Unbuilt {
            return Err(Error::InvalidState {
                operation: "clone",
                state: self.state,
            });
        }
        if self.spec.root.exists() {
            return Err(Error::EnlistmentExists {
                root: self.spec.root.clone(),
            });
        }

        info!(
            "Cloning {} at {} into {}",
            self.spec.repo_url,
            self.spec.commitish,
            self.spec.root.display()
        );
        self.state = EnlistmentState::Cloning;

        if let Err(e) = self.run_setup() {
            error!("Setup of {} failed: {}", self.spec.root.display(), e);
            self.collaborators.emitter.emit(&self.logs_root());
            return Err(Error::Setup {
                root: self.spec.root.clone(),
                source: Box::new(e),
            });
        }

        self.state = EnlistmentState::Mounted;
        Ok(())
    }

    fn run_setup(&self) -> Result<()> {
        self.product
            .clone_repo(&self.spec.repo_url, &self.spec.commitish)?;
        self.product.mount()?;

        let repo_root = self.repo_root();
        git::configure_after_clone(
            self.collaborators.git.as_ref(),
            &repo_root,
            &self.spec.commitish,
        )?;

        // Any entry named .gitignore must be readable; only absence is fine.
        match fs::read(repo_root.join(ROOT_GITIGNORE)) {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn mount(&mut self) -> Result<()> {
        self.ensure_live("mount")?;
        self.product.mount()?;
        self.state = EnlistmentState::Mounted;
        Ok(())
    }

    /// Mount without treating a product failure as an error.
    pub fn try_mount(&mut self) -> Result<(bool, String)> {
        self.ensure_live("mount")?;
        let (success, output) = self.product.try_mount()?;
        if success {
            self.state = EnlistmentState::Mounted;
        }
        Ok((success, output))
    }

    pub fn unmount(&mut self) -> Result<()> {
        self.ensure_live("unmount")?;
        self.product.unmount()?;
        self.state = EnlistmentState::Unmounted;
        Ok(())
    }

    /// Emit the product's logs, then hand the root to the eraser.
    ///
    /// An enlistment that was never cloned has nothing on disk and is
    /// rejected with [`Error::InvalidState`].
    ///
    /// A [`EraseOutcome::Deferred`] result means the directory is still on
    /// disk and cleanup is the caller's job.
    pub fn delete_enlistment(&mut self) -> Result<EraseOutcome> {
        if matches!(self.state, EnlistmentState::Unbuilt | EnlistmentState::Deleted) {
            return Err(Error::InvalidState {
                operation: "delete",
                state: self.state,
            });
        }

        self.collaborators.emitter.emit(&self.logs_root());
        let outcome = self.collaborators.eraser.erase(&self.spec.root)?;
        info!("Enlistment {} deleted ({:?})", self.spec.root.display(), outcome);
        self.state = EnlistmentState::Deleted;
        Ok(outcome)
    }

    pub fn unmount_and_delete_all(&mut self) -> Result<EraseOutcome> {
        self.unmount()?;
        self.delete_enlistment()
    }

    pub fn prefetch(&self, args: &str, fail_on_error: bool) -> Result<String> {
        self.ensure_live("prefetch")?;
        self.product.prefetch(args, fail_on_error)
    }

    pub fn repair(&self) -> Result<String> {
        self.ensure_live("repair")?;
        self.product.repair()
    }

    pub fn diagnose(&self) -> Result<String> {
        self.ensure_live("diagnose")?;
        self.product.diagnose()
    }

    pub fn status(&self) -> Result<String> {
        self.ensure_live("query status of")?;
        self.product.status()
    }

    pub fn get_cache_server(&self) -> Result<String> {
        self.ensure_live("query cache server of")?;
        self.product.cache_server("--get")
    }

    pub fn set_cache_server(&self, arg: &str) -> Result<String> {
        self.ensure_live("set cache server of")?;
        self.product.cache_server(&format!("--set {}", arg))
    }

    /// Wait until the product reports no pending background operation.
    pub fn wait_for_background_operations(&self, max_wait_ms: u64) -> Result<bool> {
        self.wait_for_status(max_wait_ms, &poll::zero_background_operations())
    }

    /// Wait until the product lock is reported as held by `lock_command`.
    pub fn wait_for_lock(&self, lock_command: &str, max_wait_ms: u64) -> Result<bool> {
        let target = poll::lock_held_by(&self.spec.lock_status_prefix, lock_command);
        self.wait_for_status(max_wait_ms, &target)
    }

    fn wait_for_status(&self, max_wait_ms: u64, target: &str) -> Result<bool> {
        self.ensure_live("poll")?;
        self.poller
            .wait_for_status(|| self.product.status(), max_wait_ms, target)
    }

    /// `<instance>/gitObjects` inside this enlistment's cache root.
    pub fn object_root(&self) -> Result<PathBuf> {
        cache_root::object_root(&self.spec.local_cache_root)
    }

    /// `<instance>/gitObjects/pack` inside this enlistment's cache root.
    pub fn pack_root(&self) -> Result<PathBuf> {
        cache_root::pack_root(&self.spec.local_cache_root)
    }

    /// Map a `/`-separated repository path to its location in the working tree.
    pub fn virtual_path_to(&self, path: &str) -> PathBuf {
        self.repo_root().join(path.replace('/', MAIN_SEPARATOR_STR))
    }

    /// Join path segments onto the working tree.
    pub fn virtual_path_to_parts(&self, parts: &[&str]) -> PathBuf {
        parts
            .iter()
            .fold(self.repo_root(), |path, part| path.join(part))
    }

    /// Loose object path for `object_hash`, using two-character fan-out.
    pub fn object_path_to(&self, object_hash: &str) -> Result<PathBuf> {
        let (Some(prefix), Some(rest)) = (object_hash.get(..2), object_hash.get(2..)) else {
            return Err(Error::Path {
                message: format!("object hash {:?} is too short", object_hash),
            });
        };
        let mut path = self.repo_root();
        for segment in OBJECTS_ROOT {
            path.push(segment);
        }
        Ok(path.join(prefix).join(rest))
    }

    fn ensure_live(&self, operation: &'static str) -> Result<()> {
        match self.state {
            EnlistmentState::Unbuilt | EnlistmentState::Deleted => Err(Error::InvalidState {
                operation,
                state: self.state,
            }),
            _ => Ok(()),
        }
    }
}
