//! # Enlistment Factory
//!
//! [`Harness`] combines a [`HarnessConfig`] with the collaborators an
//! enlistment needs (product launcher, git, eraser, log emitter) and hands
//! out fully set-up enlistments. By default it drives the real product and
//! the system `git`; tests swap any collaborator through the `with_*`
//! builders.
//!
//! ```rust,ignore
//! let harness = Harness::new(HarnessConfig::default().apply_env()?)?;
//! let mut enlistment = harness.clone_and_mount(None, None)?;
//! assert!(enlistment.wait_for_background_operations(5000)?);
//! enlistment.unmount_and_delete_all()?;
//! ```

use crate::config::HarnessConfig;
use crate::diagnostics::{ConsoleLogEmitter, LogEmitter};
use crate::enlistment::{Collaborators, Enlistment, EnlistmentSpec};
use crate::eraser::{self, DirectoryEraser};
use crate::error::Result;
use crate::git::{GitOperations, SystemGit};
use crate::poll::StatusPoller;
use crate::process::{ProductBinary, ProductLauncher};
use crate::topology::PathTopology;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Creates enlistments from an explicit configuration.
pub struct Harness {
    config: HarnessConfig,
    topology: PathTopology,
    launcher: Arc<dyn ProductLauncher>,
    collaborators: Collaborators,
}

impl Harness {
    /// A harness driving the configured product executable and system git.
    ///
    /// Fails with [`crate::error::Error::ConfigParse`] if `config` does not
    /// pass [`HarnessConfig::validate`].
    pub fn new(config: HarnessConfig) -> Result<Self> {
        config.validate()?;
        let topology = PathTopology::new(&config);
        let launcher = Arc::new(ProductBinary::new(config.path_to_product.clone()));
        let collaborators = Collaborators {
            git: Arc::new(SystemGit),
            eraser: eraser::from_config(&config),
            emitter: Arc::new(ConsoleLogEmitter),
        };
        Ok(Self {
            config,
            topology,
            launcher,
            collaborators,
        })
    }

    pub fn with_launcher(mut self, launcher: Arc<dyn ProductLauncher>) -> Self {
        self.launcher = launcher;
        self
    }

    pub fn with_git(mut self, git: Arc<dyn GitOperations>) -> Self {
        self.collaborators.git = git;
        self
    }

    pub fn with_eraser(mut self, eraser: Arc<dyn DirectoryEraser>) -> Self {
        self.collaborators.eraser = eraser;
        self
    }

    pub fn with_emitter(mut self, emitter: Arc<dyn LogEmitter>) -> Self {
        self.collaborators.emitter = emitter;
        self
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub fn topology(&self) -> &PathTopology {
        &self.topology
    }

    /// Clone and mount a new enlistment at a unique root.
    ///
    /// `commitish` defaults to the configured one. The cache root is
    /// `local_cache_root` if given, then the configured explicit root, then
    /// the shared or per-repo cache depending on `no-shared-cache`.
    pub fn clone_and_mount(
        &self,
        commitish: Option<&str>,
        local_cache_root: Option<&Path>,
    ) -> Result<Enlistment> {
        let root = self.topology.unique_enlistment_root();
        let explicit = local_cache_root.or(self.config.local_cache_root.as_deref());
        let cache_root =
            self.topology
                .resolve_cache_root(&root, explicit, self.config.no_shared_cache);
        self.build(root, commitish, cache_root)
    }

    /// Clone and mount a new enlistment with its own object cache.
    pub fn clone_and_mount_with_per_repo_cache(&self, commitish: Option<&str>) -> Result<Enlistment> {
        let root = self.topology.unique_enlistment_root();
        let cache_root = self.topology.repo_specific_cache_root(&root);
        self.build(root, commitish, cache_root)
    }

    /// Clone and mount a new enlistment whose root contains a space.
    pub fn clone_and_mount_with_spaces_in_path(&self, commitish: Option<&str>) -> Result<Enlistment> {
        let root = self.topology.unique_enlistment_root_with_spaces();
        let cache_root = self.topology.repo_specific_cache_root(&root);
        self.build(root, commitish, cache_root)
    }

    /// Re-attach to an enlistment created by an earlier run.
    pub fn attach(&self, root: &Path, local_cache_root: Option<&Path>) -> Enlistment {
        let explicit = local_cache_root.or(self.config.local_cache_root.as_deref());
        let cache_root =
            self.topology
                .resolve_cache_root(root, explicit, self.config.no_shared_cache);
        let spec = self.spec(root.to_path_buf(), None, cache_root);
        let product = self.launcher.launch(&spec.root, &spec.local_cache_root);
        Enlistment::attach(spec, product, self.collaborators.clone(), self.poller())
    }

    fn build(&self, root: PathBuf, commitish: Option<&str>, cache_root: PathBuf) -> Result<Enlistment> {
        let spec = self.spec(root, commitish, cache_root);
        let product = self.launcher.launch(&spec.root, &spec.local_cache_root);
        let mut enlistment =
            Enlistment::new(spec, product, self.collaborators.clone(), self.poller());
        enlistment.clone_and_mount()?;
        Ok(enlistment)
    }

    fn spec(&self, root: PathBuf, commitish: Option<&str>, local_cache_root: PathBuf) -> EnlistmentSpec {
        EnlistmentSpec {
            root,
            repo_url: self.config.repo_to_clone.clone(),
            commitish: commitish.unwrap_or(&self.config.commitish).to_string(),
            local_cache_root,
            control_dir: self.config.control_dir.clone(),
            lock_status_prefix: self.config.lock_status_prefix.clone(),
        }
    }

    fn poller(&self) -> StatusPoller {
        StatusPoller::with_interval(Duration::from_millis(self.config.poll_interval_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::VfsProduct;
    use std::sync::Mutex;

    /// Records which roots the harness launched products for.
    #[derive(Default)]
    struct RecordingLauncher {
        launches: Mutex<Vec<(PathBuf, PathBuf)>>,
    }

    struct IdleProduct;

    impl VfsProduct for IdleProduct {
        fn clone_repo(&self, _: &str, _: &str) -> Result<()> {
            Ok(())
        }
        fn mount(&self) -> Result<()> {
            Ok(())
        }
        fn try_mount(&self) -> Result<(bool, String)> {
            Ok((true, String::new()))
        }
        fn unmount(&self) -> Result<()> {
            Ok(())
        }
        fn status(&self) -> Result<String> {
            Ok(String::new())
        }
        fn prefetch(&self, _: &str, _: bool) -> Result<String> {
            Ok(String::new())
        }
        fn repair(&self) -> Result<String> {
            Ok(String::new())
        }
        fn diagnose(&self) -> Result<String> {
            Ok(String::new())
        }
        fn cache_server(&self, _: &str) -> Result<String> {
            Ok(String::new())
        }
    }

    impl ProductLauncher for RecordingLauncher {
        fn launch(&self, enlistment_root: &Path, local_cache_root: &Path) -> Box<dyn VfsProduct> {
            self.launches
                .lock()
                .unwrap()
                .push((enlistment_root.to_path_buf(), local_cache_root.to_path_buf()));
            Box::new(IdleProduct)
        }
    }

    fn harness(config: HarnessConfig) -> (Harness, Arc<RecordingLauncher>) {
        let launcher = Arc::new(RecordingLauncher::default());
        let harness = Harness::new(config).unwrap().with_launcher(launcher.clone());
        (harness, launcher)
    }

    #[test]
    fn test_attach_uses_shared_cache_by_default() {
        let config = HarnessConfig {
            enlistment_root: PathBuf::from("/tests/enlistment"),
            ..HarnessConfig::default()
        };
        let (harness, launcher) = harness(config);
        let root = PathBuf::from("/tests/enlistment/0123456789abcdef0123");

        let enlistment = harness.attach(&root, None);

        assert_eq!(enlistment.local_cache_root(), harness.topology().shared_cache_root());
        assert_eq!(enlistment.commitish(), harness.config().commitish);
        let launches = launcher.launches.lock().unwrap();
        assert_eq!(launches.len(), 1);
        assert_eq!(launches[0].0, root);
    }

    #[test]
    fn test_attach_prefers_explicit_cache_root() {
        let config = HarnessConfig {
            local_cache_root: Some(PathBuf::from("/configured/cache")),
            no_shared_cache: true,
            ..HarnessConfig::default()
        };
        let (harness, _) = harness(config);
        let root = PathBuf::from("/e");

        assert_eq!(
            harness.attach(&root, None).local_cache_root(),
            Path::new("/configured/cache")
        );
        assert_eq!(
            harness
                .attach(&root, Some(Path::new("/argument/cache")))
                .local_cache_root(),
            Path::new("/argument/cache")
        );
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = HarnessConfig {
            poll_interval_ms: 0,
            ..HarnessConfig::default()
        };
        assert!(matches!(
            Harness::new(config),
            Err(crate::error::Error::ConfigParse { .. })
        ));
    }

    #[test]
    fn test_attach_uses_per_repo_cache_when_sharing_disabled() {
        let config = HarnessConfig {
            no_shared_cache: true,
            ..HarnessConfig::default()
        };
        let (harness, _) = harness(config);
        let root = PathBuf::from("/e");

        assert_eq!(
            harness.attach(&root, None).local_cache_root(),
            root.join(".gvfs").join(".gvfsCache")
        );
    }
}
