//! # Harness Configuration
//!
//! Everything that used to be process-wide test state (the enlistment base
//! directory, whether the shared object cache is disabled, the default
//! commit-ish) lives in [`HarnessConfig`]. A value of this type is built once
//! per run and handed explicitly to the topology resolver and to every
//! enlistment, so two harnesses with different settings can coexist in one
//! process.
//!
//! ## Sources
//!
//! 1. Built-in defaults (see [`crate::defaults`]).
//! 2. An optional YAML file, parsed with [`parse`] or [`HarnessConfig::from_file`].
//!    Keys are kebab-case and every key is optional:
//!
//!    ```yaml
//!    enlistment-root: /mnt/tests/enlistment
//!    no-shared-cache: true
//!    commitish: FunctionalTests/20180214
//!    deletion: retrying
//!    ```
//!
//! 3. `VFS_HARNESS_*` environment variables, applied by
//!    [`HarnessConfig::apply_env`].

use crate::defaults;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

/// Environment variable overriding `enlistment-root`.
pub const ENV_ENLISTMENT_ROOT: &str = "VFS_HARNESS_ENLISTMENT_ROOT";
/// Environment variable overriding `repo-to-clone`.
pub const ENV_REPO: &str = "VFS_HARNESS_REPO";
/// Environment variable overriding `commitish`.
pub const ENV_COMMITISH: &str = "VFS_HARNESS_COMMITISH";
/// Environment variable overriding `no-shared-cache`.
pub const ENV_NO_SHARED_CACHE: &str = "VFS_HARNESS_NO_SHARED_CACHE";
/// Environment variable overriding `local-cache-root`.
pub const ENV_LOCAL_CACHE_ROOT: &str = "VFS_HARNESS_LOCAL_CACHE_ROOT";
/// Environment variable overriding `path-to-product`.
pub const ENV_PRODUCT: &str = "VFS_HARNESS_PRODUCT";

/// How enlistment directories are removed at teardown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeletionMode {
    /// Pick the platform default: retrying where the filesystem has
    /// tombstone/reparse-point semantics, deferred elsewhere.
    #[default]
    Auto,
    /// Always delete, retrying transient failures.
    Retrying,
    /// Never delete; leave cleanup to the caller.
    Deferred,
}

/// Explicit configuration for one harness run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct HarnessConfig {
    /// Base directory under which unique enlistment roots are created.
    pub enlistment_root: PathBuf,
    /// Repository URL handed to the product's clone verb.
    pub repo_to_clone: String,
    /// Commit-ish used when the caller does not provide one.
    pub commitish: String,
    /// Give every enlistment its own object cache instead of the shared one.
    pub no_shared_cache: bool,
    /// Explicit cache root that overrides both shared and per-repo caches.
    pub local_cache_root: Option<PathBuf>,
    /// Path or name of the product executable.
    pub path_to_product: PathBuf,
    /// Name of the product's control directory inside an enlistment.
    pub control_dir: String,
    /// Name of the object-cache directory.
    pub cache_dir: String,
    /// Status line prefix announcing the lock holder.
    pub lock_status_prefix: String,
    /// Sleep between status fetches while polling.
    pub poll_interval_ms: u64,
    /// Default budget for convergence waits.
    pub default_max_wait_ms: u64,
    /// Teardown strategy.
    pub deletion: DeletionMode,
    /// Attempts made by the retrying eraser.
    pub delete_attempts: u32,
    /// Pause between deletion attempts.
    pub delete_retry_delay_ms: u64,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            enlistment_root: defaults::default_enlistment_root(),
            repo_to_clone: defaults::REPO_TO_CLONE.to_string(),
            commitish: defaults::COMMITISH.to_string(),
            no_shared_cache: false,
            local_cache_root: None,
            path_to_product: PathBuf::from(defaults::PRODUCT_BINARY),
            control_dir: defaults::CONTROL_DIR.to_string(),
            cache_dir: defaults::CACHE_DIR.to_string(),
            lock_status_prefix: defaults::LOCK_STATUS_PREFIX.to_string(),
            poll_interval_ms: defaults::POLL_INTERVAL_MS,
            default_max_wait_ms: defaults::MAX_WAIT_MS,
            deletion: DeletionMode::Auto,
            delete_attempts: defaults::DELETE_ATTEMPTS,
            delete_retry_delay_ms: defaults::DELETE_RETRY_DELAY_MS,
        }
    }
}

impl HarnessConfig {
    /// Load a configuration file, falling back to defaults for missing keys.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::ConfigParse {
            message: format!("cannot read {}: {}", path.display(), e),
        })?;
        parse(&content)
    }

    /// Override fields from `VFS_HARNESS_*` environment variables.
    pub fn apply_env(mut self) -> Result<Self> {
        if let Some(root) = env::var_os(ENV_ENLISTMENT_ROOT) {
            self.enlistment_root = PathBuf::from(root);
        }
        if let Ok(repo) = env::var(ENV_REPO) {
            self.repo_to_clone = repo;
        }
        if let Ok(commitish) = env::var(ENV_COMMITISH) {
            self.commitish = commitish;
        }
        if let Ok(flag) = env::var(ENV_NO_SHARED_CACHE) {
            self.no_shared_cache = parse_flag(ENV_NO_SHARED_CACHE, &flag)?;
        }
        if let Some(cache_root) = env::var_os(ENV_LOCAL_CACHE_ROOT) {
            self.local_cache_root = Some(PathBuf::from(cache_root));
        }
        if let Some(product) = env::var_os(ENV_PRODUCT) {
            self.path_to_product = PathBuf::from(product);
        }
        self.validate()?;
        Ok(self)
    }

    /// Reject values that would make the topology ambiguous.
    pub fn validate(&self) -> Result<()> {
        for (key, value) in [("control-dir", &self.control_dir), ("cache-dir", &self.cache_dir)] {
            if value.is_empty() || value.contains(['/', '\\']) {
                return Err(Error::ConfigParse {
                    message: format!("{} must be a single path segment, got {:?}", key, value),
                });
            }
        }
        if self.poll_interval_ms == 0 {
            return Err(Error::ConfigParse {
                message: "poll-interval-ms must be greater than zero".to_string(),
            });
        }
        if self.delete_attempts == 0 {
            return Err(Error::ConfigParse {
                message: "delete-attempts must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Parse a YAML configuration document.
pub fn parse(yaml: &str) -> Result<HarnessConfig> {
    // An empty document means "all defaults".
    if yaml.trim().is_empty() {
        return Ok(HarnessConfig::default());
    }
    let config: HarnessConfig = serde_yaml::from_str(yaml)?;
    config.validate()?;
    Ok(config)
}

fn parse_flag(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(Error::ConfigParse {
            message: format!("{} must be a boolean, got {:?}", name, other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    fn clear_env() {
        for key in [
            ENV_ENLISTMENT_ROOT,
            ENV_REPO,
            ENV_COMMITISH,
            ENV_NO_SHARED_CACHE,
            ENV_LOCAL_CACHE_ROOT,
            ENV_PRODUCT,
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn test_default_config() {
        let config = HarnessConfig::default();
        assert!(!config.no_shared_cache);
        assert_eq!(config.control_dir, ".gvfs");
        assert_eq!(config.cache_dir, ".gvfsCache");
        assert_eq!(config.poll_interval_ms, 100);
        assert_eq!(config.default_max_wait_ms, 5000);
        assert_eq!(config.deletion, DeletionMode::Auto);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_yaml_keeps_defaults() {
        let config = parse(
            r#"
enlistment-root: /mnt/tests/enlistment
no-shared-cache: true
deletion: retrying
"#,
        )
        .unwrap();

        assert_eq!(config.enlistment_root, PathBuf::from("/mnt/tests/enlistment"));
        assert!(config.no_shared_cache);
        assert_eq!(config.deletion, DeletionMode::Retrying);
        assert_eq!(config.commitish, defaults::COMMITISH);
        assert_eq!(config.lock_status_prefix, defaults::LOCK_STATUS_PREFIX);
    }

    #[test]
    fn test_parse_empty_document() {
        assert_eq!(parse("").unwrap(), HarnessConfig::default());
        assert_eq!(parse("   \n").unwrap(), HarnessConfig::default());
    }

    #[test]
    fn test_parse_rejects_unknown_deletion_mode() {
        let result = parse("deletion: sometimes");
        assert!(matches!(result, Err(Error::Yaml(_))));
    }

    #[test]
    fn test_parse_rejects_nested_control_dir() {
        let result = parse("control-dir: a/b");
        match result {
            Err(Error::ConfigParse { message }) => assert!(message.contains("control-dir")),
            other => panic!("expected ConfigParse error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_zero_poll_interval() {
        assert!(matches!(
            parse("poll-interval-ms: 0"),
            Err(Error::ConfigParse { .. })
        ));
    }

    #[test]
    fn test_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("harness.yaml");
        std::fs::write(&path, "commitish: main\npath-to-product: /opt/vfs/bin/gvfs\n").unwrap();

        let config = HarnessConfig::from_file(&path).unwrap();
        assert_eq!(config.commitish, "main");
        assert_eq!(config.path_to_product, PathBuf::from("/opt/vfs/bin/gvfs"));
    }

    #[test]
    fn test_from_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = HarnessConfig::from_file(&temp_dir.path().join("missing.yaml"));
        match result {
            Err(Error::ConfigParse { message }) => assert!(message.contains("missing.yaml")),
            other => panic!("expected ConfigParse error, got {:?}", other),
        }
    }

    #[test]
    #[serial]
    fn test_apply_env_overrides() {
        clear_env();
        env::set_var(ENV_ENLISTMENT_ROOT, "/env/enlistment");
        env::set_var(ENV_NO_SHARED_CACHE, "true");
        env::set_var(ENV_COMMITISH, "topic/branch");
        env::set_var(ENV_LOCAL_CACHE_ROOT, "/env/cache");

        let config = HarnessConfig::default().apply_env().unwrap();
        clear_env();

        assert_eq!(config.enlistment_root, PathBuf::from("/env/enlistment"));
        assert!(config.no_shared_cache);
        assert_eq!(config.commitish, "topic/branch");
        assert_eq!(config.local_cache_root, Some(PathBuf::from("/env/cache")));
    }

    #[test]
    #[serial]
    fn test_apply_env_without_variables_is_identity() {
        clear_env();
        let config = HarnessConfig::default().apply_env().unwrap();
        assert_eq!(config, HarnessConfig::default());
    }

    #[test]
    #[serial]
    fn test_apply_env_rejects_bad_flag() {
        clear_env();
        env::set_var(ENV_NO_SHARED_CACHE, "maybe");
        let result = HarnessConfig::default().apply_env();
        clear_env();
        assert!(matches!(result, Err(Error::ConfigParse { .. })));
    }
}
