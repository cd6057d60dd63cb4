//! Path topology for enlistments and their object caches.
//!
//! Every enlistment gets a directory of its own under the configured base,
//! named after a fresh random identifier. The object cache either sits inside
//! the enlistment (exclusive) or next to the base directory (shared by every
//! enlistment in the run, so objects are downloaded once).
//!
//! ```text
//! <base>/../<cache-dir>                      shared cache
//! <base>/<20 hex chars>/                     enlistment root
//! <base>/<20 hex chars>/<control-dir>/<cache-dir>   per-repo cache
//! <base>/test <15 hex chars>/                enlistment root with a space
//! ```

use crate::config::HarnessConfig;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Hex characters kept from the random identifier of a plain root.
pub const ROOT_ID_LEN: usize = 20;

/// Hex characters kept from the random identifier of a spaced root.
pub const SPACED_ROOT_ID_LEN: usize = 15;

/// Leading segment of roots that deliberately contain a space.
pub const SPACED_ROOT_PREFIX: &str = "test ";

/// Resolves enlistment and cache locations from an explicit configuration.
#[derive(Debug, Clone)]
pub struct PathTopology {
    base: PathBuf,
    control_dir: String,
    cache_dir: String,
}

impl PathTopology {
    pub fn new(config: &HarnessConfig) -> Self {
        Self {
            base: config.enlistment_root.clone(),
            control_dir: config.control_dir.clone(),
            cache_dir: config.cache_dir.clone(),
        }
    }

    /// The directory under which enlistment roots are created.
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// A fresh `<base>/<20-hex-id>` path.
    pub fn unique_enlistment_root(&self) -> PathBuf {
        self.base.join(random_id(ROOT_ID_LEN))
    }

    /// A fresh `<base>/test <15-hex-id>` path.
    ///
    /// The space exercises argument quoting in the product under test.
    pub fn unique_enlistment_root_with_spaces(&self) -> PathBuf {
        self.base
            .join(format!("{}{}", SPACED_ROOT_PREFIX, random_id(SPACED_ROOT_ID_LEN)))
    }

    /// The cache that belongs to a single enlistment.
    pub fn repo_specific_cache_root(&self, enlistment_root: &Path) -> PathBuf {
        enlistment_root.join(&self.control_dir).join(&self.cache_dir)
    }

    /// The cache shared by every enlistment of the run.
    ///
    /// Kept as a sibling of the base so cleaning up enlistments never
    /// removes it.
    pub fn shared_cache_root(&self) -> PathBuf {
        self.base.join("..").join(&self.cache_dir)
    }

    /// Pick the cache root for an enlistment.
    ///
    /// An explicit root always wins. Otherwise the per-repo cache is used
    /// when sharing is disabled, and the shared cache when it is not. No
    /// disk access happens here.
    pub fn resolve_cache_root(
        &self,
        enlistment_root: &Path,
        explicit_root: Option<&Path>,
        shared_cache_disabled: bool,
    ) -> PathBuf {
        match explicit_root {
            Some(root) => root.to_path_buf(),
            None if shared_cache_disabled => self.repo_specific_cache_root(enlistment_root),
            None => self.shared_cache_root(),
        }
    }
}

fn random_id(len: usize) -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(len);
    id
}
