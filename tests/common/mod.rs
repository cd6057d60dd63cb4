//! Shared test utilities for integration and E2E tests.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new();
//!     fixture.command().arg("root").assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::statuses;
    pub use super::TestFixture;
}

/// Canned product status outputs.
#[allow(dead_code)]
pub mod statuses {
    /// Status of a mounted enlistment with nothing queued.
    pub const IDLE: &str = "Enlistment root: /e\nMount status: Ready\nBackground operations: 0\n";

    /// Status while the background queue is still draining.
    pub const BUSY: &str = "Enlistment root: /e\nMount status: Ready\nBackground operations: 12\n";

    /// Status while a git command holds the product lock.
    pub const LOCKED: &str = "GVFS Lock: Held by git checkout -f\nBackground operations: 0\n";
}

/// A temporary enlistment base plus an optional product stand-in.
///
/// Every command created through [`TestFixture::command`] has its
/// `VFS_HARNESS_*` environment pointed into the fixture, so the binary never
/// touches the real home directory.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
    product: Option<PathBuf>,
}

impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
            product: None,
        }
    }

    /// Install a product stand-in that prints `status` for the `status` verb
    /// and succeeds silently for every other verb.
    #[cfg(unix)]
    #[allow(dead_code)]
    pub fn with_product_status(mut self, status: &str) -> Self {
        use std::os::unix::fs::PermissionsExt;

        let status_file = self.temp_dir.child("status.txt");
        status_file
            .write_str(status)
            .expect("Failed to write status file");
        let script = self.temp_dir.child("fake-product");
        script
            .write_str(&format!(
                "#!/bin/sh\nif [ \"$1\" = status ]; then cat '{}'; fi\nexit 0\n",
                status_file.path().display()
            ))
            .expect("Failed to write product script");
        std::fs::set_permissions(script.path(), std::fs::Permissions::from_mode(0o755))
            .expect("Failed to make product script executable");
        self.product = Some(script.path().to_path_buf());
        self
    }

    /// Add a file with the given path and content.
    #[allow(dead_code)]
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Base directory for enlistment roots.
    pub fn enlistment_base(&self) -> PathBuf {
        self.temp_dir.path().join("enlistment")
    }

    /// Create a child path in the temp directory.
    #[allow(dead_code)]
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// Create a command configured to run in this fixture's directory.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("vfs-harness");
        cmd.current_dir(self.path())
            .env_remove("VFS_HARNESS_CONFIG")
            .env_remove("VFS_HARNESS_LOCAL_CACHE_ROOT")
            .env_remove("VFS_HARNESS_NO_SHARED_CACHE")
            .env("VFS_HARNESS_ENLISTMENT_ROOT", self.enlistment_base());
        if let Some(product) = &self.product {
            cmd.env("VFS_HARNESS_PRODUCT", product);
        }
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_creates_temp_dir() {
        let fixture = TestFixture::new();
        assert!(fixture.path().exists());
        assert!(fixture.enlistment_base().starts_with(fixture.path()));
    }

    #[test]
    fn test_fixture_with_file() {
        let fixture = TestFixture::new().with_file("test.txt", "hello");
        assert!(fixture.path().join("test.txt").exists());
    }

    #[test]
    fn test_statuses_end_with_newline() {
        for status in [statuses::IDLE, statuses::BUSY, statuses::LOCKED] {
            assert!(status.ends_with('\n'));
        }
    }
}
