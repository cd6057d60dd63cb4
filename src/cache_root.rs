//! Structural discovery of the object store inside a cache root.
//!
//! The product names its cache-instance directory itself, so the harness
//! cannot guess it. Instead it checks that the cache root has exactly the
//! shape the product produces (one instance directory plus one sibling
//! entry) and derives the object and pack paths from the single directory.

use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Entries a populated cache root is expected to hold.
pub const EXPECTED_ENTRIES: usize = 2;

/// Object-store directory inside the cache-instance directory.
pub const OBJECTS_DIR: &str = "gitObjects";

/// Pack directory inside the object store.
pub const PACK_DIR: &str = "pack";

/// Locate `<instance>/gitObjects` under `cache_root`.
///
/// Fails with [`Error::CacheLayout`] unless the cache root holds exactly two
/// entries and exactly one of them is a directory (or a symlink to one).
pub fn object_root(cache_root: &Path) -> Result<PathBuf> {
    if !cache_root.is_dir() {
        return Err(Error::CacheLayout {
            cache_root: cache_root.to_path_buf(),
            message: "cache root is not a directory".to_string(),
        });
    }

    let mut entries = Vec::new();
    for entry in fs::read_dir(cache_root)? {
        let entry = entry?;
        // Follows symlinks: a linked instance directory counts as a folder.
        entries.push((entry.file_name(), entry.path().is_dir()));
    }
    entries.sort();

    if entries.len() != EXPECTED_ENTRIES {
        return Err(Error::CacheLayout {
            cache_root: cache_root.to_path_buf(),
            message: format!(
                "expected {} items, found {}: [{}]",
                EXPECTED_ENTRIES,
                entries.len(),
                describe(&entries)
            ),
        });
    }

    let directories: Vec<_> = entries.iter().filter(|(_, is_dir)| *is_dir).collect();
    match directories.as_slice() {
        [(name, _)] => Ok(cache_root.join(name).join(OBJECTS_DIR)),
        _ => Err(Error::CacheLayout {
            cache_root: cache_root.to_path_buf(),
            message: format!(
                "expected exactly one folder, found {}: [{}]",
                directories.len(),
                describe(&entries)
            ),
        }),
    }
}

/// Locate `<instance>/gitObjects/pack` under `cache_root`.
pub fn pack_root(cache_root: &Path) -> Result<PathBuf> {
    Ok(object_root(cache_root)?.join(PACK_DIR))
}

fn describe(entries: &[(std::ffi::OsString, bool)]) -> String {
    entries
        .iter()
        .map(|(name, _)| name.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(",")
}
