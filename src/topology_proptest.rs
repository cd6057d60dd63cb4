//! Property-based tests for the path topology.
//!
//! These tests use proptest to generate random configurations and explicit
//! cache roots and verify that the resolution rules hold for all of them.

#[cfg(test)]
mod proptest_tests {
    use crate::config::HarnessConfig;
    use crate::topology::PathTopology;
    use proptest::prelude::*;
    use std::path::{Path, PathBuf};

    fn topology_for(base: &str, control_dir: &str, cache_dir: &str) -> PathTopology {
        let config = HarnessConfig {
            enlistment_root: PathBuf::from(base),
            control_dir: control_dir.to_string(),
            cache_dir: cache_dir.to_string(),
            ..HarnessConfig::default()
        };
        PathTopology::new(&config)
    }

    // ============================================================================
    // resolve_cache_root property tests
    // ============================================================================

    proptest! {
        /// Property: an explicit cache root is returned verbatim for either flag
        #[test]
        fn explicit_cache_root_always_wins(
            base in "/[a-z]{1,8}(/[a-z0-9]{1,8}){0,3}",
            explicit in "/[a-zA-Z0-9 _.]{1,12}(/[a-zA-Z0-9 _.]{1,12}){0,3}",
            shared_disabled in any::<bool>(),
        ) {
            let topology = topology_for(&base, ".gvfs", ".gvfsCache");
            let root = topology.unique_enlistment_root();
            let resolved = topology.resolve_cache_root(&root, Some(Path::new(&explicit)), shared_disabled);
            prop_assert_eq!(resolved, PathBuf::from(explicit));
        }

        /// Property: with sharing disabled the cache is nested under the enlistment
        #[test]
        fn per_repo_cache_is_nested_under_enlistment(
            base in "/[a-z]{1,8}(/[a-z0-9]{1,8}){0,3}",
            control_dir in "\\.[a-z]{1,8}",
            cache_dir in "\\.[a-zA-Z]{1,10}",
        ) {
            let topology = topology_for(&base, &control_dir, &cache_dir);
            let root = topology.unique_enlistment_root();
            let resolved = topology.resolve_cache_root(&root, None, true);

            prop_assert!(resolved.starts_with(&root));
            prop_assert_eq!(&resolved, &topology.repo_specific_cache_root(&root));
            prop_assert!(resolved.ends_with(Path::new(&control_dir).join(&cache_dir)));
        }

        /// Property: the shared cache never lives inside an enlistment
        #[test]
        fn shared_cache_is_outside_every_enlistment(
            base in "/[a-z]{1,8}(/[a-z0-9]{1,8}){0,3}",
        ) {
            let topology = topology_for(&base, ".gvfs", ".gvfsCache");
            let root = topology.unique_enlistment_root();
            let resolved = topology.resolve_cache_root(&root, None, false);

            prop_assert!(!resolved.starts_with(&root));
            prop_assert_eq!(resolved, topology.shared_cache_root());
        }
    }

    // ============================================================================
    // unique root property tests
    // ============================================================================

    proptest! {
        /// Property: spaced roots always start with "test " and hold one space
        #[test]
        fn spaced_root_has_exactly_one_space(
            base in "/[a-z]{1,8}(/[a-z0-9]{1,8}){0,3}",
        ) {
            let topology = topology_for(&base, ".gvfs", ".gvfsCache");
            let root = topology.unique_enlistment_root_with_spaces();
            let segment = root.file_name().unwrap().to_string_lossy().into_owned();

            prop_assert!(segment.starts_with("test "));
            prop_assert_eq!(segment.matches(' ').count(), 1);
            prop_assert_eq!(root.parent().unwrap(), Path::new(&base));
        }

        /// Property: plain roots never contain whitespace
        #[test]
        fn plain_root_has_no_whitespace(
            base in "/[a-z]{1,8}(/[a-z0-9]{1,8}){0,3}",
        ) {
            let topology = topology_for(&base, ".gvfs", ".gvfsCache");
            let root = topology.unique_enlistment_root();
            let segment = root.file_name().unwrap().to_string_lossy().into_owned();

            prop_assert!(!segment.contains(char::is_whitespace));
        }
    }
}
