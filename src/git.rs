use std::path::Path;
use std::process::Command;

use crate::error::{Error, Result};
use log::debug;

/// Identity written into every enlistment so test commits are reproducible.
pub const TEST_USER_NAME: &str = "Functional Test User";
pub const TEST_USER_EMAIL: &str = "functional@test.com";

/// Trait for git operations - allows mocking in tests
pub trait GitOperations: Send + Sync {
    /// Run `git <args>` inside `repo_root`, returning stdout.
    fn invoke(&self, repo_root: &Path, args: &[&str]) -> Result<String>;
}

/// Runs the system `git` command.
///
/// This uses whatever `git` is on `PATH`, so credential helpers and global
/// configuration behave exactly as they would for a developer.
#[derive(Debug, Default, Clone)]
pub struct SystemGit;

impl GitOperations for SystemGit {
    fn invoke(&self, repo_root: &Path, args: &[&str]) -> Result<String> {
        debug!("Running git {} in {}", args.join(" "), repo_root.display());

        let output = Command::new("git")
            .args(args)
            .current_dir(repo_root)
            .output()
            .map_err(|e| Error::GitCommand {
                command: args.join(" "),
                repo: repo_root.to_path_buf(),
                stderr: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::GitCommand {
                command: args.join(" "),
                repo: repo_root.to_path_buf(),
                stderr: stderr.trim_end().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Commands that pin a fresh enlistment to a known, detached configuration.
///
/// Checks out `commitish`, drops upstream tracking, makes git print full
/// hashes and sets a fixed author identity.
pub fn post_clone_commands(commitish: &str) -> Vec<Vec<&str>> {
    vec![
        vec!["checkout", commitish],
        vec!["branch", "--unset-upstream"],
        vec!["config", "core.abbrev", "40"],
        vec!["config", "user.name", TEST_USER_NAME],
        vec!["config", "user.email", TEST_USER_EMAIL],
    ]
}

/// Apply [`post_clone_commands`] to the working tree at `repo_root`.
pub fn configure_after_clone(git: &dyn GitOperations, repo_root: &Path, commitish: &str) -> Result<()> {
    for args in post_clone_commands(commitish) {
        git.invoke(repo_root, &args)?;
    }
    Ok(())
}
