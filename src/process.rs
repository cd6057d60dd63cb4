//! # Product Process Surface
//!
//! The harness never links against the product under test; it drives it
//! through its command-line verbs and reads back their text output. This
//! module defines that surface as the [`VfsProduct`] trait so enlistments can
//! be exercised against a mock in tests, plus the default [`VfsProcess`]
//! implementation that runs the real executable.
//!
//! Arguments are passed as an argument vector, never through a shell, so
//! enlistment roots containing spaces reach the product intact.

use crate::error::{Error, Result};
use log::debug;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Verbs of the product under test, bound to one enlistment.
pub trait VfsProduct: Send + Sync {
    /// Clone `repo_url` at `commitish` into the enlistment root without mounting.
    fn clone_repo(&self, repo_url: &str, commitish: &str) -> Result<()>;

    /// Mount the enlistment, failing if the product reports an error.
    fn mount(&self) -> Result<()>;

    /// Mount the enlistment, returning the success flag and captured output.
    fn try_mount(&self) -> Result<(bool, String)>;

    /// Cleanly shut down the mounted enlistment.
    fn unmount(&self) -> Result<()>;

    /// Free-text status report.
    fn status(&self) -> Result<String>;

    /// Run a prefetch; a failing prefetch is an error only when `fail_on_error`.
    fn prefetch(&self, args: &str, fail_on_error: bool) -> Result<String>;

    fn repair(&self) -> Result<String>;

    fn diagnose(&self) -> Result<String>;

    /// Query or change the cache server (`--get` or `--set <url>`).
    fn cache_server(&self, args: &str) -> Result<String>;
}

/// Creates product handles bound to an enlistment.
pub trait ProductLauncher: Send + Sync {
    fn launch(&self, enlistment_root: &Path, local_cache_root: &Path) -> Box<dyn VfsProduct>;
}

/// Launches [`VfsProcess`] handles for a product executable.
#[derive(Debug, Clone)]
pub struct ProductBinary {
    path: PathBuf,
}

impl ProductBinary {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ProductLauncher for ProductBinary {
    fn launch(&self, enlistment_root: &Path, local_cache_root: &Path) -> Box<dyn VfsProduct> {
        Box::new(VfsProcess::new(&self.path, enlistment_root, local_cache_root))
    }
}

/// Captured result of one product invocation.
#[derive(Debug, Clone)]
struct Invocation {
    success: bool,
    output: String,
}

/// The product executable, driven through `std::process::Command`.
#[derive(Debug, Clone)]
pub struct VfsProcess {
    binary: PathBuf,
    enlistment_root: PathBuf,
    local_cache_root: PathBuf,
}

impl VfsProcess {
    pub fn new(binary: &Path, enlistment_root: &Path, local_cache_root: &Path) -> Self {
        Self {
            binary: binary.to_path_buf(),
            enlistment_root: enlistment_root.to_path_buf(),
            local_cache_root: local_cache_root.to_path_buf(),
        }
    }

    fn root_arg(&self) -> OsString {
        self.enlistment_root.clone().into_os_string()
    }

    fn run(&self, args: &[OsString]) -> Result<Invocation> {
        let command = describe(args);
        debug!("Running {} {}", self.binary.display(), command);

        let output = Command::new(&self.binary)
            .args(args)
            .output()
            .map_err(|e| Error::ProductCommand {
                command: command.clone(),
                output: format!("failed to start {}: {}", self.binary.display(), e),
            })?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok(Invocation {
            success: output.status.success(),
            output: text,
        })
    }

    /// Run and turn a non-zero exit into [`Error::ProductCommand`].
    fn run_checked(&self, args: &[OsString]) -> Result<String> {
        let invocation = self.run(args)?;
        if invocation.success {
            Ok(invocation.output)
        } else {
            Err(Error::ProductCommand {
                command: describe(args),
                output: invocation.output,
            })
        }
    }
}

impl VfsProduct for VfsProcess {
    fn clone_repo(&self, repo_url: &str, commitish: &str) -> Result<()> {
        self.run_checked(&[
            "clone".into(),
            repo_url.into(),
            self.root_arg(),
            "--branch".into(),
            commitish.into(),
            "--local-cache-path".into(),
            self.local_cache_root.clone().into_os_string(),
            "--no-mount".into(),
            "--no-prefetch".into(),
        ])?;
        Ok(())
    }

    fn mount(&self) -> Result<()> {
        self.run_checked(&["mount".into(), self.root_arg()])?;
        Ok(())
    }

    fn try_mount(&self) -> Result<(bool, String)> {
        let invocation = self.run(&["mount".into(), self.root_arg()])?;
        Ok((invocation.success, invocation.output))
    }

    fn unmount(&self) -> Result<()> {
        self.run_checked(&["unmount".into(), self.root_arg()])?;
        Ok(())
    }

    fn status(&self) -> Result<String> {
        self.run_checked(&["status".into(), self.root_arg()])
    }

    fn prefetch(&self, args: &str, fail_on_error: bool) -> Result<String> {
        let mut argv: Vec<OsString> = vec!["prefetch".into(), self.root_arg()];
        argv.extend(split_args(args));
        if fail_on_error {
            self.run_checked(&argv)
        } else {
            Ok(self.run(&argv)?.output)
        }
    }

    fn repair(&self) -> Result<String> {
        self.run_checked(&["repair".into(), "--confirm".into(), self.root_arg()])
    }

    fn diagnose(&self) -> Result<String> {
        self.run_checked(&["diagnose".into(), self.root_arg()])
    }

    fn cache_server(&self, args: &str) -> Result<String> {
        let mut argv: Vec<OsString> = vec!["cache-server".into()];
        argv.extend(split_args(args));
        argv.push(self.root_arg());
        self.run_checked(&argv)
    }
}

fn split_args(args: &str) -> impl Iterator<Item = OsString> + '_ {
    args.split_whitespace().map(OsString::from)
}

fn describe(args: &[OsString]) -> String {
    args.iter()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}
