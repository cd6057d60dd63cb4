//! CLI argument parsing and command dispatch

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use vfs_harness::config::HarnessConfig;

use crate::commands;

/// VFS Harness - Create, inspect and tear down functional-test enlistments
#[derive(Parser, Debug)]
#[command(name = "vfs-harness")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Harness configuration file (YAML)
    #[arg(long, global = true, value_name = "PATH", env = "VFS_HARNESS_CONFIG")]
    config: Option<PathBuf>,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "info")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print a fresh unique enlistment root
    Root(commands::root::RootArgs),
    /// Print the object cache root an enlistment would use
    CacheRoot(commands::cache_root::CacheRootArgs),
    /// Print the object (or pack) directory inside a cache root
    ObjectRoot(commands::object_root::ObjectRootArgs),
    /// Clone and mount a new enlistment
    Clone(commands::clone::CloneArgs),
    /// Print the product status of an enlistment
    Status(commands::status::StatusArgs),
    /// Wait for background operations or a lock to settle
    Wait(commands::wait::WaitArgs),
    /// Tear down an enlistment
    Delete(commands::delete::DeleteArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level);
        let config = load_config(self.config.as_deref())?;

        match self.command {
            Commands::Root(args) => commands::root::execute(args, &config),
            Commands::CacheRoot(args) => commands::cache_root::execute(args, &config),
            Commands::ObjectRoot(args) => commands::object_root::execute(args),
            Commands::Clone(args) => commands::clone::execute(args, config),
            Commands::Status(args) => commands::status::execute(args, config),
            Commands::Wait(args) => commands::wait::execute(args, config),
            Commands::Delete(args) => commands::delete::execute(args, config),
        }
    }
}

/// Initialize `env_logger`; `RUST_LOG` takes precedence over `--log-level`.
fn init_logging(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .try_init();
}

fn load_config(path: Option<&std::path::Path>) -> Result<HarnessConfig> {
    let config = match path {
        Some(path) => HarnessConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => HarnessConfig::default(),
    };
    config
        .apply_env()
        .context("Invalid VFS_HARNESS_* environment override")
}
