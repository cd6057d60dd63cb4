//! Collection of the product's own logs for post-mortem diagnosis.
//!
//! When an enlistment fails to come up, or when it is torn down, the product's
//! log files are the only record of what happened inside it. They are read
//! from `<control-dir>/logs` and handed to a [`LogEmitter`].

use crate::error::Result;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One product log file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFile {
    pub path: PathBuf,
    pub contents: String,
}

/// Read every file under `logs_root`, sorted by path.
///
/// A missing directory yields no logs: the product may have failed before
/// creating it.
pub fn collect_logs(logs_root: &Path) -> Result<Vec<LogFile>> {
    if !logs_root.is_dir() {
        return Ok(Vec::new());
    }

    let mut logs = Vec::new();
    for entry in WalkDir::new(logs_root).sort_by_file_name() {
        let entry = entry.map_err(io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let bytes = fs::read(entry.path())?;
        logs.push(LogFile {
            path: entry.path().to_path_buf(),
            contents: String::from_utf8_lossy(&bytes).into_owned(),
        });
    }
    Ok(logs)
}

/// Receives product logs on setup failure and at teardown.
pub trait LogEmitter: Send + Sync {
    fn emit(&self, logs_root: &Path);
}

/// Writes every log file to stderr, each preceded by a header line.
#[derive(Debug, Default, Clone)]
pub struct ConsoleLogEmitter;

impl ConsoleLogEmitter {
    /// Write `logs` to `out` in the console format.
    pub fn write_logs<W: Write>(out: &mut W, logs: &[LogFile]) -> io::Result<()> {
        for log in logs {
            writeln!(out, "----- {} -----", log.path.display())?;
            out.write_all(log.contents.as_bytes())?;
            if !log.contents.ends_with('\n') {
                writeln!(out)?;
            }
        }
        Ok(())
    }
}

impl LogEmitter for ConsoleLogEmitter {
    fn emit(&self, logs_root: &Path) {
        // Emission is best effort: it runs on failure paths and must not
        // replace the error being reported.
        let logs = match collect_logs(logs_root) {
            Ok(logs) => logs,
            Err(e) => {
                log::warn!("Could not collect logs from {}: {}", logs_root.display(), e);
                return;
            }
        };
        if logs.is_empty() {
            log::info!("No product logs found in {}", logs_root.display());
            return;
        }
        let stderr = io::stderr();
        let mut out = stderr.lock();
        if let Err(e) = Self::write_logs(&mut out, &logs) {
            log::warn!("Could not write product logs: {}", e);
        }
    }
}
