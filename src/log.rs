//! Logging setup: a human-readable stderr layer plus a rotating machine log
//! file at `.mygit/mygit.log`, built on `tracing`/`tracing-subscriber`.
//!
//! The log file is append-only; once it exceeds `ROTATE_THRESHOLD_BYTES` the
//! next write renames it to `mygit.log.1` (overwriting any previous backup)
//! before appending the new line. This bypasses the `Fs` trait deliberately:
//! log rotation needs file metadata (size) the trait doesn't expose, and the
//! log is diagnostic output, not repository state.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Log files larger than this are rotated before the next append.
pub const ROTATE_THRESHOLD_BYTES: u64 = 1_000_000;

/// Initialises the global tracing subscriber: stderr for human diagnostics,
/// `.mygit/mygit.log` for the machine-readable record. `verbose` raises the
/// filter from `info` to `debug`. A second call in the same process is a
/// no-op (tracing only allows one global subscriber).
pub fn init(workspace_root: &Path, verbose: bool) {
    let log_path = workspace_root.join(".mygit").join("mygit.log");
    let filter = EnvFilter::new(if verbose { "debug" } else { "info" });

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_target(false);
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(RotatingFileWriter::new(log_path))
        .with_ansi(false)
        .with_target(false);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init();
}

/// Reads the current content of `mygit.log` verbatim, for the CLI's
/// `log -u` flag. A missing file yields an empty string.
pub fn dump(log_path: &Path) -> io::Result<String> {
    match fs::read_to_string(log_path) {
        Ok(contents) => Ok(contents),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(e),
    }
}

#[derive(Clone)]
struct RotatingFileWriter {
    path: PathBuf,
}

impl RotatingFileWriter {
    fn new(path: PathBuf) -> Self {
        RotatingFileWriter { path }
    }
}

impl<'a> MakeWriter<'a> for RotatingFileWriter {
    type Writer = RotatingFileHandle;

    fn make_writer(&'a self) -> Self::Writer {
        RotatingFileHandle {
            path: self.path.clone(),
        }
    }
}

struct RotatingFileHandle {
    path: PathBuf,
}

impl Write for RotatingFileHandle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        rotate_if_needed(&self.path)?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn rotate_if_needed(path: &Path) -> io::Result<()> {
    let len = match fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e),
    };
    if len > ROTATE_THRESHOLD_BYTES {
        let backup = backup_path(path);
        fs::rename(path, backup)?;
    }
    Ok(())
}

fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".1");
    path.with_file_name(name)
}
