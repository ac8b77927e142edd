//! JSON Lines file implementation of `DecisionStore`.
//!
//! One record per line, UTF-8, `\n`-terminated. Appends are serialized
//! twice over: a `Mutex` orders threads sharing one `JsonlFileStore`, and an
//! advisory exclusive lock on the file (`fs2`) orders separate handles and
//! separate processes. Both are held from the tail read to the end of the
//! write.
//!
//! Reads take a shared lock on the file, so a reader waits out an append in
//! progress instead of seeing a partial line.
//!
//! Each record is written with a single `write_all` of a fully built
//! buffer. If the write fails, the file is truncated back to its previous
//! length so a half-written line never becomes part of the chain.

use std::{
    fs::{self, File, OpenOptions},
    io::{ErrorKind, Read, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
    sync::Mutex,
    thread,
    time::{Duration, Instant},
};

use fs2::FileExt;
use tracing::{debug, warn};

use decisiontrace_contracts::error::{TraceError, TraceResult};
use decisiontrace_core::{traits::DecisionStore, TraceConfig};

/// Pause between attempts to take the file lock.
const LOCK_RETRY_INTERVAL: Duration = Duration::from_millis(10);

/// A decision log stored as a JSON Lines file.
#[derive(Debug)]
pub struct JsonlFileStore {
    path: PathBuf,
    durable: bool,
    lock_timeout: Duration,
    writer: Mutex<()>,
}

impl JsonlFileStore {
    /// Open a store at `path` with default durability and lock timeout.
    ///
    /// Nothing touches the disk until the first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let defaults = TraceConfig::default();
        Self {
            path: path.into(),
            durable: defaults.durable,
            lock_timeout: defaults.lock_timeout(),
            writer: Mutex::new(()),
        }
    }

    pub fn from_config(config: &TraceConfig) -> Self {
        Self {
            path: config.log_path.clone(),
            durable: config.durable,
            lock_timeout: config.lock_timeout(),
            writer: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True once the log file has been created.
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Take the file lock, retrying until `lock_timeout` elapses.
    ///
    /// Appends take it exclusive; reads take it shared, so a reader never
    /// sees a record line that is still being written.
    fn lock_with_retry(&self, file: &File, exclusive: bool) -> TraceResult<()> {
        let deadline = Instant::now() + self.lock_timeout;
        loop {
            let attempt = if exclusive {
                FileExt::try_lock_exclusive(file)
            } else {
                FileExt::try_lock_shared(file)
            };
            match attempt {
                Ok(()) => return Ok(()),
                Err(e) if Instant::now() >= deadline => {
                    let reason = format!(
                        "timed out after {:?} waiting for lock on '{}': {}",
                        self.lock_timeout,
                        self.path.display(),
                        e
                    );
                    return Err(if exclusive {
                        TraceError::StoreWrite { reason }
                    } else {
                        TraceError::StoreRead { reason }
                    });
                }
                Err(_) => thread::sleep(LOCK_RETRY_INTERVAL),
            }
        }
    }

    /// Body of an append, run with both locks held.
    fn append_locked(
        &self,
        file: &mut File,
        build: &mut dyn FnMut(&[String]) -> TraceResult<String>,
    ) -> TraceResult<()> {
        let mut existing = Vec::new();
        file.seek(SeekFrom::Start(0))
            .and_then(|_| file.read_to_end(&mut existing))
            .map_err(|e| TraceError::StoreRead {
                reason: format!("failed to read '{}': {}", self.path.display(), e),
            })?;

        let line = build(&split_lines(&existing))?;

        let mut buf = Vec::with_capacity(line.len() + 2);
        if existing.last().is_some_and(|b| *b != b'\n') {
            warn!(
                path = %self.path.display(),
                "log does not end with a newline; starting the new record on a fresh line"
            );
            buf.push(b'\n');
        }
        buf.extend_from_slice(line.as_bytes());
        buf.push(b'\n');

        if let Err(e) = self.write_record(file, &buf) {
            let previous_len = existing.len() as u64;
            if let Err(rollback) = file.set_len(previous_len) {
                warn!(
                    path = %self.path.display(),
                    error = %rollback,
                    "failed to roll back partial append"
                );
            }
            return Err(TraceError::StoreWrite {
                reason: format!("failed to append to '{}': {}", self.path.display(), e),
            });
        }

        debug!(path = %self.path.display(), bytes = buf.len(), "record line written");
        Ok(())
    }

    fn write_record(&self, file: &mut File, buf: &[u8]) -> std::io::Result<()> {
        file.write_all(buf)?;
        file.flush()?;
        if self.durable {
            file.sync_data()?;
        }
        Ok(())
    }
}

impl DecisionStore for JsonlFileStore {
    fn read_lines(&self) -> TraceResult<Vec<String>> {
        let mut file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(TraceError::StoreRead {
                    reason: format!("failed to open '{}': {}", self.path.display(), e),
                })
            }
        };

        self.lock_with_retry(&file, false)?;
        let mut bytes = Vec::new();
        let result = file.read_to_end(&mut bytes);
        if let Err(e) = FileExt::unlock(&file) {
            warn!(path = %self.path.display(), error = %e, "failed to release log lock");
        }
        result.map_err(|e| TraceError::StoreRead {
            reason: format!("failed to read '{}': {}", self.path.display(), e),
        })?;

        Ok(split_lines(&bytes))
    }

    fn append_exclusive(
        &self,
        build: &mut dyn FnMut(&[String]) -> TraceResult<String>,
    ) -> TraceResult<()> {
        let _guard = self.writer.lock().map_err(|e| TraceError::StoreWrite {
            reason: format!("store lock poisoned: {}", e),
        })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| TraceError::StoreWrite {
                reason: format!("failed to create '{}': {}", parent.display(), e),
            })?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| TraceError::StoreWrite {
                reason: format!("failed to open '{}': {}", self.path.display(), e),
            })?;

        self.lock_with_retry(&file, true)?;
        let result = self.append_locked(&mut file, build);
        if let Err(e) = FileExt::unlock(&file) {
            warn!(path = %self.path.display(), error = %e, "failed to release log lock");
        }
        result
    }
}

/// Split raw file contents into lines.
///
/// Only `\n` separates lines; a final `\n` terminates the last line rather
/// than starting an empty one. Invalid UTF-8 is replaced, so such a line
/// still shows up (and fails verification) instead of aborting the read.
fn split_lines(bytes: &[u8]) -> Vec<String> {
    if bytes.is_empty() {
        return Vec::new();
    }
    let body = bytes.strip_suffix(b"\n").unwrap_or(bytes);
    body.split(|b| *b == b'\n')
        .map(|line| String::from_utf8_lossy(line).into_owned())
        .collect()
}
