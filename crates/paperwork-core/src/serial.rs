//! File-backed serial number allocator.
//!
//! The counter file holds `"<base>,<offset>"`. Each allocation returns
//! `base + offset` and persists `offset + 1`. The read-modify-write runs under
//! an exclusive lock on a sidecar `<file>.lock`, so concurrent callers (threads
//! or separate processes) never see the same offset.

use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::debug;

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerialState {
    pub base: u64,
    pub offset: u64,
}

impl SerialState {
    pub fn current(&self) -> Option<u64> {
        self.base.checked_add(self.offset)
    }
}

impl fmt::Display for SerialState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.base, self.offset)
    }
}

impl FromStr for SerialState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (base, offset) = s
            .trim()
            .split_once(',')
            .ok_or_else(|| format!("expected \"<base>,<offset>\", got {s:?}"))?;
        let base = base
            .trim()
            .parse()
            .map_err(|e| format!("invalid base {base:?}: {e}"))?;
        let offset = offset
            .trim()
            .parse()
            .map_err(|e| format!("invalid offset {offset:?}: {e}"))?;
        Ok(Self { base, offset })
    }
}

#[derive(Debug, Clone)]
pub struct SerialAllocator {
    path: PathBuf,
}

impl SerialAllocator {
    /// Bind to an existing counter file. The file is validated but not locked.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CoreError> {
        let allocator = Self { path: path.into() };
        allocator.peek()?;
        Ok(allocator)
    }

    /// Create a new counter file starting at `base` with offset 0.
    /// Refuses to overwrite an existing file.
    pub fn init(path: impl Into<PathBuf>, base: u64) -> Result<Self, CoreError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| CoreError::storage(&path, e))?;
        }

        let allocator = Self { path };
        let _guard = allocator.lock()?;
        if allocator.path.exists() {
            return Err(CoreError::storage(
                &allocator.path,
                "counter file already exists",
            ));
        }
        allocator.write_state(SerialState { base, offset: 0 })?;
        debug!(path = %allocator.path.display(), base, "serial counter initialised");
        Ok(allocator)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted state without allocating.
    pub fn peek(&self) -> Result<SerialState, CoreError> {
        let contents =
            fs::read_to_string(&self.path).map_err(|e| CoreError::storage(&self.path, e))?;
        contents
            .parse()
            .map_err(|e: String| CoreError::storage(&self.path, e))
    }

    /// Return `base + offset` and persist `offset + 1`, atomically with respect
    /// to every other caller using the same file.
    pub fn allocate_next(&self) -> Result<u64, CoreError> {
        let _guard = self.lock()?;

        let state = self.peek()?;
        let serial = state
            .current()
            .ok_or_else(|| CoreError::storage(&self.path, "serial overflows u64"))?;
        let offset = state
            .offset
            .checked_add(1)
            .ok_or_else(|| CoreError::storage(&self.path, "offset overflows u64"))?;

        self.write_state(SerialState {
            base: state.base,
            offset,
        })?;

        debug!(path = %self.path.display(), serial, next_offset = offset, "serial allocated");
        Ok(serial)
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".lock");
        PathBuf::from(name)
    }

    fn lock(&self) -> Result<LockGuard, CoreError> {
        let lock_path = self.lock_path();
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(|e| CoreError::storage(&lock_path, e))?;
        file.lock().map_err(|e| CoreError::storage(&lock_path, e))?;
        Ok(LockGuard { file })
    }

    /// Write to a temp file and rename over the counter so a crash never
    /// leaves a half-written state.
    fn write_state(&self, state: SerialState) -> Result<(), CoreError> {
        let mut tmp_name = self.path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        fs::write(&tmp_path, state.to_string()).map_err(|e| CoreError::storage(&tmp_path, e))?;
        fs::rename(&tmp_path, &self.path).map_err(|e| CoreError::storage(&self.path, e))
    }
}

struct LockGuard {
    file: File,
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}
