//! Error types for process lock operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while acquiring or releasing a [`ProcessLock`](crate::ProcessLock).
#[derive(Debug, Error)]
pub enum LockError {
    /// Another live process holds the lock.
    #[error("another envm process holds the lock at {}{}", .path.display(), holder_suffix(.pid))]
    Held { path: PathBuf, pid: Option<u32> },

    /// I/O error while opening, locking or writing the lock file.
    #[error("lock I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn holder_suffix(pid: &Option<u32>) -> String {
    match pid {
        Some(pid) => format!(" (pid {pid})"),
        None => String::new(),
    }
}

/// Result alias for lock operations.
pub type LockResult<T> = Result<T, LockError>;
