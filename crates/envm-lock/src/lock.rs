//! The [`ProcessLock`] handle.
//!
//! The lock file holds the decimal pid of the current holder. Exclusion comes
//! from an OS advisory lock on the open file (`flock` on Unix, `LockFileEx`
//! on Windows, via `fs2`), which the kernel drops when the holding process
//! exits for any reason. A lock file left behind by a crashed process is
//! therefore never an obstacle; the recorded pid is only used to name the
//! holder in [`LockError::Held`] and to report reclaimed stale locks.
//!
//! Release truncates and unlocks the file but never deletes it. Deleting
//! would let a waiter lock the unlinked inode while a newcomer locks a fresh
//! file at the same path.
//!
//! Since the file outlives its creator, it is created world-writable (subject
//! to the umask). If a read-write open is still denied, as for a file another
//! user created under a restrictive umask, the lock is taken on a read-only
//! descriptor and the holder pid goes unrecorded.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::{debug, warn};

use crate::error::{LockError, LockResult};
use crate::liveness::is_process_alive;

/// File name of the host-wide lock inside the system temp directory.
pub const LOCK_FILE_NAME: &str = "envm.lck";

/// The lock shared by every envm invocation on this host.
pub fn global_lock_path() -> PathBuf {
    std::env::temp_dir().join(LOCK_FILE_NAME)
}

/// An exclusive, advisory, non-blocking lock identified by a file path.
///
/// The handle is owned by the caller. Dropping it releases the lock, so a
/// lock acquired in a scope is released on every exit path, including early
/// returns with `?`.
#[derive(Debug)]
pub struct ProcessLock {
    path: PathBuf,
    file: Option<File>,
    /// Whether this holder wrote its pid into the file.
    recorded: bool,
}

impl ProcessLock {
    /// Lock handle for `path`. Nothing is opened until [`acquire`](Self::acquire).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file: None,
            recorded: false,
        }
    }

    /// Lock handle for [`global_lock_path`].
    pub fn global() -> Self {
        Self::new(global_lock_path())
    }

    /// Path of the lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `true` while this handle holds the lock.
    pub fn is_held(&self) -> bool {
        self.file.is_some()
    }

    /// Try once to take the lock.
    ///
    /// Fails with [`LockError::Held`] if any other handle (in this or another
    /// process) holds it. Calling this on a handle that already holds the
    /// lock is a no-op.
    pub fn acquire(&mut self) -> LockResult<()> {
        if self.file.is_some() {
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let (file, writable) = open_lock_file(&self.path)?;
        self.lock_file(file, writable)
    }

    fn lock_file(&mut self, mut file: File, writable: bool) -> LockResult<()> {
        if let Err(e) = file.try_lock_exclusive() {
            if is_contended(&e) {
                let pid = read_holder(&mut file);
                debug!(path = %self.path.display(), ?pid, "lock is held");
                return Err(LockError::Held {
                    path: self.path.clone(),
                    pid,
                });
            }
            return Err(e.into());
        }

        // We hold the OS lock; whoever is recorded in the file no longer does.
        if let Some(previous) = read_holder(&mut file) {
            if previous != std::process::id() && !is_process_alive(previous) {
                warn!(
                    path = %self.path.display(),
                    pid = previous,
                    "reclaimed lock abandoned by a terminated process"
                );
            }
        }

        if writable {
            if let Err(e) = record_holder(&mut file) {
                let _ = FileExt::unlock(&file);
                return Err(e.into());
            }
        }

        debug!(path = %self.path.display(), recorded = writable, "lock acquired");
        self.file = Some(file);
        self.recorded = writable;
        Ok(())
    }

    /// Give the lock up. A no-op if this handle does not hold it.
    pub fn release(&mut self) -> LockResult<()> {
        let Some(file) = self.file.take() else {
            return Ok(());
        };
        // Closing the file drops the OS lock even if a step below fails.
        if std::mem::take(&mut self.recorded) {
            file.set_len(0)?;
        }
        FileExt::unlock(&file)?;
        debug!(path = %self.path.display(), "lock released");
        Ok(())
    }
}

impl Drop for ProcessLock {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            warn!(path = %self.path.display(), error = %e, "failed to release lock");
        }
    }
}

/// Run `f` while holding `lock`, releasing it afterwards on every path.
///
/// An error from `f` takes precedence over a release error.
pub fn with_lock<T, E, F>(lock: &mut ProcessLock, f: F) -> Result<T, E>
where
    F: FnOnce() -> Result<T, E>,
    E: From<LockError>,
{
    lock.acquire()?;
    let result = f();
    let released = lock.release();
    let value = result?;
    released?;
    Ok(value)
}

/// Open `path` for locking, creating it if needed. The flag tells whether
/// the descriptor is writable.
fn open_lock_file(path: &Path) -> io::Result<(File, bool)> {
    let mut options = OpenOptions::new();
    options.read(true).write(true).create(true).truncate(false);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o666);
    }

    match options.open(path) {
        Ok(file) => Ok((file, true)),
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
            debug!(path = %path.display(), "lock file not writable; locking read-only");
            File::open(path).map(|file| (file, false))
        }
        Err(e) => Err(e),
    }
}

fn is_contended(e: &io::Error) -> bool {
    e.kind() == io::ErrorKind::WouldBlock
        || e.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}

fn read_holder(file: &mut File) -> Option<u32> {
    let mut content = String::new();
    file.seek(SeekFrom::Start(0)).ok()?;
    file.read_to_string(&mut content).ok()?;
    content.trim().parse().ok()
}

fn record_holder(file: &mut File) -> io::Result<()> {
    file.set_len(0)?;
    file.seek(SeekFrom::Start(0))?;
    writeln!(file, "{}", std::process::id())?;
    file.sync_all()
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Barrier};
    use std::thread;

    use super::*;

    fn lock_path(dir: &tempfile::TempDir) -> PathBuf {
        dir.path().join(LOCK_FILE_NAME)
    }

    #[test]
    fn global_path_lives_in_temp_dir() {
        let path = global_lock_path();
        assert_eq!(path.parent().unwrap(), std::env::temp_dir());
        assert_eq!(path.file_name().unwrap(), LOCK_FILE_NAME);
    }

    #[test]
    fn acquire_records_pid() {
        let dir = tempfile::tempdir().unwrap();
        let mut lock = ProcessLock::new(lock_path(&dir));
        lock.acquire().unwrap();
        assert!(lock.is_held());

        let content = fs::read_to_string(lock.path()).unwrap();
        assert_eq!(content.trim(), std::process::id().to_string());
    }

    #[test]
    fn second_handle_sees_held() {
        let dir = tempfile::tempdir().unwrap();
        let mut first = ProcessLock::new(lock_path(&dir));
        let mut second = ProcessLock::new(lock_path(&dir));

        first.acquire().unwrap();
        let err = second.acquire().unwrap_err();
        match err {
            LockError::Held { path, pid } => {
                assert_eq!(path, lock_path(&dir));
                assert_eq!(pid, Some(std::process::id()));
            }
            other => panic!("expected Held, got {other:?}"),
        }
        assert!(!second.is_held());
    }

    #[test]
    fn released_lock_can_be_reacquired() {
        let dir = tempfile::tempdir().unwrap();
        let mut first = ProcessLock::new(lock_path(&dir));
        let mut second = ProcessLock::new(lock_path(&dir));

        first.acquire().unwrap();
        first.release().unwrap();
        assert!(!first.is_held());

        second.acquire().unwrap();
        assert!(second.is_held());
        assert!(lock_path(&dir).exists());
    }

    #[test]
    fn release_without_acquire_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let mut lock = ProcessLock::new(lock_path(&dir));
        lock.release().unwrap();
        lock.release().unwrap();
    }

    #[test]
    fn release_after_failed_acquire_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let mut holder = ProcessLock::new(lock_path(&dir));
        let mut loser = ProcessLock::new(lock_path(&dir));

        holder.acquire().unwrap();
        assert!(loser.acquire().is_err());
        loser.release().unwrap();

        // The holder is unaffected by the loser's release.
        let mut third = ProcessLock::new(lock_path(&dir));
        assert!(matches!(third.acquire(), Err(LockError::Held { .. })));
    }

    #[test]
    fn repeated_acquire_on_same_handle_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let mut lock = ProcessLock::new(lock_path(&dir));
        lock.acquire().unwrap();
        lock.acquire().unwrap();
        assert!(lock.is_held());
    }

    #[test]
    fn drop_releases() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut lock = ProcessLock::new(lock_path(&dir));
            lock.acquire().unwrap();
        }
        let mut again = ProcessLock::new(lock_path(&dir));
        again.acquire().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn stale_lock_file_from_dead_process_is_reclaimed() {
        let dir = tempfile::tempdir().unwrap();
        let mut child = std::process::Command::new("true").spawn().unwrap();
        let dead_pid = child.id();
        child.wait().unwrap();
        fs::write(lock_path(&dir), format!("{dead_pid}\n")).unwrap();

        let mut lock = ProcessLock::new(lock_path(&dir));
        lock.acquire().unwrap();

        let content = fs::read_to_string(lock.path()).unwrap();
        assert_eq!(content.trim(), std::process::id().to_string());
    }

    #[test]
    fn garbage_lock_file_is_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(lock_path(&dir), "not a pid").unwrap();

        let mut lock = ProcessLock::new(lock_path(&dir));
        lock.acquire().unwrap();
        let content = fs::read_to_string(lock.path()).unwrap();
        assert_eq!(content.trim(), std::process::id().to_string());
    }

    #[test]
    fn creates_missing_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut lock = ProcessLock::new(dir.path().join("a").join("b").join(LOCK_FILE_NAME));
        lock.acquire().unwrap();
        assert!(lock.path().exists());
    }

    #[cfg(unix)]
    #[test]
    fn read_only_lock_file_can_still_be_locked() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = lock_path(&dir);
        fs::write(&path, "").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o444)).unwrap();

        let mut lock = ProcessLock::new(&path);
        lock.acquire().unwrap();
        assert!(lock.is_held());

        let mut contender = ProcessLock::new(&path);
        assert!(matches!(contender.acquire(), Err(LockError::Held { .. })));

        lock.release().unwrap();
        contender.acquire().unwrap();
    }

    #[test]
    fn read_only_descriptor_excludes_without_recording_pid() {
        let dir = tempfile::tempdir().unwrap();
        let path = lock_path(&dir);
        fs::write(&path, "").unwrap();

        let mut lock = ProcessLock::new(&path);
        lock.lock_file(File::open(&path).unwrap(), false).unwrap();
        assert!(lock.is_held());
        assert_eq!(fs::read_to_string(&path).unwrap(), "");

        let mut contender = ProcessLock::new(&path);
        match contender.acquire() {
            Err(LockError::Held { pid, .. }) => assert_eq!(pid, None),
            other => panic!("expected Held, got {other:?}"),
        }

        lock.release().unwrap();
        assert!(!lock.is_held());
        contender.acquire().unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.trim(), std::process::id().to_string());
    }

    #[test]
    fn concurrent_attempts_exactly_one_wins() {
        let dir = tempfile::tempdir().unwrap();
        let path = lock_path(&dir);
        let barrier = Arc::new(Barrier::new(2));

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let path = path.clone();
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    let mut lock = ProcessLock::new(path);
                    barrier.wait();
                    let outcome = lock.acquire();
                    // Keep holding until both attempts are done.
                    barrier.wait();
                    outcome.is_ok()
                })
            })
            .collect();

        let wins = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(wins, 1);
    }

    #[test]
    fn with_lock_releases_on_success_and_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut lock = ProcessLock::new(lock_path(&dir));

        let value: Result<u32, LockError> = with_lock(&mut lock, || Ok(7));
        assert_eq!(value.unwrap(), 7);
        assert!(!lock.is_held());

        let failed: Result<(), LockError> = with_lock(&mut lock, || {
            Err(LockError::Io(io::Error::other("boom")))
        });
        assert!(failed.is_err());
        assert!(!lock.is_held());

        let mut other = ProcessLock::new(lock_path(&dir));
        other.acquire().unwrap();
    }

    #[test]
    fn with_lock_fails_fast_when_held() {
        let dir = tempfile::tempdir().unwrap();
        let mut holder = ProcessLock::new(lock_path(&dir));
        holder.acquire().unwrap();

        let mut contender = ProcessLock::new(lock_path(&dir));
        let mut ran = false;
        let result: Result<(), LockError> = with_lock(&mut contender, || {
            ran = true;
            Ok(())
        });
        assert!(matches!(result, Err(LockError::Held { .. })));
        assert!(!ran);
    }
}
