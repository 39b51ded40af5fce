//! Per-invocation settings: where the store lives and which lock guards it.

use std::path::{Path, PathBuf};

use anyhow::anyhow;
use envm_lock::{global_lock_path, ProcessLock};
use envm_store::{Environment, FileStore, HOME_ENV_VAR, STORE_FILE_NAME};
use tracing::debug;

use crate::cli::LockScope;

/// Suffix of the per-store lock file, next to the store document.
const STORE_LOCK_SUFFIX: &str = ".lck";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub base_dir: PathBuf,
    pub lock_scope: LockScope,
}

impl Settings {
    /// Resolve the base directory once: `--home`, then `$ENVM_HOME` when set
    /// and non-empty, then the user's home directory.
    pub fn resolve(
        home_flag: Option<&Path>,
        lock_scope: LockScope,
        env: &dyn Environment,
    ) -> anyhow::Result<Self> {
        let base_dir = match home_flag {
            Some(dir) => dir.to_path_buf(),
            None => match env.var(HOME_ENV_VAR).ok().filter(|v| !v.is_empty()) {
                Some(dir) => PathBuf::from(dir),
                None => dirs::home_dir().ok_or_else(|| {
                    anyhow!("cannot determine home directory; set {HOME_ENV_VAR} or pass --home")
                })?,
            },
        };
        debug!(base_dir = %base_dir.display(), ?lock_scope, "settings resolved");
        Ok(Self {
            base_dir,
            lock_scope,
        })
    }

    pub fn store(&self) -> FileStore {
        FileStore::new(&self.base_dir)
    }

    pub fn lock_path(&self) -> PathBuf {
        match self.lock_scope {
            LockScope::Global => global_lock_path(),
            LockScope::Store => self
                .base_dir
                .join(format!("{STORE_FILE_NAME}{STORE_LOCK_SUFFIX}")),
        }
    }

    pub fn lock(&self) -> ProcessLock {
        match self.lock_scope {
            LockScope::Global => ProcessLock::global(),
            LockScope::Store => ProcessLock::new(self.lock_path()),
        }
    }
}
