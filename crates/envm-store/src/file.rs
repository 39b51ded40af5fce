//! File-backed namespace store.
//!
//! On-disk layout inside the base directory:
//!
//! ```text
//! <base>/.envm.yml        the store document (YAML)
//! <base>/.envm.yml.bak    staging file, only present during a save
//! ```
//!
//! The document's top level maps namespace names to maps of variable name to
//! value:
//!
//! ```yaml
//! prod:
//!   API_URL: https://api.example.com
//!   DEBUG: '0'
//! staging: {}
//! ```
//!
//! Every mutation rewrites the whole document. The new content is written to
//! the staging file, synced, then renamed over the target, so a reader sees
//! either the previous document or the new one and never a partial write.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::traits::NamespaceStore;
use crate::types::{merge_variables, StoreData, VariableSet};

/// Name of the store document inside the base directory.
pub const STORE_FILE_NAME: &str = ".envm.yml";

/// Suffix appended to [`STORE_FILE_NAME`] for the staging file.
pub const STAGING_SUFFIX: &str = ".bak";

/// Path of the store document for a base directory. Performs no I/O.
pub fn resolve_store_path(base_dir: &Path) -> PathBuf {
    base_dir.join(STORE_FILE_NAME)
}

/// Namespace store persisted as a single YAML file.
#[derive(Clone, Debug)]
pub struct FileStore {
    path: PathBuf,
    staging_path: PathBuf,
}

impl FileStore {
    /// Store rooted at `base_dir`. The directory and file are not touched
    /// until the first save.
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        let base_dir = base_dir.as_ref();
        Self {
            path: resolve_store_path(base_dir),
            staging_path: base_dir.join(format!("{STORE_FILE_NAME}{STAGING_SUFFIX}")),
        }
    }

    /// Path of the store document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the staging file used during saves.
    pub fn staging_path(&self) -> &Path {
        &self.staging_path
    }

    /// Returns `true` if the store document is present.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read and parse the store document.
    ///
    /// A missing file is an [`StoreError::Io`] with kind `NotFound`; use
    /// [`load_or_default`](Self::load_or_default) where absence means empty.
    pub fn load(&self) -> StoreResult<StoreData> {
        let content = fs::read_to_string(&self.path)?;
        parse_document(&self.path, &content)
    }

    /// Like [`load`](Self::load), but a missing file yields the empty mapping.
    pub fn load_or_default(&self) -> StoreResult<StoreData> {
        match fs::read_to_string(&self.path) {
            Ok(content) => parse_document(&self.path, &content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "store file absent; using empty store");
                Ok(StoreData::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Atomically replace the store document with `data`.
    ///
    /// Serialization happens before any file is opened. If writing the
    /// staging file fails it is removed and the target is left untouched. A
    /// failed rename is reported as [`StoreError::Io`]; the target may or may
    /// not have been replaced.
    pub fn save(&self, data: &StoreData) -> StoreResult<()> {
        let content =
            serde_yaml::to_string(data).map_err(|e| StoreError::Serialization(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        if let Err(e) = self.write_staging(content.as_bytes()) {
            let _ = fs::remove_file(&self.staging_path);
            return Err(e.into());
        }

        if let Err(e) = fs::rename(&self.staging_path, &self.path) {
            let _ = fs::remove_file(&self.staging_path);
            return Err(e.into());
        }

        debug!(
            path = %self.path.display(),
            namespaces = data.len(),
            bytes = content.len(),
            "store saved"
        );
        Ok(())
    }

    fn write_staging(&self, bytes: &[u8]) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.staging_path)?;

        // Stored values are captured environment variables and may be secrets.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(fs::Permissions::from_mode(0o600))?;
        }

        file.write_all(bytes)?;
        file.flush()?;
        file.sync_all()
    }
}

impl NamespaceStore for FileStore {
    fn create(&mut self, name: &str, variables: VariableSet) -> StoreResult<()> {
        let mut data = self.load_or_default()?;
        if data.contains_key(name) {
            return Err(StoreError::DuplicateNamespace {
                name: name.to_string(),
            });
        }
        data.insert(name.to_string(), variables);
        self.save(&data)
    }

    fn merge_update(&mut self, name: &str, variables: VariableSet) -> StoreResult<()> {
        let mut data = self.load_or_default()?;
        let merged = match data.get(name) {
            Some(current) => merge_variables(current, &variables),
            None => variables,
        };
        data.insert(name.to_string(), merged);
        self.save(&data)
    }

    fn delete(&mut self, name: &str) -> StoreResult<bool> {
        if !self.exists() {
            return Ok(false);
        }
        let mut data = self.load()?;
        if data.remove(name).is_none() {
            return Ok(false);
        }
        self.save(&data)?;
        Ok(true)
    }

    fn require(&self, name: &str) -> StoreResult<VariableSet> {
        if !self.exists() {
            return Err(StoreError::StoreMissing {
                path: self.path.clone(),
            });
        }
        let mut data = self.load()?;
        data.remove(name).ok_or_else(|| StoreError::NotFound {
            name: name.to_string(),
        })
    }

    fn get(&self, name: &str) -> StoreResult<Option<VariableSet>> {
        let mut data = self.load_or_default()?;
        Ok(data.remove(name))
    }

    fn list_namespaces(&self) -> StoreResult<Vec<String>> {
        Ok(self.load_or_default()?.into_keys().collect())
    }
}

/// Parse a store document. Whitespace-only content is the empty store.
fn parse_document(path: &Path, content: &str) -> StoreResult<StoreData> {
    if content.trim().is_empty() {
        return Ok(StoreData::new());
    }
    serde_yaml::from_str(content).map_err(|source| StoreError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
