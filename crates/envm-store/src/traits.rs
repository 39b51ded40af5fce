//! The [`NamespaceStore`] trait defining the store interface.
//!
//! The file-backed store and the in-memory store both implement it, so the
//! command layer can be exercised without touching the filesystem.

use crate::error::{StoreError, StoreResult};
use crate::types::VariableSet;

/// Storage backend for namespaces of captured environment variables.
///
/// Mutating operations are expected to be called while the caller holds the
/// process lock. Implementations never take it themselves.
pub trait NamespaceStore {
    /// Insert a new namespace.
    ///
    /// Fails with [`StoreError::DuplicateNamespace`](crate::StoreError::DuplicateNamespace)
    /// if `name` is already present; the existing value is left as is.
    fn create(&mut self, name: &str, variables: VariableSet) -> StoreResult<()>;

    /// Overlay `variables` onto the namespace's current set, creating the
    /// namespace if it does not exist. Incoming values win.
    fn merge_update(&mut self, name: &str, variables: VariableSet) -> StoreResult<()>;

    /// Remove a namespace.
    ///
    /// Returns `Ok(true)` if it existed and was removed, `Ok(false)` if it
    /// (or the whole store) did not exist. Nothing is written in that case.
    fn delete(&mut self, name: &str) -> StoreResult<bool>;

    /// Look up a namespace. Returns `Ok(None)` if it does not exist.
    fn get(&self, name: &str) -> StoreResult<Option<VariableSet>>;

    /// Fetch a namespace that must exist.
    ///
    /// Fails with [`StoreError::NotFound`](crate::StoreError::NotFound) if it
    /// is absent. Backends with a persistent document may report
    /// [`StoreError::StoreMissing`](crate::StoreError::StoreMissing) instead
    /// when the document itself has never been written.
    fn require(&self, name: &str) -> StoreResult<VariableSet> {
        self.get(name)?.ok_or_else(|| StoreError::NotFound {
            name: name.to_string(),
        })
    }

    /// All namespace names in lexicographic order.
    fn list_namespaces(&self) -> StoreResult<Vec<String>>;

    /// Returns `true` if the namespace exists.
    fn contains(&self, name: &str) -> StoreResult<bool> {
        Ok(self.get(name)?.is_some())
    }
}
