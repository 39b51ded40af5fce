//! In-memory namespace store for testing and embedding.
//!
//! [`InMemoryNamespaceStore`] keeps the whole mapping in a `BTreeMap`. It
//! implements the full [`NamespaceStore`] trait with the same semantics as
//! the file-backed store. Data is lost when the store is dropped.

use crate::error::{StoreError, StoreResult};
use crate::traits::NamespaceStore;
use crate::types::{merge_variables, StoreData, VariableSet};

/// An in-memory implementation of [`NamespaceStore`].
#[derive(Clone, Debug, Default)]
pub struct InMemoryNamespaceStore {
    data: StoreData,
}

impl InMemoryNamespaceStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `data`.
    pub fn with_data(data: StoreData) -> Self {
        Self { data }
    }
}

impl NamespaceStore for InMemoryNamespaceStore {
    fn create(&mut self, name: &str, variables: VariableSet) -> StoreResult<()> {
        if self.data.contains_key(name) {
            return Err(StoreError::DuplicateNamespace {
                name: name.to_string(),
            });
        }
        self.data.insert(name.to_string(), variables);
        Ok(())
    }

    fn merge_update(&mut self, name: &str, variables: VariableSet) -> StoreResult<()> {
        let merged = match self.data.get(name) {
            Some(current) => merge_variables(current, &variables),
            None => variables,
        };
        self.data.insert(name.to_string(), merged);
        Ok(())
    }

    fn delete(&mut self, name: &str) -> StoreResult<bool> {
        Ok(self.data.remove(name).is_some())
    }

    fn get(&self, name: &str) -> StoreResult<Option<VariableSet>> {
        Ok(self.data.get(name).cloned())
    }

    fn list_namespaces(&self) -> StoreResult<Vec<String>> {
        Ok(self.data.keys().cloned().collect())
    }
}
