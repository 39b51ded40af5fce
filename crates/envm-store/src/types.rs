//! Core data types for the namespace store.

use std::collections::BTreeMap;

/// Captured environment variables of one namespace, keyed by variable name.
///
/// A `BTreeMap` keeps keys sorted, which is the order every display path
/// (export scripts, check reports) uses.
pub type VariableSet = BTreeMap<String, String>;

/// The full persisted state: namespace name to its variable set.
pub type StoreData = BTreeMap<String, VariableSet>;

/// Overlay `overlay` onto `base`, key by key.
///
/// Values from `overlay` win on collision. Keys present only in `base` are
/// kept. Neither input is modified.
pub fn merge_variables(base: &VariableSet, overlay: &VariableSet) -> VariableSet {
    let mut merged = base.clone();
    merged.extend(overlay.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged
}
