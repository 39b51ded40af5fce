//! Verification of a stored namespace against the current environment.

use crate::env::Environment;
use crate::types::VariableSet;

/// Outcome for one stored variable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyCheck {
    /// Variable name.
    pub key: String,
    /// `true` if the environment holds exactly the stored value.
    pub matched: bool,
}

/// Outcome of checking one namespace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NamespaceCheck {
    /// Namespace that was checked.
    pub name: String,
    /// Per-variable results in key order.
    pub keys: Vec<KeyCheck>,
}

impl NamespaceCheck {
    /// `true` if every stored variable matched.
    pub fn passed(&self) -> bool {
        self.keys.iter().all(|k| k.matched)
    }

    /// Names of the variables that did not match.
    pub fn mismatched(&self) -> impl Iterator<Item = &str> {
        self.keys
            .iter()
            .filter(|k| !k.matched)
            .map(|k| k.key.as_str())
    }
}

/// Compare each stored variable with `env`.
///
/// An unset variable matches only an empty stored value. The stored set is
/// only read.
pub fn check_namespace(name: &str, stored: &VariableSet, env: &dyn Environment) -> NamespaceCheck {
    let keys = stored
        .iter()
        .map(|(key, expected)| KeyCheck {
            key: key.clone(),
            matched: env.value(key).unwrap_or_default() == *expected,
        })
        .collect();
    NamespaceCheck {
        name: name.to_string(),
        keys,
    }
}
