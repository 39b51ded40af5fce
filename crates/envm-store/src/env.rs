//! Read access to environment variables.
//!
//! Commands never call `std::env` directly; they go through an
//! [`Environment`] so tests can supply a plain map.

use std::collections::{BTreeMap, HashMap};
use std::env::VarError;

use tracing::warn;

use crate::types::VariableSet;

/// Variable that overrides the base directory holding the store file.
pub const HOME_ENV_VAR: &str = "ENVM_HOME";

/// Opaque read-only accessor for environment variables.
pub trait Environment {
    /// Value of `name`, with the same error cases as [`std::env::var`].
    fn var(&self, name: &str) -> Result<String, VarError>;

    /// Value of `name`, or `None` if it is unset. A value that is not valid
    /// Unicode is converted lossily.
    fn value(&self, name: &str) -> Option<String> {
        match self.var(name) {
            Ok(value) => Some(value),
            Err(VarError::NotPresent) => None,
            Err(VarError::NotUnicode(raw)) => Some(raw.to_string_lossy().into_owned()),
        }
    }
}

/// The environment of the current process.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessEnvironment;

impl Environment for ProcessEnvironment {
    fn var(&self, name: &str) -> Result<String, VarError> {
        std::env::var(name)
    }
}

impl Environment for BTreeMap<String, String> {
    fn var(&self, name: &str) -> Result<String, VarError> {
        self.get(name).cloned().ok_or(VarError::NotPresent)
    }
}

impl Environment for HashMap<String, String> {
    fn var(&self, name: &str) -> Result<String, VarError> {
        self.get(name).cloned().ok_or(VarError::NotPresent)
    }
}

impl<E: Environment + ?Sized> Environment for &E {
    fn var(&self, name: &str) -> Result<String, VarError> {
        (**self).var(name)
    }
}

/// Snapshot the named variables from `env`.
///
/// An unset variable is captured as the empty string. A value that is not
/// valid Unicode is captured lossily.
pub fn capture<I, S>(keys: I, env: &dyn Environment) -> VariableSet
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    keys.into_iter()
        .map(|key| {
            let key = key.as_ref();
            let value = match env.var(key) {
                Ok(value) => value,
                Err(VarError::NotPresent) => {
                    warn!(variable = key, "variable is not set; capturing empty value");
                    String::new()
                }
                Err(VarError::NotUnicode(raw)) => {
                    warn!(variable = key, "variable is not valid Unicode; capturing it lossily");
                    raw.to_string_lossy().into_owned()
                }
            };
            (key.to_string(), value)
        })
        .collect()
}
