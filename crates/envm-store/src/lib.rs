//! Persistent namespace store for envm.
//!
//! A store maps user-chosen namespace names to snapshots of environment
//! variables. The whole mapping lives in a single YAML document
//! (`<base>/.envm.yml`) that is rewritten atomically on every mutation.
//!
//! # Backends
//!
//! All backends implement the [`NamespaceStore`] trait:
//!
//! - [`FileStore`] -- the YAML file with write-to-staging-then-rename saves
//! - [`InMemoryNamespaceStore`] -- `BTreeMap`-based store for tests and embedding
//!
//! # Modules
//!
//! - [`error`] — Error types for store operations
//! - [`types`] — [`VariableSet`], [`StoreData`] and the merge helper
//! - [`traits`] — The [`NamespaceStore`] trait
//! - [`file`] — The file-backed [`FileStore`]
//! - [`memory`] — The in-memory [`InMemoryNamespaceStore`]
//! - [`env`] — The [`Environment`] accessor and variable capture
//! - [`format`] — `export` script rendering
//! - [`check`] — Verification of stored values against an environment
//!
//! # Design Rules
//!
//! 1. The on-disk file is always fully parseable: saves go to a staging file
//!    in the same directory and are renamed over the target.
//! 2. A missing store file is an empty store for reads.
//! 3. The store never takes the process lock; callers do.
//! 4. Merges are flat and right-biased. There is no nested structure.

pub mod check;
pub mod env;
pub mod error;
pub mod file;
pub mod format;
pub mod memory;
pub mod traits;
pub mod types;

pub use check::{check_namespace, KeyCheck, NamespaceCheck};
pub use env::{capture, Environment, ProcessEnvironment, HOME_ENV_VAR};
pub use error::{StoreError, StoreResult};
pub use file::{resolve_store_path, FileStore, STAGING_SUFFIX, STORE_FILE_NAME};
pub use format::{export_line, export_script};
pub use memory::InMemoryNamespaceStore;
pub use traits::NamespaceStore;
pub use types::{merge_variables, StoreData, VariableSet};
