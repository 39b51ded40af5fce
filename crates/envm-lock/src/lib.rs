//! Cross-process mutual exclusion for envm.
//!
//! Every envm command that touches the store runs while holding a
//! [`ProcessLock`]. The lock is advisory: it only coordinates envm processes
//! with each other and does not stop anything else from editing the store
//! file.
//!
//! Acquisition is a single non-blocking attempt. A losing invocation gets
//! [`LockError::Held`] immediately instead of waiting.
//!
//! # Lock path
//!
//! By default one lock file in the system temp directory
//! ([`global_lock_path`]) serializes every store on the host. A per-store
//! path can be used instead by constructing the lock with
//! [`ProcessLock::new`].

pub mod error;
mod liveness;
pub mod lock;

pub use error::{LockError, LockResult};
pub use liveness::is_process_alive;
pub use lock::{global_lock_path, with_lock, ProcessLock, LOCK_FILE_NAME};
