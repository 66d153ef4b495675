//! Durable key-value storage contract and implementations.
//!
//! # Responsibility
//! - Define the minimal read/write contract the product repository persists
//!   through.
//! - Provide an on-device SQLite store and an in-process store.
//!
//! # Invariants
//! - `read` of a never-written key returns `Ok(None)`, not an error.
//! - `write` replaces the whole value stored under the key.
//! - Store failures are reported, never panicked on.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod memory_kv;
mod sqlite_kv;

pub use memory_kv::MemoryKeyValueStore;
pub use sqlite_kv::SqliteKeyValueStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure reported by a key-value store.
#[derive(Debug)]
pub enum StoreError {
    /// Underlying SQLite failure.
    Sqlite(rusqlite::Error),
    /// The database was migrated by a newer build; it is left untouched.
    UnsupportedSchemaVersion { db_version: u32, latest_supported: u32 },
    /// Store refused or could not serve the request (full, revoked, offline).
    Unavailable(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "sqlite: {err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "store schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::Unavailable(message) => write!(f, "store unavailable: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } | Self::Unavailable(_) => None,
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Named-blob storage used for durable catalog state.
///
/// Methods take `&self`; implementations use interior mutability so one
/// store can be shared between the repository and its background writer.
/// Calls may block, callers on an async runtime should move them to a
/// blocking thread.
pub trait KeyValueStore: Send + Sync {
    fn read(&self, key: &str) -> StoreResult<Option<String>>;
    fn write(&self, key: &str, value: &str) -> StoreResult<()>;
}
