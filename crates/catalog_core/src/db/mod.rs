//! SQLite file backing `SqliteKeyValueStore`.
//!
//! Opening a connection configures it and brings the `kv_entries` schema up
//! to date; nothing touches entries on a connection that failed to migrate.
//! Failures are reported as `StoreError`.

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};
