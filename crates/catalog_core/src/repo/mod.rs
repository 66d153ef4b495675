//! Product repository and its persistence plumbing.
//!
//! # Responsibility
//! - Hold the authoritative product collection in memory.
//! - Mirror mutations to durable storage through a background writer.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`) for missing ids.
//! - Storage failures are logged and counted, never returned from mutations.

pub mod codec;
pub mod observer;
pub mod product_repo;
pub mod seed;
mod writer;

pub use writer::PersistenceStatus;
