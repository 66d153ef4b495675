//! Catalog domain model.
//!
//! # Responsibility
//! - Define the product record shared by repository, service and FFI layers.
//!
//! # Invariants
//! - Every product is identified by a stable, collection-unique `ProductId`.
//! - Deletion is a hard removal from the collection.

pub mod product;
