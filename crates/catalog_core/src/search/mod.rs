//! Caller-side catalog search.
//!
//! # Responsibility
//! - Derive filtered views from repository snapshots.
//!
//! # Invariants
//! - Search never mutates or re-orders the input collection.

pub mod name_filter;
