//! Core domain logic for the product catalog.
//! This crate is the single source of truth for catalog invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;
pub mod session;
pub mod store;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::product::{DraftValidationError, Product, ProductDraft, ProductId};
pub use repo::codec::{decode_products, encode_products, CodecError};
pub use repo::observer::SubscriptionId;
pub use repo::product_repo::{
    HydrationOutcome, IdSource, ProductRepository, RepoError, RepoResult, RepositoryConfig,
    UuidIdSource, DEFAULT_STORAGE_KEY,
};
pub use repo::seed::seed_products;
pub use repo::PersistenceStatus;
pub use search::name_filter::filter_by_name;
pub use service::catalog_service::{CatalogResult, CatalogService, CatalogServiceError};
pub use session::{CredentialPresenceGate, SessionGate};
pub use store::{KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore, StoreError};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
