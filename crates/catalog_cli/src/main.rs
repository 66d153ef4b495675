//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `catalog_core` linkage without the Flutter/FFI runtime.
//! - Print the catalog held by an optional SQLite store path.

use catalog_core::{
    CatalogService, KeyValueStore, MemoryKeyValueStore, ProductRepository, RepositoryConfig,
    SqliteKeyValueStore,
};
use std::process::ExitCode;
use std::sync::Arc;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    println!("catalog_core ping={}", catalog_core::ping());
    println!("catalog_core version={}", catalog_core::core_version());

    let store: Arc<dyn KeyValueStore> = match std::env::args().nth(1) {
        Some(path) => match SqliteKeyValueStore::open(&path) {
            Ok(store) => Arc::new(store),
            Err(err) => {
                eprintln!("failed to open catalog store `{path}`: {err}");
                return ExitCode::FAILURE;
            }
        },
        None => Arc::new(MemoryKeyValueStore::new()),
    };

    let service = CatalogService::new(ProductRepository::new(store, RepositoryConfig::default()));
    let outcome = service.repository().hydrate().await;
    println!("catalog hydrate={outcome:?}");
    for product in service.search(None) {
        println!("{}\t{}\t{}", product.id, product.name, product.image);
    }

    let status = service.repository().shutdown().await;
    if status.failed_writes > 0 {
        eprintln!("catalog writes failed: {}", status.failed_writes);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
