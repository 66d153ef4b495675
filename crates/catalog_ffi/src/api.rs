//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose catalog use-cases to Dart via FRB.
//! - Own the single process-wide repository and its Tokio runtime.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Mutations return an envelope; storage failures are never surfaced.

use catalog_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    CatalogService, CatalogServiceError, CredentialPresenceGate, KeyValueStore, Product,
    ProductDraft, ProductRepository, RepositoryConfig, SessionGate, SqliteKeyValueStore,
};
use log::{error, info};
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};
use tokio::runtime::Runtime;

const CATALOG_DB_FILE_NAME: &str = "catalog_products.sqlite3";
static CATALOG: OnceLock<Result<Catalog, String>> = OnceLock::new();

struct Catalog {
    runtime: Runtime,
    service: CatalogService,
}

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Checks login credentials. No session is stored.
#[flutter_rust_bridge::frb(sync)]
pub fn session_login(username: String, password: String) -> bool {
    CredentialPresenceGate.authenticate(&username, &password)
}

/// Product row returned to Dart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductItem {
    pub id: String,
    pub name: String,
    /// Remote URL or local file path.
    pub image: String,
    pub description: Option<String>,
}

impl From<Product> for ProductItem {
    fn from(value: Product) -> Self {
        Self {
            id: value.id,
            name: value.name,
            image: value.image,
            description: value.description,
        }
    }
}

/// Action envelope for create/update/delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductActionResponse {
    pub ok: bool,
    /// Affected product id on success.
    pub product_id: Option<String>,
    /// Human-readable message for UI prompts.
    pub message: String,
}

impl ProductActionResponse {
    fn success(message: impl Into<String>, product_id: String) -> Self {
        Self {
            ok: true,
            product_id: Some(product_id),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            product_id: None,
            message: message.into(),
        }
    }
}

/// Opens the catalog and loads persisted products.
///
/// # FFI contract
/// - Async from Dart: runs on a worker thread, never on the UI thread.
/// - Idempotent; later calls return the first load's result.
/// - Returns empty string on success and error message on failure.
pub fn catalog_open() -> String {
    match catalog() {
        Ok(catalog) => {
            let outcome = catalog
                .runtime
                .block_on(catalog.service.repository().hydrate());
            info!("event=catalog_open module=ffi status=ok outcome={outcome:?}");
            String::new()
        }
        Err(err) => err.clone(),
    }
}

/// Returns whether persisted products have been loaded.
#[flutter_rust_bridge::frb(sync)]
pub fn catalog_is_ready() -> bool {
    catalog().is_ok_and(|catalog| catalog.service.repository().is_hydrated())
}

/// Lists products, filtered by name when `query` is set.
#[flutter_rust_bridge::frb(sync)]
pub fn products_list(query: Option<String>) -> Vec<ProductItem> {
    match catalog() {
        Ok(catalog) => catalog
            .service
            .search(query.as_deref())
            .into_iter()
            .map(ProductItem::from)
            .collect(),
        Err(_) => Vec::new(),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn product_get(id: String) -> Option<ProductItem> {
    catalog()
        .ok()?
        .service
        .product(&id)
        .map(ProductItem::from)
}

#[flutter_rust_bridge::frb(sync)]
pub fn product_create(
    name: String,
    image: String,
    description: Option<String>,
) -> ProductActionResponse {
    let draft = to_draft(name, image, description);
    match with_service(|service| service.add_product(&draft)) {
        Ok(product) => ProductActionResponse::success("Product added.", product.id),
        Err(message) => ProductActionResponse::failure(message),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn product_update(
    id: String,
    name: String,
    image: String,
    description: Option<String>,
) -> ProductActionResponse {
    let draft = to_draft(name, image, description);
    match with_service(|service| service.edit_product(&id, &draft)) {
        Ok(product) => ProductActionResponse::success("Product updated.", product.id),
        Err(message) => ProductActionResponse::failure(message),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn product_delete(id: String) -> ProductActionResponse {
    match with_service(|service| service.remove_product(&id)) {
        Ok(product) => ProductActionResponse::success("Product deleted.", product.id),
        Err(message) => ProductActionResponse::failure(message),
    }
}

/// Waits for pending writes; returns the number of failed writes so far.
pub fn catalog_flush() -> u64 {
    match catalog() {
        Ok(catalog) => {
            catalog
                .runtime
                .block_on(catalog.service.repository().flush())
                .failed_writes
        }
        Err(_) => 0,
    }
}

fn to_draft(name: String, image: String, description: Option<String>) -> ProductDraft {
    ProductDraft {
        name,
        image,
        description,
    }
}

fn with_service(
    f: impl FnOnce(&CatalogService) -> Result<Product, CatalogServiceError>,
) -> Result<Product, String> {
    let catalog = catalog().map_err(Clone::clone)?;
    f(&catalog.service).map_err(|err| err.to_string())
}

fn catalog() -> Result<&'static Catalog, &'static String> {
    CATALOG.get_or_init(open_catalog).as_ref()
}

fn open_catalog() -> Result<Catalog, String> {
    let db_path = resolve_db_path();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .thread_name("catalog-io")
        .enable_all()
        .build()
        .map_err(|err| format!("catalog runtime start failed: {err}"))?;
    let store = SqliteKeyValueStore::open(&db_path).map_err(|err| {
        error!("event=catalog_open module=ffi status=error error={err}");
        format!("catalog store open failed: {err}")
    })?;
    let store: Arc<dyn KeyValueStore> = Arc::new(store);

    let repo = {
        let _guard = runtime.enter();
        ProductRepository::new(store, RepositoryConfig::default())
    };
    Ok(Catalog {
        runtime,
        service: CatalogService::new(repo),
    })
}

fn resolve_db_path() -> PathBuf {
    if let Ok(raw) = std::env::var("CATALOG_DB_PATH") {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }
    std::env::temp_dir().join(CATALOG_DB_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::{
        catalog_flush, catalog_is_ready, catalog_open, core_version, init_logging, ping,
        product_create, product_delete, product_get, product_update, products_list,
        session_login,
    };
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_bad_input() {
        assert!(!init_logging("info".to_string(), String::new()).is_empty());
        assert!(!init_logging("verbose".to_string(), "tmp/logs".to_string()).is_empty());
    }

    #[test]
    fn session_login_requires_both_fields() {
        assert!(session_login("user".to_string(), "pass".to_string()));
        assert!(!session_login("user".to_string(), " ".to_string()));
    }

    #[test]
    fn created_product_is_listed_searchable_and_editable() {
        assert_eq!(catalog_open(), "");
        assert!(catalog_is_ready());

        let token = unique_token("ffi-create");
        let created = product_create(token.clone(), "uri://x".to_string(), None);
        assert!(created.ok, "{}", created.message);
        let id = created.product_id.expect("create should return product_id");

        let hits = products_list(Some(token.to_uppercase()));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, id);

        let updated = product_update(
            id.clone(),
            format!("{token} v2"),
            "uri://y".to_string(),
            Some("desc".to_string()),
        );
        assert!(updated.ok, "{}", updated.message);
        let fetched = product_get(id.clone()).expect("product should exist");
        assert_eq!(fetched.name, format!("{token} v2"));
        assert_eq!(fetched.description.as_deref(), Some("desc"));

        assert!(product_delete(id.clone()).ok);
        let again = product_delete(id.clone());
        assert!(!again.ok);
        assert!(again.message.contains("not found"));
        assert!(product_get(id).is_none());
        assert_eq!(catalog_flush(), 0);
    }

    #[test]
    fn create_rejects_blank_name() {
        assert_eq!(catalog_open(), "");
        let response = product_create("  ".to_string(), "uri://x".to_string(), None);
        assert!(!response.ok);
        assert!(response.product_id.is_none());
        assert!(response.message.contains("name"));
    }

    #[test]
    fn update_missing_product_fails() {
        assert_eq!(catalog_open(), "");
        let response = product_update(
            unique_token("missing"),
            "name".to_string(),
            "uri://x".to_string(),
            None,
        );
        assert!(!response.ok);
        assert!(response.message.contains("not found"));
    }

    fn unique_token(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}-{nanos}")
    }
}
