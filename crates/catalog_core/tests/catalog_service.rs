use catalog_core::{
    filter_by_name, seed_products, CatalogService, CatalogServiceError, DraftValidationError,
    KeyValueStore, MemoryKeyValueStore, ProductDraft, ProductRepository, RepositoryConfig,
    DEFAULT_STORAGE_KEY,
};
use std::sync::Arc;

async fn service() -> CatalogService {
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryKeyValueStore::new());
    let repo = ProductRepository::new(store, RepositoryConfig::default());
    repo.hydrate().await;
    CatalogService::new(repo)
}

#[tokio::test]
async fn add_product_trims_fields_and_drops_blank_description() {
    let service = service().await;

    let created = service
        .add_product(&ProductDraft::new("  Desk Lamp ", " uri://lamp ").with_description("   "))
        .unwrap();
    assert_eq!(created.name, "Desk Lamp");
    assert_eq!(created.image, "uri://lamp");
    assert_eq!(created.description, None);
    assert_eq!(service.product(&created.id), Some(created));
}

#[tokio::test]
async fn blank_name_or_image_never_reaches_repository() {
    let service = service().await;

    let err = service
        .add_product(&ProductDraft::new(" ", "uri://x"))
        .unwrap_err();
    assert_eq!(
        err,
        CatalogServiceError::InvalidDraft(DraftValidationError::EmptyName)
    );
    let err = service
        .edit_product("1", &ProductDraft::new("Phone", ""))
        .unwrap_err();
    assert_eq!(
        err,
        CatalogServiceError::InvalidDraft(DraftValidationError::EmptyImage)
    );
    assert_eq!(service.search(None), seed_products());
}

#[tokio::test]
async fn edit_and_remove_missing_product_report_not_found() {
    let service = service().await;

    let err = service
        .edit_product("ghost", &ProductDraft::new("a", "b"))
        .unwrap_err();
    assert_eq!(err, CatalogServiceError::ProductNotFound("ghost".to_string()));
    assert!(matches!(
        service.remove_product("ghost"),
        Err(CatalogServiceError::ProductNotFound(_))
    ));
}

#[tokio::test]
async fn ids_are_passed_through_unchanged() {
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryKeyValueStore::with_entry(
        DEFAULT_STORAGE_KEY,
        r#"[{"id":" spaced ","name":"Old","image":"uri://o"}]"#,
    ));
    let repo = ProductRepository::new(store, RepositoryConfig::default());
    repo.hydrate().await;
    let service = CatalogService::new(repo);

    assert!(service.product("spaced").is_none());
    assert_eq!(service.product(" spaced ").unwrap().name, "Old");

    let edited = service
        .edit_product(" spaced ", &ProductDraft::new("New", "uri://n"))
        .unwrap();
    assert_eq!(edited.id, " spaced ");
    assert_eq!(edited.name, "New");
    assert!(matches!(
        service.remove_product("spaced"),
        Err(CatalogServiceError::ProductNotFound(_))
    ));
    assert_eq!(service.remove_product(" spaced ").unwrap().id, " spaced ");
    assert!(service.search(None).is_empty());
}

#[tokio::test]
async fn search_filters_by_case_insensitive_name() {
    let service = service().await;

    let hits = service.search(Some("PRO"));
    let names: Vec<_> = hits.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["iPhone 15 Pro", "MacBook Pro M3", "AirPods Pro"]);

    assert_eq!(service.search(Some("")).len(), 5);
    assert_eq!(service.search(Some("   ")).len(), 5);
    assert!(service.search(Some("toaster")).is_empty());
}

#[test]
fn filter_by_name_ignores_description_and_keeps_order() {
    let products = seed_products();
    let hits = filter_by_name(&products, "chip");
    assert!(hits.is_empty());

    let hits = filter_by_name(&products, "a");
    let ids: Vec<_> = hits.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["2", "3", "4", "5"]);
}

#[test]
fn filter_by_name_matches_query_with_its_whitespace() {
    let products = seed_products();
    let names = |query: &str| -> Vec<String> {
        filter_by_name(&products, query)
            .into_iter()
            .map(|p| p.name)
            .collect()
    };

    assert_eq!(names("air"), vec!["AirPods Pro", "iPad Air"]);
    assert!(names("air ").is_empty());
    assert_eq!(names("pods pro"), vec!["AirPods Pro"]);
}
