//! End-to-end tests: `CartStore` over `HttpCatalogClient` and `FileStorage`.
//!
//! A stub catalog runs on a local port; carts persist to a temporary directory.

use cart_store::catalog::HttpCatalogClient;
use cart_store::storage::{CartStorage, FileStorage};
use cart_store::{CartError, CartStore, CatalogApiConfig, ErrorKind, Operation, UpdateProductAmount};
use cart_store_core::ProductId;
use cart_store_integration_tests::StubCatalog;
use tempfile::TempDir;

const KEY: &str = "@shop:cart";

type Store = CartStore<HttpCatalogClient, FileStorage>;

fn catalog() -> StubCatalog {
    StubCatalog::new()
        .with_product(1, "Running Shoe", 179.9, 5)
        .with_product(2, "Trail Shoe", 139.9, 0)
        .with_product(3, "Sandal", 59.9, 2)
}

async fn open(catalog: &StubCatalog, dir: &TempDir) -> Store {
    let base_url = catalog.spawn().await.unwrap();
    let api = HttpCatalogClient::new(&CatalogApiConfig::new(base_url)).unwrap();
    CartStore::open(api, FileStorage::new(dir.path()), KEY).unwrap()
}

fn persisted(dir: &TempDir) -> String {
    FileStorage::new(dir.path()).get(KEY).unwrap().unwrap()
}

fn assert_in_sync(store: &Store, dir: &TempDir) {
    assert_eq!(persisted(dir), serde_json::to_string(&store.cart()).unwrap());
}

fn amounts(store: &Store) -> Vec<(i32, u32)> {
    store
        .cart()
        .iter()
        .map(|item| (item.id.as_i32(), item.amount))
        .collect()
}

// =============================================================================
// Add
// =============================================================================

#[tokio::test]
async fn test_add_new_then_increment() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = catalog();
    let store = open(&catalog, &dir).await;

    store.add_product(ProductId::new(1)).await.unwrap();
    assert_eq!(amounts(&store), vec![(1, 1)]);
    assert_in_sync(&store, &dir);

    store.add_product(ProductId::new(1)).await.unwrap();
    assert_eq!(amounts(&store), vec![(1, 2)]);
    assert_in_sync(&store, &dir);

    let cart = store.cart();
    let item = cart.get(ProductId::new(1)).unwrap();
    assert_eq!(item.title.as_deref(), Some("Running Shoe"));
    assert_eq!(item.image.as_deref(), Some("https://cdn.example.com/1.jpg"));
}

#[tokio::test]
async fn test_add_with_stock_record_without_id() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = catalog();
    catalog.set_stock_body(1, serde_json::json!({ "amount": 5 }));
    let store = open(&catalog, &dir).await;

    store.add_product(ProductId::new(1)).await.unwrap();

    assert_eq!(amounts(&store), vec![(1, 1)]);
    assert_in_sync(&store, &dir);
}

#[tokio::test]
async fn test_add_with_stock_for_other_product_is_failure() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = catalog();
    catalog.set_stock_body(1, serde_json::json!({ "id": 9, "amount": 5 }));
    let store = open(&catalog, &dir).await;

    let err = store.add_product(ProductId::new(1)).await.unwrap_err();

    assert!(matches!(
        err,
        CartError::Failed {
            operation: Operation::Add,
            ..
        }
    ));
    assert!(store.cart().is_empty());
    assert_eq!(catalog.product_requests(), 0);
    assert_eq!(FileStorage::new(dir.path()).get(KEY).unwrap(), None);
}

#[tokio::test]
async fn test_add_out_of_stock_product() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = catalog();
    let store = open(&catalog, &dir).await;

    let err = store.add_product(ProductId::new(2)).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::OutOfStock);
    assert!(store.cart().is_empty());
    assert_eq!(FileStorage::new(dir.path()).get(KEY).unwrap(), None);
}

#[tokio::test]
async fn test_add_unknown_product_is_failure() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = catalog();
    let store = open(&catalog, &dir).await;

    let err = store.add_product(ProductId::new(404)).await.unwrap_err();

    assert!(matches!(
        err,
        CartError::Failed {
            operation: Operation::Add,
            ..
        }
    ));
    assert_eq!(err.user_message(), "Failed to add product");
}

#[tokio::test]
async fn test_catalog_outage_changes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = catalog();
    let store = open(&catalog, &dir).await;
    store.add_product(ProductId::new(1)).await.unwrap();
    let before = persisted(&dir);

    catalog.set_failing(true);
    let add = store.add_product(ProductId::new(1)).await.unwrap_err();
    let update = store
        .update_product_amount(UpdateProductAmount {
            product_id: ProductId::new(1),
            amount: 3,
        })
        .await
        .unwrap_err();

    assert_eq!(add.kind(), ErrorKind::Failure);
    assert_eq!(update.kind(), ErrorKind::Failure);
    assert_eq!(amounts(&store), vec![(1, 1)]);
    assert_eq!(persisted(&dir), before);
}

#[tokio::test]
async fn test_product_details_are_cached() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = catalog();
    let store = open(&catalog, &dir).await;

    store.add_product(ProductId::new(3)).await.unwrap();
    store.remove_product(ProductId::new(3)).unwrap();
    store.add_product(ProductId::new(3)).await.unwrap();

    assert_eq!(catalog.product_requests(), 1);
    assert_eq!(amounts(&store), vec![(3, 1)]);
}

#[tokio::test]
async fn test_stock_is_checked_on_every_add() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = catalog();
    let store = open(&catalog, &dir).await;

    store.add_product(ProductId::new(3)).await.unwrap();
    catalog.set_stock(3, 1);

    let err = store.add_product(ProductId::new(3)).await.unwrap_err();
    assert!(matches!(
        err,
        CartError::OutOfStock {
            requested: 2,
            available: 1,
            ..
        }
    ));
}

// =============================================================================
// Remove / Update
// =============================================================================

#[tokio::test]
async fn test_remove_and_update() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = catalog();
    let store = open(&catalog, &dir).await;
    store.add_product(ProductId::new(1)).await.unwrap();
    store.add_product(ProductId::new(3)).await.unwrap();

    store
        .update_product_amount(UpdateProductAmount {
            product_id: ProductId::new(1),
            amount: 5,
        })
        .await
        .unwrap();
    assert_eq!(amounts(&store), vec![(1, 5), (3, 1)]);
    assert_in_sync(&store, &dir);

    let err = store.remove_product(ProductId::new(99)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    store.remove_product(ProductId::new(1)).unwrap();
    assert_eq!(amounts(&store), vec![(3, 1)]);
    assert_in_sync(&store, &dir);
}

#[tokio::test]
async fn test_update_beyond_stock() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = catalog();
    let store = open(&catalog, &dir).await;
    store.add_product(ProductId::new(3)).await.unwrap();

    let err = store
        .update_product_amount(UpdateProductAmount {
            product_id: ProductId::new(3),
            amount: 3,
        })
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::OutOfStock);
    assert_eq!(amounts(&store), vec![(3, 1)]);
}

// =============================================================================
// Persistence
// =============================================================================

#[tokio::test]
async fn test_cart_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = catalog();

    let store = open(&catalog, &dir).await;
    store.add_product(ProductId::new(3)).await.unwrap();
    store.add_product(ProductId::new(1)).await.unwrap();
    store.add_product(ProductId::new(1)).await.unwrap();
    drop(store);

    let reopened = open(&catalog, &dir).await;
    assert_eq!(amounts(&reopened), vec![(3, 1), (1, 2)]);
}

#[tokio::test]
async fn test_extra_product_attributes_are_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = catalog();
    catalog.set_product(
        7,
        serde_json::json!({
            "id": 7,
            "title": "Boot",
            "price": 249.5,
            "image": "https://cdn.example.com/7.jpg",
            "brand": "Acme",
        }),
    );
    catalog.set_stock(7, 1);
    let store = open(&catalog, &dir).await;

    store.add_product(ProductId::new(7)).await.unwrap();

    let stored: serde_json::Value = serde_json::from_str(&persisted(&dir)).unwrap();
    assert_eq!(stored[0]["brand"], "Acme");
    assert_eq!(stored[0]["price"], 249.5);
    assert_eq!(stored[0]["amount"], 1);
}
