#![allow(dead_code)]

use std::{future::Future, net::SocketAddr, sync::Arc, time::Duration};

use catalog_service::{
    app::{build_router, AppState},
    config::{CorsConfig, ServerConfig},
    models::{NewProduct, Product},
    repositories::{InMemoryProductRepository, ProductRepository},
    services::{file_storage_service::InMemoryFileStorage, ProductService},
    AppError,
};
use rust_decimal::Decimal;
use tokio::net::TcpListener;

pub struct TestApp {
    pub base_url: String,
    pub products: Arc<ProductService>,
}

pub fn new_product(code: &str, price: Decimal) -> NewProduct {
    NewProduct {
        code: code.to_string(),
        name: format!("Product {}", code),
        description: Some(format!("Product {} description", code)),
        price,
    }
}

/// Fixture rows every API test starts from.
pub fn seed_products() -> Vec<NewProduct> {
    vec![
        new_product("P101", Decimal::new(340, 1)),
        new_product("P102", Decimal::new(250, 1)),
        new_product("P103", Decimal::new(150, 1)),
    ]
}

/// Boots the HTTP app on an ephemeral port with in-memory backends and the
/// fixture products loaded.
pub async fn spawn_app() -> anyhow::Result<TestApp> {
    let service = ProductService::new(
        Arc::new(InMemoryProductRepository::default()),
        Arc::new(InMemoryFileStorage::new("product-images")),
        None,
    );
    let state = AppState::new(service);

    for product in seed_products() {
        state.products.create_product(product).await?;
    }

    let server = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        max_body_size: 10 * 1024 * 1024,
    };
    let cors = CorsConfig {
        allowed_origins: vec![],
    };
    let app = build_router(state.clone(), &server, &cors)?;

    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            eprintln!("server error: {}", e);
        }
    });

    Ok(TestApp {
        base_url: format!("http://{}", addr),
        products: state.products,
    })
}

/// Polls `check` every 100ms for up to 10s until it yields a value.
pub async fn eventually<T, F, Fut>(mut check: F) -> Option<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Option<T>>,
{
    for _ in 0..100 {
        if let Some(value) = check().await {
            return Some(value);
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    None
}

/// Behaviour every `ProductRepository` backend must share. Expects an empty
/// store.
pub async fn assert_repository_contract(repo: &dyn ProductRepository) -> anyhow::Result<()> {
    let p101 = new_product("P101", Decimal::new(340, 1));

    assert!(repo.find_by_code("P101").await?.is_none());

    let saved = repo.save(&p101).await?;
    assert_eq!(saved.code, "P101");
    assert!(saved.available);
    assert!(saved.image_url.is_none());

    let fetched = repo.find_by_code("P101").await?.expect("saved product");
    assert_eq!(fetched.name, "Product P101");
    assert_eq!(fetched.description.as_deref(), Some("Product P101 description"));
    assert_eq!(fetched.price, Decimal::new(34, 0));
    assert!(fetched.available);
    assert!(fetched.image_url.is_none());

    let duplicate = repo.save(&p101).await;
    assert!(matches!(duplicate, Err(AppError::DuplicateCode(ref code)) if code == "P101"));

    assert!(repo.update_image("P101", "https://cdn.example.com/p101.jpg").await?);
    let updated = repo.find_by_code("P101").await?.expect("updated product");
    assert_eq!(updated.image_url.as_deref(), Some("https://cdn.example.com/p101.jpg"));
    assert_eq!(Product { image_url: None, ..updated }, fetched);

    assert!(!repo.update_image("P100001", "https://cdn.example.com/none.jpg").await?);
    assert!(repo.find_by_code("P100001").await?.is_none());

    repo.delete_all().await?;
    assert!(repo.find_by_code("P101").await?.is_none());

    repo.check_health().await?;
    Ok(())
}
