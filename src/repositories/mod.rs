//! Product persistence contract and its backend implementations.
//!
//! Every backend exposes the same operations; which one is used is decided
//! once at startup from [`StoreConfig`].

mod elasticsearch;
mod memory;
mod mongo;
mod postgres;

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    config::{StoreBackend, StoreConfig},
    error::{AppError, Result},
    models::{NewProduct, Product},
};

pub use elasticsearch::ElasticsearchProductRepository;
pub use memory::InMemoryProductRepository;
pub use mongo::MongoProductRepository;
pub use postgres::PostgresProductRepository;

#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Exact match on `code`. A missing product is `Ok(None)`.
    async fn find_by_code(&self, code: &str) -> Result<Option<Product>>;

    /// Sets only the image field of the product identified by `code`, as one
    /// store-side operation. Returns whether a product matched.
    async fn update_image(&self, code: &str, image_url: &str) -> Result<bool>;

    /// Inserts a new product. Fails with [`AppError::DuplicateCode`] when the
    /// code is taken.
    async fn save(&self, product: &NewProduct) -> Result<Product>;

    async fn delete_all(&self) -> Result<()>;

    async fn check_health(&self) -> Result<()>;
}

pub async fn connect(
    config: &StoreConfig,
    http: reqwest::Client,
) -> Result<Arc<dyn ProductRepository>> {
    let missing = |section: &str| {
        AppError::ConfigError(format!("{} settings missing for selected store", section))
    };

    let repo: Arc<dyn ProductRepository> = match config.backend {
        StoreBackend::Postgres => {
            let db = config.database.as_ref().ok_or_else(|| missing("database"))?;
            Arc::new(PostgresProductRepository::connect(db).await?)
        }
        StoreBackend::Mongo => {
            let mongo = config.mongo.as_ref().ok_or_else(|| missing("mongo"))?;
            Arc::new(MongoProductRepository::connect(mongo).await?)
        }
        StoreBackend::Elasticsearch => {
            let es = config
                .elasticsearch
                .as_ref()
                .ok_or_else(|| missing("elasticsearch"))?;
            Arc::new(ElasticsearchProductRepository::connect(http, es).await?)
        }
        StoreBackend::Memory => Arc::new(InMemoryProductRepository::default()),
    };

    tracing::info!(backend = ?config.backend, "Product repository ready");

    Ok(repo)
}
