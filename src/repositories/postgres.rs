use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    config::DatabaseConfig,
    database,
    error::Result,
    models::{NewProduct, Product},
    queries::product_queries,
};

use super::ProductRepository;

pub struct PostgresProductRepository {
    pub db: PgPool,
}

impl PostgresProductRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Opens the pool and applies pending migrations.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        Ok(Self::new(database::create_pool(config).await?))
    }
}

#[async_trait]
impl ProductRepository for PostgresProductRepository {
    async fn find_by_code(&self, code: &str) -> Result<Option<Product>> {
        let row = product_queries::find_by_code(&self.db, code).await?;
        Ok(row.map(Product::from))
    }

    async fn update_image(&self, code: &str, image_url: &str) -> Result<bool> {
        let updated = product_queries::update_image(&self.db, code, image_url).await?;
        Ok(updated > 0)
    }

    async fn save(&self, product: &NewProduct) -> Result<Product> {
        let row = product_queries::insert(&self.db, product).await?;
        Ok(row.into())
    }

    async fn delete_all(&self) -> Result<()> {
        let deleted = product_queries::delete_all(&self.db).await?;
        tracing::debug!(deleted, "Deleted all products");
        Ok(())
    }

    async fn check_health(&self) -> Result<()> {
        database::check_health(&self.db).await
    }
}
