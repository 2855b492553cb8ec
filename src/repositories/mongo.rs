use async_trait::async_trait;
use mongodb::{
    Client, Collection, IndexModel,
    bson::doc,
    error::{ErrorKind, WriteFailure},
    options::IndexOptions,
};

use crate::{
    config::MongoConfig,
    error::{AppError, Result},
    models::{NewProduct, Product, ProductDocument},
};

use super::ProductRepository;

const DUPLICATE_KEY: i32 = 11000;

pub struct MongoProductRepository {
    client: Client,
    database: String,
    products: Collection<ProductDocument>,
}

impl MongoProductRepository {
    pub async fn connect(config: &MongoConfig) -> Result<Self> {
        let client = Client::with_uri_str(&config.url).await?;
        let products = client
            .database(&config.database)
            .collection::<ProductDocument>(&config.collection);

        let code_index = IndexModel::builder()
            .keys(doc! { "code": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        products.create_index(code_index).await?;

        tracing::info!(
            database = %config.database,
            collection = %config.collection,
            "MongoDB connection established"
        );

        Ok(Self {
            client,
            database: config.database.clone(),
            products,
        })
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(e)) if e.code == DUPLICATE_KEY
    )
}

#[async_trait]
impl ProductRepository for MongoProductRepository {
    async fn find_by_code(&self, code: &str) -> Result<Option<Product>> {
        let found = self.products.find_one(doc! { "code": code }).await?;
        Ok(found.map(Product::from))
    }

    async fn update_image(&self, code: &str, image_url: &str) -> Result<bool> {
        let result = self
            .products
            .update_one(
                doc! { "code": code },
                doc! { "$set": { "imageUrl": image_url } },
            )
            .await?;

        Ok(result.matched_count > 0)
    }

    async fn save(&self, product: &NewProduct) -> Result<Product> {
        let document = ProductDocument::from(product);

        match self.products.insert_one(&document).await {
            Ok(_) => Ok(document.into()),
            Err(e) if is_duplicate_key(&e) => Err(AppError::DuplicateCode(product.code.clone())),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete_all(&self) -> Result<()> {
        let result = self.products.delete_many(doc! {}).await?;
        tracing::debug!(deleted = result.deleted_count, "Deleted all products");
        Ok(())
    }

    async fn check_health(&self) -> Result<()> {
        self.client
            .database(&self.database)
            .run_command(doc! { "ping": 1 })
            .await?;
        Ok(())
    }
}
