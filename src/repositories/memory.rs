use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    error::{AppError, Result},
    models::{NewProduct, Product},
};

use super::ProductRepository;

/// Process-local store used by tests and `CATALOG_STORE=memory`.
#[derive(Default)]
pub struct InMemoryProductRepository {
    products: RwLock<HashMap<String, Product>>,
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn find_by_code(&self, code: &str) -> Result<Option<Product>> {
        let products = self.products.read().await;
        Ok(products.get(code).cloned())
    }

    async fn update_image(&self, code: &str, image_url: &str) -> Result<bool> {
        let mut products = self.products.write().await;
        match products.get_mut(code) {
            Some(product) => {
                product.image_url = Some(image_url.to_string());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn save(&self, product: &NewProduct) -> Result<Product> {
        let mut products = self.products.write().await;
        if products.contains_key(&product.code) {
            return Err(AppError::DuplicateCode(product.code.clone()));
        }
        let stored = product.clone().into_product();
        products.insert(stored.code.clone(), stored.clone());
        Ok(stored)
    }

    async fn delete_all(&self) -> Result<()> {
        self.products.write().await.clear();
        Ok(())
    }

    async fn check_health(&self) -> Result<()> {
        Ok(())
    }
}
