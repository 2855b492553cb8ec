use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::Mutex;
use tracing::{info, instrument};

use crate::{
    error::{AppError, Result},
    models::{ImageUploadResponse, NewProduct, Product, ProductImageUploaded},
    repositories::ProductRepository,
    services::{
        file_storage_service::FileStorage,
        image_events::{spawn_image_worker, ImageEventPublisher, ImageUpdater, ImageWorker},
        inventory_service::InventoryClient,
    },
};

/// Product operations independent of the configured store.
pub struct ProductService {
    repo: Arc<dyn ProductRepository>,
    storage: Arc<dyn FileStorage>,
    inventory: Option<InventoryClient>,
    updater: ImageUpdater,
    image_events: ImageEventPublisher,
    worker: Mutex<Option<ImageWorker>>,
}

impl ProductService {
    /// Must be called inside a tokio runtime; spawns the image update worker.
    pub fn new(
        repo: Arc<dyn ProductRepository>,
        storage: Arc<dyn FileStorage>,
        inventory: Option<InventoryClient>,
    ) -> Self {
        let updater = ImageUpdater::new(repo.clone(), storage.clone());
        let (image_events, worker) = spawn_image_worker(updater.clone());

        Self {
            repo,
            storage,
            inventory,
            updater,
            image_events,
            worker: Mutex::new(Some(worker)),
        }
    }

    /// Applies every queued image update and stops the worker. Uploads made
    /// afterwards fail. Safe to call more than once.
    pub async fn shutdown(&self) {
        let worker = self.worker.lock().await.take();
        if let Some(worker) = worker {
            worker.shutdown().await;
            info!("Image update queue drained");
        }
    }

    #[instrument(skip(self, product), fields(code = %product.code))]
    pub async fn create_product(&self, product: NewProduct) -> Result<Product> {
        let created = self.repo.save(&product).await?;
        info!("Product created");
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn get_product_by_code(&self, code: &str) -> Result<Option<Product>> {
        let Some(mut product) = self.repo.find_by_code(code).await? else {
            return Ok(None);
        };

        if let Some(inventory) = &self.inventory {
            if let Some(stock) = inventory.get_inventory(code).await {
                product.available = stock.quantity > 0;
            }
        }

        Ok(Some(product))
    }

    /// Stores the image and queues the record update. Returns before the
    /// product's `imageUrl` is written.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn update_product_image(
        &self,
        code: &str,
        filename: &str,
        content_type: Option<&str>,
        bytes: Bytes,
    ) -> Result<ImageUploadResponse> {
        if self.repo.find_by_code(code).await?.is_none() {
            return Err(AppError::ProductNotFound(code.to_string()));
        }

        let image_key = self.storage.store(code, bytes, filename, content_type).await?;

        self.image_events
            .publish(ProductImageUploaded {
                code: code.to_string(),
                image_key,
            })
            .await?;

        info!("Product image accepted");

        Ok(ImageUploadResponse {
            status: "success".to_string(),
            filename: filename.to_string(),
        })
    }

    /// Writes the URL of an already stored image to the product.
    pub async fn set_product_image(&self, code: &str, image_key: &str) -> Result<bool> {
        self.updater
            .apply(&ProductImageUploaded {
                code: code.to_string(),
                image_key: image_key.to_string(),
            })
            .await
    }

    /// Clears the store. Test support only.
    pub async fn delete_all_products(&self) -> Result<()> {
        self.repo.delete_all().await?;
        info!("All products deleted");
        Ok(())
    }

    pub async fn check_health(&self) -> Result<()> {
        self.repo.check_health().await
    }
}
