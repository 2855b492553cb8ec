//! Background application of uploaded images to product records.
//!
//! Uploads return as soon as the bytes are stored; the record update happens
//! here afterwards, so readers observe `imageUrl` eventually.

use std::sync::Arc;

use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};
use tracing::instrument;

use crate::{
    error::{AppError, Result},
    models::ProductImageUploaded,
    repositories::ProductRepository,
    services::file_storage_service::FileStorage,
};

const CHANNEL_CAPACITY: usize = 256;

#[derive(Clone)]
pub struct ImageEventPublisher {
    tx: mpsc::Sender<ProductImageUploaded>,
}

impl ImageEventPublisher {
    pub async fn publish(&self, event: ProductImageUploaded) -> Result<()> {
        self.tx
            .send(event)
            .await
            .map_err(|_| AppError::InternalError("image update worker is not running".to_string()))
    }
}

/// Resolves the stored object's URL and writes it to the product.
#[derive(Clone)]
pub struct ImageUpdater {
    repo: Arc<dyn ProductRepository>,
    storage: Arc<dyn FileStorage>,
}

impl ImageUpdater {
    pub fn new(repo: Arc<dyn ProductRepository>, storage: Arc<dyn FileStorage>) -> Self {
        Self { repo, storage }
    }

    #[instrument(skip(self, event), fields(code = %event.code, key = %event.image_key))]
    pub async fn apply(&self, event: &ProductImageUploaded) -> Result<bool> {
        let url = self.storage.object_url(&event.image_key).await?;
        let updated = self.repo.update_image(&event.code, &url).await?;

        if updated {
            tracing::info!("Product image updated");
        } else {
            tracing::warn!("No product matched image update");
        }

        Ok(updated)
    }
}

/// Handle to the running consumer task.
pub struct ImageWorker {
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl ImageWorker {
    /// Stops accepting events, applies everything already queued and waits
    /// for the task to finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(());
        if let Err(e) = self.handle.await {
            tracing::error!(error = %e, "Image update worker panicked");
        }
    }
}

/// Starts the consumer task. It exits once every publisher is dropped or
/// [`ImageWorker::shutdown`] is called, in both cases after draining the queue.
pub fn spawn_image_worker(updater: ImageUpdater) -> (ImageEventPublisher, ImageWorker) {
    let (tx, mut rx) = mpsc::channel::<ProductImageUploaded>(CHANNEL_CAPACITY);
    let (shutdown, mut shutdown_rx) = oneshot::channel::<()>();

    let handle = tokio::spawn(async move {
        tracing::info!("Image update worker started");
        let mut closing = false;

        loop {
            tokio::select! {
                event = rx.recv() => {
                    let Some(event) = event else { break };
                    // Failed updates are not retried.
                    if let Err(e) = updater.apply(&event).await {
                        tracing::error!(code = %event.code, error = %e, "Failed to apply product image");
                    }
                }
                _ = &mut shutdown_rx, if !closing => {
                    // recv() keeps yielding buffered events, then None
                    rx.close();
                    closing = true;
                    tracing::info!("Image update worker draining");
                }
            }
        }

        tracing::info!("Image update worker stopped");
    });

    (ImageEventPublisher { tx }, ImageWorker { shutdown, handle })
}
