use reqwest::{Client, StatusCode, Url};

use crate::{
    error::{AppError, Result},
    models::ProductInventory,
};

/// Client for the external inventory service.
#[derive(Clone)]
pub struct InventoryClient {
    http: Client,
    base_url: Url,
}

impl InventoryClient {
    pub fn new(http: Client, base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| AppError::ConfigError(format!("Invalid INVENTORY_SERVICE_URL: {}", e)))?;
        Ok(Self { http, base_url })
    }

    /// Looks up stock for `code`. Any failure is logged and treated as unknown.
    pub async fn get_inventory(&self, code: &str) -> Option<ProductInventory> {
        match self.fetch(code).await {
            Ok(inventory) => inventory,
            Err(e) => {
                tracing::warn!(code, error = %e, "Inventory lookup failed");
                None
            }
        }
    }

    async fn fetch(&self, code: &str) -> Result<Option<ProductInventory>> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::ConfigError("INVENTORY_SERVICE_URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(["api", "inventory", code]);

        let response = self.http.get(url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let inventory = response.error_for_status()?.json::<ProductInventory>().await?;
        Ok(Some(inventory))
    }
}
