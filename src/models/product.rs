use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub available: bool,
    pub image_url: Option<String>,
}

/// Validated input for a product that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
}

impl NewProduct {
    pub fn into_product(self) -> Product {
        Product {
            code: self.code,
            name: self.name,
            description: self.description,
            price: self.price,
            available: true,
            image_url: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateProductRequest {
    pub code: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
}

impl CreateProductRequest {
    pub fn validate(self) -> Result<NewProduct> {
        let code = self
            .code
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| AppError::Validation("code is required".to_string()))?;

        // Codes are addressed as a single path segment.
        if code.chars().any(|c| c.is_control() || matches!(c, '/' | '?' | '#')) {
            return Err(AppError::Validation(
                "code must not contain control characters, '/', '?' or '#'".to_string(),
            ));
        }

        let name = self
            .name
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| AppError::Validation("name is required".to_string()))?;

        let price = self
            .price
            .ok_or_else(|| AppError::Validation("price is required".to_string()))?;

        if price.is_sign_negative() && !price.is_zero() {
            return Err(AppError::Validation("price must not be negative".to_string()));
        }

        Ok(NewProduct {
            code,
            name,
            description: self.description,
            price,
        })
    }
}

/// Emitted once an image is stored; consumed by the image update worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductImageUploaded {
    pub code: String,
    pub image_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageUploadResponse {
    pub status: String,
    pub filename: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductInventory {
    pub code: String,
    pub quantity: i64,
}
