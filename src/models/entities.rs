//! Stored shapes of a product, one per backend.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{NewProduct, Product};

/// Row of the `products` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub available: bool,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            code: row.code,
            name: row.name,
            description: row.description,
            price: row.price,
            available: row.available,
            image_url: row.image_url,
        }
    }
}

/// MongoDB document. Price is kept as a decimal string to avoid float drift.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDocument {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Decimal,
    pub available: bool,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl From<&NewProduct> for ProductDocument {
    fn from(product: &NewProduct) -> Self {
        ProductDocument {
            code: product.code.clone(),
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            available: true,
            image_url: None,
        }
    }
}

impl From<ProductDocument> for Product {
    fn from(doc: ProductDocument) -> Self {
        Product {
            code: doc.code,
            name: doc.name,
            description: doc.description,
            price: doc.price,
            available: doc.available,
            image_url: doc.image_url,
        }
    }
}

/// Elasticsearch `_source`. The document id is the product code.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductIndexDocument {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Decimal,
    pub available: bool,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl From<&NewProduct> for ProductIndexDocument {
    fn from(product: &NewProduct) -> Self {
        ProductIndexDocument {
            code: product.code.clone(),
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            available: true,
            image_url: None,
        }
    }
}

impl From<ProductIndexDocument> for Product {
    fn from(doc: ProductIndexDocument) -> Self {
        Product {
            code: doc.code,
            name: doc.name,
            description: doc.description,
            price: doc.price,
            available: doc.available,
            image_url: doc.image_url,
        }
    }
}
