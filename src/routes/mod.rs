mod health;
mod products;

use axum::{
    routing::{get, post},
    Router,
};

use crate::AppState;

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .route("/api/products", post(products::create_product))
        .route("/api/products/{code}", get(products::get_product))
        .route("/api/products/{code}/image", post(products::upload_product_image))
}
