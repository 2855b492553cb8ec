use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    config::{load_s3_client, AppConfig, CorsConfig, FileStorageBackend, ServerConfig},
    error::{AppError, Result},
    repositories, routes,
    services::{
        file_storage_service::{FileStorage, InMemoryFileStorage, S3FileStorage},
        inventory_service::InventoryClient,
        ProductService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub products: Arc<ProductService>,
}

impl AppState {
    pub fn new(products: ProductService) -> Self {
        Self {
            products: Arc::new(products),
        }
    }
}

/// Connects the configured backends and starts the image update worker.
pub async fn build_state(config: &AppConfig) -> Result<AppState> {
    let http = reqwest::Client::builder()
        .timeout(config.http_client_timeout)
        .build()?;

    let repo = repositories::connect(&config.store, http.clone()).await?;
    let storage = build_file_storage(config).await?;

    let inventory = config
        .inventory
        .base_url
        .as_deref()
        .map(|url| InventoryClient::new(http.clone(), url))
        .transpose()?;

    Ok(AppState::new(ProductService::new(repo, storage, inventory)))
}

async fn build_file_storage(config: &AppConfig) -> Result<Arc<dyn FileStorage>> {
    let s3_config = &config.file_storage.s3;

    let storage: Arc<dyn FileStorage> = match config.file_storage.backend {
        FileStorageBackend::S3 => {
            let client = load_s3_client(s3_config).await?;
            Arc::new(S3FileStorage::new(client, s3_config))
        }
        FileStorageBackend::Memory => Arc::new(InMemoryFileStorage::new(s3_config.bucket.clone())),
    };

    if s3_config.create_bucket {
        storage.create_bucket(&s3_config.bucket).await?;
    }

    Ok(storage)
}

pub fn build_router(state: AppState, server: &ServerConfig, cors: &CorsConfig) -> Result<Router> {
    let allowed_origins: Vec<HeaderValue> = cors
        .allowed_origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .map_err(|_| AppError::ConfigError(format!("Invalid CORS origin: {}", origin)))
        })
        .collect::<Result<Vec<_>>>()?;

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([http::header::CONTENT_TYPE])
        .expose_headers([http::header::LOCATION])
        .allow_origin(allowed_origins);

    let app = routes::create_router()
        .layer(DefaultBodyLimit::max(server.max_body_size))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}
