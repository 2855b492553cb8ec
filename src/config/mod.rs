mod app_config;
mod s3_config;

pub use app_config::{
    AppConfig, CorsConfig, DatabaseConfig, ElasticsearchConfig, FileStorageBackend,
    FileStorageConfig, InventoryConfig, MongoConfig, S3Config, ServerConfig, StoreBackend,
    StoreConfig,
};
pub use s3_config::*;
