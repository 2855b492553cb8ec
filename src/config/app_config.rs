use crate::error::{AppError, Result};
use std::{env, str::FromStr, time::Duration};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub store: StoreConfig,
    pub file_storage: FileStorageConfig,
    pub inventory: InventoryConfig,
    pub http_client_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_body_size: usize,
}

#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Mongo,
    Elasticsearch,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            "mongo" | "mongodb" => Ok(StoreBackend::Mongo),
            "elasticsearch" | "elastic" => Ok(StoreBackend::Elasticsearch),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(AppError::ConfigError(format!(
                "Unknown CATALOG_STORE value: {}",
                other
            ))),
        }
    }
}

/// Connection settings for the selected store. Only the section matching
/// `backend` is populated.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub database: Option<DatabaseConfig>,
    pub mongo: Option<MongoConfig>,
    pub elasticsearch: Option<ElasticsearchConfig>,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct MongoConfig {
    pub url: String,
    pub database: String,
    pub collection: String,
}

#[derive(Debug, Clone)]
pub struct ElasticsearchConfig {
    pub url: String,
    pub index: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStorageBackend {
    S3,
    Memory,
}

#[derive(Debug, Clone)]
pub struct FileStorageConfig {
    pub backend: FileStorageBackend,
    pub s3: S3Config,
}

#[derive(Debug, Clone)]
pub struct S3Config {
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub region: String,
    pub endpoint: Option<String>,
    pub bucket: String,
    pub create_bucket: bool,
    pub assets_url: Option<String>,
    pub url_expiry: Duration,
}

#[derive(Debug, Clone)]
pub struct InventoryConfig {
    pub base_url: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let backend: StoreBackend = env_or("CATALOG_STORE", "postgres").parse()?;

        Ok(Self {
            server: ServerConfig {
                host: env_or("HOST", "0.0.0.0"),
                port: parse_env("PORT", "3000")?,
                max_body_size: parse_env("MAX_BODY_SIZE", "10485760")?,
            },
            cors: CorsConfig {
                allowed_origins: optional_env("FRONTEND_URL")
                    .map(|origins| {
                        origins
                            .split(',')
                            .map(|s| s.trim().to_string())
                            .filter(|s| !s.is_empty())
                            .collect()
                    })
                    .unwrap_or_default(),
            },
            store: StoreConfig {
                backend,
                database: match backend {
                    StoreBackend::Postgres => Some(DatabaseConfig {
                        url: env::var("DB_URL")
                            .map_err(|_| AppError::ConfigError("DB_URL not set".to_string()))?,
                        max_connections: parse_env("DB_MAX_CONNECTIONS", "20")?,
                    }),
                    _ => None,
                },
                mongo: match backend {
                    StoreBackend::Mongo => Some(MongoConfig {
                        url: env::var("MONGO_URL")
                            .map_err(|_| AppError::ConfigError("MONGO_URL not set".to_string()))?,
                        database: env_or("MONGO_DATABASE", "catalog"),
                        collection: env_or("MONGO_COLLECTION", "products"),
                    }),
                    _ => None,
                },
                elasticsearch: match backend {
                    StoreBackend::Elasticsearch => Some(ElasticsearchConfig {
                        url: env::var("ELASTICSEARCH_URL").map_err(|_| {
                            AppError::ConfigError("ELASTICSEARCH_URL not set".to_string())
                        })?,
                        index: env_or("ELASTICSEARCH_INDEX", "products"),
                    }),
                    _ => None,
                },
            },
            file_storage: FileStorageConfig {
                backend: match env_or("FILE_STORAGE", "s3").to_ascii_lowercase().as_str() {
                    "s3" => FileStorageBackend::S3,
                    "memory" => FileStorageBackend::Memory,
                    other => {
                        return Err(AppError::ConfigError(format!(
                            "Unknown FILE_STORAGE value: {}",
                            other
                        )));
                    }
                },
                s3: S3Config {
                    access_key_id: optional_env("AWS_ACCESS_KEY_ID"),
                    secret_access_key: optional_env("AWS_SECRET_ACCESS_KEY"),
                    region: env_or("AWS_REGION", "us-east-1"),
                    endpoint: optional_env("S3_ENDPOINT"),
                    bucket: env_or("PRODUCT_IMAGES_BUCKET", "product-images"),
                    create_bucket: parse_env("S3_CREATE_BUCKET", "false")?,
                    assets_url: optional_env("ASSETS_URL"),
                    url_expiry: Duration::from_secs(parse_env("IMAGE_URL_EXPIRY_SECS", "604800")?),
                },
            },
            inventory: InventoryConfig {
                base_url: optional_env("INVENTORY_SERVICE_URL"),
            },
            http_client_timeout: Duration::from_secs(parse_env("HTTP_CLIENT_TIMEOUT_SECS", "10")?),
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn optional_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T: FromStr>(key: &str, default: &str) -> Result<T> {
    env_or(key, default)
        .parse()
        .map_err(|_| AppError::ConfigError(format!("Invalid {} value", key)))
}
