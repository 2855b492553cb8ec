use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
    config::ElasticsearchConfig,
    error::{AppError, Result},
    models::{NewProduct, Product, ProductIndexDocument},
};

use super::ProductRepository;

/// Product index over the Elasticsearch REST API. Documents are keyed by
/// product code so `_create` rejects duplicates.
pub struct ElasticsearchProductRepository {
    http: Client,
    base_url: Url,
    index: String,
}

#[derive(Debug, Deserialize)]
struct GetResponse {
    found: bool,
    #[serde(rename = "_source")]
    source: Option<ProductIndexDocument>,
}

#[derive(Debug, Deserialize)]
struct ByQueryResponse {
    #[serde(default)]
    updated: u64,
    #[serde(default)]
    deleted: u64,
}

impl ElasticsearchProductRepository {
    pub async fn connect(http: Client, config: &ElasticsearchConfig) -> Result<Self> {
        let base_url = Url::parse(&config.url)
            .map_err(|e| AppError::ConfigError(format!("Invalid ELASTICSEARCH_URL: {}", e)))?;

        let repo = Self {
            http,
            base_url,
            index: config.index.clone(),
        };
        repo.ensure_index().await?;

        tracing::info!(index = %repo.index, "Elasticsearch index ready");

        Ok(repo)
    }

    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::ConfigError("ELASTICSEARCH_URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder> {
        Ok(self.http.request(method, self.url(segments)?))
    }

    async fn ensure_index(&self) -> Result<()> {
        let exists = self.request(Method::HEAD, &[self.index.as_str()])?.send().await?;
        if exists.status().is_success() {
            return Ok(());
        }

        let mappings = json!({
            "mappings": {
                "properties": {
                    "code": { "type": "keyword" },
                    "name": { "type": "text" },
                    "description": { "type": "text" },
                    "price": { "type": "scaled_float", "scaling_factor": 100 },
                    "available": { "type": "boolean" },
                    "imageUrl": { "type": "keyword", "index": false }
                }
            }
        });

        let response = self
            .request(Method::PUT, &[self.index.as_str()])?
            .json(&mappings)
            .send()
            .await?;

        // A concurrent creator may have won the race.
        if response.status() == StatusCode::BAD_REQUEST {
            let body: Value = response.json().await?;
            if body["error"]["type"] == "resource_already_exists_exception" {
                return Ok(());
            }
            return Err(AppError::Search(format!("index creation failed: {}", body)));
        }

        ensure_success(response).await.map(|_| ())
    }
}

async fn ensure_success(response: Response) -> Result<Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(AppError::Search(format!("{}: {}", status, body)))
}

#[async_trait]
impl ProductRepository for ElasticsearchProductRepository {
    async fn find_by_code(&self, code: &str) -> Result<Option<Product>> {
        let response = self
            .request(Method::GET, &[self.index.as_str(), "_doc", code])?
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let found: GetResponse = ensure_success(response).await?.json().await?;
        Ok(found
            .source
            .filter(|_| found.found)
            .map(Product::from))
    }

    async fn update_image(&self, code: &str, image_url: &str) -> Result<bool> {
        let script = json!({
            "script": {
                "source": "ctx._source.imageUrl = params.imageUrl",
                "lang": "painless",
                "params": { "imageUrl": image_url }
            },
            "query": {
                "term": { "code": code }
            }
        });

        let response = self
            .request(Method::POST, &[self.index.as_str(), "_update_by_query"])?
            .query(&[("refresh", "true"), ("conflicts", "proceed")])
            .json(&script)
            .send()
            .await?;

        let result: ByQueryResponse = ensure_success(response).await?.json().await?;
        Ok(result.updated > 0)
    }

    async fn save(&self, product: &NewProduct) -> Result<Product> {
        let document = ProductIndexDocument::from(product);

        let response = self
            .request(Method::PUT, &[self.index.as_str(), "_create", product.code.as_str()])?
            .query(&[("refresh", "wait_for")])
            .json(&document)
            .send()
            .await?;

        if response.status() == StatusCode::CONFLICT {
            return Err(AppError::DuplicateCode(product.code.clone()));
        }
        ensure_success(response).await?;

        Ok(document.into())
    }

    async fn delete_all(&self) -> Result<()> {
        let response = self
            .request(Method::POST, &[self.index.as_str(), "_delete_by_query"])?
            .query(&[("refresh", "true"), ("conflicts", "proceed")])
            .json(&json!({ "query": { "match_all": {} } }))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }

        let result: ByQueryResponse = ensure_success(response).await?.json().await?;
        tracing::debug!(deleted = result.deleted, "Deleted all products");
        Ok(())
    }

    async fn check_health(&self) -> Result<()> {
        let response = self.request(Method::GET, &["_cluster", "health"])?.send().await?;
        ensure_success(response).await.map(|_| ())
    }
}
