use crate::error::SourceError;
use crate::omdb::api;
use crate::traits::{CatalogSource, SearchRequest};
use async_trait::async_trait;
use catalog_config::OmdbConfig;
use catalog_models::{MovieLookup, MovieSummary};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

const USER_AGENT: &str = concat!("moviecatalog/", env!("CARGO_PKG_VERSION"));

/// Create a reqwest Client with the catalog's user agent and request timeout
pub fn create_omdb_client(timeout: Duration) -> Client {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| Client::new())
}

#[derive(Clone)]
pub struct OmdbClient {
    client: Arc<Client>,
    base_url: String,
    api_key: String,
}

impl OmdbClient {
    pub fn new(api_key: String, base_url: String, timeout: Duration) -> Self {
        Self {
            client: Arc::new(create_omdb_client(timeout)),
            base_url,
            api_key,
        }
    }

    pub fn from_config(config: &OmdbConfig) -> Result<Self, SourceError> {
        let api_key = config.resolved_api_key();
        if api_key.is_empty() {
            return Err(SourceError::new("OMDb API key is not configured"));
        }

        info!("Using OMDb catalog at {}", config.base_url);
        Ok(Self::new(
            api_key,
            config.base_url.clone(),
            Duration::from_secs(config.timeout_secs),
        ))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl CatalogSource for OmdbClient {
    fn source_name(&self) -> &str {
        "omdb"
    }

    async fn search(&self, request: &SearchRequest) -> Result<Vec<MovieSummary>, SourceError> {
        api::search_movies(&self.client, &self.base_url, &self.api_key, request).await
    }

    async fn details(&self, imdb_id: &str) -> MovieLookup {
        api::get_movie_details(&self.client, &self.base_url, &self.api_key, imdb_id).await
    }
}
