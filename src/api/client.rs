//! HTTP client for the analysis backend.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use super::error::FetchError;
use super::request::{ApiRequest, Endpoint, QueryParams};
use crate::config::Settings;

/// Anything that can execute a derived request.
///
/// Controllers never talk to reqwest directly; the runtime hands their
/// tickets to a `Fetcher`, which keeps them testable with scripted responses.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn execute(&self, request: &ApiRequest) -> Result<Value, FetchError>;
}

/// Backend client. Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for the given base URL with no request timeout.
    pub fn new(base_url: &Url) -> Result<Self, FetchError> {
        Self::with_timeout(base_url, None, None)
    }

    /// Create a client from application settings.
    pub fn from_settings(settings: &Settings) -> Result<Self, FetchError> {
        Self::with_timeout(
            &settings.api_url,
            settings.request_timeout.map(Duration::from_secs),
            Some(&settings.user_agent),
        )
    }

    /// Create a client with an optional timeout and user agent.
    pub fn with_timeout(
        base_url: &Url,
        timeout: Option<Duration>,
        user_agent: Option<&str>,
    ) -> Result<Self, FetchError> {
        let mut builder = Client::builder().gzip(true).brotli(true);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(user_agent) = user_agent {
            builder = builder.user_agent(user_agent);
        }
        let client = builder.build().map_err(FetchError::transport)?;

        Ok(Self {
            client,
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL for an endpoint and its parameters.
    pub fn url_for(&self, endpoint: Endpoint, params: &QueryParams) -> String {
        let request = ApiRequest::new(endpoint, params.clone());
        format!("{}/{}", self.base_url, request.path_and_query())
    }

    /// Fetch an endpoint and return its JSON body.
    ///
    /// Non-2xx statuses become [`FetchError::HttpStatus`]; connection
    /// failures and unparseable bodies become [`FetchError::Transport`].
    pub async fn fetch(&self, endpoint: Endpoint, params: &QueryParams) -> Result<Value, FetchError> {
        let url = self.url_for(endpoint, params);
        debug!("GET {}", url);

        let start = Instant::now();
        let response = self.client.get(&url).send().await.map_err(|e| {
            warn!("Request to {} failed: {}", url, e);
            FetchError::transport(e)
        })?;

        let status = response.status();
        debug!("{} -> {} in {:?}", url, status, start.elapsed());

        if !status.is_success() {
            warn!("{} returned HTTP {}", url, status);
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        response.json::<Value>().await.map_err(|e| {
            warn!("Malformed body from {}: {}", url, e);
            FetchError::transport(e)
        })
    }
}

#[async_trait]
impl Fetcher for ApiClient {
    async fn execute(&self, request: &ApiRequest) -> Result<Value, FetchError> {
        self.fetch(request.endpoint, &request.params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(&Url::parse(base).unwrap()).unwrap()
    }

    #[test]
    fn test_url_for_trims_trailing_slash() {
        let client = client("http://localhost:5000/");
        assert_eq!(client.base_url(), "http://localhost:5000");
        let params = QueryParams::new().insert("page", 1).insert("limit", 100);
        assert_eq!(
            client.url_for(Endpoint::Comments, &params),
            "http://localhost:5000/comments?page=1&limit=100"
        );
    }

    #[test]
    fn test_url_for_keeps_base_path() {
        let client = client("http://example.com/api/");
        assert_eq!(
            client.url_for(Endpoint::SentimentYearly, &QueryParams::new()),
            "http://example.com/api/sentiment_yearly"
        );
    }

    #[test]
    fn test_url_for_encodes_category() {
        let client = client("http://localhost:5000");
        let params = QueryParams::new()
            .insert("category", "off topic")
            .insert("page", 1)
            .insert("limit", 25);
        assert_eq!(
            client.url_for(Endpoint::Categorized, &params),
            "http://localhost:5000/categorized?category=off%20topic&page=1&limit=25"
        );
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        // Port 9 (discard) on localhost is not expected to run an HTTP server.
        let client = client("http://127.0.0.1:9");
        let err = client
            .fetch(Endpoint::CategoriesList, &QueryParams::new())
            .await
            .unwrap_err();
        assert!(err.is_transport());
    }
}
