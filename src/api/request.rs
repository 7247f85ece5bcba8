//! Endpoints, query parameters and derived requests.

use std::fmt;

/// Backend endpoints. All are GETs under the configured base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Comments,
    Categorized,
    CategoriesList,
    Sentiment,
    Quality,
    SentimentYearly,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Comments => "comments",
            Endpoint::Categorized => "categorized",
            Endpoint::CategoriesList => "categories_list",
            Endpoint::Sentiment => "sentiment",
            Endpoint::Quality => "quality",
            Endpoint::SentimentYearly => "sentiment_yearly",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Insertion-ordered query parameters.
///
/// Keys are only present when their value is non-empty, so an unset filter
/// never shows up as `?year=`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(&'static str, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter, skipping empty values.
    pub fn insert(mut self, key: &'static str, value: impl ToString) -> Self {
        let value = value.to_string();
        if !value.is_empty() {
            self.pairs.push((key, value));
        }
        self
    }

    /// Add a parameter only when a value is present.
    pub fn insert_opt<V: ToString>(self, key: &'static str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.insert(key, value),
            None => self,
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Serialize as `k=v&k=v` with every value percent-encoded.
    pub fn to_query_string(&self) -> String {
        self.pairs
            .iter()
            .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// A fully derived request: endpoint plus parameters.
///
/// Controllers compare the request they would issue now against the last one
/// they issued; equal requests are not refetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub endpoint: Endpoint,
    pub params: QueryParams,
}

impl ApiRequest {
    pub fn new(endpoint: Endpoint, params: QueryParams) -> Self {
        Self { endpoint, params }
    }

    pub fn bare(endpoint: Endpoint) -> Self {
        Self::new(endpoint, QueryParams::new())
    }

    /// Path and query relative to the API base, e.g. `comments?page=1&limit=100`.
    pub fn path_and_query(&self) -> String {
        if self.params.is_empty() {
            self.endpoint.path().to_string()
        } else {
            format!("{}?{}", self.endpoint.path(), self.params.to_query_string())
        }
    }
}

impl fmt::Display for ApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GET /{}", self.path_and_query())
    }
}
