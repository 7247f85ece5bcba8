//! Wire records returned by the analysis backend.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, NaiveDate};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::{Endpoint, FetchError};

/// Sentiment label assigned by the upstream classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    /// Fixed chart order.
    pub const ALL: [Sentiment; 3] = [Sentiment::Positive, Sentiment::Neutral, Sentiment::Negative];

    /// Parse a backend label. Unrecognised labels give `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.label() == label)
    }

    /// Key used by the backend.
    pub fn label(&self) -> &'static str {
        match self {
            Sentiment::Positive => "POSITIVE",
            Sentiment::Neutral => "NEUTRAL",
            Sentiment::Negative => "NEGATIVE",
        }
    }

    /// Series name for the yearly trend chart.
    pub fn series_name(&self) -> &'static str {
        match self {
            Sentiment::Positive => "Positive",
            Sentiment::Neutral => "Neutral",
            Sentiment::Negative => "Negative",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Quality bucket assigned by the upstream classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quality {
    High,
    Average,
    Low,
}

impl Quality {
    /// Fixed chart order.
    pub const ALL: [Quality; 3] = [Quality::High, Quality::Average, Quality::Low];

    pub fn label(&self) -> &'static str {
        match self {
            Quality::High => "High Quality",
            Quality::Average => "Average Quality",
            Quality::Low => "Low Quality",
        }
    }
}

/// A row from `GET /comments`.
///
/// The backend columns are nullable and the sentiment label is free text, so
/// one odd row never fails the whole page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentRecord {
    #[serde(rename = "textOriginal")]
    pub text: String,
    /// Raw sentiment label as stored by the backend.
    #[serde(default)]
    pub sentiment: Option<String>,
    #[serde(default)]
    pub sentiment_score: Option<f64>,
    #[serde(rename = "publishedAt", default)]
    pub published_at: Option<String>,
    #[serde(rename = "QualityCategory", default)]
    pub quality_category: Option<String>,
}

impl CommentRecord {
    /// The sentiment label, if it is one of the known three.
    pub fn sentiment_kind(&self) -> Option<Sentiment> {
        self.sentiment.as_deref().and_then(Sentiment::from_label)
    }

    pub fn published_date(&self) -> Option<NaiveDate> {
        self.published_at.as_deref().and_then(parse_published)
    }
}

/// A row from `GET /categorized`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorizedComment {
    #[serde(rename = "textOriginal")]
    pub text: String,
    #[serde(rename = "predictedCategory")]
    pub predicted_category: String,
    pub confidence: f64,
    #[serde(rename = "publishedAt", default)]
    pub published_at: Option<String>,
}

impl CategorizedComment {
    /// Confidence rounded to two decimals for display.
    pub fn confidence_display(&self) -> String {
        format!("{:.2}", self.confidence)
    }

    pub fn published_date(&self) -> Option<NaiveDate> {
        self.published_at.as_deref().and_then(parse_published)
    }
}

/// Counts keyed by label, as returned by `/sentiment` and `/quality`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AggregateCounts(pub HashMap<String, u64>);

impl AggregateCounts {
    /// Count for a label, zero when absent.
    pub fn count(&self, label: &str) -> u64 {
        self.0.get(label).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }
}

impl<const N: usize> From<[(&str, u64); N]> for AggregateCounts {
    fn from(entries: [(&str, u64); N]) -> Self {
        Self(entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
    }
}

/// Per-year sentiment counts from `/sentiment_yearly`, in server order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct YearlyCounts(pub Vec<(String, AggregateCounts)>);

impl YearlyCounts {
    pub fn years(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(year, _)| year.as_str())
    }
}

/// Decode a JSON body into a typed record, tagging failures with the endpoint.
pub fn decode<T: DeserializeOwned>(endpoint: Endpoint, value: Value) -> Result<T, FetchError> {
    serde_json::from_value(value).map_err(|e| FetchError::Decode {
        endpoint: endpoint.path(),
        message: e.to_string(),
    })
}

/// Decode `/sentiment_yearly`, keeping the key order of the response.
pub fn decode_yearly(value: Value) -> Result<YearlyCounts, FetchError> {
    let endpoint = Endpoint::SentimentYearly;
    let Value::Object(map) = value else {
        return Err(FetchError::Decode {
            endpoint: endpoint.path(),
            message: "expected an object keyed by year".to_string(),
        });
    };

    map.into_iter()
        .map(|(year, counts)| {
            decode::<AggregateCounts>(endpoint, counts).map(|counts| (year, counts))
        })
        .collect::<Result<Vec<_>, FetchError>>()
        .map(YearlyCounts)
}

/// Pull the comment list for `category` out of a `/categorized` body.
///
/// The body is a single-key object `{ <category>: [...] }`; a missing key is
/// an empty page, not an error.
pub fn decode_categorized(
    value: Value,
    category: &str,
) -> Result<Vec<CategorizedComment>, FetchError> {
    let endpoint = Endpoint::Categorized;
    let Value::Object(mut map) = value else {
        return Err(FetchError::Decode {
            endpoint: endpoint.path(),
            message: "expected an object keyed by category".to_string(),
        });
    };

    match map.remove(category) {
        Some(list) => decode(endpoint, list),
        None => Ok(Vec::new()),
    }
}

fn parse_published(raw: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    raw.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
}
