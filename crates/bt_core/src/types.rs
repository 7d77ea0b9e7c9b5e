use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// One record extracted from a bulletin container. Every field is a string
/// and is empty when the markup did not carry it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Article {
    #[serde(rename = "h1")]
    pub title: String,
    #[serde(rename = "p")]
    pub body: String,
    #[serde(rename = "img")]
    pub image: String,
    pub audio: String,
    pub link: String,
}

impl Article {
    pub fn has_image(&self) -> bool {
        !self.image.is_empty()
    }

    pub fn has_audio(&self) -> bool {
        !self.audio.is_empty()
    }

    pub fn has_link(&self) -> bool {
        !self.link.is_empty()
    }
}

/// Output of a single scrape: when it ran and what it found, in page order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeResult {
    pub timestamp: DateTime<Utc>,
    pub articles: Vec<Article>,
}

/// Wire shape of `GET /api/scrape`. Exactly one of `articles` and `error`
/// is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub articles: Option<Vec<Article>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl ApiResponse {
    pub fn success(result: ScrapeResult) -> Self {
        Self {
            timestamp: format_timestamp(&result.timestamp),
            articles: Some(result.articles),
            error: None,
        }
    }

    pub fn failure(timestamp: &DateTime<Utc>, message: impl Into<String>) -> Self {
        Self {
            timestamp: format_timestamp(timestamp),
            articles: None,
            error: Some(message.into()),
        }
    }

    /// Splits the response into the timestamp and articles, or the error
    /// message. Any non-empty `error` wins over `articles`.
    pub fn into_outcome(self) -> std::result::Result<(String, Vec<Article>), String> {
        match (self.error, self.articles) {
            (Some(error), _) if !error.is_empty() => Err(error),
            (_, Some(articles)) => Ok((self.timestamp, articles)),
            (_, None) => Err("Malformed response: no articles".to_string()),
        }
    }
}
