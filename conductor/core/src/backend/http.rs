//! HTTP Course Service
//!
//! [`CourseService`] over the course service's JSON API.
//!
//! # API
//!
//! - `POST {search_path}` with `{"query": "..."}` returns a payload tagged by
//!   `status` (`success`, `chat`, `rejected`, anything else means no match)
//! - `GET {suggestions_path}` returns `{"suggestions": ["..."]}`
//!
//! Any non-2xx status or unparseable body is a [`ServiceError`].

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::traits::{CourseService, SearchOutcome, ServiceError};
use crate::course::CourseRecord;

/// Default course service address
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
/// Default search endpoint path
pub const DEFAULT_SEARCH_PATH: &str = "/api/search";
/// Default suggestions endpoint path
pub const DEFAULT_SUGGESTIONS_PATH: &str = "/api/suggestions";
/// Default per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Where and how to reach the course service
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Scheme, host and port
    pub base_url: String,
    /// Search endpoint path
    pub search_path: String,
    /// Suggestions endpoint path
    pub suggestions_path: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            search_path: DEFAULT_SEARCH_PATH.to_string(),
            suggestions_path: DEFAULT_SUGGESTIONS_PATH.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ServiceConfig {
    /// Create with a base URL and default paths
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Full search URL
    pub fn search_url(&self) -> String {
        join_url(&self.base_url, &self.search_path)
    }

    /// Full suggestions URL
    pub fn suggestions_url(&self) -> String {
        join_url(&self.base_url, &self.suggestions_path)
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Search response as it appears on the wire
#[derive(Debug, Default, Deserialize)]
struct SearchResponseWire {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    ai_message: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    courses: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    matched_type: Option<String>,
    #[serde(default)]
    total_results: Option<serde_json::Value>,
}

impl From<SearchResponseWire> for SearchOutcome {
    fn from(wire: SearchResponseWire) -> Self {
        let message = non_empty(wire.message);
        match wire.status.as_deref() {
            Some("success") => Self::Success {
                ai_message: non_empty(wire.ai_message),
                message,
                items: wire
                    .courses
                    .unwrap_or_default()
                    .into_iter()
                    .filter_map(|course| match course {
                        serde_json::Value::Object(map) => Some(CourseRecord::from(map)),
                        _ => None,
                    })
                    .collect(),
                match_kind: non_empty(wire.matched_type),
                total_results: wire.total_results.as_ref().and_then(serde_json::Value::as_u64),
            },
            Some("chat") => Self::Chat { message },
            Some("rejected") => Self::Rejected { message },
            _ => Self::NotFound { message },
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Pull the suggestion list out of a response body
///
/// A missing or malformed `suggestions` field reads as an empty list.
fn parse_suggestions(body: &serde_json::Value) -> Vec<String> {
    body.get("suggestions")
        .and_then(serde_json::Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(serde_json::Value::as_str)
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

/// HTTP course service client
#[derive(Clone)]
pub struct HttpCourseService {
    config: ServiceConfig,
    http_client: reqwest::Client,
}

impl HttpCourseService {
    /// Create a new client
    pub fn new(config: ServiceConfig) -> Result<Self, ServiceError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ServiceError::Client)?;
        Ok(Self {
            config,
            http_client,
        })
    }

    async fn read_json(response: reqwest::Response) -> Result<serde_json::Value, ServiceError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::Status {
                status: status.as_u16(),
                body,
            });
        }
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl CourseService for HttpCourseService {
    fn name(&self) -> &'static str {
        "course-service"
    }

    async fn submit_query(&self, query: &str) -> Result<SearchOutcome, ServiceError> {
        let response = self
            .http_client
            .post(self.config.search_url())
            .json(&serde_json::json!({ "query": query }))
            .send()
            .await?;

        let body = Self::read_json(response).await?;
        let wire: SearchResponseWire = serde_json::from_value(body)?;
        let outcome = SearchOutcome::from(wire);

        tracing::debug!(kind = outcome.kind(), "Search response classified");
        Ok(outcome)
    }

    async fn suggestions(&self) -> Result<Vec<String>, ServiceError> {
        let response = self
            .http_client
            .get(self.config.suggestions_url())
            .send()
            .await?;

        let body = Self::read_json(response).await?;
        Ok(parse_suggestions(&body))
    }
}
