//! Course Service Traits
//!
//! Trait definitions for the remote course service. The Conductor talks to
//! the service only through [`CourseService`], so the HTTP client can be
//! swapped for a scripted one in tests.
//!
//! # Design Philosophy
//!
//! The service answers a search with one of several loosely shaped payloads.
//! That shape is classified exactly once, at the client boundary, into a
//! [`SearchOutcome`] with one variant per status. Nothing downstream branches
//! on raw response fields.
//!
//! Each call is a single network exchange. Clients never retry on their own;
//! retrying is something the user asks for.

use async_trait::async_trait;

use crate::course::CourseRecord;

/// Placeholder measured for pacing when a success carries no text
pub const EMPTY_SUCCESS_PACING_TEXT: &str = "Found courses";

/// Classified result of a search request
#[derive(Clone, Debug, PartialEq)]
pub enum SearchOutcome {
    /// Courses matched the query
    Success {
        /// Narrative reply written by the service
        ai_message: Option<String>,
        /// Plain status text sent alongside the results
        message: Option<String>,
        /// Matching course records, in service order
        items: Vec<CourseRecord>,
        /// Classifier label (skill, department, job role, ...)
        match_kind: Option<String>,
        /// Total number of matches reported by the service
        total_results: Option<u64>,
    },
    /// Conversational reply that is not a search
    Chat {
        /// Reply text
        message: Option<String>,
    },
    /// Query is outside the course domain
    Rejected {
        /// Reply text
        message: Option<String>,
    },
    /// Nothing matched
    NotFound {
        /// Reply text
        message: Option<String>,
    },
}

impl SearchOutcome {
    /// Short label for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Success { .. } => "success",
            Self::Chat { .. } => "chat",
            Self::Rejected { .. } => "rejected",
            Self::NotFound { .. } => "not_found",
        }
    }

    /// Character count of the text the service returned
    ///
    /// This is what the pacing engine measures: `message` first, then
    /// `ai_message`. A success with neither is measured as a short
    /// placeholder.
    pub fn reply_text_len(&self) -> u64 {
        let text = match self {
            Self::Success {
                ai_message,
                message,
                ..
            } => Some(
                message
                    .as_deref()
                    .or(ai_message.as_deref())
                    .unwrap_or(EMPTY_SUCCESS_PACING_TEXT),
            ),
            Self::Chat { message } | Self::Rejected { message } | Self::NotFound { message } => {
                message.as_deref()
            }
        };
        text.map_or(0, |t| t.chars().count() as u64)
    }
}

/// Errors from the course service client
///
/// Every variant is a transport failure as far as the conversation is
/// concerned: no partial data survives it.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The HTTP client could not be built
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The request never produced a response
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service answered with a non-2xx status
    #[error("course service returned {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, if readable
        body: String,
    },

    /// The response body was not the expected JSON
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Course service trait
///
/// Implement this trait to plug a different course service into the
/// Conductor.
#[async_trait]
pub trait CourseService: Send + Sync {
    /// Get the service name for logs
    fn name(&self) -> &str;

    /// Run a search for a non-empty query
    async fn submit_query(&self, query: &str) -> Result<SearchOutcome, ServiceError>;

    /// Fetch suggestion prompts
    async fn suggestions(&self) -> Result<Vec<String>, ServiceError>;

    /// Fetch suggestion prompts, degrading to an empty list on any failure
    async fn fetch_suggestions(&self) -> Vec<String> {
        match self.suggestions().await {
            Ok(list) => list,
            Err(e) => {
                tracing::warn!(service = self.name(), error = %e, "Suggestion fetch failed");
                Vec::new()
            }
        }
    }
}
