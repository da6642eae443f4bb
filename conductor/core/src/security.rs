//! Input Validation
//!
//! Guards the points where untrusted text enters the Conductor:
//! - Queries typed by the user
//! - Usernames from the sign-in form
//!
//! # Design Philosophy
//!
//! Validation is fail-safe: when in doubt, reject the input. A rejected
//! query never reaches the course service; the Conductor turns the reason
//! into an error message in the log instead.

use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

/// Length of the rate limit window
const RATE_WINDOW: Duration = Duration::from_secs(60);

/// Longest accepted username, in characters
const MAX_USERNAME_CHARS: usize = 64;

/// Configuration limits for the Conductor
///
/// These limits keep a runaway surface from flooding the course service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConductorLimits {
    /// Maximum query length in characters (default: 500)
    pub max_query_chars: usize,
    /// Maximum queries per minute (default: 30)
    pub queries_per_minute: u32,
}

impl Default for ConductorLimits {
    fn default() -> Self {
        Self {
            max_query_chars: 500,
            queries_per_minute: 30,
        }
    }
}

/// Result of input validation
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValidationResult {
    /// Input is valid
    Valid,
    /// Input is invalid with reason
    Invalid(String),
    /// Input was rate limited
    RateLimited(String),
}

impl ValidationResult {
    /// Check if the result indicates valid input
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Get the error message if invalid
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Valid => None,
            Self::Invalid(msg) | Self::RateLimited(msg) => Some(msg),
        }
    }
}

struct RateWindow {
    started: Instant,
    count: u32,
}

/// Input validator for surface events
///
/// Rejects:
/// - Oversized queries
/// - Control character injection
/// - Submissions beyond the per-minute budget
pub struct InputValidator {
    limits: ConductorLimits,
    window: Mutex<RateWindow>,
}

impl InputValidator {
    /// Create a new input validator with the given limits
    pub fn new(limits: ConductorLimits) -> Self {
        Self {
            limits,
            window: Mutex::new(RateWindow {
                started: Instant::now(),
                count: 0,
            }),
        }
    }

    /// Validate a trimmed, non-empty query
    ///
    /// Only queries that pass the content checks count toward the rate limit.
    pub fn validate_query(&self, query: &str) -> ValidationResult {
        let chars = query.chars().count();
        if chars > self.limits.max_query_chars {
            return ValidationResult::Invalid(format!(
                "That query is too long ({chars} characters, max {}). Try something shorter.",
                self.limits.max_query_chars
            ));
        }

        if has_control_chars(query) {
            return ValidationResult::Invalid(
                "That query contains characters I can't read. Please retype it.".to_string(),
            );
        }

        self.check_rate_limit()
    }

    /// Validate a trimmed username
    pub fn validate_username(&self, username: &str) -> ValidationResult {
        if username.is_empty() {
            return ValidationResult::Invalid("Please enter a username".to_string());
        }
        if username.chars().count() > MAX_USERNAME_CHARS {
            return ValidationResult::Invalid(format!(
                "Username too long (max {MAX_USERNAME_CHARS} characters)"
            ));
        }
        if username.chars().any(char::is_control) {
            return ValidationResult::Invalid(
                "Username contains invalid control characters".to_string(),
            );
        }
        ValidationResult::Valid
    }

    /// Check and update rate limit
    fn check_rate_limit(&self) -> ValidationResult {
        let mut window = self.window.lock();
        let now = Instant::now();

        if now.duration_since(window.started) >= RATE_WINDOW {
            window.started = now;
            window.count = 0;
        }

        window.count += 1;
        if window.count > self.limits.queries_per_minute {
            return ValidationResult::RateLimited(format!(
                "You're sending queries too quickly (max {} per minute). Please wait a moment.",
                self.limits.queries_per_minute
            ));
        }

        ValidationResult::Valid
    }
}

/// Control characters other than newline, tab and carriage return
fn has_control_chars(text: &str) -> bool {
    text.chars()
        .any(|c| c.is_control() && c != '\n' && c != '\t' && c != '\r')
}
