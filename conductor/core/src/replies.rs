//! Reply Copy
//!
//! Fixed text the Conductor writes into the log, and the mapping from a
//! classified [`SearchOutcome`] to the single bot message it produces.

use serde::{Deserialize, Serialize};

use crate::backend::SearchOutcome;
use crate::session::ConversationMessage;

/// Placeholder replaced by the result count in [`ReplyCopy::success_template`]
pub const COUNT_PLACEHOLDER: &str = "{count}";

/// User-facing copy
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplyCopy {
    /// First welcome message
    pub greeting: String,
    /// Second welcome message
    pub capabilities: String,
    /// Error for a blank submission
    pub empty_query: String,
    /// Error for a failed request
    pub transport_failure: String,
    /// Success text when the service wrote none; `{count}` is substituted
    pub success_template: String,
    /// Default conversational reply
    pub chat: String,
    /// Default out-of-domain reply
    pub rejected: String,
    /// Default no-match reply
    pub not_found: String,
}

impl Default for ReplyCopy {
    fn default() -> Self {
        Self {
            greeting: "Hello! I'm Course Buddy. I can help you find certification courses \
                       and learning paths tailored to your career goals."
                .to_string(),
            capabilities: "Search for courses by skill, department, or job role.".to_string(),
            empty_query: "Please enter a query to search courses.".to_string(),
            transport_failure: "Formatting response... (Server busy, please retry)".to_string(),
            success_template: "Here are the best matches for you ({count} results):".to_string(),
            chat: "I'm here to help you find courses. What would you like to learn?".to_string(),
            rejected: "I focus on course recommendations. Ask me about Python, AI, or Web Dev!"
                .to_string(),
            not_found: "Sorry, I couldn't find any courses matching that. Try checking your \
                        spelling or ask for a broader topic."
                .to_string(),
        }
    }
}

impl ReplyCopy {
    /// Turn a classified outcome into the bot message it produces
    pub fn render(&self, outcome: SearchOutcome) -> ConversationMessage {
        match outcome {
            SearchOutcome::Success {
                ai_message,
                message,
                items,
                match_kind,
                total_results,
            } => {
                let text = ai_message.or(message).unwrap_or_else(|| {
                    let count = total_results.unwrap_or(items.len() as u64);
                    self.success_template
                        .replace(COUNT_PLACEHOLDER, &count.to_string())
                });
                ConversationMessage::results(text, items, match_kind)
            }
            SearchOutcome::Chat { message } => {
                ConversationMessage::bot(message.unwrap_or_else(|| self.chat.clone()))
            }
            SearchOutcome::Rejected { message } => {
                ConversationMessage::bot(message.unwrap_or_else(|| self.rejected.clone()))
            }
            SearchOutcome::NotFound { message } => {
                ConversationMessage::bot(message.unwrap_or_else(|| self.not_found.clone()))
            }
        }
    }

    /// Retry-eligible message for a failed request
    pub fn transport_failure(&self) -> ConversationMessage {
        ConversationMessage::error(self.transport_failure.clone())
    }
}
