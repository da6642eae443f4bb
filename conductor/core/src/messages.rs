//! Conductor Messages
//!
//! Messages sent from the Conductor to UI surfaces. A surface never mutates
//! the conversation itself; it renders what these messages tell it and
//! forwards user intents back as [`SurfaceEvent`](crate::events::SurfaceEvent)s.
//!
//! # Design Philosophy
//!
//! The session log has exactly one writer (the Conductor). Every change to
//! the session is announced here in the order it happened, so a surface that
//! applies messages in arrival order always holds the same picture as a
//! fresh [`SessionSnapshot`](crate::session::SessionSnapshot).

use serde::{Deserialize, Serialize};

use crate::session::ConversationMessage;

/// Messages from Conductor to UI Surface
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum ConductorMessage {
    // ============================================
    // Conversation Messages
    // ============================================
    /// A message was appended to the session log
    ///
    /// This doubles as the "new message" notification surfaces use to
    /// scroll to the bottom of the transcript.
    Message {
        /// Stable position of the message in the log
        index: usize,
        /// The appended message
        message: ConversationMessage,
    },

    /// The uncommitted input text changed (suggestion click, retry, clear)
    Draft {
        /// New draft text
        text: String,
    },

    /// Suggestion prompts were shown or hidden
    SuggestionsVisible {
        /// Whether suggestions may be shown
        visible: bool,
    },

    /// Suggestion prompts arrived from the course service
    ///
    /// An empty list means the panel should stay absent.
    Suggestions {
        /// Example queries, in service order
        suggestions: Vec<String>,
    },

    // ============================================
    // Layout Directives
    // ============================================
    /// Layout hint for surface UI organization
    LayoutHint {
        /// The layout directive to apply
        directive: LayoutDirective,
    },

    // ============================================
    // System Messages
    // ============================================
    /// System notification
    Notify {
        /// Notification level
        level: NotifyLevel,
        /// Title (optional)
        title: Option<String>,
        /// Message content
        message: String,
    },

    /// Conductor state change
    State {
        /// The new state
        state: ConductorState,
    },

    /// Acknowledgment of received event
    Ack {
        /// Event ID being acknowledged
        event_id: EventId,
    },

    /// A session was established for a user
    SessionStarted {
        /// Session ID
        session_id: SessionId,
        /// The signed-in username
        owner: String,
    },

    /// The session was torn down (logout)
    SessionEnded {
        /// Session ID that ended
        session_id: SessionId,
    },

    /// Request surface to quit
    Quit {
        /// Optional goodbye message
        message: Option<String>,
    },
}

/// Message identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

impl MessageId {
    /// Generate a new unique message ID
    pub fn new() -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        Self(format!("msg_{id}"))
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

/// Event identifier (for acks)
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(pub String);

/// Session identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    /// Generate a new unique session ID
    pub fn new() -> Self {
        Self(format!("session_{}", uuid::Uuid::new_v4().simple()))
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Who sent a message
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageRole {
    /// User input
    User,
    /// Course Buddy
    Bot,
}

/// Layout directives for controlling UI surface organization
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum LayoutDirective {
    /// Focus the input field
    FocusInput,
    /// Scroll to a specific message
    ScrollToMessage {
        /// The message ID to scroll to
        message_id: MessageId,
    },
}

/// Notification levels
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotifyLevel {
    /// Informational
    Info,
    /// Warning
    Warning,
    /// Error
    Error,
}

/// Conductor operational states
///
/// `Composing`, `Thinking` and `Typing` are the pending states: input is
/// disabled while the Conductor is in any of them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConductorState {
    /// No user is signed in
    Idle,
    /// Ready for input
    Ready,
    /// Composing a welcome message
    Composing,
    /// Waiting on the course service
    Thinking,
    /// Holding a reply back so it lands at a natural pace
    Typing,
    /// Shutting down
    ShuttingDown,
}

impl ConductorState {
    /// Whether input is disabled in this state
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Composing | Self::Thinking | Self::Typing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_id_unique() {
        let id1 = MessageId::new();
        let id2 = MessageId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_session_id_unique() {
        let id1 = SessionId::new();
        let id2 = SessionId::new();
        assert_ne!(id1, id2);
        assert!(id1.0.starts_with("session_"));
    }

    #[test]
    fn test_pending_states() {
        assert!(ConductorState::Composing.is_pending());
        assert!(ConductorState::Thinking.is_pending());
        assert!(ConductorState::Typing.is_pending());
        assert!(!ConductorState::Ready.is_pending());
        assert!(!ConductorState::Idle.is_pending());
    }
}
