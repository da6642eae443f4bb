//! Session Management
//!
//! A session is the conversation of one signed-in user. It is created empty
//! when an identity is established and dropped on logout; two identities never
//! share one.
//!
//! # Design Philosophy
//!
//! The Conductor is the only writer. The message log is append-only: entries
//! are never removed or edited, so a message index stays valid for the whole
//! life of the session. Surfaces read a [`SessionSnapshot`] and never touch
//! the session directly.

use serde::{Deserialize, Serialize};

use crate::course::CourseRecord;
use crate::messages::{ConductorState, MessageId, MessageRole, SessionId};

/// Most messages the log may hold while the suggestion panel is still shown
const SUGGESTION_PANEL_MAX_MESSAGES: usize = 2;

/// A message in the conversation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConversationMessage {
    /// Unique message ID
    pub id: MessageId,
    /// Who sent this message
    pub role: MessageRole,
    /// Display text (may be empty only when `items` is not)
    pub text: String,
    /// Marks a failed turn that the user can retry
    pub is_error: bool,
    /// Course records attached to a search result, in service order
    #[serde(default)]
    pub items: Vec<CourseRecord>,
    /// Classifier label the service attached to the results
    #[serde(default)]
    pub match_kind: Option<String>,
    /// When the message was created (Unix timestamp ms)
    pub timestamp: u64,
}

impl ConversationMessage {
    fn new(role: MessageRole, text: String) -> Self {
        Self {
            id: MessageId::new(),
            role,
            text,
            is_error: false,
            items: Vec::new(),
            match_kind: None,
            timestamp: now_ms(),
        }
    }

    /// A query typed by the user
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(MessageRole::User, text.into())
    }

    /// A plain bot reply
    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(MessageRole::Bot, text.into())
    }

    /// A bot message marking a failed turn
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            is_error: true,
            ..Self::new(MessageRole::Bot, text.into())
        }
    }

    /// A bot reply carrying search results
    pub fn results(
        text: impl Into<String>,
        items: Vec<CourseRecord>,
        match_kind: Option<String>,
    ) -> Self {
        Self {
            items,
            match_kind,
            ..Self::new(MessageRole::Bot, text.into())
        }
    }

    /// Whether the user wrote this message
    pub fn is_user(&self) -> bool {
        self.role == MessageRole::User
    }
}

/// Session metadata
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionMetadata {
    /// When the session was created (Unix timestamp ms)
    pub created_at: u64,
    /// When the session was last active (Unix timestamp ms)
    pub last_active_at: u64,
    /// Total messages appended
    pub message_count: u32,
    /// Queries sent to the course service
    pub turns: u32,
}

impl SessionMetadata {
    fn new() -> Self {
        let now = now_ms();
        Self {
            created_at: now,
            last_active_at: now,
            message_count: 0,
            turns: 0,
        }
    }

    fn touch(&mut self) {
        self.last_active_at = now_ms();
    }
}

/// Progress of the welcome sequence
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WelcomePhase {
    /// Not started yet
    NotStarted,
    /// Steps are still being played out
    Running,
    /// Completed or cut short
    Finished,
}

/// A conversation session
#[derive(Clone, Debug)]
pub struct Session {
    id: SessionId,
    owner: String,
    state: ConductorState,
    messages: Vec<ConversationMessage>,
    suggestions_visible: bool,
    suggestions: Vec<String>,
    suggestions_fetched: bool,
    draft: String,
    welcome: WelcomePhase,
    metadata: SessionMetadata,
}

impl Session {
    /// Create an empty session for `owner`
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            id: SessionId::new(),
            owner: owner.into(),
            state: ConductorState::Ready,
            messages: Vec::new(),
            suggestions_visible: false,
            suggestions: Vec::new(),
            suggestions_fetched: false,
            draft: String::new(),
            welcome: WelcomePhase::NotStarted,
            metadata: SessionMetadata::new(),
        }
    }

    /// Session ID
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// The signed-in username
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Current state
    pub fn state(&self) -> ConductorState {
        self.state
    }

    /// Whether input is disabled
    pub fn is_pending(&self) -> bool {
        self.state.is_pending()
    }

    /// The message log
    pub fn messages(&self) -> &[ConversationMessage] {
        &self.messages
    }

    /// Current draft text
    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Whether suggestions may be shown
    pub fn suggestions_visible(&self) -> bool {
        self.suggestions_visible
    }

    /// Fetched suggestion prompts
    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    /// Session metadata
    pub fn metadata(&self) -> &SessionMetadata {
        &self.metadata
    }

    /// Append a message, returning its index
    pub fn push(&mut self, message: ConversationMessage) -> usize {
        if message.is_user() {
            self.metadata.turns += 1;
        }
        self.messages.push(message);
        self.metadata.message_count += 1;
        self.metadata.touch();
        self.messages.len() - 1
    }

    /// Set the state, returning whether it changed
    pub fn set_state(&mut self, state: ConductorState) -> bool {
        let changed = self.state != state;
        self.state = state;
        changed
    }

    /// Replace the draft, returning whether it changed
    pub fn set_draft(&mut self, text: impl Into<String>) -> bool {
        let text = text.into();
        let changed = self.draft != text;
        self.draft = text;
        changed
    }

    /// Show suggestions, returning whether this was a transition
    pub fn show_suggestions(&mut self) -> bool {
        !std::mem::replace(&mut self.suggestions_visible, true)
    }

    /// Hide suggestions, returning whether this was a transition
    pub fn hide_suggestions(&mut self) -> bool {
        std::mem::replace(&mut self.suggestions_visible, false)
    }

    /// Claim the one suggestion fetch this session gets
    ///
    /// Returns `true` the first time only.
    pub fn claim_suggestion_fetch(&mut self) -> bool {
        !std::mem::replace(&mut self.suggestions_fetched, true)
    }

    /// Store fetched suggestions
    pub fn set_suggestions(&mut self, suggestions: Vec<String>) {
        self.suggestions = suggestions;
    }

    /// Most recent message the user wrote
    pub fn last_user_message(&self) -> Option<&ConversationMessage> {
        self.messages.iter().rev().find(|m| m.is_user())
    }

    /// Welcome sequence progress
    pub fn welcome_phase(&self) -> WelcomePhase {
        self.welcome
    }

    /// Whether welcome steps may still mutate the session
    pub fn welcome_running(&self) -> bool {
        self.welcome == WelcomePhase::Running
    }

    /// Mark the welcome sequence as started
    ///
    /// Returns `false` when the log already has messages or a welcome
    /// already ran for this session.
    pub fn begin_welcome(&mut self) -> bool {
        if self.welcome != WelcomePhase::NotStarted
            || !self.messages.is_empty()
            || self.owner.is_empty()
        {
            return false;
        }
        self.welcome = WelcomePhase::Running;
        true
    }

    /// End the welcome sequence, returning whether it was still running
    pub fn finish_welcome(&mut self) -> bool {
        std::mem::replace(&mut self.welcome, WelcomePhase::Finished) == WelcomePhase::Running
    }

    /// Read-only copy for surfaces
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.id.clone(),
            owner: self.owner.clone(),
            state: self.state,
            pending: self.is_pending(),
            messages: self.messages.clone(),
            suggestions_visible: self.suggestions_visible,
            suggestions: self.suggestions.clone(),
            draft: self.draft.clone(),
        }
    }
}

/// Point-in-time view of a session
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Session ID
    pub session_id: SessionId,
    /// The signed-in username
    pub owner: String,
    /// Conductor state
    pub state: ConductorState,
    /// Whether input is disabled
    pub pending: bool,
    /// The message log
    pub messages: Vec<ConversationMessage>,
    /// Whether suggestions may be shown
    pub suggestions_visible: bool,
    /// Fetched suggestion prompts
    pub suggestions: Vec<String>,
    /// Current draft text
    pub draft: String,
}

impl SessionSnapshot {
    /// Whether the suggestion panel should be drawn
    pub fn suggestions_panel_visible(&self) -> bool {
        self.suggestions_visible
            && self.messages.len() <= SUGGESTION_PANEL_MAX_MESSAGES
            && !self.suggestions.is_empty()
    }

    /// Whether the retry action should be offered
    pub fn retry_available(&self) -> bool {
        self.messages.iter().any(|m| m.is_error)
    }

    /// Whether `draft` may be submitted right now
    pub fn can_submit(&self, draft: &str) -> bool {
        !self.pending && !draft.trim().is_empty()
    }
}

/// Get current timestamp in milliseconds
fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
