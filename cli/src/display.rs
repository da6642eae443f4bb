//! Display State Types
//!
//! Types that represent the current display state for the terminal surface.
//! These are derived from ConductorMessages and used for rendering.
//!
//! # Design Philosophy
//!
//! The surface is a "thin client" - it just renders what the Conductor tells
//! it to. [`DisplayState::apply`] folds one message into the state and returns
//! the lines that should be printed for it, so the transcript scrolls like a
//! chat log without ever redrawing.

use buddy_conductor::{
    ConductorMessage, ConductorState, ConversationMessage, CourseCard, LevelTier, MessageId,
    MessageRole, NotifyLevel,
};
use textwrap::Options;

/// Default wrap width when the terminal size is unknown
pub const DEFAULT_WIDTH: usize = 80;

/// Largest message count at which suggestions are still offered
const SUGGESTION_PANEL_MAX_MESSAGES: usize = 2;

/// A rendered conversation message
#[derive(Clone, Debug)]
pub struct DisplayMessage {
    /// Unique message ID
    pub id: MessageId,
    /// Who sent this message
    pub role: DisplayRole,
    /// The message content
    pub content: String,
    /// Course cards attached to a result message
    pub cards: Vec<CourseCard>,
}

impl From<&ConversationMessage> for DisplayMessage {
    fn from(message: &ConversationMessage) -> Self {
        let role = match (message.role, message.is_error) {
            (MessageRole::User, _) => DisplayRole::User,
            (MessageRole::Bot, false) => DisplayRole::Bot,
            (MessageRole::Bot, true) => DisplayRole::Error,
        };
        Self {
            id: message.id.clone(),
            role,
            content: message.text.clone(),
            cards: message.items.iter().map(CourseCard::from_record).collect(),
        }
    }
}

/// Display role for messages
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisplayRole {
    /// User input
    User,
    /// Course Buddy
    Bot,
    /// Course Buddy reporting a failed turn
    Error,
}

impl DisplayRole {
    /// Get the prefix for this role
    pub fn prefix(&self) -> &'static str {
        match self {
            DisplayRole::User => "You: ",
            DisplayRole::Bot => "Buddy: ",
            DisplayRole::Error => "Buddy (!): ",
        }
    }
}

/// Everything the surface knows about the conversation
#[derive(Clone, Debug)]
pub struct DisplayState {
    /// Signed-in username
    pub owner: Option<String>,
    /// Transcript in log order
    pub messages: Vec<DisplayMessage>,
    /// Last announced Conductor state
    pub state: ConductorState,
    /// Draft the next empty line will submit
    pub draft: String,
    /// Whether suggestions may be shown
    pub suggestions_visible: bool,
    /// Fetched suggestion prompts
    pub suggestions: Vec<String>,
    /// Set once the Conductor asked the surface to quit
    pub quit: bool,
    width: usize,
}

impl Default for DisplayState {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH)
    }
}

impl DisplayState {
    /// Create an empty display wrapping at `width` columns
    pub fn new(width: usize) -> Self {
        Self {
            owner: None,
            messages: Vec::new(),
            state: ConductorState::Idle,
            draft: String::new(),
            suggestions_visible: false,
            suggestions: Vec::new(),
            quit: false,
            width: width.max(20),
        }
    }

    /// Whether input would be accepted right now
    pub fn is_pending(&self) -> bool {
        self.state.is_pending()
    }

    /// Whether the suggestion panel should be drawn
    pub fn suggestions_panel_visible(&self) -> bool {
        self.suggestions_visible
            && self.messages.len() <= SUGGESTION_PANEL_MAX_MESSAGES
            && !self.suggestions.is_empty()
    }

    /// Whether `/retry` should be offered
    pub fn retry_available(&self) -> bool {
        self.messages.iter().any(|m| m.role == DisplayRole::Error)
    }

    /// Suggestion `n`, counting from 1 as printed
    pub fn suggestion(&self, n: usize) -> Option<&str> {
        if !self.suggestions_panel_visible() {
            return None;
        }
        n.checked_sub(1)
            .and_then(|i| self.suggestions.get(i))
            .map(String::as_str)
    }

    /// Fold a Conductor message into the display and return the lines to print
    pub fn apply(&mut self, msg: &ConductorMessage) -> Vec<String> {
        match msg {
            ConductorMessage::SessionStarted { owner, .. } => {
                self.reset();
                self.owner = Some(owner.clone());
                vec![format!("Signed in as {owner}.")]
            }

            ConductorMessage::SessionEnded { .. } => {
                let owner = self.owner.take();
                self.reset();
                owner.map_or_else(Vec::new, |owner| vec![format!("Signed out {owner}.")])
            }

            ConductorMessage::State { state } => {
                let previous = std::mem::replace(&mut self.state, *state);
                if previous == *state {
                    return Vec::new();
                }
                match state {
                    ConductorState::Composing | ConductorState::Typing
                        if !matches!(
                            previous,
                            ConductorState::Composing | ConductorState::Typing
                        ) =>
                    {
                        vec!["Buddy is typing...".to_string()]
                    }
                    ConductorState::Thinking => vec!["Searching courses...".to_string()],
                    _ => Vec::new(),
                }
            }

            ConductorMessage::Message { index, message } => {
                if *index != self.messages.len() {
                    tracing::warn!(
                        index,
                        known = self.messages.len(),
                        "Message index out of step with transcript"
                    );
                }
                let display = DisplayMessage::from(message);
                let mut lines = self.render_message(&display);
                self.messages.push(display);
                if message.is_error {
                    lines.push("  (type /retry to edit and resend your last query)".to_string());
                }
                lines
            }

            ConductorMessage::Draft { text } => {
                self.draft.clone_from(text);
                if text.is_empty() {
                    Vec::new()
                } else {
                    vec![format!("Draft: {text}  (press Enter to send)")]
                }
            }

            ConductorMessage::SuggestionsVisible { visible } => {
                self.suggestions_visible = *visible;
                Vec::new()
            }

            ConductorMessage::Suggestions { suggestions } => {
                self.suggestions.clone_from(suggestions);
                self.render_suggestions()
            }

            ConductorMessage::LayoutHint { .. } | ConductorMessage::Ack { .. } => Vec::new(),

            ConductorMessage::Notify {
                level,
                title,
                message,
            } => {
                let tag = match level {
                    NotifyLevel::Info => "info",
                    NotifyLevel::Warning => "warning",
                    NotifyLevel::Error => "error",
                };
                let text = match title {
                    Some(title) => format!("[{tag}] {title}: {message}"),
                    None => format!("[{tag}] {message}"),
                };
                vec![text]
            }

            ConductorMessage::Quit { message } => {
                self.quit = true;
                message.iter().cloned().collect()
            }
        }
    }

    fn reset(&mut self) {
        self.messages.clear();
        self.draft.clear();
        self.suggestions_visible = false;
        self.suggestions.clear();
    }

    fn render_message(&self, message: &DisplayMessage) -> Vec<String> {
        let prefix = message.role.prefix();
        let indent = " ".repeat(prefix.len());
        let options = Options::new(self.width)
            .initial_indent(prefix)
            .subsequent_indent(&indent);

        let mut lines: Vec<String> = textwrap::wrap(&message.content, &options)
            .into_iter()
            .map(|line| line.into_owned())
            .collect();

        for (i, card) in message.cards.iter().enumerate() {
            lines.extend(self.render_card(i + 1, card));
        }
        lines
    }

    fn render_card(&self, number: usize, card: &CourseCard) -> Vec<String> {
        let mut header = format!("{number}. {}", card.name);
        if let Some(level) = &card.level {
            header.push_str(&format!(" [{level}{}]", tier_badge(card.tier)));
        }

        let mut details = Vec::new();
        let facts: Vec<&str> = [&card.department, &card.course_type]
            .into_iter()
            .filter_map(|f| f.as_deref())
            .collect();
        if !facts.is_empty() {
            details.push(facts.join(" | "));
        }
        if let Some(pathway) = &card.pathway {
            details.push(format!("Pathway: {pathway}"));
        }
        if !card.skills.is_empty() {
            details.push(format!("Skills: {}", card.skills.join(", ")));
        }
        if !card.domains.is_empty() {
            details.push(format!("Domains: {}", card.domains.join(", ")));
        }
        if let Some(role) = &card.job_role {
            details.push(format!("For: {role}"));
        }

        let card_indent = "    ";
        let options = Options::new(self.width)
            .initial_indent("  ")
            .subsequent_indent(card_indent);
        let mut lines: Vec<String> = textwrap::wrap(&header, &options)
            .into_iter()
            .map(|line| line.into_owned())
            .collect();

        let options = Options::new(self.width)
            .initial_indent(card_indent)
            .subsequent_indent(card_indent);
        for detail in details {
            lines.extend(
                textwrap::wrap(&detail, &options)
                    .into_iter()
                    .map(|line| line.into_owned()),
            );
        }
        lines
    }

    fn render_suggestions(&self) -> Vec<String> {
        if !self.suggestions_panel_visible() {
            return Vec::new();
        }
        let mut lines = vec!["Try one of these (/pick N):".to_string()];
        lines.extend(
            self.suggestions
                .iter()
                .enumerate()
                .map(|(i, s)| format!("  {}. {s}", i + 1)),
        );
        lines
    }
}

fn tier_badge(tier: LevelTier) -> &'static str {
    match tier {
        LevelTier::Beginner => " *",
        LevelTier::Intermediate => " **",
        LevelTier::Advanced => " ***",
        LevelTier::Unrated => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use buddy_conductor::{CourseRecord, SessionId};
    use pretty_assertions::assert_eq;

    fn started() -> ConductorMessage {
        ConductorMessage::SessionStarted {
            session_id: SessionId::new(),
            owner: "ada".to_string(),
        }
    }

    fn appended(display: &DisplayState, message: ConversationMessage) -> ConductorMessage {
        ConductorMessage::Message {
            index: display.messages.len(),
            message,
        }
    }

    #[test]
    fn test_message_wrapping() {
        let mut display = DisplayState::new(24);
        display.apply(&started());

        let msg = appended(
            &display,
            ConversationMessage::bot("Search for courses by skill or job role."),
        );
        let lines = display.apply(&msg);

        assert_eq!(lines[0], "Buddy: Search for");
        assert!(lines[1..].iter().all(|l| l.starts_with("       ")));
        assert!(lines.iter().all(|l| l.chars().count() <= 24));
        assert_eq!(display.messages.len(), 1);
        assert_eq!(display.messages[0].role, DisplayRole::Bot);
    }

    #[test]
    fn test_error_offers_retry() {
        let mut display = DisplayState::default();
        display.apply(&started());

        let msg = appended(&display, ConversationMessage::error("Server busy"));
        let lines = display.apply(&msg);

        assert_eq!(lines[0], "Buddy (!): Server busy");
        assert!(lines.last().unwrap().contains("/retry"));
        assert!(display.retry_available());
    }

    #[test]
    fn test_result_cards() {
        let mut display = DisplayState::default();
        display.apply(&started());

        let record: CourseRecord = serde_json::from_value(serde_json::json!({
            "Course Name": "Python 101",
            "Course Level": "Beginner",
            "Department": "Computing",
            "Skills": "Python, nan, Testing",
        }))
        .unwrap();
        let msg = appended(
            &display,
            ConversationMessage::results("Here you go", vec![record], None),
        );
        let lines = display.apply(&msg);

        assert_eq!(
            lines,
            vec![
                "Buddy: Here you go",
                "  1. Python 101 [Beginner *]",
                "    Computing",
                "    Skills: Python, Testing",
            ]
        );
    }

    #[test]
    fn test_suggestion_panel_gating() {
        let mut display = DisplayState::default();
        display.apply(&started());
        display.apply(&ConductorMessage::SuggestionsVisible { visible: true });

        let lines = display.apply(&ConductorMessage::Suggestions {
            suggestions: vec!["Python".to_string(), "Cloud".to_string()],
        });
        assert_eq!(lines, vec!["Try one of these (/pick N):", "  1. Python", "  2. Cloud"]);
        assert_eq!(display.suggestion(2), Some("Cloud"));
        assert_eq!(display.suggestion(0), None);
        assert_eq!(display.suggestion(3), None);

        display.apply(&ConductorMessage::SuggestionsVisible { visible: false });
        assert!(!display.suggestions_panel_visible());
        assert_eq!(display.suggestion(1), None);
    }

    #[test]
    fn test_empty_suggestions_print_nothing() {
        let mut display = DisplayState::default();
        display.apply(&started());
        display.apply(&ConductorMessage::SuggestionsVisible { visible: true });

        let lines = display.apply(&ConductorMessage::Suggestions {
            suggestions: Vec::new(),
        });
        assert!(lines.is_empty());
        assert!(!display.suggestions_panel_visible());
    }

    #[test]
    fn test_typing_indicator_once_per_pending_run() {
        let mut display = DisplayState::default();
        display.apply(&started());

        let state = |state| ConductorMessage::State { state };
        assert!(display.apply(&state(ConductorState::Ready)).is_empty());
        assert_eq!(
            display.apply(&state(ConductorState::Thinking)),
            vec!["Searching courses..."]
        );
        assert_eq!(
            display.apply(&state(ConductorState::Typing)),
            vec!["Buddy is typing..."]
        );
        assert!(display.apply(&state(ConductorState::Ready)).is_empty());
        assert!(!display.is_pending());
    }

    #[test]
    fn test_session_end_clears_transcript() {
        let mut display = DisplayState::default();
        display.apply(&started());
        let msg = appended(&display, ConversationMessage::user("python"));
        display.apply(&msg);
        display.apply(&ConductorMessage::Draft {
            text: "python".to_string(),
        });

        let lines = display.apply(&ConductorMessage::SessionEnded {
            session_id: SessionId::new(),
        });

        assert_eq!(lines, vec!["Signed out ada."]);
        assert!(display.messages.is_empty());
        assert!(display.draft.is_empty());
        assert_eq!(display.owner, None);
    }

    #[test]
    fn test_quit_message() {
        let mut display = DisplayState::default();
        let lines = display.apply(&ConductorMessage::Quit {
            message: Some("Goodbye!".to_string()),
        });
        assert_eq!(lines, vec!["Goodbye!"]);
        assert!(display.quit);
    }
}
