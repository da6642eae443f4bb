//! Surface Events
//!
//! Events sent from UI surfaces to the Conductor. These represent the
//! intents a surface can forward: signing in and out, editing and
//! submitting the draft, clicking a suggestion and asking for a retry.
//!
//! # Design Philosophy
//!
//! UI surfaces are "dumb" renderers that forward user actions to the Conductor.
//! They don't interpret what actions mean - they just report what happened.
//! The Conductor decides how to respond.

use serde::{Deserialize, Serialize};

use crate::messages::EventId;

/// Events from UI Surface to Conductor
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum SurfaceEvent {
    // ============================================
    // Identity Events
    // ============================================
    /// User signed in with an existing username
    Login {
        /// Event ID for acknowledgment
        event_id: EventId,
        /// Username as typed (trimmed by the Conductor)
        username: String,
    },

    /// User created an account
    Signup {
        /// Event ID for acknowledgment
        event_id: EventId,
        /// Username as typed (trimmed by the Conductor)
        username: String,
    },

    /// User signed out
    Logout {
        /// Event ID for acknowledgment
        event_id: EventId,
    },

    // ============================================
    // Input Events
    // ============================================
    /// User edited the input box
    DraftEdited {
        /// Full draft text after the edit
        text: String,
    },

    /// User submitted a query
    Submit {
        /// Event ID for acknowledgment
        event_id: EventId,
        /// Raw input text
        content: String,
    },

    /// User clicked a suggestion prompt
    SuggestionClicked {
        /// Event ID for acknowledgment
        event_id: EventId,
        /// The suggestion text
        text: String,
    },

    /// User asked to retry the last query
    RetryRequested {
        /// Event ID for acknowledgment
        event_id: EventId,
    },

    // ============================================
    // Lifecycle Events
    // ============================================
    /// User requested to quit
    QuitRequested {
        /// Event ID for acknowledgment
        event_id: EventId,
    },
}

impl SurfaceEvent {
    /// Generate a new event ID for this event
    pub fn new_event_id() -> EventId {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        EventId(format!("evt_{id}"))
    }

    /// Get the event ID if this event has one
    pub fn event_id(&self) -> Option<&EventId> {
        match self {
            Self::Login { event_id, .. }
            | Self::Signup { event_id, .. }
            | Self::Logout { event_id }
            | Self::Submit { event_id, .. }
            | Self::SuggestionClicked { event_id, .. }
            | Self::RetryRequested { event_id }
            | Self::QuitRequested { event_id } => Some(event_id),
            Self::DraftEdited { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_id_unique() {
        let id1 = SurfaceEvent::new_event_id();
        let id2 = SurfaceEvent::new_event_id();
        assert_ne!(id1.0, id2.0);
    }

    #[test]
    fn test_draft_edits_are_not_acked() {
        let event = SurfaceEvent::DraftEdited {
            text: "pyth".to_string(),
        };
        assert!(event.event_id().is_none());

        let event = SurfaceEvent::RetryRequested {
            event_id: SurfaceEvent::new_event_id(),
        };
        assert!(event.event_id().is_some());
    }
}
