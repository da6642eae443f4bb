//! Conductor Client
//!
//! Thin wrapper around the Conductor for the terminal surface.
//! This client embeds the Conductor directly (no network between them) and
//! provides a convenient interface for sending events and receiving messages.
//!
//! # Architecture
//!
//! The terminal surface is a "thin client" - it doesn't contain any business
//! logic. All session handling happens in the Conductor. The surface's job is:
//! 1. Convert typed lines to SurfaceEvents
//! 2. Send SurfaceEvents to Conductor
//! 3. Receive ConductorMessages
//! 4. Render display state based on messages

use tokio::sync::mpsc;

use buddy_conductor::{
    BuddyConfigFile, Conductor, ConductorConfig, ConductorMessage, ConductorState,
    CourseService, HttpCourseService, SessionSnapshot, SurfaceEvent,
};

/// Client for communicating with the embedded Conductor
pub struct ConductorClient<S: CourseService + 'static = HttpCourseService> {
    /// The embedded Conductor instance
    conductor: Conductor<S>,
    /// Receiver for messages from Conductor
    rx: mpsc::UnboundedReceiver<ConductorMessage>,
}

impl ConductorClient<HttpCourseService> {
    /// Create a client talking to the course service described by `config`
    pub fn from_config(config: &BuddyConfigFile) -> anyhow::Result<Self> {
        let service = HttpCourseService::new(config.service.clone())?;
        Ok(Self::with_service(service, config.conductor.clone()))
    }
}

impl<S: CourseService + 'static> ConductorClient<S> {
    /// Create a client around an arbitrary course service
    pub fn with_service(service: S, config: ConductorConfig) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let conductor = Conductor::new(service, config, tx);
        Self { conductor, rx }
    }

    /// Sign in as `username`
    pub async fn login(&mut self, username: String) -> anyhow::Result<()> {
        self.send_event(SurfaceEvent::Login {
            event_id: SurfaceEvent::new_event_id(),
            username,
        })
        .await
    }

    /// Sign out
    pub async fn logout(&mut self) -> anyhow::Result<()> {
        self.send_event(SurfaceEvent::Logout {
            event_id: SurfaceEvent::new_event_id(),
        })
        .await
    }

    /// Submit a query
    pub async fn submit(&mut self, content: String) -> anyhow::Result<()> {
        self.send_event(SurfaceEvent::Submit {
            event_id: SurfaceEvent::new_event_id(),
            content,
        })
        .await
    }

    /// Put a suggestion into the draft
    pub async fn pick_suggestion(&mut self, text: String) -> anyhow::Result<()> {
        self.send_event(SurfaceEvent::SuggestionClicked {
            event_id: SurfaceEvent::new_event_id(),
            text,
        })
        .await
    }

    /// Copy the last query back into the draft
    pub async fn retry(&mut self) -> anyhow::Result<()> {
        self.send_event(SurfaceEvent::RetryRequested {
            event_id: SurfaceEvent::new_event_id(),
        })
        .await
    }

    /// Notify Conductor that user wants to quit
    pub async fn request_quit(&mut self) -> anyhow::Result<()> {
        self.send_event(SurfaceEvent::QuitRequested {
            event_id: SurfaceEvent::new_event_id(),
        })
        .await
    }

    /// Wait for the next message from the Conductor
    pub async fn recv(&mut self) -> Option<ConductorMessage> {
        self.rx.recv().await
    }

    /// Receive all pending messages from the Conductor (non-blocking)
    pub fn recv_all(&mut self) -> Vec<ConductorMessage> {
        let mut messages = Vec::new();
        while let Ok(msg) = self.rx.try_recv() {
            messages.push(msg);
        }
        messages
    }

    /// Get the current Conductor state
    pub async fn state(&self) -> ConductorState {
        self.conductor.state().await
    }

    /// Read-only copy of the current session
    pub async fn snapshot(&self) -> Option<SessionSnapshot> {
        self.conductor.snapshot().await
    }

    /// Send raw surface event to Conductor
    pub async fn send_event(&mut self, event: SurfaceEvent) -> anyhow::Result<()> {
        self.conductor.handle_event(event).await
    }
}
