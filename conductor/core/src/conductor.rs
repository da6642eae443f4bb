//! Conductor - The Session Controller
//!
//! The Conductor owns the conversation of the signed-in user. It:
//! - Creates and destroys sessions as identities come and go
//! - Plays the welcome sequence
//! - Validates and dispatches queries to the course service
//! - Paces bot replies
//! - Gates the suggestion panel
//!
//! # Design Philosophy
//!
//! The Conductor is UI-agnostic. It communicates through:
//! - `ConductorMessage`: Commands sent TO the UI surface
//! - `SurfaceEvent`: Events received FROM the UI surface
//!
//! # Concurrency
//!
//! The welcome sequence and each query turn run as spawned tasks. They touch
//! the session only through `Outlet::apply`, which takes the session lock,
//! checks that the session epoch captured at spawn time is still current,
//! mutates, and emits the resulting messages before releasing the lock. The
//! epoch is bumped on every establish and teardown, so a task that outlives
//! its session can never append to the next one, even when the same user
//! signs straight back in.
//!
//! The surface channel is unbounded: emitting never waits, so the lock is
//! never held across a suspension point and a surface that falls behind
//! cannot stall snapshots or input. Message order on the channel is append
//! order.

use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio::task::{AbortHandle, JoinHandle};
use tokio::time::Instant;

use crate::backend::CourseService;
use crate::events::SurfaceEvent;
use crate::messages::{
    ConductorMessage, ConductorState, EventId, LayoutDirective, NotifyLevel, SessionId,
};
use crate::pacing::{PacingConfig, WelcomeTimings};
use crate::replies::ReplyCopy;
use crate::security::{ConductorLimits, InputValidator, ValidationResult};
use crate::session::{ConversationMessage, Session, SessionSnapshot};

/// Conductor configuration
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConductorConfig {
    /// Reply pacing policy
    pub pacing: PacingConfig,
    /// Welcome sequence timings
    pub welcome: WelcomeTimings,
    /// User-facing copy
    pub replies: ReplyCopy,
    /// Input limits
    pub limits: ConductorLimits,
}

/// Errors from identity lifecycle operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConductorError {
    /// The username was rejected
    #[error("{0}")]
    InvalidOwner(String),

    /// The operation needs a signed-in user
    #[error("no active session")]
    NoSession,
}

/// Handle to a dispatched query turn
#[derive(Debug)]
pub struct TurnHandle(JoinHandle<()>);

impl TurnHandle {
    /// Wait until the turn has appended its reply (or was cancelled)
    pub async fn finished(self) {
        if let Err(e) = self.0.await {
            if e.is_panic() {
                tracing::error!(error = %e, "Query turn panicked");
            }
        }
    }
}

/// Result of a submission attempt
#[derive(Debug)]
pub enum SubmitOutcome {
    /// A query was sent to the course service
    Dispatched(TurnHandle),
    /// The input was rejected locally and an error message was appended
    Invalid,
    /// Another turn or welcome step is pending; nothing changed
    Busy,
    /// No user is signed in
    NoSession,
}

impl SubmitOutcome {
    /// Whether a query was sent
    pub fn is_dispatched(&self) -> bool {
        matches!(self, Self::Dispatched(_))
    }
}

/// What `submit` decided while holding the session lock
enum Admission {
    Accepted,
    Invalid,
    Busy,
}

struct Shared {
    epoch: u64,
    session: Option<Session>,
}

/// Single write path into the session and the surface channel
#[derive(Clone)]
struct Outlet {
    shared: Arc<Mutex<Shared>>,
    tx: mpsc::UnboundedSender<ConductorMessage>,
}

impl Outlet {
    /// Mutate the session if `epoch` is still current
    ///
    /// Messages pushed to the outbox are sent before the lock is released.
    /// Returns `None` when the session is gone or was replaced.
    async fn apply<R>(
        &self,
        epoch: u64,
        f: impl FnOnce(&mut Session, &mut Vec<ConductorMessage>) -> R,
    ) -> Option<R> {
        let mut shared = self.shared.lock().await;
        if shared.epoch != epoch {
            return None;
        }
        let session = shared.session.as_mut()?;

        let mut outbox = Vec::new();
        let result = f(session, &mut outbox);
        for msg in outbox {
            self.send(msg);
        }
        Some(result)
    }

    fn send(&self, msg: ConductorMessage) {
        if let Err(e) = self.tx.send(msg) {
            tracing::warn!("Failed to send message to surface: {}", e);
        }
    }
}

/// Append a message and announce it
fn append(session: &mut Session, outbox: &mut Vec<ConductorMessage>, message: ConversationMessage) {
    let message_id = message.id.clone();
    let index = session.push(message.clone());
    outbox.push(ConductorMessage::Message { index, message });
    outbox.push(ConductorMessage::LayoutHint {
        directive: LayoutDirective::ScrollToMessage { message_id },
    });
}

/// Set the state and announce it if it changed
fn set_state(session: &mut Session, outbox: &mut Vec<ConductorMessage>, state: ConductorState) {
    if session.set_state(state) {
        outbox.push(ConductorMessage::State { state });
    }
}

/// The Conductor - headless session controller
pub struct Conductor<S: CourseService> {
    /// Configuration
    config: ConductorConfig,
    /// Course service client
    service: Arc<S>,
    /// Session and surface channel
    outlet: Outlet,
    /// Epoch of the current session; mirrors `Shared::epoch`
    epoch: u64,
    /// Input validator for surface events
    input_validator: InputValidator,
    /// Running welcome sequence
    welcome_task: Option<AbortHandle>,
    /// Running query turn
    turn_task: Option<AbortHandle>,
}

impl<S: CourseService + 'static> Conductor<S> {
    /// Create a new Conductor with the given course service
    pub fn new(
        service: S,
        config: ConductorConfig,
        tx: mpsc::UnboundedSender<ConductorMessage>,
    ) -> Self {
        let input_validator = InputValidator::new(config.limits.clone());
        Self {
            config,
            service: Arc::new(service),
            outlet: Outlet {
                shared: Arc::new(Mutex::new(Shared {
                    epoch: 0,
                    session: None,
                })),
                tx,
            },
            epoch: 0,
            input_validator,
            welcome_task: None,
            turn_task: None,
        }
    }

    /// Get current state
    pub async fn state(&self) -> ConductorState {
        let shared = self.outlet.shared.lock().await;
        shared
            .session
            .as_ref()
            .map_or(ConductorState::Idle, Session::state)
    }

    /// Read-only copy of the current session
    pub async fn snapshot(&self) -> Option<SessionSnapshot> {
        let shared = self.outlet.shared.lock().await;
        shared.session.as_ref().map(Session::snapshot)
    }

    /// Create an empty session for `owner`
    ///
    /// Any existing session is torn down first, cancelling its welcome
    /// sequence and in-flight turn.
    pub async fn establish_session(&mut self, owner: &str) -> Result<SessionId, ConductorError> {
        let owner = owner.trim();
        if let ValidationResult::Invalid(reason) | ValidationResult::RateLimited(reason) =
            self.input_validator.validate_username(owner)
        {
            return Err(ConductorError::InvalidOwner(reason));
        }

        self.teardown_session().await;

        let mut shared = self.outlet.shared.lock().await;
        shared.epoch += 1;
        self.epoch = shared.epoch;

        let session = Session::new(owner);
        let session_id = session.id().clone();
        shared.session = Some(session);

        tracing::info!(session_id = %session_id, owner = %owner, "Session established");

        self.outlet.send(ConductorMessage::SessionStarted {
            session_id: session_id.clone(),
            owner: owner.to_string(),
        });
        self.outlet.send(ConductorMessage::State {
            state: ConductorState::Ready,
        });

        Ok(session_id)
    }

    /// Destroy the current session
    ///
    /// Pending welcome steps and turns are cancelled; none of them can
    /// mutate anything afterwards. Returns the ended session's ID.
    pub async fn teardown_session(&mut self) -> Option<SessionId> {
        self.abort_tasks();

        let mut shared = self.outlet.shared.lock().await;
        shared.epoch += 1;
        self.epoch = shared.epoch;

        let session = shared.session.take()?;
        let session_id = session.id().clone();

        tracing::info!(
            session_id = %session_id,
            messages = session.messages().len(),
            turns = session.metadata().turns,
            "Session ended"
        );

        self.outlet.send(ConductorMessage::SessionEnded {
            session_id: session_id.clone(),
        });
        self.outlet.send(ConductorMessage::State {
            state: ConductorState::Idle,
        });

        Some(session_id)
    }

    /// Start the welcome sequence for the current session
    ///
    /// Runs at most once per session and only while the log is empty.
    /// Returns whether a sequence was started.
    pub async fn initialize_welcome(&mut self) -> bool {
        let started = self
            .outlet
            .apply(self.epoch, |session, _| session.begin_welcome())
            .await
            .unwrap_or(false);
        if !started {
            return false;
        }

        let task = tokio::spawn(welcome_sequence(
            self.outlet.clone(),
            self.epoch,
            Arc::clone(&self.service),
            self.config.welcome.clone(),
            self.config.replies.clone(),
        ));
        if let Some(old) = self.welcome_task.replace(task.abort_handle()) {
            old.abort();
        }
        true
    }

    /// Submit a query
    ///
    /// Blank or rejected input appends one error message and never reaches
    /// the course service. While a turn or welcome step is pending the call
    /// is a no-op.
    pub async fn submit(&mut self, raw: &str) -> SubmitOutcome {
        let query = raw.trim();
        let validator = &self.input_validator;
        let replies = &self.config.replies;

        let admission = self
            .outlet
            .apply(self.epoch, |session, outbox| {
                if session.is_pending() {
                    return Admission::Busy;
                }

                if query.is_empty() {
                    append(
                        session,
                        outbox,
                        ConversationMessage::error(replies.empty_query.clone()),
                    );
                    return Admission::Invalid;
                }

                if let ValidationResult::Invalid(reason) | ValidationResult::RateLimited(reason) =
                    validator.validate_query(query)
                {
                    tracing::warn!(reason = %reason, "Rejected query");
                    append(session, outbox, ConversationMessage::error(reason));
                    return Admission::Invalid;
                }

                append(session, outbox, ConversationMessage::user(query));
                if session.set_draft("") {
                    outbox.push(ConductorMessage::Draft {
                        text: String::new(),
                    });
                }
                if session.hide_suggestions() {
                    outbox.push(ConductorMessage::SuggestionsVisible { visible: false });
                }
                // A query sent during the welcome pause ends the welcome
                session.finish_welcome();
                set_state(session, outbox, ConductorState::Thinking);
                Admission::Accepted
            })
            .await;

        match admission {
            None => SubmitOutcome::NoSession,
            Some(Admission::Invalid) => SubmitOutcome::Invalid,
            Some(Admission::Busy) => {
                tracing::debug!("Submission rejected while pending");
                SubmitOutcome::Busy
            }
            Some(Admission::Accepted) => {
                if let Some(welcome) = self.welcome_task.take() {
                    welcome.abort();
                }

                let task = tokio::spawn(run_turn(
                    self.outlet.clone(),
                    self.epoch,
                    Arc::clone(&self.service),
                    query.to_string(),
                    self.config.pacing.clone(),
                    self.config.replies.clone(),
                ));
                self.turn_task = Some(task.abort_handle());

                tracing::info!(query_chars = query.chars().count(), "Query dispatched");
                SubmitOutcome::Dispatched(TurnHandle(task))
            }
        }
    }

    /// Put a suggestion into the draft without submitting it
    pub async fn select_suggestion(&mut self, text: &str) -> bool {
        self.outlet
            .apply(self.epoch, |session, outbox| {
                session.set_draft(text);
                outbox.push(ConductorMessage::Draft {
                    text: text.to_string(),
                });
            })
            .await
            .is_some()
    }

    /// Record the surface's own edit of the draft
    pub async fn update_draft(&mut self, text: &str) -> bool {
        self.outlet
            .apply(self.epoch, |session, _| {
                session.set_draft(text);
            })
            .await
            .is_some()
    }

    /// Copy the most recent user query back into the draft
    ///
    /// Appends nothing and does not submit. Returns the restored text.
    pub async fn retry_last(&mut self) -> Option<String> {
        self.outlet
            .apply(self.epoch, |session, outbox| {
                let text = session.last_user_message()?.text.clone();
                session.set_draft(text.clone());
                outbox.push(ConductorMessage::Draft { text: text.clone() });
                Some(text)
            })
            .await
            .flatten()
    }

    /// Handle an event from the UI surface
    pub async fn handle_event(&mut self, event: SurfaceEvent) -> anyhow::Result<()> {
        if let Some(event_id) = event.event_id() {
            self.ack(event_id.clone());
        }

        match event {
            SurfaceEvent::Login { username, .. } | SurfaceEvent::Signup { username, .. } => {
                match self.establish_session(&username).await {
                    Ok(_) => {
                        self.initialize_welcome().await;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Rejected sign-in");
                        self.notify(NotifyLevel::Warning, &e.to_string());
                    }
                }
            }

            SurfaceEvent::Logout { .. } => {
                if self.teardown_session().await.is_none() {
                    tracing::debug!("Logout without a session");
                }
            }

            SurfaceEvent::DraftEdited { text } => {
                self.update_draft(&text).await;
            }

            SurfaceEvent::Submit { content, .. } => {
                if let SubmitOutcome::NoSession = self.submit(&content).await {
                    self.notify(NotifyLevel::Warning, "Please sign in first");
                }
            }

            SurfaceEvent::SuggestionClicked { text, .. } => {
                self.select_suggestion(&text).await;
            }

            SurfaceEvent::RetryRequested { .. } => {
                if self.retry_last().await.is_none() {
                    tracing::debug!("Nothing to retry");
                }
            }

            SurfaceEvent::QuitRequested { .. } => {
                self.shutdown().await?;
            }
        }

        Ok(())
    }

    /// Shut down the Conductor
    pub async fn shutdown(&mut self) -> anyhow::Result<()> {
        self.teardown_session().await;
        self.outlet.send(ConductorMessage::State {
            state: ConductorState::ShuttingDown,
        });
        self.outlet.send(ConductorMessage::Quit {
            message: Some("Goodbye!".to_string()),
        });
        Ok(())
    }

    /// Send acknowledgment
    fn ack(&self, event_id: EventId) {
        self.outlet.send(ConductorMessage::Ack { event_id });
    }

    /// Send notification
    fn notify(&self, level: NotifyLevel, message: &str) {
        self.outlet.send(ConductorMessage::Notify {
            level,
            title: None,
            message: message.to_string(),
        });
    }
}

impl<S: CourseService> Conductor<S> {
    fn abort_tasks(&mut self) {
        for task in [self.welcome_task.take(), self.turn_task.take()]
            .into_iter()
            .flatten()
        {
            task.abort();
        }
    }
}

impl<S: CourseService> Drop for Conductor<S> {
    fn drop(&mut self) {
        self.abort_tasks();
    }
}

/// Apply one welcome step, unless the sequence was cut short
async fn welcome_step(
    outlet: &Outlet,
    epoch: u64,
    f: impl FnOnce(&mut Session, &mut Vec<ConductorMessage>),
) -> bool {
    outlet
        .apply(epoch, |session, outbox| {
            if !session.welcome_running() {
                return false;
            }
            f(session, outbox);
            true
        })
        .await
        .unwrap_or(false)
}

/// Two bot messages with composing pauses, then the suggestion panel
async fn welcome_sequence<S: CourseService>(
    outlet: Outlet,
    epoch: u64,
    service: Arc<S>,
    timings: WelcomeTimings,
    replies: ReplyCopy,
) {
    if !welcome_step(&outlet, epoch, |s, out| {
        set_state(s, out, ConductorState::Composing);
    })
    .await
    {
        return;
    }
    tokio::time::sleep(timings.compose).await;

    if !welcome_step(&outlet, epoch, |s, out| {
        append(s, out, ConversationMessage::bot(replies.greeting.clone()));
        set_state(s, out, ConductorState::Ready);
    })
    .await
    {
        return;
    }
    tokio::time::sleep(timings.pause).await;

    if !welcome_step(&outlet, epoch, |s, out| {
        set_state(s, out, ConductorState::Composing);
    })
    .await
    {
        return;
    }
    tokio::time::sleep(timings.follow_up).await;

    let mut fetch = false;
    let finished = welcome_step(&outlet, epoch, |s, out| {
        append(s, out, ConversationMessage::bot(replies.capabilities.clone()));
        set_state(s, out, ConductorState::Ready);
        s.finish_welcome();
        if s.show_suggestions() {
            out.push(ConductorMessage::SuggestionsVisible { visible: true });
            fetch = s.claim_suggestion_fetch();
        }
        out.push(ConductorMessage::LayoutHint {
            directive: LayoutDirective::FocusInput,
        });
    })
    .await;

    tracing::debug!(epoch, finished, "Welcome sequence done");

    if fetch {
        fetch_suggestions_if_needed(&outlet, epoch, service.as_ref()).await;
    }
}

/// Load suggestion prompts once the panel has become visible
///
/// Failures leave the list empty; nothing user-visible is appended.
async fn fetch_suggestions_if_needed<S: CourseService>(outlet: &Outlet, epoch: u64, service: &S) {
    let suggestions = service.fetch_suggestions().await;
    let count = suggestions.len();

    let stored = outlet
        .apply(epoch, |session, outbox| {
            session.set_suggestions(suggestions.clone());
            outbox.push(ConductorMessage::Suggestions { suggestions });
        })
        .await;

    tracing::debug!(count, stored = stored.is_some(), "Suggestions fetched");
}

/// One query turn: request, pace, append, release
async fn run_turn<S: CourseService>(
    outlet: Outlet,
    epoch: u64,
    service: Arc<S>,
    query: String,
    pacing: PacingConfig,
    replies: ReplyCopy,
) {
    let started = Instant::now();

    let (wait, reply) = match service.submit_query(&query).await {
        Ok(outcome) => {
            let kind = outcome.kind();
            let wait = pacing.wait_for(outcome.reply_text_len(), started.elapsed());
            tracing::info!(
                kind,
                elapsed_ms = started.elapsed().as_millis() as u64,
                wait_ms = wait.as_millis() as u64,
                "Query answered"
            );

            let typing = outlet
                .apply(epoch, |s, out| set_state(s, out, ConductorState::Typing))
                .await;
            if typing.is_none() {
                return;
            }
            (wait, replies.render(outcome))
        }
        Err(e) => {
            tracing::warn!(service = service.name(), error = %e, "Query failed");
            (pacing.transport_grace, replies.transport_failure())
        }
    };

    tokio::time::sleep(wait).await;

    outlet
        .apply(epoch, |s, out| {
            append(s, out, reply);
            set_state(s, out, ConductorState::Ready);
        })
        .await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{SearchOutcome, ServiceError};

    struct MockService;

    #[async_trait::async_trait]
    impl CourseService for MockService {
        fn name(&self) -> &str {
            "Mock"
        }

        async fn submit_query(&self, _query: &str) -> Result<SearchOutcome, ServiceError> {
            Ok(SearchOutcome::Chat {
                message: Some("Hello world!".to_string()),
            })
        }

        async fn suggestions(&self) -> Result<Vec<String>, ServiceError> {
            Ok(vec!["Python".to_string()])
        }
    }

    #[tokio::test]
    async fn test_conductor_creation() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let conductor = Conductor::new(MockService, ConductorConfig::default(), tx);

        assert_eq!(conductor.state().await, ConductorState::Idle);
        assert!(conductor.snapshot().await.is_none());
    }

    #[tokio::test]
    async fn test_establish_rejects_blank_owner() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut conductor = Conductor::new(MockService, ConductorConfig::default(), tx);

        let err = conductor.establish_session("   ").await.unwrap_err();
        assert_eq!(err, ConductorError::InvalidOwner("Please enter a username".to_string()));
        assert!(conductor.snapshot().await.is_none());
    }

    #[tokio::test]
    async fn test_establish_announces_session() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut conductor = Conductor::new(MockService, ConductorConfig::default(), tx);

        let id = conductor.establish_session(" ada ").await.unwrap();
        assert_eq!(conductor.state().await, ConductorState::Ready);

        match rx.recv().await.unwrap() {
            ConductorMessage::SessionStarted { session_id, owner } => {
                assert_eq!(session_id, id);
                assert_eq!(owner, "ada");
            }
            other => panic!("Expected SessionStarted, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_operations_without_session() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut conductor = Conductor::new(MockService, ConductorConfig::default(), tx);

        assert!(matches!(conductor.submit("python").await, SubmitOutcome::NoSession));
        assert!(!conductor.select_suggestion("python").await);
        assert!(conductor.retry_last().await.is_none());
        assert!(!conductor.initialize_welcome().await);
        assert!(conductor.teardown_session().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_sends_quit() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut conductor = Conductor::new(MockService, ConductorConfig::default(), tx);
        conductor.establish_session("ada").await.unwrap();
        conductor.shutdown().await.unwrap();

        let mut saw_quit = false;
        while let Ok(msg) = rx.try_recv() {
            if let ConductorMessage::Quit { message } = msg {
                assert_eq!(message.as_deref(), Some("Goodbye!"));
                saw_quit = true;
            }
        }
        assert!(saw_quit);
    }
}
