//! Buddy Conductor - Headless Conversation Core for Course Buddy
//!
//! This crate provides the conversation session controller behind Course
//! Buddy, completely independent of any UI framework. It can drive a terminal
//! client, a web front end, or run headless for testing.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        UI Surfaces                            │
//! │        ┌──────────┐   ┌──────────┐   ┌──────────────┐        │
//! │        │   CLI    │   │  Web UI  │   │   Headless   │        │
//! │        └────┬─────┘   └────┬─────┘   └──────┬───────┘        │
//! │             └──────────────┴────────────────┘                │
//! │                            │                                  │
//! │                    SurfaceEvent (up)                          │
//! │                  ConductorMessage (down)                      │
//! └────────────────────────────┼──────────────────────────────────┘
//!                              │
//! ┌────────────────────────────┼──────────────────────────────────┐
//! │                     CONDUCTOR CORE                            │
//! │  ┌─────────────────────────┴──────────────────────────────┐   │
//! │  │                      Conductor                          │   │
//! │  │  ┌──────────┐  ┌──────────┐  ┌─────────────────────┐   │   │
//! │  │  │ Session  │  │  Pacing  │  │   Course Service    │   │   │
//! │  │  │   Log    │  │  Engine  │  │      (HTTP)         │   │   │
//! │  │  └──────────┘  └──────────┘  └─────────────────────┘   │   │
//! │  └────────────────────────────────────────────────────────┘   │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`Conductor`]: The session controller
//! - [`ConductorMessage`]: Messages sent from Conductor to UI surfaces
//! - [`SurfaceEvent`]: Events sent from UI surfaces to Conductor
//! - [`Session`]: Conversation session with its append-only message log
//! - [`CourseService`]: The remote course search service
//!
//! # Quick Start
//!
//! ```ignore
//! use buddy_conductor::{load_config, Conductor, HttpCourseService, SurfaceEvent};
//! use tokio::sync::mpsc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let (tx, mut rx) = mpsc::unbounded_channel();
//!
//!     let config = load_config()?;
//!     let service = HttpCourseService::new(config.service.clone())?;
//!     let mut conductor = Conductor::new(service, config.conductor, tx);
//!
//!     conductor
//!         .handle_event(SurfaceEvent::Login {
//!             event_id: SurfaceEvent::new_event_id(),
//!             username: "ada".to_string(),
//!         })
//!         .await?;
//!
//!     while let Some(msg) = rx.recv().await {
//!         // Render message to UI
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Module Overview
//!
//! - [`backend`]: Course service abstraction and HTTP client
//! - [`conductor`]: Main Conductor struct
//! - [`config`]: Layered TOML/env/CLI configuration
//! - [`course`]: Opaque course records and the card view model
//! - [`events`]: Events from UI surfaces to Conductor
//! - [`messages`]: Messages from Conductor to UI surfaces
//! - [`pacing`]: Reply pacing policy
//! - [`replies`]: User-facing copy
//! - [`security`]: Input validation and rate limiting
//! - [`session`]: Conversation session and snapshots
//!
//! # No UI Dependencies
//!
//! This crate has **zero** dependencies on any terminal or GUI framework.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod backend;
pub mod conductor;
pub mod config;
pub mod course;
pub mod events;
pub mod messages;
pub mod pacing;
pub mod replies;
pub mod security;
pub mod session;

// Re-exports for convenience
pub use backend::{
    CourseService, HttpCourseService, SearchOutcome, ServiceConfig, ServiceError,
};
pub use conductor::{
    Conductor, ConductorConfig, ConductorError, SubmitOutcome, TurnHandle,
};
pub use course::{CourseCard, CourseRecord, LevelTier};
pub use events::SurfaceEvent;
pub use messages::{
    ConductorMessage, ConductorState, EventId, LayoutDirective, MessageId, MessageRole,
    NotifyLevel, SessionId,
};
pub use pacing::{typing_delay_ms, PacingConfig, WelcomeTimings};
pub use replies::ReplyCopy;
pub use security::{ConductorLimits, InputValidator, ValidationResult};
pub use session::{
    ConversationMessage, Session, SessionMetadata, SessionSnapshot, WelcomePhase,
};

// Config exports
pub use config::{
    default_config_path, load_config, load_config_from_path, BuddyConfigFile, BuddyToml,
    ConfigError, ConfigOverrides, ConfigSource,
};
