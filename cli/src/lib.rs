//! Course Buddy - line-oriented terminal surface
//!
//! Embeds the headless [`buddy_conductor::Conductor`] and renders its
//! messages as a scrolling chat transcript.
//!
//! - **Commands**: parsing typed lines into session actions
//! - **Conductor client**: the embedded Conductor and its message channel
//! - **Display**: transcript state and text rendering

pub mod commands;
pub mod conductor_client;
pub mod display;

pub use commands::Command;
pub use conductor_client::ConductorClient;
pub use display::DisplayState;
