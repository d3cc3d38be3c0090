//! Discord bot posting Japanese and English learning content.

pub mod content;
pub mod discord;
pub mod jobs;
pub mod lessons;
pub mod outbound;
pub mod providers;
pub mod quiz_tracker;
pub mod scheduler;
pub mod state;
pub mod tts;

pub use outbound::Outbound;
pub use state::{AppState, StartupError};
