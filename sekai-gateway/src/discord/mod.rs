mod bot;
pub mod commands;
pub mod send;

use std::sync::Arc;

use serenity::prelude::*;
use tracing::info;

use crate::state::AppState;

pub use bot::Bot;
pub use commands::{Command, help_text};

/// Build the Discord client. Call `start()` on the result to connect.
pub async fn start_discord_bot(token: &str, state: Arc<AppState>) -> Result<Client, DiscordError> {
    if token.trim().is_empty() {
        return Err(DiscordError::MissingToken);
    }

    info!("Starting Discord bot...");

    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    Client::builder(token, intents)
        .event_handler(Bot::new(state))
        .await
        .map_err(|e| DiscordError::ClientError(e.to_string()))
}

/// Discord-related errors
#[derive(Debug, thiserror::Error)]
pub enum DiscordError {
    #[error("Discord token is empty")]
    MissingToken,
    #[error("Failed to create Discord client: {0}")]
    ClientError(String),
}
