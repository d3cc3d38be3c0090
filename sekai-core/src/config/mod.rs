//! Configuration for sekai-bot.
//!
//! Secrets come from environment variables (a `.env` file is honoured),
//! everything else from `config.toml`:
//!
//! ```toml
//! [llm]
//! model = "gpt-4o"
//!
//! [channels]
//! japanese_quiz = 123456789012345678
//! smalltalk = [123456789012345678]
//!
//! [[schedule]]
//! job = "japanese_quiz"
//! cron = "0 1 * * 5"
//! ```

mod secrets;
mod settings;

pub use secrets::{Secrets, SecretsError};
pub use settings::{
    CardSettings, ChannelSettings, LlmSettings, LoggingSettings, QuizSettings, SchedulerSettings,
    Settings, SettingsError, TtsEngine, TtsSettings, parse_channel_id_list,
};

use crate::schedule::{ScheduleError, validate_schedule};

/// Secrets plus settings, validated together.
#[derive(Debug, Clone)]
pub struct Config {
    pub secrets: Secrets,
    pub settings: Settings,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Secrets error: {0}")]
    Secrets(#[from] SecretsError),

    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("Schedule error: {0}")]
    Schedule(#[from] ScheduleError),
}

impl Config {
    /// Load secrets and settings and validate the schedule table.
    pub fn load() -> Result<Self, ConfigError> {
        let secrets = Secrets::from_env()?;
        let settings = Settings::load()?;
        let config = Self { secrets, settings };
        config.validate()?;
        Ok(config)
    }

    /// Schedule checks only apply while the scheduler is enabled.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.settings.scheduler.enabled {
            let channels = &self.settings.channels;
            validate_schedule(&self.settings.schedule, |job| channels.has_channel(job))?;
        }
        Ok(())
    }

    pub fn tts_available(&self) -> bool {
        self.settings.tts.enabled && self.secrets.has_tts()
    }
}

/// Load .env file if it exists.
pub fn load_dotenv() {
    let _ = dotenvy::dotenv();
}
