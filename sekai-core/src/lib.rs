//! Shared configuration and vocabulary for sekai-bot.

pub mod config;
pub mod lesson;
pub mod schedule;

pub use config::{
    CardSettings, ChannelSettings, Config, ConfigError, LlmSettings, LoggingSettings,
    QuizSettings, SchedulerSettings, Secrets, SecretsError, Settings, SettingsError, TtsEngine,
    TtsSettings, load_dotenv, parse_channel_id_list,
};
pub use lesson::{JobKind, Language, LessonKind};
pub use schedule::{
    ScheduleEntry, ScheduleError, default_schedule, next_due_after, next_due_at_or_after,
    parse_cron, utc_minute, validate_schedule,
};
