//! Settings loaded from a TOML file.
//!
//! The file lives at `$SEKAI_CONFIG` or `~/.config/sekai-bot/config.toml`
//! and is created with defaults on first run. Channel IDs can still be
//! supplied through the legacy per-job environment variables, which win over
//! the file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::lesson::JobKind;
use crate::schedule::{ScheduleEntry, default_schedule};

const DEFAULT_CONFIG_TOML: &str = r#"# sekai-bot configuration
#
# Secrets are read from the environment (or .env):
#   DISCORD_TOKEN, OPENAI_API_KEY, GOOGLE_TTS_API_KEY, GOOGLE_ACCESS_TOKEN

[llm]
base_url = "https://api.openai.com/v1"
model = "gpt-4o"
timeout_seconds = 120

[tts]
enabled = true
# "gemini" uses model_name + style_prompt and falls back to Chirp voices
engine = "gemini"
model_name = "gemini-2.5-pro-tts"
style_prompt = "You are having a casual conversation with a friend. Say the following in a friendly, clear way."
audio_encoding = "MP3"
max_single_request_chars = 4000
endpoint = "https://texttospeech.googleapis.com/v1/text:synthesize"

[card]
font_families = ["Noto Sans", "Noto Sans CJK JP", "Noto Sans JP", "Hiragino Sans", "sans-serif"]
# background_image = "/path/to/header.png"
title_sentinel = "Today's small talk"
wordmark = "Sekai Meetup"

# Channel IDs per job. The JAPANESE_QUIZ_CHANNEL_ID, SMALLTALK_CHANNEL_IDS, ...
# environment variables override these.
[channels]
smalltalk = []

[quiz]
reveal_delay_seconds = 21600

[scheduler]
enabled = true
check_seconds = 30

# Five-field cron, UTC. 0 1 * * 5 = Friday 10:00 JST.
[[schedule]]
job = "japanese_quiz"
cron = "0 1 * * 5"

[[schedule]]
job = "japanese_word"
cron = "0 2 * * 5"

[[schedule]]
job = "japanese_grammar"
cron = "0 3 * * 5"

[[schedule]]
job = "english_quiz"
cron = "0 4 * * 5"

[[schedule]]
job = "english_word"
cron = "0 5 * * 5"

[[schedule]]
job = "english_grammar"
cron = "0 6 * * 5"

[[schedule]]
job = "smalltalk"
cron = "0 12 * * 5"

[logging]
level = "info"
"#;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub llm: LlmSettings,

    #[serde(default)]
    pub tts: TtsSettings,

    #[serde(default)]
    pub card: CardSettings,

    #[serde(default)]
    pub channels: ChannelSettings,

    #[serde(default)]
    pub quiz: QuizSettings,

    #[serde(default)]
    pub scheduler: SchedulerSettings,

    #[serde(default = "default_schedule")]
    pub schedule: Vec<ScheduleEntry>,

    #[serde(default)]
    pub logging: LoggingSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            llm: LlmSettings::default(),
            tts: TtsSettings::default(),
            card: CardSettings::default(),
            channels: ChannelSettings::default(),
            quiz: QuizSettings::default(),
            scheduler: SchedulerSettings::default(),
            schedule: default_schedule(),
            logging: LoggingSettings::default(),
        }
    }
}

/// OpenAI-compatible chat completions endpoint
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LlmSettings {
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,

    #[serde(default = "default_llm_model")]
    pub model: String,

    #[serde(default = "default_llm_timeout")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TtsEngine {
    Gemini,
    Chirp,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TtsSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_tts_engine")]
    pub engine: TtsEngine,

    #[serde(default = "default_tts_model")]
    pub model_name: String,

    #[serde(default = "default_tts_style_prompt")]
    pub style_prompt: String,

    #[serde(default = "default_audio_encoding")]
    pub audio_encoding: String,

    /// Longer text is split into sentences and synthesized piecewise.
    #[serde(default = "default_max_single_request")]
    pub max_single_request_chars: usize,

    #[serde(default = "default_tts_endpoint")]
    pub endpoint: String,
}

impl TtsSettings {
    /// Gemini voices are only used with a `gemini-*` model name.
    pub fn gemini_enabled(&self) -> bool {
        self.engine == TtsEngine::Gemini && self.model_name.to_lowercase().starts_with("gemini-")
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CardSettings {
    /// Font stack, first match per glyph wins.
    #[serde(default = "default_font_families")]
    pub font_families: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_image: Option<PathBuf>,

    #[serde(default = "default_title_sentinel")]
    pub title_sentinel: String,

    #[serde(default = "default_wordmark")]
    pub wordmark: String,
}

/// Discord channel IDs per scheduled job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ChannelSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub japanese_quiz: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub japanese_word: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub japanese_grammar: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub english_quiz: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub english_word: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub english_grammar: Option<u64>,
    /// Small talk fans out to every listed channel.
    #[serde(default)]
    pub smalltalk: Vec<u64>,
}

impl ChannelSettings {
    fn slot(&mut self, job: JobKind) -> Option<&mut Option<u64>> {
        match job {
            JobKind::JapaneseQuiz => Some(&mut self.japanese_quiz),
            JobKind::JapaneseWord => Some(&mut self.japanese_word),
            JobKind::JapaneseGrammar => Some(&mut self.japanese_grammar),
            JobKind::EnglishQuiz => Some(&mut self.english_quiz),
            JobKind::EnglishWord => Some(&mut self.english_word),
            JobKind::EnglishGrammar => Some(&mut self.english_grammar),
            JobKind::SmallTalk => None,
        }
    }

    /// Channels a scheduled run of `job` posts to.
    pub fn for_job(&self, job: JobKind) -> Vec<u64> {
        let single = match job {
            JobKind::JapaneseQuiz => self.japanese_quiz,
            JobKind::JapaneseWord => self.japanese_word,
            JobKind::JapaneseGrammar => self.japanese_grammar,
            JobKind::EnglishQuiz => self.english_quiz,
            JobKind::EnglishWord => self.english_word,
            JobKind::EnglishGrammar => self.english_grammar,
            JobKind::SmallTalk => return self.smalltalk.clone(),
        };
        single.into_iter().collect()
    }

    pub fn has_channel(&self, job: JobKind) -> bool {
        !self.for_job(job).is_empty()
    }

    /// Apply legacy per-job environment variables through `lookup`.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        for job in JobKind::ALL {
            let var = job.channel_env_var();
            let Some(raw) = lookup(var) else {
                continue;
            };
            let ids = parse_channel_id_list(&raw);
            match self.slot(job) {
                Some(slot) => {
                    if let Some(first) = ids.first() {
                        *slot = Some(*first);
                    }
                }
                None => {
                    if !ids.is_empty() {
                        self.smalltalk = ids;
                    }
                }
            }
        }
    }
}

/// Split a comma-separated channel list, dropping blanks and non-numeric entries.
pub fn parse_channel_id_list(value: &str) -> Vec<u64> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| match s.parse::<u64>() {
            Ok(id) => Some(id),
            Err(_) => {
                warn!("ignoring invalid channel id '{s}'");
                None
            }
        })
        .collect()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QuizSettings {
    /// Delay between posting a quiz and revealing its answer.
    #[serde(default = "default_reveal_delay")]
    pub reveal_delay_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SchedulerSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_check_seconds")]
    pub check_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingSettings {
    /// Log level used when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_true() -> bool {
    true
}

fn default_llm_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_llm_model() -> String {
    "gpt-4o".to_string()
}

fn default_llm_timeout() -> u64 {
    120
}

fn default_tts_engine() -> TtsEngine {
    TtsEngine::Gemini
}

fn default_tts_model() -> String {
    "gemini-2.5-pro-tts".to_string()
}

fn default_tts_style_prompt() -> String {
    "You are having a casual conversation with a friend. Say the following in a friendly, clear way."
        .to_string()
}

fn default_audio_encoding() -> String {
    "MP3".to_string()
}

fn default_max_single_request() -> usize {
    4000
}

fn default_tts_endpoint() -> String {
    "https://texttospeech.googleapis.com/v1/text:synthesize".to_string()
}

fn default_font_families() -> Vec<String> {
    [
        "Noto Sans",
        "Noto Sans CJK JP",
        "Noto Sans JP",
        "Hiragino Sans",
        "sans-serif",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_title_sentinel() -> String {
    "Today's small talk".to_string()
}

fn default_wordmark() -> String {
    "Sekai Meetup".to_string()
}

fn default_reveal_delay() -> u64 {
    6 * 60 * 60
}

fn default_check_seconds() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            base_url: default_llm_base_url(),
            model: default_llm_model(),
            timeout_seconds: default_llm_timeout(),
        }
    }
}

impl Default for TtsSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            engine: default_tts_engine(),
            model_name: default_tts_model(),
            style_prompt: default_tts_style_prompt(),
            audio_encoding: default_audio_encoding(),
            max_single_request_chars: default_max_single_request(),
            endpoint: default_tts_endpoint(),
        }
    }
}

impl Default for CardSettings {
    fn default() -> Self {
        Self {
            font_families: default_font_families(),
            background_image: None,
            title_sentinel: default_title_sentinel(),
            wordmark: default_wordmark(),
        }
    }
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            reveal_delay_seconds: default_reveal_delay(),
        }
    }
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            check_seconds: default_check_seconds(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Config directory not found")]
    ConfigDirNotFound,
}

impl Settings {
    /// Load settings from the config file, creating it with defaults if
    /// needed, then apply channel overrides from the environment.
    pub fn load() -> Result<Self, SettingsError> {
        let config_path = Self::config_path()?;
        let mut settings = Self::load_from_path(&config_path)?;
        settings
            .channels
            .apply_env_overrides(|name| std::env::var(name).ok());
        Ok(settings)
    }

    pub fn load_from_path(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            tracing::info!("Creating default configuration at {:?}", path);
            Self::create_default_config(path)?;
        }
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml(&self) -> Result<String, SettingsError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// `$SEKAI_CONFIG`, or `<config dir>/sekai-bot/config.toml`.
    pub fn config_path() -> Result<PathBuf, SettingsError> {
        if let Ok(path) = std::env::var("SEKAI_CONFIG")
            && !path.trim().is_empty()
        {
            return Ok(PathBuf::from(path));
        }

        let config_dir = dirs::config_dir()
            .ok_or(SettingsError::ConfigDirNotFound)?
            .join("sekai-bot");
        Ok(config_dir.join("config.toml"))
    }

    fn create_default_config(path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, DEFAULT_CONFIG_TOML)?;
        Ok(())
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_toml()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.llm.model, "gpt-4o");
        assert_eq!(settings.llm.timeout_seconds, 120);
        assert!(settings.tts.gemini_enabled());
        assert_eq!(settings.tts.max_single_request_chars, 4000);
        assert_eq!(settings.quiz.reveal_delay_seconds, 21_600);
        assert_eq!(settings.scheduler.check_seconds, 30);
        assert_eq!(settings.schedule.len(), 7);
        assert_eq!(settings.logging.level, "info");
        assert!(settings.channels.smalltalk.is_empty());
    }

    #[test]
    fn test_default_toml_matches_defaults() {
        let parsed = Settings::from_toml(DEFAULT_CONFIG_TOML).unwrap();
        let defaults = Settings::default();
        assert_eq!(parsed.schedule, defaults.schedule);
        assert_eq!(parsed.card.font_families, defaults.card.font_families);
        assert_eq!(parsed.tts.style_prompt, defaults.tts.style_prompt);
        assert_eq!(parsed.tts.engine, TtsEngine::Gemini);
        assert_eq!(parsed.channels, ChannelSettings::default());
    }

    #[test]
    fn test_from_toml_partial() {
        let toml = r#"
[channels]
japanese_quiz = 111
smalltalk = [222, 333]

[tts]
engine = "chirp"
"#;
        let settings = Settings::from_toml(toml).unwrap();
        assert_eq!(settings.channels.for_job(JobKind::JapaneseQuiz), vec![111]);
        assert_eq!(settings.channels.for_job(JobKind::SmallTalk), vec![222, 333]);
        assert!(settings.channels.for_job(JobKind::EnglishWord).is_empty());
        assert!(!settings.tts.gemini_enabled());
        assert_eq!(settings.schedule.len(), 7);
    }

    #[test]
    fn test_gemini_requires_gemini_model() {
        let mut tts = TtsSettings::default();
        tts.model_name = "chirp3-hd".to_string();
        assert!(!tts.gemini_enabled());
        tts.model_name = "Gemini-2.5-flash-tts".to_string();
        assert!(tts.gemini_enabled());
    }

    #[test]
    fn test_parse_channel_id_list() {
        assert_eq!(parse_channel_id_list("1, 2,,3 , "), vec![1, 2, 3]);
        assert_eq!(parse_channel_id_list(""), Vec::<u64>::new());
        assert_eq!(parse_channel_id_list("12,abc,34"), vec![12, 34]);
    }

    #[test]
    fn test_env_overrides_win() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("JAPANESE_QUIZ_CHANNEL_ID", "900"),
            ("SMALLTALK_CHANNEL_IDS", "10, 20"),
            ("ENGLISH_WORD_CHANNEL_ID", "  "),
        ]);
        let mut channels = ChannelSettings {
            japanese_quiz: Some(1),
            english_word: Some(5),
            smalltalk: vec![3],
            ..Default::default()
        };
        channels.apply_env_overrides(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(channels.japanese_quiz, Some(900));
        assert_eq!(channels.smalltalk, vec![10, 20]);
        assert_eq!(channels.english_word, Some(5), "blank env keeps file value");
    }

    #[test]
    fn test_load_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let settings = Settings::load_from_path(&path).unwrap();
        assert!(path.exists());
        assert_eq!(settings.schedule, default_schedule());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut settings = Settings::default();
        settings.channels.english_quiz = Some(42);
        settings.quiz.reveal_delay_seconds = 60;
        settings.card.background_image = Some(PathBuf::from("/tmp/header.png"));
        settings.save_to_path(&path).unwrap();

        let loaded = Settings::load_from_path(&path).unwrap();
        assert_eq!(loaded.channels.english_quiz, Some(42));
        assert_eq!(loaded.quiz.reveal_delay_seconds, 60);
        assert_eq!(
            loaded.card.background_image.as_deref(),
            Some(Path::new("/tmp/header.png"))
        );
        assert_eq!(loaded.schedule, settings.schedule);
    }
}
