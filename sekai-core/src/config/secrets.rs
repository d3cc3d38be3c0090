//! Secrets loaded from environment variables only.

use std::env;

/// API keys and tokens. Never written to disk.
#[derive(Clone, Default)]
pub struct Secrets {
    /// Discord bot token (env: DISCORD_TOKEN, alias DISCORD_BOT_TOKEN)
    pub discord_token: String,

    /// OpenAI API key (env: OPENAI_API_KEY)
    pub openai_api_key: String,

    /// Google Cloud Text-to-Speech API key (env: GOOGLE_TTS_API_KEY)
    pub google_tts_api_key: Option<String>,

    /// OAuth bearer token for Text-to-Speech (env: GOOGLE_ACCESS_TOKEN)
    pub google_access_token: Option<String>,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("discord_token", &"<redacted>")
            .field("openai_api_key", &"<redacted>")
            .field("google_tts_api_key", &self.google_tts_api_key.is_some())
            .field("google_access_token", &self.google_access_token.is_some())
            .finish()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SecretsError {
    #[error("Missing required secret: {0}")]
    MissingSecret(&'static str),
}

impl Secrets {
    /// Load secrets from the environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self, SecretsError> {
        let _ = dotenvy::dotenv();
        Self::from_env_inner()
    }

    pub(crate) fn from_env_inner() -> Result<Self, SecretsError> {
        let discord_token = non_empty("DISCORD_TOKEN")
            .or_else(|| non_empty("DISCORD_BOT_TOKEN"))
            .ok_or(SecretsError::MissingSecret("DISCORD_TOKEN"))?;
        let openai_api_key =
            non_empty("OPENAI_API_KEY").ok_or(SecretsError::MissingSecret("OPENAI_API_KEY"))?;

        Ok(Self {
            discord_token,
            openai_api_key,
            google_tts_api_key: non_empty("GOOGLE_TTS_API_KEY"),
            google_access_token: non_empty("GOOGLE_ACCESS_TOKEN"),
        })
    }

    /// Whether any Text-to-Speech credential is present.
    pub fn has_tts(&self) -> bool {
        self.google_tts_api_key.is_some() || self.google_access_token.is_some()
    }
}

fn non_empty(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    pub(crate) static ENV_MUTEX: Mutex<()> = Mutex::new(());

    pub(crate) fn clear_env() {
        unsafe {
            env::remove_var("DISCORD_TOKEN");
            env::remove_var("DISCORD_BOT_TOKEN");
            env::remove_var("OPENAI_API_KEY");
            env::remove_var("GOOGLE_TTS_API_KEY");
            env::remove_var("GOOGLE_ACCESS_TOKEN");
        }
    }

    #[test]
    fn test_load_required_secrets() {
        let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        unsafe {
            env::set_var("DISCORD_TOKEN", "discord-token");
            env::set_var("OPENAI_API_KEY", "sk-test");
        }

        let secrets = Secrets::from_env_inner().unwrap();
        assert_eq!(secrets.discord_token, "discord-token");
        assert_eq!(secrets.openai_api_key, "sk-test");
        assert!(!secrets.has_tts());
    }

    #[test]
    fn test_bot_token_alias() {
        let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        unsafe {
            env::set_var("DISCORD_BOT_TOKEN", "legacy");
            env::set_var("OPENAI_API_KEY", "sk-test");
            env::set_var("GOOGLE_ACCESS_TOKEN", "ya29.token");
        }

        let secrets = Secrets::from_env_inner().unwrap();
        assert_eq!(secrets.discord_token, "legacy");
        assert!(secrets.has_tts());
    }

    #[test]
    fn test_missing_discord_token() {
        let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        unsafe { env::set_var("OPENAI_API_KEY", "sk-test") }

        let err = Secrets::from_env_inner().unwrap_err();
        assert!(matches!(err, SecretsError::MissingSecret("DISCORD_TOKEN")));
    }

    #[test]
    fn test_blank_key_counts_as_missing() {
        let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        unsafe {
            env::set_var("DISCORD_TOKEN", "t");
            env::set_var("OPENAI_API_KEY", "   ");
        }

        let err = Secrets::from_env_inner().unwrap_err();
        assert!(matches!(err, SecretsError::MissingSecret("OPENAI_API_KEY")));
    }

    #[test]
    fn test_debug_redacts() {
        let secrets = Secrets {
            discord_token: "very-secret".into(),
            openai_api_key: "sk-secret".into(),
            ..Default::default()
        };
        let shown = format!("{secrets:?}");
        assert!(!shown.contains("very-secret"));
        assert!(!shown.contains("sk-secret"));
    }
}
