//! Live tests against the real LLM and Text-to-Speech APIs (requires --features live-tests).
//!
//! Run with: cargo test --features live-tests --test live

#[cfg(feature = "live-tests")]
use std::time::Duration;

#[cfg(feature = "live-tests")]
use sekai_core::{Language, Settings};
#[cfg(feature = "live-tests")]
use sekai_gateway::providers::{ChatProvider, OpenAiClient};
#[cfg(feature = "live-tests")]
use sekai_gateway::tts::{GoogleTtsClient, SpeechSynthesizer, TtsAuth};

#[cfg(feature = "live-tests")]
fn env_secret(name: &str) -> Option<String> {
    sekai_core::load_dotenv();
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Some(value),
        _ => {
            eprintln!("{name} not set; skipping live test.");
            None
        }
    }
}

#[cfg(feature = "live-tests")]
#[tokio::test]
async fn test_openai_completion_live() {
    let Some(api_key) = env_secret("OPENAI_API_KEY") else {
        return;
    };
    let llm = Settings::default().llm;
    let client = OpenAiClient::new(
        llm.base_url,
        api_key,
        llm.model,
        Duration::from_secs(llm.timeout_seconds),
    )
    .unwrap();

    let reply = client
        .complete("Reply with one word.", "Say hello in Japanese.")
        .await
        .unwrap();
    assert!(!reply.trim().is_empty());
}

#[cfg(feature = "live-tests")]
#[tokio::test]
async fn test_tts_live() {
    let secrets = sekai_core::Secrets {
        google_tts_api_key: env_secret("GOOGLE_TTS_API_KEY"),
        google_access_token: std::env::var("GOOGLE_ACCESS_TOKEN").ok(),
        ..Default::default()
    };
    let Some(auth) = TtsAuth::from_secrets(&secrets) else {
        return;
    };
    let client = GoogleTtsClient::new(auth, Settings::default().tts).unwrap();
    let audio = client
        .speak("毎朝、公園を散歩します。", Language::Japanese)
        .await
        .unwrap();
    assert!(audio.len() > 100);
}
