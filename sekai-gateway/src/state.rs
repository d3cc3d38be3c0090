//! Shared application state.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{error, info, warn};

use sekai_card::{BackgroundSource, CardError, CardRenderer, CardStyle};
use sekai_core::{Config, Language};

use crate::content::{ContentError, PromptBook};
use crate::lessons::{CardPainter, LessonService, UnavailableCards};
use crate::providers::{OpenAiClient, ProviderError};
use crate::quiz_tracker::{QuizTracker, TrackedQuiz};
use crate::tts::{GoogleTtsClient, TtsAuth, TtsError};

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("LLM client: {0}")]
    Provider(#[from] ProviderError),
    #[error("Text-to-Speech client: {0}")]
    Tts(#[from] TtsError),
    #[error("Prompt content: {0}")]
    Content(#[from] ContentError),
    #[error("Font loading task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

pub struct AppState {
    pub config: Config,
    pub lessons: LessonService,
    quizzes: Mutex<QuizTracker>,
}

impl AppState {
    pub fn new(config: Config, lessons: LessonService) -> Self {
        Self {
            config,
            lessons,
            quizzes: Mutex::new(QuizTracker::new()),
        }
    }

    /// Build every collaborator from configuration.
    ///
    /// The system font scan runs on a blocking thread.
    pub async fn from_config(config: Config) -> Result<Self, StartupError> {
        let llm = &config.settings.llm;
        let provider = OpenAiClient::new(
            llm.base_url.as_str(),
            config.secrets.openai_api_key.as_str(),
            llm.model.as_str(),
            Duration::from_secs(llm.timeout_seconds),
        )?;
        info!("LLM client ready ({} via {})", llm.model, llm.base_url);

        let card_settings = config.settings.card.clone();
        let mut style = CardStyle::default();
        style.theme.title_sentinel = card_settings.title_sentinel.clone();
        style.theme.wordmark = card_settings.wordmark.clone();
        let families = card_settings.font_families.clone();
        let renderer =
            tokio::task::spawn_blocking(move || CardRenderer::system(&families, style)).await?;
        let cards = card_painter(renderer, &card_settings.font_families);

        let mut lessons = LessonService::new(
            Arc::new(provider),
            cards,
            PromptBook::load()?,
            card_settings.title_sentinel.as_str(),
        );

        if let Some(path) = card_settings.background_image {
            info!("card background image: {}", path.display());
            lessons = lessons.with_background(BackgroundSource::Path(path));
        }

        match TtsAuth::from_secrets(&config.secrets) {
            Some(auth) if config.tts_available() => {
                let tts = GoogleTtsClient::new(auth, config.settings.tts.clone())?;
                info!(
                    "Text-to-Speech enabled (gemini voices: {})",
                    config.settings.tts.gemini_enabled()
                );
                lessons = lessons.with_speech(Arc::new(tts));
            }
            Some(_) => info!("Text-to-Speech disabled in settings"),
            None => warn!("No Google TTS credentials, lessons will be posted without audio"),
        }

        Ok(Self::new(config, lessons))
    }

    pub fn reveal_delay(&self) -> Duration {
        Duration::from_secs(self.config.settings.quiz.reveal_delay_seconds)
    }

    pub async fn track_quiz(&self, language: Language, quiz: TrackedQuiz) -> u64 {
        self.quizzes.lock().await.track(language, quiz)
    }

    pub async fn take_quiz(&self, language: Language, token: u64) -> Option<TrackedQuiz> {
        self.quizzes.lock().await.take(language, token)
    }
}

/// Use the renderer if its fonts resolved; otherwise keep running with a
/// painter whose every card fails over to the embed fallback.
fn card_painter<R: CardPainter + 'static>(
    renderer: Result<R, CardError>,
    families: &[String],
) -> Arc<dyn CardPainter> {
    match renderer {
        Ok(renderer) => Arc::new(renderer),
        Err(e) => {
            error!("Card renderer unavailable, small talk will be posted as text: {e}");
            Arc::new(UnavailableCards::new(families.join(", ")))
        }
    }
}
