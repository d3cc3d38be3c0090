//! Lesson generation: prompt the model, shape the reply into posts.
//!
//! Nothing here talks to Discord. Each generator returns [`Outbound`]
//! messages which the bot delivers to one or more channels.

pub mod extract;
mod learning;
mod quiz;
mod smalltalk;

use std::sync::Arc;

use tracing::debug;

use sekai_card::{BackgroundSource, CardError, CardRenderer, HeaderImage, TextMeasure};

use crate::content::{ContentError, PromptBook, PromptTemplate};
use crate::providers::{ChatProvider, ProviderError};
use crate::tts::SpeechSynthesizer;

pub use extract::{QuizParts, extract_example, parse_quiz};
pub use learning::{LESSON_COLOR, example_audio_filename, follow_up_message};
pub use quiz::{QuizPost, poll_question, quiz_audio_filename, quiz_heading, reveal_message};
pub use smalltalk::{CARD_FAILED_MESSAGE, SMALLTALK_CARD_FILENAME, SMALLTALK_COLOR, SMALLTALK_FOOTER};

#[derive(Debug, thiserror::Error)]
pub enum LessonError {
    #[error("LLM request failed: {0}")]
    Provider(#[from] ProviderError),
    #[error("Prompt content error: {0}")]
    Content(#[from] ContentError),
    #[error("Card rendering failed: {0}")]
    Card(#[from] CardError),
    #[error("Card rendering task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Renders small talk text to PNG bytes. Called on a blocking thread.
pub trait CardPainter: Send + Sync {
    fn paint(&self, text: &str, header: Option<&HeaderImage>) -> Result<Vec<u8>, CardError>;
}

impl<M: TextMeasure + Send + Sync> CardPainter for CardRenderer<M> {
    fn paint(&self, text: &str, header: Option<&HeaderImage>) -> Result<Vec<u8>, CardError> {
        self.compose(text, header)
    }
}

/// Stand-in painter used when no card font could be loaded at startup.
///
/// Every paint fails, so small talk falls back to an embed while the rest
/// of the bot keeps running.
pub struct UnavailableCards {
    families: String,
}

impl UnavailableCards {
    pub fn new(families: impl Into<String>) -> Self {
        Self {
            families: families.into(),
        }
    }
}

impl CardPainter for UnavailableCards {
    fn paint(&self, _text: &str, _header: Option<&HeaderImage>) -> Result<Vec<u8>, CardError> {
        Err(CardError::FontUnavailable(self.families.clone()))
    }
}

/// Everything the lesson generators need.
pub struct LessonService {
    provider: Arc<dyn ChatProvider>,
    speech: Option<Arc<dyn SpeechSynthesizer>>,
    cards: Arc<dyn CardPainter>,
    background: Option<BackgroundSource>,
    prompts: PromptBook,
    card_title: String,
}

impl LessonService {
    pub fn new(
        provider: Arc<dyn ChatProvider>,
        cards: Arc<dyn CardPainter>,
        prompts: PromptBook,
        card_title: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            speech: None,
            cards,
            background: None,
            prompts,
            card_title: card_title.into(),
        }
    }

    pub fn with_speech(mut self, speech: Arc<dyn SpeechSynthesizer>) -> Self {
        self.speech = Some(speech);
        self
    }

    pub fn with_background(mut self, background: BackgroundSource) -> Self {
        self.background = Some(background);
        self
    }

    async fn ask(
        &self,
        prompt: &PromptTemplate,
        vars: &[(&str, &str)],
    ) -> Result<String, LessonError> {
        let rendered = prompt.render(vars)?;
        debug!("prompt {} sent to {}", prompt.id, self.provider.model());
        let reply = self
            .provider
            .complete(&rendered.system, &rendered.user)
            .await?;
        Ok(reply)
    }
}
