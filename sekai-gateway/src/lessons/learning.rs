use tracing::{debug, info, warn};

use sekai_core::{Language, LessonKind};

use super::extract::extract_example;
use super::{LessonError, LessonService};
use crate::outbound::Outbound;

pub const LESSON_COLOR: u32 = 0x00_AE_86;

/// Invitation posted after a lesson, in the learner's own language.
pub fn follow_up_message(language: Language) -> &'static str {
    match language {
        Language::English => "💡 この単語を使って例文を作ってみましょう！チャットで共有してください。",
        Language::Japanese => "💡 Try creating your own example! Feel free to share it in the chat.",
    }
}

pub fn example_audio_filename(language: Language) -> String {
    format!("{}-example.mp3", language.slug())
}

impl LessonService {
    /// Word or grammar lesson: embed, spoken example, follow-up.
    pub async fn learning_card(
        &self,
        language: Language,
        kind: LessonKind,
    ) -> Result<Vec<Outbound>, LessonError> {
        let prompt = self.prompts.lesson(language, kind)?;
        let reply = self.ask(prompt, &[]).await?;

        let mut posts = vec![Outbound::embed(reply.as_str(), LESSON_COLOR)];
        if let Some(audio) = self.example_audio(&reply, language).await {
            posts.push(Outbound::attachment(example_audio_filename(language), audio));
        }
        posts.push(Outbound::text(follow_up_message(language)));
        Ok(posts)
    }

    async fn example_audio(&self, reply: &str, language: Language) -> Option<Vec<u8>> {
        let Some(example) = extract_example(reply, language) else {
            debug!("no {} example sentence found, skipping audio", language.label());
            return None;
        };
        let speech = self.speech.as_ref()?;
        match speech.speak(&example, language).await {
            Ok(audio) => {
                info!("example audio synthesized ({} bytes)", audio.len());
                Some(audio)
            }
            Err(e) => {
                warn!("example audio failed, posting without it: {}", e);
                None
            }
        }
    }
}
