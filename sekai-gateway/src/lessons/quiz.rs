use tracing::warn;

use sekai_core::{Language, LessonKind};

use super::extract::{QuizParts, parse_quiz};
use super::{LessonError, LessonService};
use crate::outbound::Outbound;

const OPTION_LABELS: [&str; 4] = ["a", "b", "c", "d"];

/// A quiz ready to post. The poll is always the last message.
#[derive(Debug, Clone)]
pub struct QuizPost {
    pub language: Language,
    pub messages: Vec<Outbound>,
    pub answer: char,
    pub explanation: String,
}

pub fn poll_question(language: Language) -> &'static str {
    match language {
        Language::Japanese => "What is the most accurate English meaning?",
        Language::English => "この英文の意味として最も適切なのは？",
    }
}

pub fn quiz_heading(language: Language) -> &'static str {
    match language {
        Language::Japanese => "@everyone **Weekly Quiz**",
        Language::English => "@everyone **Weekly English Quiz**",
    }
}

pub fn quiz_audio_filename(language: Language) -> &'static str {
    match language {
        Language::Japanese => "quiz-audio.mp3",
        Language::English => "english-quiz-audio.mp3",
    }
}

pub fn reveal_message(answer: char, explanation: &str) -> String {
    format!("✅ **Correct answer:** {}\n{}", answer, explanation)
}

fn options_message(options: &[String]) -> String {
    let lines: Vec<String> = options
        .iter()
        .zip(OPTION_LABELS)
        .map(|(option, label)| format!("{}. {}", label, option))
        .collect();
    format!("**Options:**\n{}", lines.join("\n"))
}

impl LessonService {
    pub async fn quiz(&self, language: Language) -> Result<QuizPost, LessonError> {
        let prompt = self.prompts.lesson(language, LessonKind::Quiz)?;
        let reply = self.ask(prompt, &[]).await?;
        let parts = parse_quiz(&reply, language);
        if parts.options.len() < OPTION_LABELS.len() {
            warn!(
                "{} quiz has {} options, expected 4",
                language.label(),
                parts.options.len()
            );
        }
        let audio = self.quiz_audio(&parts.paragraph, language).await;
        Ok(build_quiz_post(language, parts, audio))
    }

    async fn quiz_audio(&self, paragraph: &str, language: Language) -> Option<Vec<u8>> {
        let speech = self.speech.as_ref()?;
        match speech.speak_long(paragraph, language).await {
            Ok(audio) => Some(audio),
            Err(e) => {
                warn!("quiz audio failed, sending without audio: {}", e);
                None
            }
        }
    }
}

fn build_quiz_post(language: Language, parts: QuizParts, audio: Option<Vec<u8>>) -> QuizPost {
    let intro = format!("{}\n{}", quiz_heading(language), parts.paragraph);
    let intro = match audio {
        Some(bytes) => Outbound::attachment_with_text(intro, quiz_audio_filename(language), bytes),
        None => Outbound::text(intro),
    };

    let messages = vec![
        intro,
        Outbound::text(options_message(&parts.options)),
        Outbound::Poll {
            question: poll_question(language).to_string(),
            answers: OPTION_LABELS.iter().map(|s| s.to_string()).collect(),
        },
    ];

    QuizPost {
        language,
        messages,
        answer: parts.answer,
        explanation: parts.explanation,
    }
}
