#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use sekai_card::{
    CardError, CardRenderer, CardStyle, FontSpec, FontWeight, HeaderImage, TextMeasure, fontdb,
};
use sekai_core::Language;
use sekai_gateway::content::PromptBook;
use sekai_gateway::lessons::{CardPainter, LessonService};
use sekai_gateway::providers::{ChatProvider, ProviderError};
use sekai_gateway::tts::{SpeechSynthesizer, TtsError};

/// Returns one fixed reply and records every request.
pub struct CannedProvider {
    reply: Option<String>,
    pub calls: Mutex<Vec<(String, String)>>,
}

impl CannedProvider {
    pub fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Some(reply.to_string()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: None,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn last_system_prompt(&self) -> String {
        self.calls
            .lock()
            .unwrap()
            .last()
            .map(|(system, _)| system.clone())
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl ChatProvider for CannedProvider {
    fn model(&self) -> &str {
        "canned"
    }

    async fn complete(&self, system: &str, user: &str) -> Result<String, ProviderError> {
        self.calls
            .lock()
            .unwrap()
            .push((system.to_string(), user.to_string()));
        match &self.reply {
            Some(reply) => Ok(reply.clone()),
            None => Err(ProviderError::ApiError {
                status: 500,
                message: "upstream down".to_string(),
            }),
        }
    }
}

/// Speech stand-in: audio bytes are the spoken text itself.
#[derive(Default)]
pub struct EchoSpeech {
    pub fail: bool,
    pub spoken: Mutex<Vec<(String, Language, bool)>>,
}

#[async_trait::async_trait]
impl SpeechSynthesizer for EchoSpeech {
    async fn speak(&self, text: &str, language: Language) -> Result<Vec<u8>, TtsError> {
        self.spoken
            .lock()
            .unwrap()
            .push((text.to_string(), language, false));
        if self.fail {
            return Err(TtsError::EmptyText);
        }
        Ok(text.as_bytes().to_vec())
    }

    async fn speak_long(&self, text: &str, language: Language) -> Result<Vec<u8>, TtsError> {
        self.spoken
            .lock()
            .unwrap()
            .push((text.to_string(), language, true));
        if self.fail {
            return Err(TtsError::EmptyText);
        }
        Ok(text.as_bytes().to_vec())
    }
}

/// Fixed-advance measurer so cards render without installed fonts.
pub struct MonoMeasure;

impl TextMeasure for MonoMeasure {
    fn width(&self, text: &str, font: &FontSpec) -> f32 {
        let scale = match font.weight {
            FontWeight::Regular => 1.0,
            FontWeight::Bold => 1.2,
        };
        text.chars().count() as f32 * 10.0 * scale
    }
}

pub fn mono_cards() -> Arc<CardRenderer<MonoMeasure>> {
    Arc::new(CardRenderer::with_measure(
        MonoMeasure,
        Arc::new(fontdb::Database::new()),
        "sans-serif",
        CardStyle::default(),
    ))
}

pub struct BrokenCards;

impl CardPainter for BrokenCards {
    fn paint(&self, _text: &str, _header: Option<&HeaderImage>) -> Result<Vec<u8>, CardError> {
        Err(CardError::Encode("no encoder".to_string()))
    }
}

pub fn service(provider: Arc<CannedProvider>) -> LessonService {
    LessonService::new(
        provider,
        mono_cards(),
        PromptBook::load().unwrap(),
        "Today's small talk",
    )
}

pub const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

pub const SMALLTALK_REPLY: &str = "**Today's small talk**\n**EN: What did you cook last weekend?\nJP: 先週末、何を作りましたか？\nRomaji: Senshuumatsu, nani wo tsukurimashita ka?**\n\nEN: I made curry ___ my friends.\nJP: 友達___カレーを作りました。\nRomaji: Tomodachi ___ karee wo tsukurimashita.";

pub const JP_WORD_REPLY: &str = "📝 Word:\nJP: 散歩\nRomaji: sanpo\nEN: a walk\n\n💡 Definition:\nA leisurely walk.\n\n🎯 Example:\nJP: 毎朝、公園を散歩します。\nRomaji: Maiasa, kouen wo sanpo shimasu.\nEN: I take a walk in the park every morning.\n\n📌 Notes:\nUsed with する.";

pub const EN_QUIZ_REPLY: &str = "EN: Tom said he would love to come, but he has a lot on his plate this week.\nA) トムは喜んで来る。\nB) トムは今週忙しいので来られないかもしれない。\nC) トムは食べ物を持ってくる。\nD) トムは来週来る。\nAnswer: B\nExplanation: 'a lot on his plate' は忙しいという意味です。\n\nBonus: idioms.";
