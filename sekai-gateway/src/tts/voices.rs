//! Google Cloud voice tables.

use rand::seq::SliceRandom;

use sekai_core::Language;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SsmlGender {
    Female,
    Male,
    Neutral,
}

impl SsmlGender {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Female => "FEMALE",
            Self::Male => "MALE",
            Self::Neutral => "NEUTRAL",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChirpVoice {
    pub name: &'static str,
    pub gender: SsmlGender,
    pub speaking_rate: f32,
    pub pitch: f32,
}

const fn chirp(name: &'static str, gender: SsmlGender, speaking_rate: f32) -> ChirpVoice {
    ChirpVoice {
        name,
        gender,
        speaking_rate,
        pitch: 0.0,
    }
}

pub const JAPANESE_VOICES: [ChirpVoice; 5] = [
    chirp("ja-JP-Chirp3-HD-Achird", SsmlGender::Female, 1.0),
    chirp("ja-JP-Chirp3-HD-Callirrhoe", SsmlGender::Female, 1.0),
    chirp("ja-JP-Chirp3-HD-Sadachbia", SsmlGender::Male, 1.0),
    chirp("ja-JP-Chirp3-HD-Gacrux", SsmlGender::Male, 1.0),
    chirp("ja-JP-Chirp3-HD-Despina", SsmlGender::Female, 0.9),
];

pub const ENGLISH_VOICES: [ChirpVoice; 7] = [
    chirp("en-US-Chirp3-HD-Achernar", SsmlGender::Female, 1.0),
    chirp("en-US-Chirp3-HD-Erinome", SsmlGender::Female, 1.0),
    chirp("en-US-Chirp3-HD-Sulafat", SsmlGender::Female, 1.0),
    chirp("en-US-Chirp3-HD-Vindemiatrix", SsmlGender::Female, 1.0),
    chirp("en-US-Chirp3-HD-Algenib", SsmlGender::Male, 1.0),
    chirp("en-US-Chirp3-HD-Achird", SsmlGender::Male, 1.0),
    chirp("en-US-Chirp3-HD-Alnilam", SsmlGender::Male, 1.0),
];

/// Speaker names for the Gemini TTS models; language comes from the request.
pub const GEMINI_SPEAKERS: [&str; 12] = [
    "Kore",
    "Aoede",
    "Callirrhoe",
    "Achernar",
    "Achird",
    "Algenib",
    "Autonoe",
    "Charon",
    "Despina",
    "Enceladus",
    "Erinome",
    "Fenrir",
];

pub fn chirp_voices(language: Language) -> &'static [ChirpVoice] {
    match language {
        Language::Japanese => &JAPANESE_VOICES,
        Language::English => &ENGLISH_VOICES,
    }
}

pub fn random_chirp(language: Language) -> &'static ChirpVoice {
    let voices = chirp_voices(language);
    voices.choose(&mut rand::thread_rng()).unwrap_or(&voices[0])
}

pub fn random_gemini_speaker() -> &'static str {
    GEMINI_SPEAKERS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(GEMINI_SPEAKERS[0])
}
