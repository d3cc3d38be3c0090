//! Languages, lesson kinds and the scheduled jobs built from them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Language a lesson teaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    Japanese,
    English,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::Japanese, Language::English];

    /// BCP-47 code used for speech synthesis.
    pub fn speech_code(self) -> &'static str {
        match self {
            Self::Japanese => "ja-JP",
            Self::English => "en-US",
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            Self::Japanese => "japanese",
            Self::English => "english",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Japanese => "Japanese",
            Self::English => "English",
        }
    }

    /// Line label the model uses for sentences in this language.
    pub fn line_label(self) -> &'static str {
        match self {
            Self::Japanese => "JP",
            Self::English => "EN",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LessonKind {
    Quiz,
    Word,
    Grammar,
}

impl LessonKind {
    pub fn slug(self) -> &'static str {
        match self {
            Self::Quiz => "quiz",
            Self::Word => "word",
            Self::Grammar => "grammar",
        }
    }
}

/// A job the scheduler can run, and that a force command can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    JapaneseQuiz,
    JapaneseWord,
    JapaneseGrammar,
    EnglishQuiz,
    EnglishWord,
    EnglishGrammar,
    #[serde(rename = "smalltalk")]
    SmallTalk,
}

impl JobKind {
    pub const ALL: [JobKind; 7] = [
        JobKind::JapaneseQuiz,
        JobKind::JapaneseWord,
        JobKind::JapaneseGrammar,
        JobKind::EnglishQuiz,
        JobKind::EnglishWord,
        JobKind::EnglishGrammar,
        JobKind::SmallTalk,
    ];

    pub fn lesson(language: Language, kind: LessonKind) -> Self {
        match (language, kind) {
            (Language::Japanese, LessonKind::Quiz) => Self::JapaneseQuiz,
            (Language::Japanese, LessonKind::Word) => Self::JapaneseWord,
            (Language::Japanese, LessonKind::Grammar) => Self::JapaneseGrammar,
            (Language::English, LessonKind::Quiz) => Self::EnglishQuiz,
            (Language::English, LessonKind::Word) => Self::EnglishWord,
            (Language::English, LessonKind::Grammar) => Self::EnglishGrammar,
        }
    }

    /// Language and lesson kind, or `None` for small talk.
    pub fn parts(self) -> Option<(Language, LessonKind)> {
        match self {
            Self::JapaneseQuiz => Some((Language::Japanese, LessonKind::Quiz)),
            Self::JapaneseWord => Some((Language::Japanese, LessonKind::Word)),
            Self::JapaneseGrammar => Some((Language::Japanese, LessonKind::Grammar)),
            Self::EnglishQuiz => Some((Language::English, LessonKind::Quiz)),
            Self::EnglishWord => Some((Language::English, LessonKind::Word)),
            Self::EnglishGrammar => Some((Language::English, LessonKind::Grammar)),
            Self::SmallTalk => None,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Self::JapaneseQuiz => "japanese_quiz",
            Self::JapaneseWord => "japanese_word",
            Self::JapaneseGrammar => "japanese_grammar",
            Self::EnglishQuiz => "english_quiz",
            Self::EnglishWord => "english_word",
            Self::EnglishGrammar => "english_grammar",
            Self::SmallTalk => "smalltalk",
        }
    }

    pub fn label(self) -> String {
        match self.parts() {
            Some((language, kind)) => {
                let kind = match kind {
                    LessonKind::Quiz => "Quiz",
                    LessonKind::Word => "Word",
                    LessonKind::Grammar => "Grammar",
                };
                format!("{} {kind}", language.label())
            }
            None => "Small Talk".to_string(),
        }
    }

    /// Legacy environment variable holding this job's channel ID(s).
    pub fn channel_env_var(self) -> &'static str {
        match self {
            Self::JapaneseQuiz => "JAPANESE_QUIZ_CHANNEL_ID",
            Self::JapaneseWord => "JAPANESE_WORD_CHANNEL_ID",
            Self::JapaneseGrammar => "JAPANESE_GRAMMAR_CHANNEL_ID",
            Self::EnglishQuiz => "ENGLISH_QUIZ_CHANNEL_ID",
            Self::EnglishWord => "ENGLISH_WORD_CHANNEL_ID",
            Self::EnglishGrammar => "ENGLISH_GRAMMAR_CHANNEL_ID",
            Self::SmallTalk => "SMALLTALK_CHANNEL_IDS",
        }
    }

    /// Chat command that runs this job immediately.
    pub fn force_command(self) -> String {
        format!("!forcescheduled{}", self.key().replace('_', ""))
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for JobKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|job| job.key() == s)
            .ok_or_else(|| format!("unknown job '{s}'"))
    }
}
