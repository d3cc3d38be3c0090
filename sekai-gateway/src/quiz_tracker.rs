use std::collections::HashMap;

use sekai_core::Language;

/// The quiz awaiting its answer reveal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedQuiz {
    pub channel_id: u64,
    pub poll_message_id: u64,
    pub answer: char,
    pub explanation: String,
}

/// One open quiz per language. A newer quiz replaces the older one, and a
/// reveal scheduled for the older one then finds nothing to reveal.
#[derive(Debug, Default)]
pub struct QuizTracker {
    open: HashMap<Language, (u64, TrackedQuiz)>,
    next_token: u64,
}

impl QuizTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track `quiz`, returning the token its reveal must present.
    pub fn track(&mut self, language: Language, quiz: TrackedQuiz) -> u64 {
        self.next_token += 1;
        self.open.insert(language, (self.next_token, quiz));
        self.next_token
    }

    /// Remove and return the quiz if it is still the one `token` refers to.
    pub fn take(&mut self, language: Language, token: u64) -> Option<TrackedQuiz> {
        match self.open.get(&language) {
            Some((current, _)) if *current == token => {
                self.open.remove(&language).map(|(_, quiz)| quiz)
            }
            _ => None,
        }
    }
}
