//! Field extraction from model output.

use std::sync::LazyLock;

use regex::Regex;

use sekai_core::Language;

static EXAMPLE_EN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)🎯[ \t]*Examples?:[ \t]*\r?\n[ \t]*EN:[ \t]*([^\r\n]*)").expect("valid regex")
});

static EXAMPLE_JP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)🎯[ \t]*Examples?:[ \t]*\r?\n[ \t]*JP:[ \t]*([^\r\n]*)").expect("valid regex")
});

static PARAGRAPH_EN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"EN:[ \t]*(.+)").expect("valid regex"));

static PARAGRAPH_JP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"JP:[ \t]*(.+)").expect("valid regex"));

static OPTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*([A-D])\)[ \t]*(.+)$").expect("valid regex"));

static ANSWER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Answer:\s*([A-D])").expect("valid regex"));

static EXPLANATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)Explanation:\s*(.*?)(?:\n[ \t]*\n|\z)").expect("valid regex")
});

/// Example sentence in `language` from a word or grammar lesson.
///
/// Only the labelled line directly under the `🎯 Example:` heading counts.
pub fn extract_example(text: &str, language: Language) -> Option<String> {
    let re = match language {
        Language::English => &EXAMPLE_EN,
        Language::Japanese => &EXAMPLE_JP,
    };
    re.captures(text)
        .map(|c| c[1].trim().to_string())
        .filter(|s| !s.is_empty())
}

/// A parsed comprehension quiz.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizParts {
    pub paragraph: String,
    /// Options in A-D order; missing letters are skipped.
    pub options: Vec<String>,
    /// Uppercase `A`-`D`.
    pub answer: char,
    pub explanation: String,
}

pub fn parse_quiz(text: &str, language: Language) -> QuizParts {
    let (paragraph_re, fallback) = match language {
        Language::Japanese => (&PARAGRAPH_JP, "Japanese paragraph"),
        Language::English => (&PARAGRAPH_EN, "English paragraph"),
    };
    let paragraph = paragraph_re
        .captures(text)
        .map(|c| c[1].trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| fallback.to_string());

    let mut options = Vec::with_capacity(4);
    for letter in ["A", "B", "C", "D"] {
        if let Some(caps) = OPTION.captures_iter(text).find(|c| &c[1] == letter) {
            options.push(caps[2].trim().to_string());
        }
    }

    let answer = ANSWER
        .captures(text)
        .and_then(|c| c[1].chars().next())
        .map(|c| c.to_ascii_uppercase())
        .unwrap_or('A');

    let explanation = EXPLANATION
        .captures(text)
        .map(|c| c[1].trim().to_string())
        .unwrap_or_default();

    QuizParts {
        paragraph,
        options,
        answer,
        explanation,
    }
}
