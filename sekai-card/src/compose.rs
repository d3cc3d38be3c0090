//! Turning raw lesson text into layout blocks.
//!
//! Normalization is an ordered table of regex rewrites kept outside the
//! layout engine; the engine only ever sees [`CardBlock`]s.

use regex::Regex;

use crate::layout::CardBlock;

/// One `pattern -> replacement` rewrite.
struct Rule {
    name: &'static str,
    pattern: Regex,
    replacement: String,
}

/// Ordered rewrite table applied to lesson text before block splitting.
pub struct Normalizer {
    rules: Vec<Rule>,
}

impl Normalizer {
    /// Build the rule table. `title` replaces the question marker.
    pub fn new(title: &str) -> Self {
        let table: [(&'static str, &str, String); 6] = [
            (
                "example-answer",
                r"(?s)\n*💬\s*Example Answer:.*$",
                String::new(),
            ),
            (
                "question-title",
                r"❓\s*Question:",
                format!("**{}**", title.replace('$', "$$")),
            ),
            (
                "fill-in-label",
                r"(?m)^[ \t]*✍\x{FE0F}?[ \t]*Fill-in-the-Blank:[^\n]*\n?",
                String::new(),
            ),
            (
                "language-label",
                r"(?m)^(\*\*)?[ \t]*(?:EN|JP)[ \t]*:[ \t]*",
                "${1}".to_string(),
            ),
            (
                "emoji",
                r"[\p{Extended_Pictographic}\x{1F1E6}-\x{1F1FF}\x{1F3FB}-\x{1F3FF}\x{20E3}\x{FE0F}\x{200D}]",
                String::new(),
            ),
            ("trailing-space", r"(?m)[ \t]+$", String::new()),
        ];

        let rules = table
            .into_iter()
            .map(|(name, pattern, replacement)| Rule {
                name,
                pattern: Regex::new(pattern).expect("normalization patterns are valid"),
                replacement,
            })
            .collect();
        Self { rules }
    }

    pub fn normalize(&self, raw: &str) -> String {
        let mut text = raw.replace("\r\n", "\n");
        for rule in &self.rules {
            let rewritten = rule.pattern.replace_all(&text, rule.replacement.as_str());
            if let std::borrow::Cow::Owned(changed) = rewritten {
                tracing::trace!(rule = rule.name, "normalization rule applied");
                text = changed;
            }
        }
        text
    }
}

/// Split on blank lines (whitespace-only lines count), dropping empty blocks.
pub fn split_blocks(text: &str) -> Vec<Vec<String>> {
    let mut blocks = Vec::new();
    let mut current: Vec<String> = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line.to_string());
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }
    blocks
}

/// Normalize `raw` and build the blocks handed to the layout engine.
///
/// The first block is titled and loses every `**` marker; later blocks keep
/// theirs for styled rendering.
pub fn compose_blocks(raw: &str, normalizer: &Normalizer) -> Vec<CardBlock> {
    let normalized = normalizer.normalize(raw);
    split_blocks(&normalized)
        .into_iter()
        .enumerate()
        .map(|(index, lines)| {
            if index == 0 {
                CardBlock::titled(lines.into_iter().map(|l| l.replace("**", "")).collect())
            } else {
                CardBlock::body(lines)
            }
        })
        .collect()
}
