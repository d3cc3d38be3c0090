//! Greedy line breaking against a pixel width budget.

use crate::metrics::{FontSpec, TextMeasure};

/// Break `text` into lines no wider than `max_width` under `font`.
///
/// Tokens are whitespace separated and re-joined with single spaces. A token
/// that does not fit on a line of its own is split by characters with
/// [`split_oversized_word`]. Whitespace-only input produces no lines.
pub fn wrap_text<M: TextMeasure + ?Sized>(
    text: &str,
    measure: &M,
    font: &FontSpec,
    max_width: f32,
) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for token in text.split_whitespace() {
        if !current.is_empty() {
            let candidate = format!("{current} {token}");
            if measure.width(&candidate, font) <= max_width {
                current = candidate;
                continue;
            }
            lines.push(std::mem::take(&mut current));
        }

        if measure.width(token, font) <= max_width {
            current.push_str(token);
            continue;
        }

        let mut fragments = split_oversized_word(token, measure, font, max_width);
        // The last fragment stays open so following words can join it.
        if let Some(last) = fragments.pop() {
            lines.extend(fragments);
            current = last;
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Split a single word into fragments no wider than `max_width`.
///
/// A fragment is only allowed to overflow when it is a single character that
/// is wider than the budget by itself. Fragments are never empty.
pub fn split_oversized_word<M: TextMeasure + ?Sized>(
    word: &str,
    measure: &M,
    font: &FontSpec,
    max_width: f32,
) -> Vec<String> {
    let mut fragments = Vec::new();
    let mut current = String::new();

    for ch in word.chars() {
        current.push(ch);
        if current.chars().nth(1).is_some() && measure.width(&current, font) > max_width {
            current.pop();
            fragments.push(std::mem::take(&mut current));
            current.push(ch);
        }
    }

    if !current.is_empty() {
        fragments.push(current);
    }
    fragments
}
