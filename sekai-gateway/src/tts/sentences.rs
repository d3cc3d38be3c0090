/// Sentence terminators, Latin and full-width.
fn is_terminator(ch: char) -> bool {
    matches!(ch, '.' | '!' | '?' | '。' | '！' | '？')
}

/// Split text after each run of sentence terminators.
///
/// Pieces are trimmed and empty pieces dropped. Trailing text without a
/// terminator is kept as the last piece.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut prev_terminator = false;

    for (i, ch) in text.char_indices() {
        let terminator = is_terminator(ch);
        if prev_terminator && !terminator {
            push_trimmed(&mut sentences, &text[start..i]);
            start = i;
        }
        prev_terminator = terminator;
    }
    push_trimmed(&mut sentences, &text[start..]);
    sentences
}

fn push_trimmed<'a>(out: &mut Vec<&'a str>, piece: &'a str) {
    let piece = piece.trim();
    if !piece.is_empty() {
        out.push(piece);
    }
}
