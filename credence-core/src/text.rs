//! Sentence normalization
//!
//! Splits article text after `.`, `!` or `?` when followed by whitespace.

use regex::Regex;
use std::sync::LazyLock;

// Numeric token: two or more consecutive digits on word boundaries
static NUMERIC_TOKEN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[0-9]{2,}\b").expect("numeric token pattern")
});

/// Split text into trimmed, non-empty sentences in original order
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let trimmed = text.trim();
    let mut chars = trimmed.char_indices().peekable();
    let mut start = 0;

    while let Some((idx, ch)) = chars.next() {
        if !matches!(ch, '.' | '!' | '?') {
            continue;
        }

        let boundary = match chars.peek() {
            Some((_, next)) if next.is_whitespace() => idx + ch.len_utf8(),
            _ => continue,
        };

        push_sentence(&mut sentences, &trimmed[start..boundary]);

        // Consume the whole whitespace run as one boundary
        while chars.peek().is_some_and(|(_, c)| c.is_whitespace()) {
            chars.next();
        }
        start = chars.peek().map(|(i, _)| *i).unwrap_or(trimmed.len());
    }

    if start < trimmed.len() {
        push_sentence(&mut sentences, &trimmed[start..]);
    }

    sentences
}

fn push_sentence(sentences: &mut Vec<String>, piece: &str) {
    let piece = piece.trim();
    if !piece.is_empty() {
        sentences.push(piece.to_string());
    }
}

/// Count numeric tokens (runs of two or more digits)
pub fn count_numeric_tokens(text: &str) -> usize {
    NUMERIC_TOKEN_REGEX.find_iter(text).count()
}

/// Check whether text contains at least one numeric token
pub fn has_numeric_token(text: &str) -> bool {
    NUMERIC_TOKEN_REGEX.is_match(text)
}

/// Length of text in characters (not bytes)
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}
