//! Claim highlighting
//!
//! Flags sentences carrying numeric or absolute claims, up to
//! [`MAX_HIGHLIGHTS`]. Falls back to the lead sentence when nothing qualifies.

use regex::Regex;
use std::sync::LazyLock;

use crate::{has_numeric_token, Highlight, MAX_HIGHLIGHTS};

pub const CLAIM_REASON: &str = "Contains numeric/strong claim";

pub const LEAD_REASON: &str = "Lead sentence";

static STRONG_CLAIM_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:always|never|proves|confirm|disproves)\b").expect("strong claim pattern")
});

/// Whether a sentence contains a numeric token or an absolute claim word
pub fn is_claim(sentence: &str) -> bool {
    has_numeric_token(sentence) || STRONG_CLAIM_REGEX.is_match(sentence)
}

/// Select highlights from sentences in original order
pub fn select_highlights(sentences: &[String]) -> Vec<Highlight> {
    let highlights: Vec<Highlight> = sentences
        .iter()
        .filter(|sentence| is_claim(sentence))
        .take(MAX_HIGHLIGHTS)
        .map(|sentence| Highlight::new(sentence, CLAIM_REASON))
        .collect();

    if highlights.is_empty() {
        return sentences
            .first()
            .map(|lead| vec![Highlight::new(lead, LEAD_REASON)])
            .unwrap_or_default();
    }

    highlights
}
