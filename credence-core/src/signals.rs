//! Credibility signal detectors
//!
//! Each detector is a pure function over the article text and its sentences.
//! A detector that does not trigger contributes a zero delta and no reason.
//! Detectors share no state and can run in any order; [`detect_signals`]
//! returns them in a fixed order so traces are reproducible.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::{char_len, count_numeric_tokens, MIN_ARTICLE_CHARS};

/// Terms that suggest clickbait or sensational framing
pub const SENSATIONAL_TERMS: &[&str] = &[
    "shocking",
    "unbelievable",
    "miracle",
    "exposed",
    "secret",
    "you won't believe",
    "breakthrough",
];

/// Penalty per sensational match
const SENSATIONAL_PENALTY_PER_MATCH: f64 = 0.05;

/// Cap on the total sensational penalty
const SENSATIONAL_PENALTY_CAP: f64 = 0.25;

/// Bonus when the article links out to at least two sources
const LINK_BONUS: f64 = 0.15;

/// Links needed for the bonus
const MIN_LINKS_FOR_BONUS: usize = 2;

/// Penalty for numbers with nothing to back them
const UNSUPPORTED_NUMBERS_PENALTY: f64 = 0.15;

/// Penalty for very short articles
const BREVITY_PENALTY: f64 = 0.1;

static LINK_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://").expect("link pattern"));

/// The detectors, in scoring order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    SensationalLanguage,
    ExternalLinks,
    UnsupportedNumbers,
    Brevity,
}

/// Outcome of one detector for one analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    /// Which detector produced this
    pub kind: SignalKind,
    /// Additive score adjustment (0.0 when not triggered)
    pub delta: f64,
    /// Human-readable reason, present only when triggered
    pub reason: Option<String>,
}

impl Signal {
    fn quiet(kind: SignalKind) -> Self {
        Self {
            kind,
            delta: 0.0,
            reason: None,
        }
    }

    fn triggered(kind: SignalKind, delta: f64, reason: String) -> Self {
        Self {
            kind,
            delta,
            reason: Some(reason),
        }
    }

    pub fn is_triggered(&self) -> bool {
        self.reason.is_some()
    }
}

/// Count case-insensitive, non-overlapping occurrences of sensational terms
pub fn count_sensational(text: &str) -> usize {
    let lowered = text.to_lowercase();
    SENSATIONAL_TERMS
        .iter()
        .map(|term| lowered.matches(term).count())
        .sum()
}

/// Count `http://` and `https://` occurrences
pub fn count_links(text: &str) -> usize {
    LINK_REGEX.find_iter(text).count()
}

pub fn detect_sensational(text: &str, _sentences: &[String]) -> Signal {
    let count = count_sensational(text);
    if count == 0 {
        return Signal::quiet(SignalKind::SensationalLanguage);
    }

    let penalty = (SENSATIONAL_PENALTY_PER_MATCH * count as f64).min(SENSATIONAL_PENALTY_CAP);
    Signal::triggered(
        SignalKind::SensationalLanguage,
        -penalty,
        format!("Found sensational language ({} match(es)).", count),
    )
}

pub fn detect_external_links(text: &str, _sentences: &[String]) -> Signal {
    let links = count_links(text);
    if links < MIN_LINKS_FOR_BONUS {
        return Signal::quiet(SignalKind::ExternalLinks);
    }

    Signal::triggered(
        SignalKind::ExternalLinks,
        LINK_BONUS,
        format!("Contains {} external links (potential sources).", links),
    )
}

pub fn detect_unsupported_numbers(text: &str, _sentences: &[String]) -> Signal {
    if count_numeric_tokens(text) == 0 || count_links(text) > 0 {
        return Signal::quiet(SignalKind::UnsupportedNumbers);
    }

    Signal::triggered(
        SignalKind::UnsupportedNumbers,
        -UNSUPPORTED_NUMBERS_PENALTY,
        "Contains numeric claims but no obvious citations or links.".to_string(),
    )
}

pub fn detect_brevity(text: &str, _sentences: &[String]) -> Signal {
    if char_len(text) >= MIN_ARTICLE_CHARS {
        return Signal::quiet(SignalKind::Brevity);
    }

    Signal::triggered(
        SignalKind::Brevity,
        -BREVITY_PENALTY,
        "Article is very short; may lack context.".to_string(),
    )
}

/// Run every detector in scoring order
pub fn detect_signals(text: &str, sentences: &[String]) -> Vec<Signal> {
    vec![
        detect_sensational(text, sentences),
        detect_external_links(text, sentences),
        detect_unsupported_numbers(text, sentences),
        detect_brevity(text, sentences),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sensational_count_is_case_insensitive() {
        let signal = detect_sensational("Breaking news! Unbelievable SECRET discovered.", &[]);
        assert_eq!(signal.kind, SignalKind::SensationalLanguage);
        assert!((signal.delta + 0.1).abs() < 1e-9);
        assert_eq!(
            signal.reason.as_deref(),
            Some("Found sensational language (2 match(es)).")
        );
    }

    #[test]
    fn test_sensational_penalty_is_capped() {
        let text = "shocking shocking shocking miracle miracle exposed secret";
        assert_eq!(count_sensational(text), 7);
        let signal = detect_sensational(text, &[]);
        assert!((signal.delta + 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_sensational_phrase() {
        assert_eq!(count_sensational("You won't believe what happened"), 1);
        assert!(!detect_sensational("A calm report.", &[]).is_triggered());
    }

    #[test]
    fn test_links_need_two() {
        let one = detect_external_links("See https://a.example for details", &[]);
        assert!(!one.is_triggered());
        assert_eq!(one.delta, 0.0);

        let two = detect_external_links("See https://a.example and http://b.example", &[]);
        assert_eq!(two.delta, 0.15);
        assert_eq!(
            two.reason.as_deref(),
            Some("Contains 2 external links (potential sources).")
        );
    }

    #[test]
    fn test_numbers_without_links() {
        let signal = detect_unsupported_numbers("Study claims 95% of students prefer X.", &[]);
        assert_eq!(signal.delta, -0.15);

        // A single link is enough to suppress the penalty
        let cited = detect_unsupported_numbers("95% agree, per https://a.example", &[]);
        assert!(!cited.is_triggered());
    }

    #[test]
    fn test_brevity_boundary() {
        let at_limit = "a".repeat(300);
        assert!(!detect_brevity(&at_limit, &[]).is_triggered());

        let below = "a".repeat(299);
        let signal = detect_brevity(&below, &[]);
        assert_eq!(signal.delta, -0.1);
        assert_eq!(
            signal.reason.as_deref(),
            Some("Article is very short; may lack context.")
        );
    }

    #[test]
    fn test_detect_signals_order() {
        let kinds: Vec<_> = detect_signals("", &[]).iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                SignalKind::SensationalLanguage,
                SignalKind::ExternalLinks,
                SignalKind::UnsupportedNumbers,
                SignalKind::Brevity,
            ]
        );
    }
}
