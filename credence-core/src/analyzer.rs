//! Local heuristic analyzer
//!
//! Pure and synchronous: no I/O and no shared state, so it can be called
//! concurrently from anywhere. Identical input always yields an identical
//! verdict.

use tracing::debug;

use crate::{detect_signals, score, select_highlights, split_sentences, summarize, Signal, VerdictResult};

/// A verdict together with the detector trace that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub verdict: VerdictResult,
    pub signals: Vec<Signal>,
}

/// Analyze article text and keep the per-detector trace
pub fn analyze_with_trace(text: &str, url: Option<&str>) -> Analysis {
    let sentences = split_sentences(text);
    let signals = detect_signals(text, &sentences);
    let card = score(&signals);

    debug!(
        url = url.unwrap_or("-"),
        sentences = sentences.len(),
        confidence = card.confidence,
        label = %card.label,
        "local analysis complete"
    );

    let verdict = VerdictResult {
        label: card.label,
        confidence: card.confidence,
        summary: summarize(text, &sentences),
        explanation: card.explanation,
        highlights: select_highlights(&sentences),
    };

    Analysis { verdict, signals }
}

/// Analyze article text. The URL is informational only.
pub fn analyze(text: &str, url: Option<&str>) -> VerdictResult {
    analyze_with_trace(text, url).verdict
}
