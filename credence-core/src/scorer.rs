//! Score aggregation
//!
//! Starts from a neutral prior, applies every signal delta additively,
//! clamps to [0, 1] and maps the result onto a label.

use tracing::debug;

use crate::{Label, Signal, CREDIBLE_THRESHOLD, MIXED_THRESHOLD, NEUTRAL_PRIOR};

/// Explanation used when no detector fired
pub const NO_SIGNALS_REASON: &str = "No strong signals found; treat with caution.";

/// Aggregated score for one analysis
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreCard {
    /// Clamped score rounded to two decimals
    pub confidence: f64,
    /// Label derived from `confidence`
    pub label: Label,
    /// Reasons from triggered detectors, in detector order
    pub explanation: Vec<String>,
}

/// Round to two decimals, half away from zero
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Map a score in [0, 1] to a label
pub fn label_for(score: f64) -> Label {
    if score >= CREDIBLE_THRESHOLD {
        Label::Credible
    } else if score >= MIXED_THRESHOLD {
        Label::Mixed
    } else {
        Label::Fake
    }
}

/// Combine detector outputs into a score card
pub fn score(signals: &[Signal]) -> ScoreCard {
    let mut raw = NEUTRAL_PRIOR;
    for signal in signals {
        raw += signal.delta;
        debug!(kind = ?signal.kind, delta = signal.delta, running = raw, "applied signal");
    }

    // Thresholds compare the rounded value so float noise cannot flip a label
    let confidence = round2(raw.clamp(0.0, 1.0));
    let label = label_for(confidence);

    let mut explanation: Vec<String> = signals
        .iter()
        .filter_map(|signal| signal.reason.clone())
        .collect();
    if explanation.is_empty() {
        explanation.push(NO_SIGNALS_REASON.to_string());
    }

    ScoreCard {
        confidence,
        label,
        explanation,
    }
}
