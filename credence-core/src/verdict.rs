//! The verdict contract
//!
//! [`VerdictResult`] is the single output shape of every analysis source.
//! The local analyzer always produces a valid one; output from a remote
//! provider goes through [`parse_verdict`], which either yields a validated
//! verdict or an error the caller turns into [`VerdictResult::degraded`].

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::{round2, MAX_HIGHLIGHTS};

/// Note attached when provider output could not be parsed
pub const UNSTRUCTURED_NOTE: &str = "LLM returned unstructured text; see raw for details.";

/// Characters of raw provider output kept in a degraded summary
const DEGRADED_SUMMARY_CHARS: usize = 1000;

/// Credibility label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    Credible,
    Mixed,
    Fake,
    /// Only produced for degraded results
    Unknown,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Credible => "credible",
            Label::Mixed => "mixed",
            Label::Fake => "fake",
            Label::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A flagged sentence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Highlight {
    pub sentence: String,
    pub reason: String,
    /// The claim being flagged; defaults to the sentence
    #[serde(default)]
    pub claim: Option<String>,
}

impl Highlight {
    pub fn new(sentence: &str, reason: &str) -> Self {
        Self {
            sentence: sentence.to_string(),
            reason: reason.to_string(),
            claim: Some(sentence.to_string()),
        }
    }

    /// The claim text, falling back to the sentence
    pub fn claim_text(&self) -> &str {
        self.claim.as_deref().unwrap_or(&self.sentence)
    }
}

/// Structured credibility verdict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerdictResult {
    pub label: Label,
    /// In [0.0, 1.0], rounded to two decimals
    pub confidence: f64,
    pub summary: String,
    /// Ordered reasons, never empty
    pub explanation: Vec<String>,
    /// At most five
    pub highlights: Vec<Highlight>,
}

impl VerdictResult {
    /// Safe stand-in when an alternative source fails or returns garbage
    pub fn degraded(summary: &str, note: &str) -> Self {
        Self {
            label: Label::Unknown,
            confidence: 0.0,
            summary: summary.to_string(),
            explanation: vec![note.to_string()],
            highlights: Vec::new(),
        }
    }

    /// Degraded result for provider output that failed to parse
    pub fn unstructured(raw: &str, error: &VerdictParseError) -> Self {
        let summary: String = raw.trim().chars().take(DEGRADED_SUMMARY_CHARS).collect();
        let mut result = Self::degraded(&summary, UNSTRUCTURED_NOTE);
        result.explanation.push(error.to_string());
        result
    }

    pub fn is_degraded(&self) -> bool {
        self.label == Label::Unknown
    }
}

/// Why provider output could not be turned into a verdict
#[derive(Debug, Error)]
pub enum VerdictParseError {
    #[error("No JSON object found in provider output")]
    NoJson,

    #[error("Malformed verdict JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported label: {0}")]
    Label(Label),

    #[error("Confidence out of range: {0}")]
    Confidence(f64),

    #[error("Explanation is empty")]
    EmptyExplanation,
}

/// Parse provider output into a validated verdict
///
/// Accepts bare JSON, JSON inside a Markdown code fence, or a JSON object
/// surrounded by prose. Highlights beyond the limit are dropped and the
/// confidence is re-rounded.
pub fn parse_verdict(raw: &str) -> Result<VerdictResult, VerdictParseError> {
    let json = extract_json_object(raw).ok_or(VerdictParseError::NoJson)?;
    let mut verdict: VerdictResult = serde_json::from_str(json)?;

    if verdict.label == Label::Unknown {
        return Err(VerdictParseError::Label(verdict.label));
    }
    if !verdict.confidence.is_finite() || !(0.0..=1.0).contains(&verdict.confidence) {
        return Err(VerdictParseError::Confidence(verdict.confidence));
    }
    if verdict.explanation.iter().all(|reason| reason.trim().is_empty()) {
        return Err(VerdictParseError::EmptyExplanation);
    }

    verdict.confidence = round2(verdict.confidence);
    verdict.highlights.truncate(MAX_HIGHLIGHTS);

    Ok(verdict)
}

/// Locate the outermost JSON object, ignoring code fences and prose
fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (start < end).then(|| &raw[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"{
        "label": "credible",
        "confidence": 0.834,
        "summary": "A sourced report.",
        "explanation": ["Cites two agencies."],
        "highlights": [{"sentence": "Rates rose 12%.", "reason": "Numeric claim"}]
    }"#;

    #[test]
    fn test_parse_bare_json() {
        let verdict = parse_verdict(VALID).unwrap();
        assert_eq!(verdict.label, Label::Credible);
        assert_eq!(verdict.confidence, 0.83);
        assert_eq!(verdict.highlights.len(), 1);
        assert_eq!(verdict.highlights[0].claim, None);
        assert_eq!(verdict.highlights[0].claim_text(), "Rates rose 12%.");
    }

    #[test]
    fn test_parse_fenced_json() {
        let fenced = format!("Here is the analysis:\n```json\n{}\n```\nHope this helps.", VALID);
        let verdict = parse_verdict(&fenced).unwrap();
        assert_eq!(verdict.summary, "A sourced report.");
    }

    #[test]
    fn test_rejects_prose() {
        let err = parse_verdict("The article seems fine to me.").unwrap_err();
        assert!(matches!(err, VerdictParseError::NoJson));
    }

    #[test]
    fn test_rejects_missing_fields() {
        let err = parse_verdict(r#"{"label": "fake", "confidence": 0.2}"#).unwrap_err();
        assert!(matches!(err, VerdictParseError::Json(_)));
    }

    #[test]
    fn test_rejects_unknown_or_bogus_label() {
        let unknown = VALID.replace("\"credible\"", "\"unknown\"");
        assert!(matches!(
            parse_verdict(&unknown).unwrap_err(),
            VerdictParseError::Label(Label::Unknown)
        ));

        let bogus = VALID.replace("\"credible\"", "\"satire\"");
        assert!(matches!(parse_verdict(&bogus).unwrap_err(), VerdictParseError::Json(_)));
    }

    #[test]
    fn test_rejects_out_of_range_confidence() {
        let over = VALID.replace("0.834", "1.5");
        assert!(matches!(
            parse_verdict(&over).unwrap_err(),
            VerdictParseError::Confidence(_)
        ));
    }

    #[test]
    fn test_rejects_empty_explanation() {
        let empty = VALID.replace("[\"Cites two agencies.\"]", "[]");
        assert!(matches!(
            parse_verdict(&empty).unwrap_err(),
            VerdictParseError::EmptyExplanation
        ));
    }

    #[test]
    fn test_truncates_highlights() {
        let highlight = r#"{"sentence": "s", "reason": "r", "claim": "c"}"#;
        let many = vec![highlight; 8].join(",");
        let json = format!(
            r#"{{"label": "mixed", "confidence": 0.5, "summary": "", "explanation": ["x"], "highlights": [{}]}}"#,
            many
        );
        let verdict = parse_verdict(&json).unwrap();
        assert_eq!(verdict.highlights.len(), MAX_HIGHLIGHTS);
    }

    #[test]
    fn test_unstructured_degrades() {
        let raw = "I cannot produce JSON today.";
        let err = parse_verdict(raw).unwrap_err();
        let verdict = VerdictResult::unstructured(raw, &err);

        assert!(verdict.is_degraded());
        assert_eq!(verdict.confidence, 0.0);
        assert_eq!(verdict.summary, raw);
        assert_eq!(verdict.explanation[0], UNSTRUCTURED_NOTE);
        assert!(verdict.highlights.is_empty());
    }

    #[test]
    fn test_label_serializes_lowercase() {
        let json = serde_json::to_string(&Label::Credible).unwrap();
        assert_eq!(json, "\"credible\"");
        assert_eq!(Label::Unknown.to_string(), "unknown");
    }
}
