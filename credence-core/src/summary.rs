//! Extractive summaries

use crate::SUMMARY_SENTENCES;

/// Characters of raw text used when no sentences could be found
const RAW_PREFIX_CHARS: usize = 300;

/// Join the lead sentences, or fall back to a raw prefix with an ellipsis
pub fn summarize(text: &str, sentences: &[String]) -> String {
    if !sentences.is_empty() {
        return sentences
            .iter()
            .take(SUMMARY_SENTENCES)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ");
    }

    if text.is_empty() {
        return String::new();
    }

    let prefix: String = text.chars().take(RAW_PREFIX_CHARS).collect();
    format!("{}...", prefix)
}
