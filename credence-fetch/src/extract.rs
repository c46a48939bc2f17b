//! Article text extraction
//!
//! Fetches a page and keeps the text of its `<p>` elements, which is where
//! news sites put article bodies. Navigation, scripts and boilerplate
//! outside paragraphs are dropped.

use async_trait::async_trait;
use scraper::{Html, Selector};
use tracing::{debug, warn};

use crate::{create_client, validate_url, FetchConfig, FetchError};

/// Source of article text for a URL
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Extract article text; `Ok(None)` means the page had nothing usable
    async fn extract(&self, url: &str) -> Result<Option<String>, FetchError>;
}

/// [`TextProvider`] that fetches pages over HTTP
#[derive(Debug, Clone, Default)]
pub struct HttpTextProvider {
    config: FetchConfig,
}

impl HttpTextProvider {
    pub fn new(config: FetchConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl TextProvider for HttpTextProvider {
    async fn extract(&self, url: &str) -> Result<Option<String>, FetchError> {
        fetch_article_text(url, &self.config).await
    }
}

/// Fetch a URL and extract its paragraph text
pub async fn fetch_article_text(url: &str, config: &FetchConfig) -> Result<Option<String>, FetchError> {
    validate_url(url)?;
    let client = create_client(config)?;

    debug!("Fetching: {}", url);

    let response = client.get(url).send().await?;

    if response.status() != reqwest::StatusCode::OK {
        warn!("Fetch of {} returned status: {}", url, response.status());
        return Ok(None);
    }

    let html = response.text().await?;
    let text = extract_paragraphs(&html);

    if text.is_empty() {
        debug!("No paragraph text found at {}", url);
        return Ok(None);
    }

    Ok(Some(truncate_chars(&text, config.max_chars)))
}

/// Join the trimmed text of every non-empty `<p>` with blank lines
pub fn extract_paragraphs(html: &str) -> String {
    let document = Html::parse_document(html);
    let paragraph_selector = Selector::parse("p").expect("static selector");

    document
        .select(&paragraph_selector)
        .map(|p| p.text().collect::<String>())
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Keep at most `max_chars` characters
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
