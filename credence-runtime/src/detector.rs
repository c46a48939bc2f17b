//! Detector
//!
//! Owns the analysis choice explicitly: a [`Detector`] is built with an
//! [`AnalysisMode`] instead of consulting process-wide state, so local and
//! remote paths are both deterministic to test.
//!
//! - Requests carry text, a URL, or both; text wins when present
//! - Input shorter than [`DetectorConfig::min_chars`] is rejected
//! - Remote output is parsed strictly or degraded to an `unknown` verdict

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use credence_agents::{enrich, EnrichmentOutcome, SharedProvider};
use credence_core::{analyze, VerdictResult};
use credence_fetch::{validate_url, FetchConfig, HttpTextProvider, TextProvider};

/// Default minimum article length in characters
pub const DEFAULT_MIN_CHARS: usize = 50;

/// Where analysis happens
#[derive(Clone)]
pub enum AnalysisMode {
    /// Heuristic analyzer only; never touches the network for scoring
    Local,
    /// Ask a remote provider for the verdict
    Remote(SharedProvider),
}

impl AnalysisMode {
    pub fn describe(&self) -> String {
        match self {
            AnalysisMode::Local => "local heuristics".to_string(),
            AnalysisMode::Remote(provider) => format!("remote ({})", provider.name()),
        }
    }
}

/// What to do when the remote provider fails or answers garbage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Return the degraded `unknown` verdict
    #[default]
    Degrade,
    /// Run the local analyzer instead
    LocalFallback,
}

/// Detector configuration
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Minimum article length in characters
    pub min_chars: usize,
    /// Maximum requests analyzed at once in a batch
    pub max_concurrent: usize,
    /// Remote failure handling
    pub failure_policy: FailurePolicy,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            min_chars: DEFAULT_MIN_CHARS,
            max_concurrent: 4,
            failure_policy: FailurePolicy::default(),
        }
    }
}

impl DetectorConfig {
    pub fn with_min_chars(mut self, min_chars: usize) -> Self {
        self.min_chars = min_chars;
        self
    }

    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }
}

/// An article to check
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub url: Option<String>,
    pub text: Option<String>,
}

impl AnalysisRequest {
    pub fn from_text(text: &str) -> Self {
        Self {
            url: None,
            text: Some(text.to_string()),
        }
    }

    pub fn from_url(url: &str) -> Self {
        Self {
            url: Some(url.to_string()),
            text: None,
        }
    }

    pub fn with_url(mut self, url: &str) -> Self {
        self.url = Some(url.to_string());
        self
    }
}

/// Request-level failures
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Couldn't extract article text from URL: {0}")]
    Extraction(String),

    #[error("Please provide article text or a valid URL with sufficient content ({actual} of {required} characters).")]
    InsufficientContent { actual: usize, required: usize },
}

/// Which path produced a verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictSource {
    Local,
    Remote,
    Degraded,
}

/// A verdict plus where it came from
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    #[serde(flatten)]
    pub verdict: VerdictResult,
    pub source: VerdictSource,
    /// Remote provider name, when one was asked
    pub provider: Option<String>,
    /// Raw provider output, when there was any
    pub raw: Option<String>,
    pub url: Option<String>,
    pub analyzed_at: DateTime<Utc>,
}

/// The analysis boundary
pub struct Detector {
    config: DetectorConfig,
    mode: AnalysisMode,
    text_provider: Arc<dyn TextProvider>,
}

impl Detector {
    /// Create a detector with an explicit mode and text source
    pub fn new(config: DetectorConfig, mode: AnalysisMode, text_provider: Arc<dyn TextProvider>) -> Self {
        info!("Detector using {}", mode.describe());
        Self {
            config,
            mode,
            text_provider,
        }
    }

    /// Detector fetching over HTTP with the given fetch settings
    pub fn with_http(config: DetectorConfig, mode: AnalysisMode, fetch: FetchConfig) -> Self {
        Self::new(config, mode, Arc::new(HttpTextProvider::new(fetch)))
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn mode(&self) -> &AnalysisMode {
        &self.mode
    }

    /// Validate a request and produce the text to analyze
    pub async fn resolve_text(&self, request: &AnalysisRequest) -> Result<String, RequestError> {
        if let Some(url) = &request.url {
            validate_url(url).map_err(|_| RequestError::InvalidUrl(url.clone()))?;
        }

        let text = match (&request.text, &request.url) {
            (Some(text), _) if !text.is_empty() => text.clone(),
            (_, Some(url)) => self
                .text_provider
                .extract(url)
                .await
                .map_err(|e| RequestError::Extraction(e.to_string()))?
                .ok_or_else(|| RequestError::Extraction(url.clone()))?,
            _ => String::new(),
        };

        let actual = text.chars().count();
        if actual < self.config.min_chars {
            return Err(RequestError::InsufficientContent {
                actual,
                required: self.config.min_chars,
            });
        }

        Ok(text)
    }

    /// Analyze one request
    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisReport, RequestError> {
        let text = self.resolve_text(request).await?;
        let url = request.url.as_deref();

        debug!("Analyzing {} chars from {}", text.chars().count(), url.unwrap_or("text input"));

        let report = match &self.mode {
            AnalysisMode::Local => self.local_report(&text, url),
            AnalysisMode::Remote(provider) => {
                let enrichment = enrich(provider.as_ref(), &text, url).await;

                match enrichment.outcome {
                    EnrichmentOutcome::Parsed => self.report(
                        enrichment.verdict,
                        VerdictSource::Remote,
                        Some(provider.name()),
                        enrichment.raw,
                        url,
                    ),
                    _ if self.config.failure_policy == FailurePolicy::LocalFallback => {
                        warn!("Remote verdict unusable; falling back to local analyzer");
                        let mut report = self.local_report(&text, url);
                        report.provider = Some(provider.name().to_string());
                        report.raw = enrichment.raw;
                        report
                    }
                    _ => self.report(
                        enrichment.verdict,
                        VerdictSource::Degraded,
                        Some(provider.name()),
                        enrichment.raw,
                        url,
                    ),
                }
            }
        };

        info!(
            "Verdict {} ({:.2}) via {:?}",
            report.verdict.label, report.verdict.confidence, report.source
        );

        Ok(report)
    }

    /// Analyze several requests concurrently; results keep input order
    pub async fn analyze_batch(
        &self,
        requests: &[AnalysisRequest],
    ) -> Vec<Result<AnalysisReport, RequestError>> {
        use futures::stream::{self, StreamExt};

        stream::iter(requests)
            .map(|request| self.analyze(request))
            .buffered(self.config.max_concurrent.max(1))
            .collect()
            .await
    }

    fn local_report(&self, text: &str, url: Option<&str>) -> AnalysisReport {
        self.report(analyze(text, url), VerdictSource::Local, None, None, url)
    }

    fn report(
        &self,
        verdict: VerdictResult,
        source: VerdictSource,
        provider: Option<&str>,
        raw: Option<String>,
        url: Option<&str>,
    ) -> AnalysisReport {
        AnalysisReport {
            verdict,
            source,
            provider: provider.map(str::to_string),
            raw,
            url: url.map(str::to_string),
            analyzed_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use credence_agents::{EnrichmentProvider, LlmError};
    use credence_core::Label;
    use credence_fetch::FetchError;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const ARTICLE: &str = "The city council approved the annual budget on Tuesday after a long debate.";

    /// Text provider serving canned pages
    #[derive(Default)]
    struct StaticPages {
        pages: HashMap<String, Option<String>>,
        calls: AtomicUsize,
    }

    impl StaticPages {
        fn with(mut self, url: &str, text: Option<&str>) -> Self {
            self.pages.insert(url.to_string(), text.map(str::to_string));
            self
        }
    }

    #[async_trait]
    impl TextProvider for StaticPages {
        async fn extract(&self, url: &str) -> Result<Option<String>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| FetchError::InvalidUrl(url.to_string()))
        }
    }

    /// Provider replaying a canned reply
    struct ScriptedProvider {
        reply: Result<String, String>,
    }

    #[async_trait]
    impl EnrichmentProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn enrich(&self, _text: &str, _url: Option<&str>) -> Result<String, LlmError> {
            self.reply.clone().map_err(LlmError::Api)
        }
    }

    fn remote(reply: Result<&str, &str>) -> AnalysisMode {
        AnalysisMode::Remote(Arc::new(ScriptedProvider {
            reply: reply.map(str::to_string).map_err(str::to_string),
        }))
    }

    fn detector(mode: AnalysisMode, pages: StaticPages) -> Detector {
        Detector::new(DetectorConfig::default(), mode, Arc::new(pages))
    }

    #[tokio::test]
    async fn test_local_text_request() {
        let pages = Arc::new(StaticPages::default());
        let detector = Detector::new(DetectorConfig::default(), AnalysisMode::Local, pages.clone());

        let report = detector.analyze(&AnalysisRequest::from_text(ARTICLE)).await.unwrap();
        assert_eq!(report.source, VerdictSource::Local);
        assert_eq!(report.verdict, analyze(ARTICLE, None));
        assert!(report.provider.is_none());
        assert_eq!(pages.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_short_text_is_rejected() {
        let detector = detector(AnalysisMode::Local, StaticPages::default());
        let err = detector
            .analyze(&AnalysisRequest::from_text("Too short."))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RequestError::InsufficientContent { actual: 10, required: 50 }
        ));
    }

    #[tokio::test]
    async fn test_empty_request_is_rejected() {
        let detector = detector(AnalysisMode::Local, StaticPages::default());
        let err = detector.analyze(&AnalysisRequest::default()).await.unwrap_err();
        assert!(matches!(err, RequestError::InsufficientContent { actual: 0, .. }));
    }

    #[tokio::test]
    async fn test_url_request_fetches_text() {
        let url = "https://news.example/budget";
        let detector = detector(
            AnalysisMode::Local,
            StaticPages::default().with(url, Some(ARTICLE)),
        );

        let report = detector.analyze(&AnalysisRequest::from_url(url)).await.unwrap();
        assert_eq!(report.url.as_deref(), Some(url));
        assert_eq!(report.verdict, analyze(ARTICLE, Some(url)));
    }

    #[tokio::test]
    async fn test_text_wins_over_url() {
        let pages = Arc::new(StaticPages::default());
        let detector = Detector::new(DetectorConfig::default(), AnalysisMode::Local, pages.clone());

        let request = AnalysisRequest::from_text(ARTICLE).with_url("https://news.example/other");
        detector.analyze(&request).await.unwrap();
        assert_eq!(pages.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_url_without_text_is_extraction_error() {
        let url = "https://news.example/empty";
        let detector = detector(AnalysisMode::Local, StaticPages::default().with(url, None));

        let err = detector.analyze(&AnalysisRequest::from_url(url)).await.unwrap_err();
        assert!(matches!(err, RequestError::Extraction(_)));
    }

    #[tokio::test]
    async fn test_invalid_url() {
        let detector = detector(AnalysisMode::Local, StaticPages::default());
        let err = detector
            .analyze(&AnalysisRequest::from_url("mailto:someone@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, RequestError::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn test_malformed_host_is_invalid_url_not_fetched() {
        let pages = Arc::new(StaticPages::default());
        let detector = Detector::new(DetectorConfig::default(), AnalysisMode::Local, pages.clone());

        for url in ["https://[::1", "https://:80/x", "http://@"] {
            let err = detector.analyze(&AnalysisRequest::from_url(url)).await.unwrap_err();
            assert!(matches!(err, RequestError::InvalidUrl(ref u) if u == url));
        }
        assert_eq!(pages.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_detector_exposes_config() {
        let config = DetectorConfig::default()
            .with_min_chars(120)
            .with_max_concurrent(0)
            .with_failure_policy(FailurePolicy::LocalFallback);
        let detector = Detector::new(config, AnalysisMode::Local, Arc::new(StaticPages::default()));

        assert_eq!(detector.config().min_chars, 120);
        assert_eq!(detector.config().max_concurrent, 1);
        assert_eq!(detector.config().failure_policy, FailurePolicy::LocalFallback);
    }

    #[tokio::test]
    async fn test_remote_parsed() {
        let detector = detector(
            remote(Ok(r#"{"label": "credible", "confidence": 0.9, "summary": "ok",
                "explanation": ["Well sourced."], "highlights": []}"#)),
            StaticPages::default(),
        );

        let report = detector.analyze(&AnalysisRequest::from_text(ARTICLE)).await.unwrap();
        assert_eq!(report.source, VerdictSource::Remote);
        assert_eq!(report.verdict.label, Label::Credible);
        assert_eq!(report.provider.as_deref(), Some("scripted"));
        assert!(report.raw.is_some());
    }

    #[tokio::test]
    async fn test_remote_unstructured_degrades() {
        let detector = detector(remote(Ok("I think it is fine.")), StaticPages::default());

        let report = detector.analyze(&AnalysisRequest::from_text(ARTICLE)).await.unwrap();
        assert_eq!(report.source, VerdictSource::Degraded);
        assert_eq!(report.verdict.label, Label::Unknown);
        assert_eq!(report.verdict.confidence, 0.0);
        assert!(report.verdict.highlights.is_empty());
        assert!(!report.verdict.explanation.is_empty());
    }

    #[tokio::test]
    async fn test_remote_failure_with_local_fallback() {
        let detector = Detector::new(
            DetectorConfig::default().with_failure_policy(FailurePolicy::LocalFallback),
            remote(Err("timeout")),
            Arc::new(StaticPages::default()),
        );

        let report = detector.analyze(&AnalysisRequest::from_text(ARTICLE)).await.unwrap();
        assert_eq!(report.source, VerdictSource::Local);
        assert_eq!(report.verdict, analyze(ARTICLE, None));
        assert_eq!(report.provider.as_deref(), Some("scripted"));
    }

    #[tokio::test]
    async fn test_batch_keeps_order() {
        let detector = Detector::new(
            DetectorConfig::default().with_max_concurrent(2),
            AnalysisMode::Local,
            Arc::new(StaticPages::default()),
        );

        let long_sensational = format!("{} Shocking secret exposed!", ARTICLE);
        let requests = vec![
            AnalysisRequest::from_text(ARTICLE),
            AnalysisRequest::from_text("short"),
            AnalysisRequest::from_text(&long_sensational),
        ];

        let results = detector.analyze_batch(&requests).await;
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().verdict, analyze(ARTICLE, None));
        assert!(results[1].is_err());
        assert_eq!(
            results[2].as_ref().unwrap().verdict,
            analyze(&long_sensational, None)
        );
    }

    #[tokio::test]
    async fn test_report_serializes_flat() {
        let detector = detector(AnalysisMode::Local, StaticPages::default());
        let report = detector.analyze(&AnalysisRequest::from_text(ARTICLE)).await.unwrap();

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["label"], "mixed");
        assert_eq!(json["source"], "local");
        assert!(json["explanation"].is_array());
    }
}
