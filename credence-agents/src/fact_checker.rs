//! Fact-checker enrichment
//!
//! Sends the article to an LLM backend using the fact-checker persona and
//! turns the reply into a [`VerdictResult`]. Output that does not parse
//! into the verdict shape, and transport failures, become degraded
//! `unknown` verdicts; nothing untyped leaves this module.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

use credence_core::{parse_verdict, VerdictResult};

use crate::{EnrichmentProvider, LlmError, Persona, SharedBackend, SharedProvider};

/// Summary used when the remote call itself fails
pub const CALL_FAILED_SUMMARY: &str = "Generative API call failed; falling back to local analyzer.";

/// LLM-backed fact checker
pub struct FactChecker {
    backend: SharedBackend,
    persona: Persona,
}

impl FactChecker {
    pub fn new(backend: SharedBackend, persona: Persona) -> Self {
        Self { backend, persona }
    }
}

#[async_trait]
impl EnrichmentProvider for FactChecker {
    fn name(&self) -> &str {
        self.backend.model_name()
    }

    async fn enrich(&self, text: &str, url: Option<&str>) -> Result<String, LlmError> {
        let user = self.persona.render_user(text, url);

        debug!(
            "Fact checker prompting {} with {} chars",
            self.backend.model_name(),
            user.len()
        );

        self.backend.generate(self.persona.system_prompt(), &user).await
    }
}

/// Create a shared fact checker
pub fn create_fact_checker(backend: SharedBackend, persona: Persona) -> SharedProvider {
    Arc::new(FactChecker::new(backend, persona))
}

/// How an enrichment attempt ended
#[derive(Debug, Clone, PartialEq)]
pub enum EnrichmentOutcome {
    /// Provider output parsed into a valid verdict
    Parsed,
    /// Provider answered, but not in the verdict shape
    Unstructured,
    /// The call itself failed
    Failed(String),
}

/// Result of asking a provider for a verdict
#[derive(Debug, Clone)]
pub struct Enrichment {
    /// Always a valid verdict; degraded unless `outcome` is `Parsed`
    pub verdict: VerdictResult,
    pub outcome: EnrichmentOutcome,
    /// Raw provider output, when there was any
    pub raw: Option<String>,
}

/// Ask a provider for a verdict, parsing strictly or degrading
pub async fn enrich(provider: &dyn EnrichmentProvider, text: &str, url: Option<&str>) -> Enrichment {
    let raw = match provider.enrich(text, url).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!("Enrichment via {} failed: {}", provider.name(), e);
            return Enrichment {
                verdict: VerdictResult::degraded(CALL_FAILED_SUMMARY, &e.to_string()),
                outcome: EnrichmentOutcome::Failed(e.to_string()),
                raw: None,
            };
        }
    };

    match parse_verdict(&raw) {
        Ok(verdict) => {
            info!(
                "Enrichment via {} returned {} ({:.2})",
                provider.name(),
                verdict.label,
                verdict.confidence
            );
            Enrichment {
                verdict,
                outcome: EnrichmentOutcome::Parsed,
                raw: Some(raw),
            }
        }
        Err(e) => {
            warn!("Enrichment via {} returned unstructured output: {}", provider.name(), e);
            Enrichment {
                verdict: VerdictResult::unstructured(&raw, &e),
                outcome: EnrichmentOutcome::Unstructured,
                raw: Some(raw),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LlmBackend;
    use credence_core::Label;
    use std::sync::Mutex;

    /// Backend that replays a canned reply and records prompts
    struct CannedBackend {
        reply: Result<String, String>,
        prompts: Mutex<Vec<(String, String)>>,
    }

    impl CannedBackend {
        fn ok(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(reply.to_string()),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn failing(message: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(message.to_string()),
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl LlmBackend for CannedBackend {
        async fn generate(&self, system: &str, user: &str) -> Result<String, LlmError> {
            self.prompts
                .lock()
                .unwrap()
                .push((system.to_string(), user.to_string()));
            self.reply.clone().map_err(LlmError::Api)
        }

        fn model_name(&self) -> &str {
            "canned"
        }
    }

    fn checker(backend: Arc<CannedBackend>) -> FactChecker {
        FactChecker::new(backend, Persona::fact_checker().unwrap())
    }

    #[tokio::test]
    async fn test_parsed_verdict() {
        let backend = CannedBackend::ok(
            r#"```json
            {"label": "fake", "confidence": 0.12, "summary": "s",
             "explanation": ["a", "b", "c"], "highlights": []}
            ```"#,
        );
        let checker = checker(backend.clone());

        let result = enrich(&checker, "Article body", Some("https://news.example/x")).await;
        assert_eq!(result.outcome, EnrichmentOutcome::Parsed);
        assert_eq!(result.verdict.label, Label::Fake);
        assert_eq!(result.verdict.confidence, 0.12);
        assert!(result.raw.is_some());

        let prompts = backend.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].1.contains("Article body"));
        assert!(prompts[0].1.contains("https://news.example/x"));
    }

    #[tokio::test]
    async fn test_unstructured_reply_degrades() {
        let checker = checker(CannedBackend::ok("Looks legit to me!"));

        let result = enrich(&checker, "Article body", None).await;
        assert_eq!(result.outcome, EnrichmentOutcome::Unstructured);
        assert_eq!(result.verdict.label, Label::Unknown);
        assert_eq!(result.verdict.confidence, 0.0);
        assert_eq!(result.verdict.summary, "Looks legit to me!");
        assert!(result.verdict.highlights.is_empty());
        assert_eq!(result.raw.as_deref(), Some("Looks legit to me!"));
    }

    #[tokio::test]
    async fn test_transport_failure_degrades() {
        let checker = checker(CannedBackend::failing("connection reset"));

        let result = enrich(&checker, "Article body", None).await;
        assert!(matches!(result.outcome, EnrichmentOutcome::Failed(_)));
        assert!(result.verdict.is_degraded());
        assert_eq!(result.verdict.summary, CALL_FAILED_SUMMARY);
        assert_eq!(result.verdict.explanation, vec!["API error: connection reset"]);
        assert!(result.raw.is_none());
    }

    #[test]
    fn test_provider_name_is_model() {
        let checker = checker(CannedBackend::ok(""));
        assert_eq!(checker.name(), "canned");
    }
}
