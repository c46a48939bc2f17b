//! Common traits for enrichment providers

use async_trait::async_trait;
use std::sync::Arc;

use crate::LlmError;

/// A remote source of verdicts
///
/// Implementations return the raw model output. Turning it into a
/// validated verdict is the caller's job (see [`crate::enrich`]).
#[async_trait]
pub trait EnrichmentProvider: Send + Sync {
    /// Provider name for logs and reports
    fn name(&self) -> &str;

    /// Ask the provider for a verdict on the article
    async fn enrich(&self, text: &str, url: Option<&str>) -> Result<String, LlmError>;
}

/// Thread-safe reference to an enrichment provider
pub type SharedProvider = Arc<dyn EnrichmentProvider>;
