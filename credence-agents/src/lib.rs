//! Credence Agents
//!
//! Remote enrichment for article credibility checks:
//! - **Backends**: Gemini, OpenAI-compatible (OpenAI, OpenRouter, local) and Anthropic
//! - **Persona**: the fact-checker prompt, defined in TOML under `prompts/`
//! - **Fact checker**: an [`EnrichmentProvider`] that asks a backend for a
//!   verdict and parses it strictly, degrading anything malformed
//!
//! See [`persona::Persona`] for the prompt format.

pub mod backend;
pub mod persona;
pub mod fact_checker;
pub mod traits;

pub use backend::*;
pub use persona::*;
pub use fact_checker::*;
pub use traits::*;
