//! Prompt personas for enrichment providers
//!
//! Personas are TOML documents carrying a system prompt and a user template
//! with `{url}` and `{text}` placeholders. The fact-checker persona is
//! embedded; a custom one can be loaded from disk.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Errors loading a persona
#[derive(Debug, Error)]
pub enum PersonaError {
    #[error("Failed to read persona file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid persona TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Persona '{0}' is disabled")]
    Disabled(String),
}

/// A persona definition loaded from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct Persona {
    pub persona: PersonaMetadata,
    pub prompt: PromptConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PersonaMetadata {
    pub id: String,
    pub name: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PromptConfig {
    pub system: String,
    pub user: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Article text beyond this many characters is cut from the prompt
    #[serde(default = "default_max_article_chars")]
    pub max_article_chars: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            max_article_chars: default_max_article_chars(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_max_article_chars() -> usize {
    15_000
}

const EMBEDDED_FACT_CHECKER: &str = include_str!("../prompts/fact_checker.toml");

impl Persona {
    /// Parse a persona from TOML, rejecting disabled ones
    pub fn from_toml(toml_str: &str) -> Result<Self, PersonaError> {
        let persona: Persona = toml::from_str(toml_str)?;
        if !persona.persona.enabled {
            return Err(PersonaError::Disabled(persona.persona.id));
        }
        Ok(persona)
    }

    /// Load a persona from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PersonaError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// The embedded fact-checker persona
    pub fn fact_checker() -> Result<Self, PersonaError> {
        Self::from_toml(EMBEDDED_FACT_CHECKER)
    }

    /// Get the system prompt
    pub fn system_prompt(&self) -> &str {
        &self.prompt.system
    }

    /// Render the user prompt for an article
    pub fn render_user(&self, text: &str, url: Option<&str>) -> String {
        let article: String = text.chars().take(self.output.max_article_chars).collect();
        self.prompt
            .user
            .replace("{url}", url.unwrap_or("None"))
            .replace("{text}", &article)
    }
}
