use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::config::Config;

/// Instructions used when no persona is selected.
pub const DEFAULT_INSTRUCTIONS: &str =
    "You are a friendly AI assistant. Answer questions in a warm and approachable way.";

/// A character the assistant plays for a whole conversation.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Persona {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Short label for the persona, shown in listings.
    #[serde(default)]
    pub prompt: String,
    /// Full instructions handed to the provider when the session starts.
    pub system_prompt: String,
    #[serde(default)]
    pub avatar: String,
}

impl Persona {
    pub fn instructions(&self) -> &str {
        &self.system_prompt
    }
}

#[derive(Debug, Deserialize)]
struct BuiltinPersonaConfig {
    personas: Vec<Persona>,
}

pub fn load_builtin_personas() -> Vec<Persona> {
    const CONFIG_CONTENT: &str = include_str!("../builtins/personas.toml");
    match toml::from_str::<BuiltinPersonaConfig>(CONFIG_CONTENT) {
        Ok(config) => config.personas,
        Err(err) => {
            warn!(error = %err, "failed to parse builtins/personas.toml");
            Vec::new()
        }
    }
}

/// Instructions for a session started with `persona`, falling back to
/// `fallback` when none is selected.
pub fn instructions_for<'a>(persona: Option<&'a Persona>, fallback: &'a str) -> &'a str {
    persona.map_or(fallback, Persona::instructions)
}

/// Built-in personas followed by the ones defined in the configuration.
pub struct PersonaCatalog {
    personas: Vec<Persona>,
}

impl PersonaCatalog {
    pub fn from_config(config: &Config) -> Self {
        let mut personas = load_builtin_personas();
        for custom in &config.personas {
            match personas
                .iter_mut()
                .find(|p| p.id.eq_ignore_ascii_case(&custom.id))
            {
                Some(existing) => *existing = custom.clone(),
                None => personas.push(custom.clone()),
            }
        }
        Self { personas }
    }

    pub fn list(&self) -> &[Persona] {
        &self.personas
    }

    pub fn find(&self, id: &str) -> Option<&Persona> {
        self.personas
            .iter()
            .find(|p| p.id.eq_ignore_ascii_case(id))
    }

    /// Picks the persona named on the command line, else the configured
    /// default. Naming an unknown persona is an error; no selection is not.
    pub fn resolve(
        &self,
        requested: Option<&str>,
        config: &Config,
    ) -> Result<Option<&Persona>, String> {
        let Some(id) = requested.or(config.default_persona.as_deref()) else {
            return Ok(None);
        };
        match self.find(id) {
            Some(persona) => Ok(Some(persona)),
            None => {
                let available: Vec<&str> = self.personas.iter().map(|p| p.id.as_str()).collect();
                Err(format!(
                    "Persona '{}' not found. Available personas: {}",
                    id,
                    available.join(", ")
                ))
            }
        }
    }
}
