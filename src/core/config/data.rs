use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::core::persona::{Persona, DEFAULT_INSTRUCTIONS};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    /// OpenAI-compatible endpoint, e.g. "http://localhost:11434/v1"
    pub base_url: Option<String>,
    pub model: Option<String>,
    /// Name of the environment variable holding the API key
    pub api_key_env: Option<String>,
    /// Persona id used when none is given on the command line
    pub default_persona: Option<String>,
    /// Instructions used when no persona is selected
    pub default_instructions: Option<String>,
    pub questions_file: Option<PathBuf>,
    /// Format replies as markdown (on unless set to false)
    pub markdown: Option<bool>,
    /// User-defined personas, listed after the built-ins
    #[serde(default)]
    pub personas: Vec<Persona>,
}

impl Config {
    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    pub fn api_key_env(&self) -> &str {
        self.api_key_env.as_deref().unwrap_or(DEFAULT_API_KEY_ENV)
    }

    pub fn instructions(&self) -> &str {
        self.default_instructions
            .as_deref()
            .unwrap_or(DEFAULT_INSTRUCTIONS)
    }

    pub fn markdown_enabled(&self) -> bool {
        self.markdown.unwrap_or(true)
    }
}

/// Keys accepted by `parley set` and `parley unset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    BaseUrl,
    Model,
    ApiKeyEnv,
    DefaultPersona,
    DefaultInstructions,
    QuestionsFile,
    Markdown,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 7] = [
        ConfigKey::BaseUrl,
        ConfigKey::Model,
        ConfigKey::ApiKeyEnv,
        ConfigKey::DefaultPersona,
        ConfigKey::DefaultInstructions,
        ConfigKey::QuestionsFile,
        ConfigKey::Markdown,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ConfigKey::BaseUrl => "base-url",
            ConfigKey::Model => "model",
            ConfigKey::ApiKeyEnv => "api-key-env",
            ConfigKey::DefaultPersona => "default-persona",
            ConfigKey::DefaultInstructions => "default-instructions",
            ConfigKey::QuestionsFile => "questions-file",
            ConfigKey::Markdown => "markdown",
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        ConfigKey::ALL
            .into_iter()
            .find(|key| key.as_str() == normalized)
            .ok_or_else(|| {
                let known: Vec<&str> = ConfigKey::ALL.iter().map(|k| k.as_str()).collect();
                format!("Unknown config key '{}'. Known keys: {}", s, known.join(", "))
            })
    }
}

fn parse_toggle(value: &str) -> Result<bool, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        other => Err(format!("Expected on or off, got '{other}'")),
    }
}

impl Config {
    pub fn set_value(&mut self, key: ConfigKey, value: &str) -> Result<(), String> {
        let value = value.trim();
        if value.is_empty() {
            return Err(format!("A value is required for {key}"));
        }
        match key {
            ConfigKey::BaseUrl => self.base_url = Some(value.to_string()),
            ConfigKey::Model => self.model = Some(value.to_string()),
            ConfigKey::ApiKeyEnv => self.api_key_env = Some(value.to_string()),
            ConfigKey::DefaultPersona => self.default_persona = Some(value.to_string()),
            ConfigKey::DefaultInstructions => {
                self.default_instructions = Some(value.to_string())
            }
            ConfigKey::QuestionsFile => self.questions_file = Some(PathBuf::from(value)),
            ConfigKey::Markdown => self.markdown = Some(parse_toggle(value)?),
        }
        Ok(())
    }

    pub fn unset_value(&mut self, key: ConfigKey) {
        match key {
            ConfigKey::BaseUrl => self.base_url = None,
            ConfigKey::Model => self.model = None,
            ConfigKey::ApiKeyEnv => self.api_key_env = None,
            ConfigKey::DefaultPersona => self.default_persona = None,
            ConfigKey::DefaultInstructions => self.default_instructions = None,
            ConfigKey::QuestionsFile => self.questions_file = None,
            ConfigKey::Markdown => self.markdown = None,
        }
    }
}

/// Shortens paths under the home directory to `~/...` on Unix-like systems.
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            if let Ok(relative) = path.strip_prefix(PathBuf::from(home)) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}
