use crate::core::config::data::{path_display, Config, ConfigKey};

impl Config {
    /// One `key: value` line per setting, with defaults marked.
    pub fn describe(&self) -> Vec<String> {
        ConfigKey::ALL
            .iter()
            .map(|key| format!("  {}: {}", key, self.describe_value(*key)))
            .collect()
    }

    fn describe_value(&self, key: ConfigKey) -> String {
        let or_default = |value: Option<&str>, default: &str| match value {
            Some(value) => value.to_string(),
            None => format!("{default} (default)"),
        };
        match key {
            ConfigKey::BaseUrl => or_default(self.base_url.as_deref(), self.base_url()),
            ConfigKey::Model => or_default(self.model.as_deref(), self.model()),
            ConfigKey::ApiKeyEnv => or_default(self.api_key_env.as_deref(), self.api_key_env()),
            ConfigKey::DefaultPersona => self
                .default_persona
                .clone()
                .unwrap_or_else(|| "(unset)".to_string()),
            ConfigKey::DefaultInstructions => match &self.default_instructions {
                Some(text) => text.clone(),
                None => "(built-in)".to_string(),
            },
            ConfigKey::QuestionsFile => match self.questions_path() {
                Some(path) if self.questions_file.is_some() => path_display(path),
                Some(path) => format!("{} (default)", path_display(path)),
                None => "(unset)".to_string(),
            },
            ConfigKey::Markdown => match self.markdown_enabled() {
                true => "on".to_string(),
                false => "off".to_string(),
            },
        }
    }

    pub fn print_all(&self) {
        println!("Current configuration:");
        for line in self.describe() {
            println!("{line}");
        }
    }
}
