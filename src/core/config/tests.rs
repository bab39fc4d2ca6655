use super::data::{path_display, Config, ConfigKey, DEFAULT_BASE_URL, DEFAULT_MODEL};
use super::io::ConfigError;
use crate::core::persona::{Persona, DEFAULT_INSTRUCTIONS};
use std::error::Error as _;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_load_nonexistent_config() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("nonexistent_config.toml");

    let config = Config::load_from_path(&config_path).expect("Failed to load config");

    assert_eq!(config, Config::default());
    assert_eq!(config.base_url(), DEFAULT_BASE_URL);
    assert_eq!(config.model(), DEFAULT_MODEL);
    assert_eq!(config.instructions(), DEFAULT_INSTRUCTIONS);
    assert!(config.markdown_enabled());
}

#[test]
fn test_config_persistence_lifecycle() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("nested").join("config.toml");

    let mut config = Config::default();
    config
        .set_value(ConfigKey::BaseUrl, "http://localhost:11434/v1")
        .unwrap();
    config.set_value(ConfigKey::Markdown, "off").unwrap();
    config
        .save_to_path(&config_path)
        .expect("Failed to save config");

    let mut loaded = Config::load_from_path(&config_path).expect("Failed to load config");
    assert_eq!(loaded.base_url(), "http://localhost:11434/v1");
    assert!(!loaded.markdown_enabled());

    loaded.unset_value(ConfigKey::BaseUrl);
    loaded
        .save_to_path(&config_path)
        .expect("Failed to save config");
    let reloaded = Config::load_from_path(&config_path).expect("Failed to load config");
    assert_eq!(reloaded.base_url, None);
    assert_eq!(reloaded.markdown, Some(false));
}

#[test]
fn test_parse_error_reports_path_and_source() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "markdown = \"maybe\"\n").unwrap();

    let err = Config::load_from_path(&config_path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().starts_with("Failed to parse config at"));
    assert!(err.source().is_some());
}

#[test]
fn test_config_with_personas() {
    let toml_text = r#"
default_persona = "pirate"

[[personas]]
id = "pirate"
name = "Pirate"
system_prompt = "Talk like a pirate."
"#;
    let config: Config = toml::from_str(toml_text).expect("Failed to parse config");
    assert_eq!(
        config.personas,
        vec![Persona {
            id: "pirate".to_string(),
            name: "Pirate".to_string(),
            description: String::new(),
            prompt: String::new(),
            system_prompt: "Talk like a pirate.".to_string(),
            avatar: String::new(),
        }]
    );
    assert_eq!(config.default_persona.as_deref(), Some("pirate"));
}

#[test]
fn test_config_key_parsing() {
    assert_eq!("base-url".parse::<ConfigKey>(), Ok(ConfigKey::BaseUrl));
    assert_eq!("BASE_URL".parse::<ConfigKey>(), Ok(ConfigKey::BaseUrl));
    assert_eq!(
        "questions-file".parse::<ConfigKey>(),
        Ok(ConfigKey::QuestionsFile)
    );
    let err = "theme".parse::<ConfigKey>().unwrap_err();
    assert!(err.contains("Unknown config key 'theme'"));
}

#[test]
fn test_set_value_validation() {
    let mut config = Config::default();
    assert!(config.set_value(ConfigKey::Markdown, "sometimes").is_err());
    assert!(config.set_value(ConfigKey::Model, "   ").is_err());
    assert_eq!(config, Config::default());

    config
        .set_value(ConfigKey::QuestionsFile, "/tmp/questions.json")
        .unwrap();
    assert_eq!(
        config.questions_path(),
        Some(PathBuf::from("/tmp/questions.json"))
    );
}

#[test]
fn test_describe_marks_defaults() {
    let config = Config {
        model: Some("llama3".to_string()),
        ..Default::default()
    };
    let lines = config.describe();
    assert_eq!(lines.len(), ConfigKey::ALL.len());
    assert!(lines.contains(&"  model: llama3".to_string()));
    assert!(lines.contains(&format!("  base-url: {DEFAULT_BASE_URL} (default)")));
    assert!(lines.contains(&"  markdown: on".to_string()));
}

#[test]
fn test_path_display() {
    let abs_path = PathBuf::from("/usr/local/bin");
    assert_eq!(path_display(&abs_path), "/usr/local/bin");

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let subpath = PathBuf::from(&home).join("notes/questions.json");
            assert_eq!(path_display(&subpath), "~/notes/questions.json");
        }
    }
}
