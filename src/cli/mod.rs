//! Command-line interface parsing and handling
//!
//! This module parses command-line arguments, prepares the provider and
//! conversation engine, and dispatches to the chosen subcommand.

pub mod persona_list;
pub mod question_list;
pub mod say;

use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;

use crate::cli::persona_list::list_personas;
use crate::cli::question_list::list_questions;
use crate::cli::say::run_say;
use crate::core::chat_stream::OpenAiCompatibleProvider;
use crate::core::config::{Config, ConfigKey};
use crate::core::conversation::ConversationEngine;
use crate::core::persona::PersonaCatalog;
use crate::core::questions::load_questions;
use crate::ui::chat_loop::{run_chat, ChatSession};
use crate::ui::renderer::Renderer;
use crate::ui::theme::Theme;
use crate::utils::logging::init_tracing;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("VERGEN_GIT_DESCRIBE"),
    ", ",
    env!("VERGEN_GIT_SHA"),
    ")\nbuilt ",
    env!("VERGEN_BUILD_TIMESTAMP"),
    " with rustc ",
    env!("VERGEN_RUSTC_SEMVER"),
);

#[derive(Parser)]
#[command(name = "parley")]
#[command(version, long_version = LONG_VERSION)]
#[command(about = "A line-mode terminal chat with streaming replies")]
#[command(
    long_about = "Parley is a line-mode terminal chat that streams replies from an \
OpenAI-compatible endpoint, shows how quickly they arrived, and explains failures \
with a retry option.\n\n\
Environment Variables:\n\
  OPENAI_API_KEY    API key (the variable name can be changed with `parley set api-key-env`)\n\
  PARLEY_LOG        Log filter, e.g. `parley=debug` (default: warn)\n\n\
Commands inside a chat:\n\
  /help             List commands\n\
  /retry            Ask again after a failed reply\n\
  /questions        List quick questions\n\
  /q <n>            Send quick question n\n\
  /quit             Leave the chat"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Model to request replies from
    #[arg(short = 'm', long, global = true, value_name = "MODEL")]
    pub model: Option<String>,

    /// Persona to chat with (see `parley personas`)
    #[arg(short = 'P', long, global = true, value_name = "PERSONA")]
    pub persona: Option<String>,

    /// Base URL of an OpenAI-compatible API
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// Write diagnostics to this file instead of stderr
    #[arg(short = 'l', long, global = true, value_name = "FILE")]
    pub log: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start an interactive chat (default)
    Chat,
    /// Send a single prompt and print the reply
    Say {
        /// Prompt text; multiple words are joined with spaces
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        prompt: Vec<String>,
    },
    /// List available personas
    Personas,
    /// List the quick-question catalog
    Questions,
    /// Set a configuration value, or show all values when none is given
    Set {
        /// Configuration key to set
        key: Option<String>,
        /// Value to set (multiple words are joined with spaces)
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        value: Vec<String>,
    },
    /// Reset a configuration value to its default
    Unset {
        /// Configuration key to unset
        key: String,
    },
}

pub fn main() -> Result<(), Box<dyn Error>> {
    tokio::runtime::Runtime::new()?.block_on(async_main())
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let mut args = Args::parse();
    init_tracing(args.log.as_deref())?;

    match args.command.take().unwrap_or(Commands::Chat) {
        Commands::Set { key, value } => {
            let mut config = Config::load()?;
            let Some(key) = key else {
                config.print_all();
                return Ok(());
            };
            let key = parse_key_or_exit(&key);
            if value.is_empty() {
                config.print_all();
                return Ok(());
            }
            let value = value.join(" ");
            if let Err(err) = config.set_value(key, &value) {
                eprintln!("❌ {err}");
                std::process::exit(1);
            }
            config.save()?;
            println!("✅ Set {key} to: {value}");
            Ok(())
        }
        Commands::Unset { key } => {
            let mut config = Config::load()?;
            let key = parse_key_or_exit(&key);
            config.unset_value(key);
            config.save()?;
            println!("✅ Unset {key}");
            Ok(())
        }
        Commands::Personas => {
            let config = Config::load()?;
            list_personas(&config);
            Ok(())
        }
        Commands::Questions => {
            let config = Config::load()?;
            list_questions(&config);
            Ok(())
        }
        Commands::Say { prompt } => {
            let config = Config::load()?;
            let prompt = prompt.join(" ");
            if prompt.trim().is_empty() {
                eprintln!("Usage: parley say <prompt>");
                std::process::exit(1);
            }
            let (engine, renderer) = prepare(&args, &config).await;
            run_say(ChatSession::new(engine, renderer, Vec::new()), &prompt).await
        }
        Commands::Chat => {
            let config = Config::load()?;
            let (engine, renderer) = prepare(&args, &config).await;
            let questions = config
                .questions_path()
                .map(|path| load_questions(&path))
                .unwrap_or_default();
            run_chat(ChatSession::new(engine, renderer, questions)).await
        }
    }
}

fn parse_key_or_exit(key: &str) -> ConfigKey {
    match key.parse() {
        Ok(key) => key,
        Err(err) => {
            eprintln!("❌ {err}");
            std::process::exit(1);
        }
    }
}

/// Builds the provider session and renderer shared by `chat` and `say`.
async fn prepare(args: &Args, config: &Config) -> (ConversationEngine, Renderer) {
    let catalog = PersonaCatalog::from_config(config);
    let persona = match catalog.resolve(args.persona.as_deref(), config) {
        Ok(persona) => persona,
        Err(err) => {
            eprintln!("❌ {err}");
            std::process::exit(1);
        }
    };

    let base_url = args.base_url.as_deref().unwrap_or(config.base_url());
    let model = args.model.as_deref().unwrap_or(config.model());
    let api_key = std::env::var(config.api_key_env()).ok();
    info!(base_url, model, persona = ?persona.map(|p| p.id.as_str()), "starting session");

    let provider = OpenAiCompatibleProvider::new(base_url, model, api_key);
    let engine = match persona {
        Some(persona) => ConversationEngine::new(&provider, Some(persona)).await,
        None => ConversationEngine::with_instructions(&provider, config.instructions()).await,
    };

    let mut renderer = Renderer::stdout(Theme::detect(), config.markdown_enabled());
    if let Some(persona) = persona {
        let label = match persona.avatar.is_empty() {
            true => persona.name.clone(),
            false => format!("{} {}", persona.avatar, persona.name),
        };
        renderer = renderer.with_assistant_label(label);
    }
    (engine, renderer)
}
