//! Parley is a line-mode terminal chat that streams replies from a text
//! generation provider.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the conversation engine, provider sessions, error
//!   classification, personas, the question catalog, and configuration.
//! - [`ui`] formats reply markdown into styled spans and runs the line-mode
//!   chat loop that renders conversation events.
//! - [`commands`] implements the slash commands used by the chat loop.
//! - [`api`] defines the chat completion payloads sent to OpenAI-compatible
//!   endpoints.
//!
//! The binary (`src/main.rs`) routes through [`crate::cli::main`], which
//! builds a [`core::conversation::ConversationEngine`] and hands it to
//! [`ui::chat_loop`].

pub mod api;
pub mod cli;
pub mod commands;
pub mod core;
pub mod ui;
pub mod utils;
