pub mod chat_stream;
pub mod config;
pub mod conversation;
pub mod error_classifier;
pub mod message;
pub mod persona;
pub mod questions;
