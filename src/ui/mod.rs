//! Terminal presentation for line-mode chat sessions.
//!
//! - [`chat_loop`]: reads input, dispatches [`crate::commands`] and renders
//!   the events produced by [`crate::core::conversation`].
//! - [`markdown`] and [`span`]: turn reply text into styled spans.
//! - [`renderer`] and [`theme`]: write spans and conversation chrome to the
//!   terminal.
//!
//! Domain state lives in [`crate::core`]; this layer only presents it.

pub mod chat_loop;
pub mod markdown;
pub mod renderer;
pub mod span;
pub mod theme;
