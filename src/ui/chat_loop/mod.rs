//! Line-mode chat loop.
//!
//! Reads prompts from stdin, hands them to the [`ConversationEngine`] and
//! renders every [`ConversationEvent`] it produces. While a reply streams,
//! stdin is still read so `/quit` works, but new prompts are turned away.

use std::error::Error;
use std::io;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::commands::{process_input, CommandResult};
use crate::core::conversation::{ConversationEngine, ConversationEvent};
use crate::core::questions::Question;
use crate::ui::renderer::Renderer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopAction {
    Continue,
    Quit,
}

pub struct ChatSession {
    engine: ConversationEngine,
    renderer: Renderer,
    questions: Vec<Question>,
    /// Set when the next user message did not come from the keyboard.
    echo_next_user: bool,
}

impl ChatSession {
    pub fn new(engine: ConversationEngine, renderer: Renderer, questions: Vec<Question>) -> Self {
        Self {
            engine,
            renderer,
            questions,
            echo_next_user: false,
        }
    }

    pub fn engine(&self) -> &ConversationEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut ConversationEngine {
        &mut self.engine
    }

    pub fn renderer_mut(&mut self) -> &mut Renderer {
        &mut self.renderer
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn send_question(&mut self, question: &Question) -> bool {
        let sent = self.engine.send_question(question);
        self.echo_next_user = sent;
        sent
    }

    pub fn handle_line(&mut self, line: &str) -> io::Result<LoopAction> {
        match process_input(self, line)? {
            CommandResult::Continue => Ok(LoopAction::Continue),
            CommandResult::Quit => Ok(LoopAction::Quit),
            CommandResult::ProcessAsMessage(text) => {
                if text.trim().is_empty() {
                    return Ok(LoopAction::Continue);
                }
                self.engine.set_draft(text);
                if !self.engine.send_draft() {
                    self.engine.set_draft(String::new());
                    self.renderer
                        .notice("Still answering; wait for the reply to finish.")?;
                }
                Ok(LoopAction::Continue)
            }
        }
    }

    pub fn render_event(&mut self, event: &ConversationEvent) -> io::Result<()> {
        let state = self.engine.state();
        match event {
            ConversationEvent::MessageAppended(id) => match state.message(*id) {
                Some(message) if message.is_user() => {
                    if std::mem::take(&mut self.echo_next_user) {
                        self.renderer.user_message(message)?;
                    }
                }
                Some(_) => self.renderer.begin_reply()?,
                None => {}
            },
            ConversationEvent::MessageUpdated(id) => {
                if state.open_message_id() == Some(*id) {
                    if let Some(message) = state.message(*id) {
                        self.renderer.stream_update(message.content())?;
                    }
                }
            }
            ConversationEvent::StreamCompleted(id) => {
                if let Some(message) = state.message(*id) {
                    self.renderer.finish_reply(message)?;
                }
            }
            ConversationEvent::StreamFailed { id, kind } => {
                debug!(kind = kind.label(), "rendering failed reply");
                if let Some(message) = state.message(*id) {
                    self.renderer.failed_reply(message)?;
                }
            }
            ConversationEvent::MessageRemoved(_) => {}
            ConversationEvent::ProviderUnavailable => {
                self.renderer.notice(
                    "The text generation provider is unavailable. Check the API key \
                     environment variable and the base URL (see `parley set`).",
                )?;
            }
        }
        Ok(())
    }

    /// Renders events until the current reply, if any, has finished.
    pub async fn drain(&mut self) -> io::Result<()> {
        while let Some(event) = self.engine.next_event().await {
            self.render_event(&event)?;
        }
        Ok(())
    }
}

enum Input {
    Event(Option<ConversationEvent>),
    Line(io::Result<Option<String>>),
}

pub async fn run_chat(mut session: ChatSession) -> Result<(), Box<dyn Error>> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        if !session.engine().state().pending() {
            session.drain().await?;
            session.renderer_mut().prompt()?;
            let Some(line) = lines.next_line().await? else {
                break;
            };
            if session.handle_line(&line)? == LoopAction::Quit {
                break;
            }
            continue;
        }

        let input = tokio::select! {
            event = session.engine_mut().next_event() => Input::Event(event),
            line = lines.next_line() => Input::Line(line),
        };

        match input {
            Input::Event(Some(event)) => session.render_event(&event)?,
            Input::Event(None) => {}
            Input::Line(line) => match line? {
                Some(line) => {
                    if session.handle_line(&line)? == LoopAction::Quit {
                        break;
                    }
                }
                None => {
                    // stdin closed mid-reply; let it finish before exiting
                    session.drain().await?;
                    break;
                }
            },
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests;
