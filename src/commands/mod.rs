//! Slash commands available in the line-mode chat.

mod registry;


pub use registry::{all_commands, find_command, CommandInvocation};

use std::io;

use crate::ui::chat_loop::ChatSession;

#[derive(Debug, PartialEq, Eq)]
pub enum CommandResult {
    Continue,
    ProcessAsMessage(String),
    Quit,
}

/// Runs `input` as a command when it names one; anything else, including
/// unknown `/words`, is sent as a message.
pub fn process_input(session: &mut ChatSession, input: &str) -> io::Result<CommandResult> {
    let trimmed = input.trim();

    let Some(rest) = trimmed.strip_prefix('/') else {
        return Ok(CommandResult::ProcessAsMessage(input.to_string()));
    };

    let mut parts = rest.splitn(2, char::is_whitespace);
    let command_name = match parts.next() {
        Some(name) if !name.is_empty() => name,
        _ => return Ok(CommandResult::ProcessAsMessage(input.to_string())),
    };
    let args = parts.next().unwrap_or("").trim();

    match find_command(command_name) {
        Some(command) => {
            (command.handler)(session, CommandInvocation { args })
        }
        None => Ok(CommandResult::ProcessAsMessage(input.to_string())),
    }
}

pub(super) fn handle_help(
    session: &mut ChatSession,
    _invocation: CommandInvocation<'_>,
) -> io::Result<CommandResult> {
    let width = all_commands()
        .iter()
        .map(|command| command.usage.len())
        .max()
        .unwrap_or(0);
    let mut help = String::from("Commands:");
    for command in all_commands() {
        help.push_str(&format!("\n  {:width$}  {}", command.usage, command.help));
    }
    session.renderer_mut().notice(&help)?;
    Ok(CommandResult::Continue)
}

pub(super) fn handle_retry(
    session: &mut ChatSession,
    _invocation: CommandInvocation<'_>,
) -> io::Result<CommandResult> {
    if session.engine().state().pending() {
        session
            .renderer_mut()
            .notice("Still answering; wait for the reply to finish.")?;
        return Ok(CommandResult::Continue);
    }
    let Some(id) = session
        .engine()
        .state()
        .last_retryable()
        .map(|message| message.id())
    else {
        session.renderer_mut().notice("Nothing to retry.")?;
        return Ok(CommandResult::Continue);
    };
    session.engine_mut().retry(id);
    Ok(CommandResult::Continue)
}

pub(super) fn handle_questions(
    session: &mut ChatSession,
    _invocation: CommandInvocation<'_>,
) -> io::Result<CommandResult> {
    let listing = match session.questions() {
        [] => "No quick questions available.".to_string(),
        questions => {
            let mut listing = String::from("Quick questions (send with /q <n>):");
            for (index, question) in questions.iter().enumerate() {
                listing.push_str(&format!("\n  {}. {}", index + 1, question.title));
            }
            listing
        }
    };
    session.renderer_mut().notice(&listing)?;
    Ok(CommandResult::Continue)
}

pub(super) fn handle_question(
    session: &mut ChatSession,
    invocation: CommandInvocation<'_>,
) -> io::Result<CommandResult> {
    let count = session.questions().len();
    let Some(question) = invocation
        .args
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|index| session.questions().get(index))
        .cloned()
    else {
        let notice = match count {
            0 => "No quick questions available.".to_string(),
            _ => format!("Usage: /q <n> with n between 1 and {count}."),
        };
        session.renderer_mut().notice(&notice)?;
        return Ok(CommandResult::Continue);
    };

    if !session.send_question(&question) {
        session
            .renderer_mut()
            .notice("Still answering; wait for the reply to finish.")?;
    }
    Ok(CommandResult::Continue)
}

pub(super) fn handle_quit(
    _session: &mut ChatSession,
    _invocation: CommandInvocation<'_>,
) -> io::Result<CommandResult> {
    Ok(CommandResult::Quit)
}
