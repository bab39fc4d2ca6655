use std::io;

use super::CommandResult;
use crate::ui::chat_loop::ChatSession;

pub type CommandHandler = fn(&mut ChatSession, CommandInvocation<'_>) -> io::Result<CommandResult>;

pub struct Command {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub usage: &'static str,
    pub help: &'static str,
    pub handler: CommandHandler,
}

#[derive(Clone, Copy)]
pub struct CommandInvocation<'a> {
    pub args: &'a str,
}

pub fn all_commands() -> &'static [Command] {
    COMMANDS
}

pub fn find_command(name: &str) -> Option<&'static Command> {
    all_commands().iter().find(|command| {
        command.name.eq_ignore_ascii_case(name)
            || command
                .aliases
                .iter()
                .any(|alias| alias.eq_ignore_ascii_case(name))
    })
}

const COMMANDS: &[Command] = &[
    Command {
        name: "help",
        aliases: &[],
        usage: "/help",
        help: "Show available commands.",
        handler: super::handle_help,
    },
    Command {
        name: "retry",
        aliases: &[],
        usage: "/retry",
        help: "Ask again for the most recent failed reply.",
        handler: super::handle_retry,
    },
    Command {
        name: "questions",
        aliases: &[],
        usage: "/questions",
        help: "List the quick questions from the catalog.",
        handler: super::handle_questions,
    },
    Command {
        name: "q",
        aliases: &["question"],
        usage: "/q <n>",
        help: "Send quick question number n.",
        handler: super::handle_question,
    },
    Command {
        name: "quit",
        aliases: &["exit"],
        usage: "/quit",
        help: "Leave the chat.",
        handler: super::handle_quit,
    },
];
