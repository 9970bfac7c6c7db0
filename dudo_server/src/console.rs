//! Line-based console transport.
//!
//! Each input line is `<chat> <user> <name> <text>`. Typing `[yes]` or `[no]`
//! as the text presses the matching poll button.

use dudo::{
    Outbound,
    room::{
        ChatEvent, ChatId, RoomOutput,
        commands::{NO, YES},
    },
};
use thiserror::Error;

/// Errors that can occur while reading an input line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("Expected '<chat> <user> <name> <text>'")]
    MissingFields,
    #[error("Invalid chat id '{0}'")]
    InvalidChat(String),
    #[error("Invalid user id '{0}'")]
    InvalidUser(String),
}

/// An input line, ready for the room manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleInput {
    pub chat_id: ChatId,
    pub event: ChatEvent,
}

/// Splits off the first whitespace separated field.
fn next_field(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_start();
    let (field, rest) = s.split_once(char::is_whitespace)?;
    Some((field, rest.trim_start()))
}

pub fn parse_line(line: &str) -> Result<ConsoleInput, InputError> {
    let (chat, rest) = next_field(line).ok_or(InputError::MissingFields)?;
    let (user, rest) = next_field(rest).ok_or(InputError::MissingFields)?;
    let (name, text) = next_field(rest).ok_or(InputError::MissingFields)?;
    let text = text.trim();
    if text.is_empty() {
        return Err(InputError::MissingFields);
    }

    let chat_id = chat
        .parse()
        .map_err(|_| InputError::InvalidChat(chat.to_string()))?;
    let user_id = user
        .parse()
        .map_err(|_| InputError::InvalidUser(user.to_string()))?;

    let event = match text {
        "[yes]" => ChatEvent::PollAnswer {
            user_id,
            data: YES.to_string(),
        },
        "[no]" => ChatEvent::PollAnswer {
            user_id,
            data: NO.to_string(),
        },
        _ => ChatEvent::Message {
            user_id,
            name: name.to_string(),
            text: text.to_string(),
        },
    };

    Ok(ConsoleInput { chat_id, event })
}

/// Renders an outbound message, one chat-prefixed line per text line.
pub fn format_output(output: &RoomOutput) -> String {
    match &output.message {
        Outbound::Text(text) => text
            .lines()
            .map(|line| format!("[{}] {line}", output.chat_id))
            .collect::<Vec<_>>()
            .join("\n"),
        Outbound::Poll { prompt } => format!("[{}] {prompt} [yes] [no]", output.chat_id),
    }
}
