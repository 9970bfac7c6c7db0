//! Chat command parsing.

use thiserror::Error;

use crate::game::{
    actions::{Action, BetInput, QuestionInput},
    entities::{PlayerId, Username},
};

/// Separates the question from its opening bet in `/ask`.
pub const BET_SEPARATOR: &str = "##";

/// Poll button payload for a "yes" answer.
pub const YES: &str = "yes";

/// Poll button payload for a "no" answer.
pub const NO: &str = "no";

pub const HELP: &str = "\
/startgame - open a lobby in this chat
/join - join the open lobby
/ask <question> ## <bet> - ask a yes/no question and bet how many will say yes
/raise <bet> - raise the bet when it's your turn to guess
/dudo - doubt the bet: fewer players said yes
/calzo - call a fit: exactly that many said yes
/flee - leave the game
/endgame - cancel the game (owner only)
/help - show this message";

/// Errors that can occur during command parsing.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum ParseError {
    #[error("Not a command")]
    NotACommand,
    #[error("Unrecognized command '{0}'. Type /help to see available commands")]
    UnrecognizedCommand(String),
}

/// A command typed in the chat.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Command {
    StartGame,
    EndGame,
    Join,
    Flee,
    Ask(QuestionInput),
    Raise(BetInput),
    Doubt,
    Fit,
    Help,
}

impl Command {
    /// The game action this command stands for, sent by `player` named
    /// `name`. Room-level commands have none.
    #[must_use]
    pub fn into_action(self, player: PlayerId, name: &str) -> Option<Action> {
        let action = match self {
            Self::Join => Action::Join {
                player,
                name: Username::new(name),
            },
            Self::Flee => Action::Flee { player },
            Self::Ask(question) => Action::AskQuestion { player, question },
            Self::Raise(bet) => Action::RaiseBet { player, bet },
            Self::Doubt => Action::Doubt { player },
            Self::Fit => Action::Fit { player },
            Self::EndGame => Action::End { player },
            Self::StartGame | Self::Help => return None,
        };
        Some(action)
    }
}

/// Parse a chat message into a [`Command`].
///
/// The first word selects the command. It is matched case-insensitively and
/// may carry an `@bot_name` suffix, as chat clients add when several bots
/// share a chat.
///
/// # Examples
///
/// ```
/// use dudo::game::{BetInput, QuestionInput};
/// use dudo::room::{Command, parse_command};
///
/// assert_eq!(parse_command("/join@dudobot", Some("dudobot")), Ok(Command::Join));
/// assert_eq!(parse_command("/raise 3", None), Ok(Command::Raise(BetInput::Valid(3))));
/// assert_eq!(
///     parse_command("/ask Coffee? ## 2", None),
///     Ok(Command::Ask(QuestionInput::Valid { text: "Coffee?".to_string(), bet: 2 }))
/// );
/// ```
pub fn parse_command(text: &str, bot_name: Option<&str>) -> Result<Command, ParseError> {
    let trimmed = text.trim();
    if !trimmed.starts_with('/') {
        return Err(ParseError::NotACommand);
    }

    let (head, rest) = trimmed
        .split_once(char::is_whitespace)
        .unwrap_or((trimmed, ""));
    let head = head.to_lowercase();
    let command = match bot_name {
        Some(bot) => {
            let suffix = format!("@{}", bot.trim_start_matches('@').to_lowercase());
            head.strip_suffix(&suffix).unwrap_or(&head).to_string()
        }
        None => head,
    };

    match command.as_str() {
        "/startgame" => Ok(Command::StartGame),
        "/endgame" => Ok(Command::EndGame),
        "/join" => Ok(Command::Join),
        "/flee" => Ok(Command::Flee),
        "/ask" => Ok(Command::Ask(parse_question(rest))),
        "/raise" => Ok(Command::Raise(parse_bet(rest))),
        "/dudo" => Ok(Command::Doubt),
        "/calzo" => Ok(Command::Fit),
        "/help" => Ok(Command::Help),
        _ => Err(ParseError::UnrecognizedCommand(command)),
    }
}

/// Reads `<question> ## <bet>`. Anything else is an invalid question.
#[must_use]
pub fn parse_question(text: &str) -> QuestionInput {
    let Some((question, bet)) = text.split_once(BET_SEPARATOR) else {
        return QuestionInput::Invalid;
    };
    match bet.trim().parse() {
        Ok(bet) => QuestionInput::Valid {
            text: question.trim().to_string(),
            bet,
        },
        Err(_) => QuestionInput::Invalid,
    }
}

#[must_use]
pub fn parse_bet(text: &str) -> BetInput {
    text.trim()
        .parse()
        .map_or(BetInput::Invalid, BetInput::Valid)
}

/// Poll buttons answer "yes" with [`YES`]. Everything else is a "no".
#[must_use]
pub fn parse_answer(data: &str) -> bool {
    data.trim().eq_ignore_ascii_case(YES)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_commands() {
        for (text, expected) in [
            ("/startgame", Command::StartGame),
            ("/endgame", Command::EndGame),
            ("/join", Command::Join),
            ("/flee", Command::Flee),
            ("/dudo", Command::Doubt),
            ("/calzo", Command::Fit),
            ("/help", Command::Help),
            ("  /JOIN  ", Command::Join),
        ] {
            assert_eq!(parse_command(text, None), Ok(expected), "{text}");
        }
    }

    #[test]
    fn test_bot_suffix_is_stripped() {
        assert_eq!(
            parse_command("/dudo@DudoBot", Some("dudobot")),
            Ok(Command::Doubt)
        );
        assert_eq!(
            parse_command("/dudo@dudobot", Some("@dudobot")),
            Ok(Command::Doubt)
        );
        // Addressed to some other bot.
        assert_eq!(
            parse_command("/dudo@otherbot", Some("dudobot")),
            Err(ParseError::UnrecognizedCommand("/dudo@otherbot".to_string()))
        );
    }

    #[test]
    fn test_plain_text_is_not_a_command() {
        assert_eq!(parse_command("hello there", None), Err(ParseError::NotACommand));
        assert_eq!(parse_command("", None), Err(ParseError::NotACommand));
    }

    #[test]
    fn test_unknown_command() {
        let err = parse_command("/shuffle now", None).unwrap_err();
        assert_eq!(err, ParseError::UnrecognizedCommand("/shuffle".to_string()));
        assert!(err.to_string().contains("/help"));
    }

    #[test]
    fn test_ask_parsing() {
        assert_eq!(
            parse_command("/ask Did you sleep well? ##3", None),
            Ok(Command::Ask(QuestionInput::Valid {
                text: "Did you sleep well?".to_string(),
                bet: 3
            }))
        );
        assert_eq!(
            parse_command("/ask Did you sleep well?", None),
            Ok(Command::Ask(QuestionInput::Invalid))
        );
        assert_eq!(
            parse_command("/ask Cats? ## many", None),
            Ok(Command::Ask(QuestionInput::Invalid))
        );
        assert_eq!(
            parse_command("/ask Cats? ## -1", None),
            Ok(Command::Ask(QuestionInput::Invalid))
        );
        // Only the first separator splits.
        assert_eq!(
            parse_question("a ## b ## 2"),
            QuestionInput::Invalid
        );
        assert_eq!(parse_command("/ask", None), Ok(Command::Ask(QuestionInput::Invalid)));
    }

    #[test]
    fn test_raise_parsing() {
        assert_eq!(parse_bet(" 4 "), BetInput::Valid(4));
        assert_eq!(parse_bet("four"), BetInput::Invalid);
        assert_eq!(parse_bet(""), BetInput::Invalid);
        assert_eq!(
            parse_command("/raise", None),
            Ok(Command::Raise(BetInput::Invalid))
        );
    }

    #[test]
    fn test_answers() {
        assert!(parse_answer("yes"));
        assert!(parse_answer("YES"));
        assert!(!parse_answer("no"));
        assert!(!parse_answer("maybe"));
    }

    #[test]
    fn test_into_action() {
        assert_eq!(
            Command::Join.into_action(7, "alice"),
            Some(Action::Join {
                player: 7,
                name: Username::new("alice")
            })
        );
        assert_eq!(
            Command::EndGame.into_action(7, "alice"),
            Some(Action::End { player: 7 })
        );
        assert_eq!(Command::StartGame.into_action(7, "alice"), None);
        assert_eq!(Command::Help.into_action(7, "alice"), None);
    }
}
