//! Player intents, decoded by the transport and dispatched to the current
//! phase.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::entities::{Bet, PlayerId, Username};
use super::state_machine::Engine;
use super::states::{Phase, PhaseBehavior};

/// A question and its opening bet, or text that couldn't be read as one.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum QuestionInput {
    Valid { text: String, bet: Bet },
    Invalid,
}

/// A raised bet, or text that couldn't be read as one.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum BetInput {
    Valid(Bet),
    Invalid,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Action {
    Join { player: PlayerId, name: Username },
    Flee { player: PlayerId },
    AskQuestion { player: PlayerId, question: QuestionInput },
    Answer { player: PlayerId, answer: bool },
    RaiseBet { player: PlayerId, bet: BetInput },
    Doubt { player: PlayerId },
    Fit { player: PlayerId },
    End { player: PlayerId },
}

impl Action {
    /// The player performing the action.
    #[must_use]
    pub fn player(&self) -> PlayerId {
        match self {
            Self::Join { player, .. }
            | Self::Flee { player }
            | Self::AskQuestion { player, .. }
            | Self::Answer { player, .. }
            | Self::RaiseBet { player, .. }
            | Self::Doubt { player }
            | Self::Fit { player }
            | Self::End { player } => *player,
        }
    }

    /// Hands the action to the matching handler of `phase`.
    pub(crate) fn apply(self, phase: Phase, engine: &mut Engine) {
        match self {
            Self::Join { player, name } => phase.on_join(engine, player, name),
            Self::Flee { player } => phase.on_flee(engine, player),
            Self::AskQuestion { player, question } => phase.on_question(engine, player, question),
            Self::Answer { player, answer } => phase.on_answer(engine, player, answer),
            Self::RaiseBet { player, bet } => phase.on_bet(engine, player, bet),
            Self::Doubt { player } => phase.on_doubt(engine, player),
            Self::Fit { player } => phase.on_fit(engine, player),
            Self::End { player } => phase.on_end(engine, player),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Join { player, name } => write!(f, "{player} joins as {name}"),
            Self::Flee { player } => write!(f, "{player} flees"),
            Self::AskQuestion {
                player,
                question: QuestionInput::Valid { text, bet },
            } => write!(f, "{player} asks '{text}' betting {bet}"),
            Self::AskQuestion {
                player,
                question: QuestionInput::Invalid,
            } => write!(f, "{player} asks an unreadable question"),
            Self::Answer { player, answer } => write!(f, "{player} answers {answer}"),
            Self::RaiseBet {
                player,
                bet: BetInput::Valid(bet),
            } => write!(f, "{player} raises to {bet}"),
            Self::RaiseBet {
                player,
                bet: BetInput::Invalid,
            } => write!(f, "{player} raises by an unreadable amount"),
            Self::Doubt { player } => write!(f, "{player} doubts"),
            Self::Fit { player } => write!(f, "{player} fits"),
            Self::End { player } => write!(f, "{player} ends the game"),
        }
    }
}
