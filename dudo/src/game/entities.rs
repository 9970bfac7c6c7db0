//! Plain data types shared by the engine, the phases and the announcer.

use serde::{Deserialize, Deserializer, Serialize};
use std::{collections::HashMap, fmt};

use super::constants::MAX_NAME_LENGTH;

/// Opaque player identity handed to us by the transport.
pub type PlayerId = i64;

/// Number of players a guesser claims answered "yes".
pub type Bet = u32;

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Username(String);

impl Username {
    pub fn new(s: &str) -> Self {
        let username: String = s.trim().chars().take(MAX_NAME_LENGTH).collect();
        Self(username)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<'de> Deserialize<'de> for Username {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::new(&s))
    }
}

impl From<String> for Username {
    fn from(value: String) -> Self {
        Self::new(&value)
    }
}

impl From<&str> for Username {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// The two ways a guesser can end a round instead of raising.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum FinalGuess {
    /// The bet is higher than the real number of "yes" answers.
    Doubt,
    /// The bet is exactly the real number of "yes" answers.
    Fit,
}

impl FinalGuess {
    /// Whether the claim made by this guess holds for `bet` against the
    /// `correct` number of "yes" answers.
    #[must_use]
    pub fn holds(self, bet: Bet, correct: usize) -> bool {
        let bet = bet as usize;
        match self {
            Self::Doubt => bet > correct,
            Self::Fit => bet == correct,
        }
    }
}

impl fmt::Display for FinalGuess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Doubt => "doubt",
            Self::Fit => "fit",
        };
        write!(f, "{repr}")
    }
}

/// Mutable per-round data. Lives in the engine, never in a phase.
#[derive(Debug, Default)]
pub struct Round {
    pub question: Option<String>,
    pub bet: Bet,
    /// Whether each voter believes the true count reaches the bet.
    /// Cleared every time answer collection starts.
    pub answers: HashMap<PlayerId, bool>,
    /// Set once a question has been accepted or a bet escalated. Survives
    /// into later rounds.
    pub previous_guesser: Option<PlayerId>,
    pub final_guess: Option<FinalGuess>,
    pub final_actor: Option<PlayerId>,
}

impl Round {
    /// Number of the given players whose recorded answer is "yes".
    #[must_use]
    pub fn count_yes<'a>(&self, players: impl IntoIterator<Item = &'a PlayerId>) -> usize {
        players
            .into_iter()
            .filter(|player| self.answers.get(player).copied().unwrap_or(false))
            .count()
    }

    #[must_use]
    pub fn has_answered(&self, player: &PlayerId) -> bool {
        self.answers.contains_key(player)
    }
}

/// Outcome of a round settled by a doubt or a fit.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct RoundResult {
    pub guess: FinalGuess,
    pub bet: Bet,
    pub correct: usize,
    pub winner: PlayerId,
    pub loser: PlayerId,
    /// Current players that answered "yes", in roster order.
    pub yes_voters: Vec<PlayerId>,
}
