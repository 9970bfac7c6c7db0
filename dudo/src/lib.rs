//! # Dudo
//!
//! A bluffing game for group chats. One player asks a yes/no question and
//! bets on how many players will answer "yes". Everyone answers in a poll,
//! then the guessers take turns raising the bet until somebody doubts it
//! (claims fewer said yes) or calls it a fit (claims exactly that many did).
//!
//! The game is a finite state machine dispatched with `enum_dispatch`:
//!
//! - **Lobby**: Waiting for players to join
//! - **AwaitingQuestion**: The head questioner asks and sets the opening bet
//! - **AwaitingAnswers**: Everyone answers the poll
//! - **AwaitingGuess**: The head guesser raises, doubts or fits
//!
//! Every phase is guarded by a timeout. Player actions and timeouts for one
//! game are serialized through a single gate.
//!
//! ## Core Modules
//!
//! - [`game`]: Phases, actions, the engine and its timers
//! - [`announce`]: Buffered chat output and insults for misbehaving players
//! - [`room`]: Per-chat actors parsing commands and owning at most one game
//!
//! ## Example
//!
//! ```
//! use dudo::room::{Command, parse_command};
//!
//! let command = parse_command("/ask Are you awake? ## 2", None).unwrap();
//! assert!(matches!(command, Command::Ask(_)));
//! ```

/// Chat output: buffering, polls and insults.
pub mod announce;
pub use announce::{Announcer, MessageSink, Mood, Outbound};

/// Core game logic, entities and state machine.
pub mod game;
pub use game::{
    Action, Engine, GameHandle, GameSettings, Phase, SettingsError,
    constants::{self, MIN_PLAYERS},
    entities::{self, Bet, FinalGuess, PlayerId, Username},
};

/// Per-chat rooms and command parsing.
pub mod room;
pub use room::{RoomConfig, RoomManager};
