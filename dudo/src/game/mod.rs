//! Game engine - phases, actions and the state machine driving them.
//!
//! This module provides:
//! - Actions decoded from player input
//! - Four stateless phases dispatched through `enum_dispatch`
//! - The engine holding roster, turn queues, round data and the timeout
//! - A gated handle for sharing one engine between transport and timers

pub mod actions;
pub mod constants;
pub mod entities;
pub mod handle;
pub mod roster;
pub mod state_machine;
pub mod states;
pub mod timer;

pub use actions::{Action, BetInput, QuestionInput};
pub use handle::GameHandle;
pub use roster::Roster;
pub use state_machine::{Engine, GameSettings, SettingsError};
pub use states::{AwaitingAnswers, AwaitingGuess, AwaitingQuestion, Lobby, Phase, PhaseBehavior};
pub use timer::{Scheduler, TimerToken, TokioScheduler};
