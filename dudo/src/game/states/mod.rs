//! Game phases.
//!
//! Phases are stateless unit structs. Everything they read or change lives in
//! the [`Engine`] they're handed, so the same phase value serves any number
//! of games. Handlers that a phase doesn't override ignore the action.

use enum_dispatch::enum_dispatch;
use std::fmt;

use crate::game::{
    actions::{BetInput, QuestionInput},
    entities::{FinalGuess, PlayerId, Username},
    state_machine::Engine,
};

#[enum_dispatch]
pub trait PhaseBehavior {
    /// Runs when the engine transitions into the phase, including re-entry.
    fn on_enter(&self, engine: &mut Engine);

    fn on_timeout(&self, engine: &mut Engine);

    fn on_join(&self, _engine: &mut Engine, _player: PlayerId, _name: Username) {}

    fn on_flee(&self, _engine: &mut Engine, _player: PlayerId) {}

    fn on_question(&self, _engine: &mut Engine, _player: PlayerId, _question: QuestionInput) {}

    fn on_answer(&self, _engine: &mut Engine, _player: PlayerId, _answer: bool) {}

    fn on_bet(&self, _engine: &mut Engine, _player: PlayerId, _bet: BetInput) {}

    fn on_doubt(&self, _engine: &mut Engine, _player: PlayerId) {}

    fn on_fit(&self, _engine: &mut Engine, _player: PlayerId) {}

    /// The owner may end the game at any point.
    fn on_end(&self, engine: &mut Engine, player: PlayerId) {
        if engine.owner() == Some(player) {
            engine.cancel_by(player);
        }
    }
}

/// Waiting for players to join.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Lobby;

/// Waiting for the head questioner to ask something.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct AwaitingQuestion;

/// Waiting for everyone to answer the poll.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct AwaitingAnswers;

/// Waiting for the head guesser to raise, doubt or fit.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct AwaitingGuess;

#[enum_dispatch(PhaseBehavior)]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Phase {
    Lobby(Lobby),
    AwaitingQuestion(AwaitingQuestion),
    AwaitingAnswers(AwaitingAnswers),
    AwaitingGuess(AwaitingGuess),
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Lobby(_) => "lobby",
            Self::AwaitingQuestion(_) => "awaiting question",
            Self::AwaitingAnswers(_) => "awaiting answers",
            Self::AwaitingGuess(_) => "awaiting guess",
        };
        write!(f, "{repr}")
    }
}

impl PhaseBehavior for Lobby {
    fn on_enter(&self, engine: &mut Engine) {
        let starter = engine.started_by().cloned();
        engine
            .announcer_mut()
            .announce_start(starter.as_ref().map(Username::as_str));
        let timeout = engine.settings().lobby_timeout;
        engine.arm_timeout(timeout);
    }

    fn on_timeout(&self, engine: &mut Engine) {
        engine.announcer_mut().announce_timeout();
        let min_players = engine.settings().min_players;
        if engine.check_game_over(min_players) {
            return;
        }
        engine.transition_to(AwaitingQuestion.into());
    }

    fn on_join(&self, engine: &mut Engine, player: PlayerId, name: Username) {
        if engine.add_player(player, name) {
            let timeout = engine.settings().lobby_rearm_timeout;
            engine.arm_timeout(timeout);
        }
    }

    fn on_flee(&self, engine: &mut Engine, player: PlayerId) {
        if !engine.remove_player(player, false) {
            return;
        }
        let timeout = engine.settings().lobby_rearm_timeout;
        engine.arm_timeout(timeout);
        let min_players = engine.settings().lobby_min_players;
        engine.check_game_over(min_players);
    }
}

impl PhaseBehavior for AwaitingQuestion {
    fn on_enter(&self, engine: &mut Engine) {
        if let Some(questioner) = engine.head_questioner() {
            let name = engine.roster().display_name(&questioner);
            engine.announcer_mut().announce_questioner(&name);
        }
        let timeout = engine.settings().turn_timeout;
        engine.arm_timeout(timeout);
    }

    fn on_timeout(&self, engine: &mut Engine) {
        if let Some(questioner) = engine.head_questioner() {
            let name = engine.roster().display_name(&questioner);
            engine.announcer_mut().announce_timeout_kick(&name);
            engine.remove_player(questioner, true);
        }
        let min_players = engine.settings().min_players;
        if !engine.check_game_over(min_players) {
            engine.transition_to(AwaitingQuestion.into());
        }
    }

    fn on_flee(&self, engine: &mut Engine, player: PlayerId) {
        let was_questioner = engine.head_questioner() == Some(player);
        if !engine.remove_player(player, false) {
            return;
        }
        log::debug!("Game {}: was questioner: {was_questioner}", engine.id());
        let min_players = engine.settings().min_players;
        if !engine.check_game_over(min_players) && was_questioner {
            engine.transition_to(AwaitingQuestion.into());
        }
    }

    fn on_question(&self, engine: &mut Engine, player: PlayerId, question: QuestionInput) {
        if engine.head_questioner() != Some(player) {
            return;
        }
        let timeout = engine.settings().turn_timeout;
        let num_players = engine.players().len();

        match question {
            QuestionInput::Valid { bet, .. } if bet as usize > num_players => {
                engine.announcer_mut().announce_too_high_bet(num_players);
                engine.arm_timeout(timeout);
            }
            QuestionInput::Valid { text, bet } if bet > 0 && !text.trim().is_empty() => {
                engine.make_poll(player, text.trim().to_string(), bet);
                engine.choose_next_guesser();
                engine.transition_to(AwaitingAnswers.into());
            }
            _ => {
                engine.announcer_mut().announce_invalid_question();
                engine.arm_timeout(timeout);
            }
        }
    }
}

impl PhaseBehavior for AwaitingAnswers {
    fn on_enter(&self, engine: &mut Engine) {
        engine.clear_answers();
        let timeout = engine.settings().turn_timeout;
        engine.arm_timeout(timeout);
    }

    fn on_timeout(&self, engine: &mut Engine) {
        engine.announcer_mut().announce_nonvoter_removal();
        engine.remove_nonvoters();
        let min_players = engine.settings().min_players;
        if engine.check_game_over(min_players) {
            return;
        }
        let names = engine.roster().roster_names();
        engine.announcer_mut().announce_players(&names);
        engine.transition_to(AwaitingGuess.into());
    }

    fn on_flee(&self, engine: &mut Engine, player: PlayerId) {
        if engine.remove_player(player, false) {
            let min_players = engine.settings().min_players;
            engine.check_game_over(min_players);
        }
    }

    fn on_answer(&self, engine: &mut Engine, player: PlayerId, answer: bool) {
        if !engine.record_answer(player, answer) || !engine.everyone_answered() {
            return;
        }
        let names = engine.roster().roster_names();
        engine.announcer_mut().announce_votes_received(&names);
        engine.transition_to(AwaitingGuess.into());
    }
}

impl AwaitingGuess {
    fn settle(engine: &mut Engine, player: PlayerId, guess: FinalGuess) {
        if engine.head_guesser() != Some(player) || engine.previous_guesser().is_none() {
            return;
        }
        if engine.resolve_round(player, guess).is_some() {
            engine.transition_to(AwaitingQuestion.into());
        }
    }
}

impl PhaseBehavior for AwaitingGuess {
    fn on_enter(&self, engine: &mut Engine) {
        if let Some(guesser) = engine.head_guesser() {
            let name = engine.roster().display_name(&guesser);
            let question = engine.question().unwrap_or_default().to_string();
            let bet = engine.current_bet();
            engine
                .announcer_mut()
                .announce_guesser(&name, &question, bet);
        }
        let timeout = engine.settings().turn_timeout;
        engine.arm_timeout(timeout);
    }

    fn on_timeout(&self, engine: &mut Engine) {
        if let Some(guesser) = engine.head_guesser() {
            let name = engine.roster().display_name(&guesser);
            engine.announcer_mut().announce_timeout_kick(&name);
            engine.remove_player(guesser, true);
        }
        let min_players = engine.settings().min_players;
        if !engine.check_game_over(min_players) {
            engine.transition_to(AwaitingGuess.into());
        }
    }

    fn on_flee(&self, engine: &mut Engine, player: PlayerId) {
        let was_guesser = engine.head_guesser() == Some(player);
        if !engine.remove_player(player, false) {
            return;
        }
        log::debug!("Game {}: was guesser: {was_guesser}", engine.id());
        let min_players = engine.settings().min_players;
        if !engine.check_game_over(min_players) && was_guesser {
            engine.transition_to(AwaitingGuess.into());
        }
    }

    fn on_bet(&self, engine: &mut Engine, player: PlayerId, bet: BetInput) {
        if engine.head_guesser() != Some(player) {
            return;
        }
        let timeout = engine.settings().turn_timeout;
        let num_players = engine.players().len();
        let current_bet = engine.current_bet();

        match bet {
            BetInput::Invalid => {
                engine.announcer_mut().announce_invalid_bet();
                engine.arm_timeout(timeout);
            }
            BetInput::Valid(bet) if bet as usize > num_players => {
                engine.announcer_mut().announce_too_high_bet(num_players);
                engine.arm_timeout(timeout);
            }
            BetInput::Valid(bet) if bet <= current_bet => {
                engine.announcer_mut().announce_too_low_bet(current_bet);
                engine.arm_timeout(timeout);
            }
            BetInput::Valid(bet) => {
                engine.set_bet(bet);
                engine.choose_next_guesser();
                engine.transition_to(AwaitingGuess.into());
            }
        }
    }

    fn on_doubt(&self, engine: &mut Engine, player: PlayerId) {
        Self::settle(engine, player, FinalGuess::Doubt);
    }

    fn on_fit(&self, engine: &mut Engine, player: PlayerId) {
        Self::settle(engine, player, FinalGuess::Fit);
    }
}
