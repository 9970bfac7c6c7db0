//! The game engine.
//!
//! [`Engine`] owns every piece of mutable game data and routes actions and
//! timeouts to the current [`Phase`]. Phases call back into the engine to
//! change the roster and round, arm timers and request transitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, time::Duration};
use thiserror::Error;
use uuid::Uuid;

use super::actions::Action;
use super::constants::{
    DEFAULT_LOBBY_REARM_TIMEOUT, DEFAULT_LOBBY_TIMEOUT, DEFAULT_TURN_TIMEOUT, LOBBY_MIN_PLAYERS,
    MIN_PLAYERS,
};
use super::entities::{Bet, FinalGuess, PlayerId, Round, RoundResult, Username};
use super::roster::Roster;
use super::states::{Lobby, Phase, PhaseBehavior};
use super::timer::{Scheduler, TimerToken};
use crate::announce::Announcer;

/// Errors in [`GameSettings`].
#[derive(Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum SettingsError {
    #[error("{name} must be longer than zero")]
    ZeroTimeout { name: String },
    #[error("need at least {min} players to play, got {0}", min = MIN_PLAYERS)]
    TooFewPlayers(usize),
    #[error("lobby minimum {lobby} must be between 1 and {game}")]
    InvalidLobbyMinimum { lobby: usize, game: usize },
}

/// Game configuration settings
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct GameSettings {
    /// How long the lobby stays open before the first round.
    pub lobby_timeout: Duration,
    /// Lobby deadline after somebody joins or flees.
    pub lobby_rearm_timeout: Duration,
    /// Deadline for asking, answering and guessing.
    pub turn_timeout: Duration,
    pub min_players: usize,
    pub lobby_min_players: usize,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            lobby_timeout: DEFAULT_LOBBY_TIMEOUT,
            lobby_rearm_timeout: DEFAULT_LOBBY_REARM_TIMEOUT,
            turn_timeout: DEFAULT_TURN_TIMEOUT,
            min_players: MIN_PLAYERS,
            lobby_min_players: LOBBY_MIN_PLAYERS,
        }
    }
}

impl GameSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        for (name, timeout) in [
            ("lobby_timeout", self.lobby_timeout),
            ("lobby_rearm_timeout", self.lobby_rearm_timeout),
            ("turn_timeout", self.turn_timeout),
        ] {
            if timeout.is_zero() {
                return Err(SettingsError::ZeroTimeout {
                    name: name.to_string(),
                });
            }
        }

        if self.min_players < MIN_PLAYERS {
            return Err(SettingsError::TooFewPlayers(self.min_players));
        }

        if self.lobby_min_players == 0 || self.lobby_min_players > self.min_players {
            return Err(SettingsError::InvalidLobbyMinimum {
                lobby: self.lobby_min_players,
                game: self.min_players,
            });
        }

        Ok(())
    }
}

/// A single game: roster, turn queues, round data, the pending timeout and
/// the announcements produced while handling the current event.
pub struct Engine {
    id: Uuid,
    settings: GameSettings,
    phase: Phase,
    roster: Roster,
    round: Round,
    /// The only timeout allowed to fire.
    timer: Option<TimerToken>,
    last_token: TimerToken,
    scheduler: Box<dyn Scheduler>,
    announcer: Announcer,
    alive: bool,
    started_at: DateTime<Utc>,
    started_by: Option<Username>,
    rounds_played: u32,
    last_result: Option<RoundResult>,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("id", &self.id)
            .field("phase", &self.phase)
            .field("roster", &self.roster)
            .field("round", &self.round)
            .field("timer", &self.timer)
            .field("alive", &self.alive)
            .finish_non_exhaustive()
    }
}

impl Engine {
    pub fn new(
        id: Uuid,
        settings: GameSettings,
        announcer: Announcer,
        scheduler: Box<dyn Scheduler>,
    ) -> Self {
        Self {
            id,
            settings,
            phase: Phase::Lobby(Lobby),
            roster: Roster::new(),
            round: Round::default(),
            timer: None,
            last_token: TimerToken::new(0),
            scheduler,
            announcer,
            alive: true,
            started_at: Utc::now(),
            started_by: None,
            rounds_played: 0,
            last_result: None,
        }
    }

    /// Opens the lobby.
    pub fn start(&mut self) {
        if !self.alive {
            return;
        }
        log::info!("Game {} starting", self.id);
        self.transition_to(Lobby.into());
    }

    /// Opens the lobby on behalf of `name`, who is named in the announcement.
    pub fn start_by(&mut self, name: Username) {
        self.started_by = Some(name);
        self.start();
    }

    /// Hands `action` to the current phase. Does nothing once the game is
    /// over.
    pub fn submit_action(&mut self, action: Action) {
        if !self.alive {
            log::debug!("Game {}: ignoring '{action}', game is over", self.id);
            return;
        }
        log::debug!("Game {} ({}): {action}", self.id, self.phase);
        let phase = self.phase;
        action.apply(phase, self);
    }

    /// Replaces the current phase and runs its entry effect, which may
    /// itself transition again.
    pub fn transition_to(&mut self, phase: Phase) {
        log::debug!("Game {}: {} -> {phase}", self.id, self.phase);
        self.phase = phase;
        phase.on_enter(self);
    }

    /// Cancels whatever timeout is pending and arms a new one.
    pub fn arm_timeout(&mut self, after: Duration) {
        self.cancel_timeout();
        let token = self.last_token.next();
        self.last_token = token;
        self.timer = Some(token);
        self.scheduler.schedule(token, after);
    }

    pub fn cancel_timeout(&mut self) {
        if let Some(token) = self.timer.take() {
            self.scheduler.cancel(token);
        }
    }

    /// Timer callback. Must be called with the gate held. Stale tokens and
    /// dead games are ignored.
    pub fn fire_timeout(&mut self, token: TimerToken) {
        if !self.alive || self.timer != Some(token) {
            log::debug!("Game {}: dropping stale {token}", self.id);
            return;
        }
        self.timer = None;
        log::debug!("Game {} ({}): {token} fired", self.id, self.phase);
        let phase = self.phase;
        phase.on_timeout(self);
        self.flush();
    }

    /// Sends every buffered announcement.
    pub fn flush(&mut self) {
        self.announcer.flush();
    }

    /// Ends the game if fewer than `min_players` remain. Callers must stop
    /// as soon as this returns `true`.
    pub fn check_game_over(&mut self, min_players: usize) -> bool {
        if self.roster.len() < min_players {
            self.announcer.announce_end_game_too_few_players();
            self.destroy();
            return true;
        }
        false
    }

    /// Stops the game for good. Pending timeouts are cancelled and further
    /// actions are ignored.
    pub fn destroy(&mut self) {
        if !self.alive {
            return;
        }
        self.cancel_timeout();
        self.alive = false;
        log::info!(
            "Game {} over after {} round(s)",
            self.id,
            self.rounds_played
        );
    }

    /// Announces the owner's cancellation and ends the game.
    pub fn cancel_by(&mut self, player: PlayerId) {
        let name = self.roster.display_name(&player);
        self.announcer.announce_cancel(&name);
        self.destroy();
    }

    pub fn add_player(&mut self, player: PlayerId, name: Username) -> bool {
        let display = name.to_string();
        if !self.roster.add(player, name) {
            return false;
        }
        self.announcer.announce_join(&display);
        true
    }

    /// Removes a player, announcing their escape unless `silent`.
    pub fn remove_player(&mut self, player: PlayerId, silent: bool) -> bool {
        if !self.roster.contains(&player) {
            return false;
        }
        if !silent {
            let name = self.roster.display_name(&player);
            self.announcer.announce_fled(&name);
        }
        self.roster.remove(&player)
    }

    /// Removes everyone who hasn't answered. Removing anybody counts as an
    /// escalation.
    pub fn remove_nonvoters(&mut self) -> usize {
        let nonvoters: Vec<PlayerId> = self
            .roster
            .players()
            .iter()
            .filter(|player| !self.round.has_answered(player))
            .copied()
            .collect();

        for player in &nonvoters {
            self.remove_player(*player, false);
        }
        if !nonvoters.is_empty() {
            self.announcer.escalate();
        }
        nonvoters.len()
    }

    pub fn choose_next_questioner(&mut self) {
        self.roster.rotate_questioners();
    }

    /// Passes the guess to the next player. The deposed head becomes the
    /// previous guesser, or the questioner if nobody has guessed yet.
    pub fn choose_next_guesser(&mut self) {
        self.round.previous_guesser = match self.round.previous_guesser {
            None => self.roster.head_questioner(),
            Some(_) => self.roster.head_guesser(),
        };
        self.roster.rotate_guessers();
    }

    /// Sets the question and opening bet and opens the poll.
    pub fn make_poll(&mut self, asker: PlayerId, question: String, bet: Bet) {
        let name = self.roster.display_name(&asker);
        self.announcer.open_poll(&name, &question, bet);
        self.round.question = Some(question);
        self.round.bet = bet;
        self.round.final_guess = None;
        self.round.final_actor = None;
    }

    pub fn set_bet(&mut self, bet: Bet) {
        self.round.bet = bet;
    }

    pub fn clear_answers(&mut self) {
        self.round.answers.clear();
    }

    /// Records an answer from a current player.
    pub fn record_answer(&mut self, player: PlayerId, answer: bool) -> bool {
        if !self.roster.contains(&player) {
            return false;
        }
        self.round.answers.insert(player, answer);
        true
    }

    #[must_use]
    pub fn everyone_answered(&self) -> bool {
        self.roster
            .players()
            .iter()
            .all(|player| self.round.has_answered(player))
    }

    /// Settles the round with `guess` made by `player`.
    ///
    /// "Yes" answers are counted over the roster as it is now, so anyone
    /// purged since the poll no longer counts.
    pub fn resolve_round(&mut self, player: PlayerId, guess: FinalGuess) -> Option<RoundResult> {
        if !self.roster.contains(&player) {
            return None;
        }
        let previous = self.round.previous_guesser?;

        self.cancel_timeout();
        self.round.final_actor = Some(player);
        self.round.final_guess = Some(guess);

        let bet = self.round.bet;
        let correct = self.round.count_yes(self.roster.players());
        let (winner, loser) = if guess.holds(bet, correct) {
            (player, previous)
        } else {
            (previous, player)
        };
        let yes_voters: Vec<PlayerId> = self
            .roster
            .players()
            .iter()
            .filter(|p| self.round.answers.get(p).copied().unwrap_or(false))
            .copied()
            .collect();

        let winner_name = self.roster.display_name(&winner);
        let loser_name = self.roster.display_name(&loser);
        let voters = self.roster.join_names(&yes_voters);
        self.announcer
            .announce_round_finished(&winner_name, &loser_name, &voters);
        self.announcer.calm_down();

        log::info!(
            "Game {}: {} {guess}s at {bet} with {correct} correct, {winner_name} beats {loser_name}",
            self.id,
            self.roster.display_name(&player),
        );

        let result = RoundResult {
            guess,
            bet,
            correct,
            winner,
            loser,
            yes_voters,
        };
        self.rounds_played += 1;
        self.last_result = Some(result.clone());
        self.choose_next_questioner();
        Some(result)
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    #[must_use]
    pub fn owner(&self) -> Option<PlayerId> {
        self.roster.owner()
    }

    #[must_use]
    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    #[must_use]
    pub fn round(&self) -> &Round {
        &self.round
    }

    #[must_use]
    pub fn players(&self) -> &[PlayerId] {
        self.roster.players()
    }

    #[must_use]
    pub fn current_bet(&self) -> Bet {
        self.round.bet
    }

    #[must_use]
    pub fn question(&self) -> Option<&str> {
        self.round.question.as_deref()
    }

    #[must_use]
    pub fn head_questioner(&self) -> Option<PlayerId> {
        self.roster.head_questioner()
    }

    #[must_use]
    pub fn head_guesser(&self) -> Option<PlayerId> {
        self.roster.head_guesser()
    }

    #[must_use]
    pub fn previous_guesser(&self) -> Option<PlayerId> {
        self.round.previous_guesser
    }

    #[must_use]
    pub fn last_result(&self) -> Option<&RoundResult> {
        self.last_result.as_ref()
    }

    #[must_use]
    pub fn rounds_played(&self) -> u32 {
        self.rounds_played
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn started_by(&self) -> Option<&Username> {
        self.started_by.as_ref()
    }

    /// The timeout currently allowed to fire.
    #[must_use]
    pub fn pending_timer(&self) -> Option<TimerToken> {
        self.timer
    }

    #[must_use]
    pub fn announcer(&self) -> &Announcer {
        &self.announcer
    }

    pub fn announcer_mut(&mut self) -> &mut Announcer {
        &mut self.announcer
    }
}
