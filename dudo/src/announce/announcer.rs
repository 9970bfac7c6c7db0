//! Buffered announcements with poll support and an escalating temper.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{MessageSink, Outbound, insults::Insulter};
use crate::game::entities::Bet;

/// How rude rejection messages get. Chosen from the escalation score.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Mood {
    Mild,
    Normal,
    Harsh,
    Savage,
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Mild => "mild",
            Self::Normal => "normal",
            Self::Harsh => "harsh",
            Self::Savage => "savage",
        };
        write!(f, "{repr}")
    }
}

/// Each mood lasts for this much escalation before the next one kicks in.
const MOOD_THRESHOLDS: [(Mood, f64); 4] = [
    (Mood::Mild, 1.0),
    (Mood::Normal, 2.0),
    (Mood::Harsh, 3.0),
    (Mood::Savage, f64::INFINITY),
];

const ESCALATION_STEP: f64 = 1.0;
const CALM_DOWN_STEP: f64 = 0.5;

/// A poll waiting to be flushed. `index` is where the prompt goes relative
/// to the buffered lines.
#[derive(Debug)]
struct PendingPoll {
    asker: String,
    question: String,
    bet: Bet,
    index: usize,
}

pub struct Announcer {
    buffer: Vec<String>,
    poll: Option<PendingPoll>,
    escalation: f64,
    mood: Mood,
    insulter: Insulter,
    sink: Box<dyn MessageSink>,
}

impl fmt::Debug for Announcer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Announcer")
            .field("buffer", &self.buffer)
            .field("poll", &self.poll)
            .field("escalation", &self.escalation)
            .field("mood", &self.mood)
            .finish_non_exhaustive()
    }
}

impl Announcer {
    pub fn new(sink: Box<dyn MessageSink>) -> Self {
        Self {
            buffer: Vec::new(),
            poll: None,
            escalation: 0.0,
            mood: Mood::Mild,
            insulter: Insulter::default(),
            sink,
        }
    }

    pub fn announce(&mut self, announcement: impl Into<String>) {
        self.buffer.push(announcement.into());
    }

    /// Sends everything buffered so far. With a pending poll, the prompt is
    /// sent between the lines buffered before and after it was opened.
    pub fn flush(&mut self) {
        let lines = std::mem::take(&mut self.buffer);

        if let Some(poll) = self.poll.take() {
            let index = poll.index.min(lines.len());
            let (before, after) = lines.split_at(index);
            if !before.is_empty() {
                self.sink.deliver(Outbound::Text(before.join("\n")));
            }
            let people = if poll.bet == 1 { "person" } else { "people" };
            self.sink.deliver(Outbound::Poll {
                prompt: format!(
                    "{} asks '{}', starting with {} {people}.",
                    poll.asker, poll.question, poll.bet
                ),
            });
            if !after.is_empty() {
                self.sink.deliver(Outbound::Text(after.join("\n")));
            }
        } else if !lines.is_empty() {
            log::debug!("Announcing '{}'", lines.join(" "));
            self.sink.deliver(Outbound::Text(lines.join("\n")));
        }
    }

    /// Queues the yes/no prompt for the next flush.
    pub fn open_poll(&mut self, asker: &str, question: &str, bet: Bet) {
        self.poll = Some(PendingPoll {
            asker: asker.to_string(),
            question: question.to_string(),
            bet,
            index: self.buffer.len(),
        });
    }

    #[must_use]
    pub fn mood(&self) -> Mood {
        self.mood
    }

    #[must_use]
    pub fn escalation(&self) -> f64 {
        self.escalation
    }

    pub fn escalate(&mut self) {
        self.escalation += ESCALATION_STEP;
        self.update_mood();
        log::debug!("Escalated to {} ({})", self.escalation, self.mood);
    }

    pub fn calm_down(&mut self) {
        self.escalation = (self.escalation - CALM_DOWN_STEP).max(0.0);
        self.update_mood();
    }

    fn update_mood(&mut self) {
        let mut remaining = self.escalation;
        for (mood, threshold) in MOOD_THRESHOLDS {
            remaining -= threshold;
            if remaining < 0.0 {
                self.mood = mood;
                return;
            }
        }
    }

    fn insult(&self) -> String {
        self.insulter.get_insult(self.mood)
    }

    pub fn announce_start(&mut self, starter: Option<&str>) {
        match starter {
            Some(name) => {
                self.announce(format!("{name} started a new game! Join by using /join."));
            }
            None => self.announce("A new game has started! Join by using /join."),
        }
    }

    pub fn announce_cancel(&mut self, name: &str) {
        self.announce(format!("Game was cancelled by {name}."));
    }

    pub fn announce_timeout(&mut self) {
        self.announce("Time's up!");
    }

    pub fn announce_too_high_bet(&mut self, num_players: usize) {
        let insult = self.insult();
        self.announce(format!(
            "{insult} You can't bet that high. There's only {num_players} players!"
        ));
        self.escalate();
    }

    pub fn announce_too_low_bet(&mut self, current_bet: Bet) {
        let insult = self.insult();
        self.announce(format!(
            "{insult} You should bet more than {current_bet}. If you can't, maybe you should doubt or fit."
        ));
        self.escalate();
    }

    pub fn announce_invalid_question(&mut self) {
        self.announce(
            "That's not a valid question! Remember to include a bet of at least 1 after '##'",
        );
        self.escalate();
    }

    pub fn announce_invalid_bet(&mut self) {
        self.announce("That's not a valid bet! Use /raise followed by a number.");
        self.escalate();
    }

    pub fn announce_timeout_kick(&mut self, name: &str) {
        self.announce(format!("{name} has taken too long. Kicking..."));
        self.escalate();
    }

    pub fn announce_votes_received(&mut self, names: &str) {
        self.announce("All votes received.");
        self.announce_players(names);
    }

    pub fn announce_nonvoter_removal(&mut self) {
        self.announce("Ok, we're done here. Removing everyone who didn't vote.");
    }

    pub fn announce_players(&mut self, names: &str) {
        self.announce(format!("Current players are: {names}."));
    }

    pub fn announce_questioner(&mut self, name: &str) {
        self.announce(format!("{name}, it's your turn to ask a question."));
    }

    pub fn announce_join(&mut self, name: &str) {
        self.announce(format!("{name} joined!"));
    }

    pub fn announce_fled(&mut self, name: &str) {
        self.announce(format!("{name} fled!"));
    }

    pub fn announce_guesser(&mut self, name: &str, question: &str, bet: Bet) {
        self.announce(format!(
            "{name}, it's your turn to make a guess. Question is '{question}'. Current bet is {bet}."
        ));
    }

    pub fn announce_round_finished(&mut self, winner: &str, loser: &str, voters: &str) {
        self.announce(format!(
            "Round ended! {winner} won and {loser} lost. The following players answered 'yes': {voters}."
        ));
    }

    pub fn announce_end_game_too_few_players(&mut self) {
        self.announce("Ending game, not enough players :(");
    }

    pub fn announce_idle_teardown(&mut self) {
        self.announce("You've been silent for too long. See ya next time!");
    }
}
