//! Active players and the two turn queues that rotate over them.

use std::collections::{HashMap, VecDeque};

use super::constants::UNKNOWN_PLAYER;
use super::entities::{PlayerId, Username};

/// The set of players currently in a game.
///
/// Every mutation keeps the questioner and guesser queues permutations of
/// exactly the active players. Names are remembered for the lifetime of the
/// game so results can still mention players that left.
#[derive(Debug, Default)]
pub struct Roster {
    players: Vec<PlayerId>,
    names: HashMap<PlayerId, Username>,
    questioners: VecDeque<PlayerId>,
    guessers: VecDeque<PlayerId>,
    /// First player that ever joined.
    owner: Option<PlayerId>,
}

impl Roster {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a player to the back of both queues. Returns `false` if they're
    /// already playing.
    pub fn add(&mut self, player: PlayerId, name: Username) -> bool {
        if self.contains(&player) {
            return false;
        }
        self.names.insert(player, name);
        self.players.push(player);
        self.questioners.push_back(player);
        self.guessers.push_back(player);
        if self.owner.is_none() {
            self.owner = Some(player);
        }
        true
    }

    /// Removes a player from the roster and both queues. Returns `false` if
    /// they weren't playing.
    pub fn remove(&mut self, player: &PlayerId) -> bool {
        if !self.contains(player) {
            return false;
        }
        self.players.retain(|p| p != player);
        self.questioners.retain(|p| p != player);
        self.guessers.retain(|p| p != player);
        true
    }

    #[must_use]
    pub fn contains(&self, player: &PlayerId) -> bool {
        self.players.contains(player)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.players.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Active players in join order.
    #[must_use]
    pub fn players(&self) -> &[PlayerId] {
        &self.players
    }

    #[must_use]
    pub fn owner(&self) -> Option<PlayerId> {
        self.owner
    }

    #[must_use]
    pub fn head_questioner(&self) -> Option<PlayerId> {
        self.questioners.front().copied()
    }

    #[must_use]
    pub fn head_guesser(&self) -> Option<PlayerId> {
        self.guessers.front().copied()
    }

    pub fn questioners(&self) -> impl Iterator<Item = &PlayerId> {
        self.questioners.iter()
    }

    pub fn guessers(&self) -> impl Iterator<Item = &PlayerId> {
        self.guessers.iter()
    }

    /// Moves the head questioner to the back of the queue.
    pub fn rotate_questioners(&mut self) -> Option<PlayerId> {
        rotate(&mut self.questioners)
    }

    /// Moves the head guesser to the back of the queue and returns them.
    pub fn rotate_guessers(&mut self) -> Option<PlayerId> {
        rotate(&mut self.guessers)
    }

    #[must_use]
    pub fn name(&self, player: &PlayerId) -> Option<&Username> {
        self.names.get(player)
    }

    /// Name of a player, current or former.
    #[must_use]
    pub fn display_name(&self, player: &PlayerId) -> String {
        self.name(player)
            .map_or_else(|| UNKNOWN_PLAYER.to_string(), ToString::to_string)
    }

    /// Comma separated names of the given players.
    #[must_use]
    pub fn join_names<'a>(&self, players: impl IntoIterator<Item = &'a PlayerId>) -> String {
        players
            .into_iter()
            .map(|player| self.display_name(player))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Comma separated names of every active player.
    #[must_use]
    pub fn roster_names(&self) -> String {
        self.join_names(&self.players)
    }
}

fn rotate(queue: &mut VecDeque<PlayerId>) -> Option<PlayerId> {
    let head = queue.pop_front()?;
    queue.push_back(head);
    Some(head)
}
