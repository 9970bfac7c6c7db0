//! Room actor implementation with async message handling.

use chrono::{DateTime, Utc};
use tokio::{
    sync::{mpsc, oneshot},
    time::Instant,
};

use super::{
    commands::{Command, HELP, ParseError, parse_answer, parse_command},
    config::{ROOM_INBOX_CAPACITY, RoomConfig},
    errors::{RoomError, RoomResult},
    messages::{ChatEvent, ChatId, RoomMessage, RoomOutput, RoomStateResponse},
};
use crate::{
    announce::{MessageSink, Outbound},
    game::{
        GameHandle,
        actions::Action,
        entities::{PlayerId, Username},
    },
};

/// Room actor handle for sending messages
#[derive(Clone, Debug)]
pub struct RoomHandle {
    sender: mpsc::Sender<RoomMessage>,
    chat_id: ChatId,
}

impl RoomHandle {
    pub fn new(sender: mpsc::Sender<RoomMessage>, chat_id: ChatId) -> Self {
        Self { sender, chat_id }
    }

    pub fn chat_id(&self) -> ChatId {
        self.chat_id
    }

    /// Whether the actor behind this handle has stopped.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Send a message to the room
    pub async fn send(&self, message: RoomMessage) -> RoomResult<()> {
        self.sender
            .send(message)
            .await
            .map_err(|_| RoomError::Closed(self.chat_id))
    }

    pub async fn dispatch(&self, event: ChatEvent) -> RoomResult<()> {
        self.send(RoomMessage::Event(event)).await
    }

    pub async fn state(&self) -> RoomResult<RoomStateResponse> {
        let (response, rx) = oneshot::channel();
        self.send(RoomMessage::GetState { response }).await?;
        rx.await.map_err(|_| RoomError::NoResponse(self.chat_id))
    }

    /// Destroys the room's game, if any, and stops the actor.
    pub async fn close(&self) -> RoomResult<()> {
        let (response, rx) = oneshot::channel();
        self.send(RoomMessage::Close { response }).await?;
        rx.await.map_err(|_| RoomError::NoResponse(self.chat_id))
    }
}

/// Tags a game's announcements with the chat they belong to.
struct ChatSink {
    chat_id: ChatId,
    outbox: mpsc::UnboundedSender<RoomOutput>,
}

impl MessageSink for ChatSink {
    fn deliver(&mut self, message: Outbound) {
        let output = RoomOutput {
            chat_id: self.chat_id,
            message,
        };
        if self.outbox.send(output).is_err() {
            log::warn!("Room {}: outbox closed, dropping message", self.chat_id);
        }
    }
}

/// Room actor serving a single chat. Holds at most one game at a time.
pub struct RoomActor {
    chat_id: ChatId,

    config: RoomConfig,

    /// Message inbox
    inbox: mpsc::Receiver<RoomMessage>,

    /// Where every message for the chat goes
    outbox: mpsc::UnboundedSender<RoomOutput>,

    /// The current game, dropped once it's over
    game: Option<GameHandle>,

    is_closed: bool,

    created_at: DateTime<Utc>,

    games_started: u32,
}

impl RoomActor {
    /// Create a new room actor
    ///
    /// # Returns
    ///
    /// * `(RoomActor, RoomHandle)` - Actor and handle for sending messages
    pub fn new(
        chat_id: ChatId,
        config: RoomConfig,
        outbox: mpsc::UnboundedSender<RoomOutput>,
    ) -> (Self, RoomHandle) {
        let (sender, inbox) = mpsc::channel(ROOM_INBOX_CAPACITY);

        let actor = Self {
            chat_id,
            config,
            inbox,
            outbox,
            game: None,
            is_closed: false,
            created_at: Utc::now(),
            games_started: 0,
        };

        (actor, RoomHandle::new(sender, chat_id))
    }

    /// Run the room actor event loop until it's closed or the chat goes
    /// quiet for the idle timeout.
    pub async fn run(mut self) {
        log::info!("Room {} starting", self.chat_id);

        let idle_timeout = self.config.idle_timeout;
        let idle = tokio::time::sleep(idle_timeout);
        tokio::pin!(idle);

        loop {
            tokio::select! {
                message = self.inbox.recv() => {
                    let Some(message) = message else {
                        break;
                    };
                    if matches!(message, RoomMessage::Event(_)) {
                        idle.as_mut().reset(Instant::now() + idle_timeout);
                    }
                    self.handle_message(message).await;

                    if self.is_closed {
                        break;
                    }
                }

                () = &mut idle => {
                    self.handle_idle().await;
                    break;
                }
            }
        }

        self.inbox.close();
        log::info!(
            "Room {} closed after {} game(s), open since {}",
            self.chat_id,
            self.games_started,
            self.created_at
        );
    }

    async fn handle_message(&mut self, message: RoomMessage) {
        match message {
            RoomMessage::Event(event) => self.handle_event(event).await,

            RoomMessage::GetState { response } => {
                let state = self.state().await;
                let _ = response.send(state);
            }

            RoomMessage::Close { response } => {
                if let Some(game) = self.game.take() {
                    game.destroy().await;
                }
                self.is_closed = true;
                let _ = response.send(());
            }
        }
    }

    async fn handle_event(&mut self, event: ChatEvent) {
        self.discard_dead_game().await;

        match event {
            ChatEvent::Message {
                user_id,
                name,
                text,
            } => {
                let command = match parse_command(&text, self.config.bot_name.as_deref()) {
                    Ok(command) => command,
                    Err(ParseError::NotACommand) => return,
                    Err(e) => {
                        log::debug!("Room {}: {e}", self.chat_id);
                        return;
                    }
                };
                self.handle_command(user_id, &name, command).await;
            }

            ChatEvent::PollAnswer { user_id, data } => {
                let action = Action::Answer {
                    player: user_id,
                    answer: parse_answer(&data),
                };
                self.submit(action).await;
            }
        }
    }

    async fn handle_command(&mut self, user_id: PlayerId, name: &str, command: Command) {
        if command == Command::Help {
            self.send_text(HELP);
            return;
        }

        if self.game.is_some() {
            if let Some(action) = command.into_action(user_id, name) {
                self.submit(action).await;
            }
        } else if command == Command::StartGame {
            self.start_game(user_id, name).await;
        } else {
            log::trace!("Room {}: no game, ignoring {command:?}", self.chat_id);
        }
    }

    /// Opens a lobby with the starter already in it.
    async fn start_game(&mut self, user_id: PlayerId, name: &str) {
        let sink = ChatSink {
            chat_id: self.chat_id,
            outbox: self.outbox.clone(),
        };
        let game = GameHandle::new(self.config.game.clone(), Box::new(sink));

        {
            let mut engine = game.lock().await;
            engine.start_by(Username::new(name));
            engine.submit_action(Action::Join {
                player: user_id,
                name: Username::new(name),
            });
            engine.flush();
        }

        log::info!(
            "Room {}: {name} started game {}",
            self.chat_id,
            game.id()
        );
        self.games_started += 1;
        self.game = Some(game);
    }

    async fn submit(&mut self, action: Action) {
        let Some(game) = self.game.clone() else {
            return;
        };
        if !game.submit(action).await {
            log::debug!("Room {}: game {} is over", self.chat_id, game.id());
            self.game = None;
        }
    }

    /// Forgets a game that ended on its own, e.g. through a timeout.
    async fn discard_dead_game(&mut self) {
        if let Some(game) = &self.game
            && !game.is_alive().await
        {
            log::debug!("Room {}: discarding finished game {}", self.chat_id, game.id());
            self.game = None;
        }
    }

    async fn handle_idle(&mut self) {
        log::info!("Room {}: idle for {:?}", self.chat_id, self.config.idle_timeout);
        let Some(game) = self.game.take() else {
            return;
        };
        let mut engine = game.lock().await;
        if engine.is_alive() {
            engine.announcer_mut().announce_idle_teardown();
            engine.destroy();
            engine.flush();
        }
    }

    async fn state(&self) -> RoomStateResponse {
        let Some(game) = &self.game else {
            return RoomStateResponse {
                chat_id: self.chat_id,
                ..RoomStateResponse::default()
            };
        };

        let engine = game.lock().await;
        let roster = engine.roster();
        RoomStateResponse {
            chat_id: self.chat_id,
            has_game: engine.is_alive(),
            phase: Some(engine.phase().to_string()),
            players: engine
                .players()
                .iter()
                .map(|player| roster.display_name(player))
                .collect(),
            owner: engine.owner().map(|owner| roster.display_name(&owner)),
            question: engine.question().map(str::to_string),
            current_bet: engine.current_bet(),
            rounds_played: engine.rounds_played(),
        }
    }

    fn send_text(&self, text: &str) {
        let output = RoomOutput {
            chat_id: self.chat_id,
            message: Outbound::Text(text.to_string()),
        };
        if self.outbox.send(output).is_err() {
            log::warn!("Room {}: outbox closed, dropping message", self.chat_id);
        }
    }
}
