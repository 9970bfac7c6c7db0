//! Integration tests for rooms: command routing, game lifecycle and idle
//! teardown.

use std::time::Duration;
use tokio::{sync::mpsc, time::sleep};

use dudo::{
    Outbound,
    room::{ChatEvent, ChatId, HELP, RoomConfig, RoomManager, RoomOutput, RoomStateResponse},
};

struct Chat {
    manager: RoomManager,
    outputs: mpsc::UnboundedReceiver<RoomOutput>,
}

impl Chat {
    fn new(config: RoomConfig) -> Self {
        let (outbox, outputs) = mpsc::unbounded_channel();
        Self {
            manager: RoomManager::new(config, outbox),
            outputs,
        }
    }

    async fn say(&self, chat_id: ChatId, user_id: i64, name: &str, text: &str) {
        let event = ChatEvent::Message {
            user_id,
            name: name.to_string(),
            text: text.to_string(),
        };
        self.manager.dispatch(chat_id, event).await.unwrap();
    }

    async fn press(&self, chat_id: ChatId, user_id: i64, data: &str) {
        let event = ChatEvent::PollAnswer {
            user_id,
            data: data.to_string(),
        };
        self.manager.dispatch(chat_id, event).await.unwrap();
    }

    /// Round-trips through the room's inbox, so everything sent before has
    /// been handled.
    async fn state(&self, chat_id: ChatId) -> RoomStateResponse {
        self.manager.room_state(chat_id).await.unwrap()
    }

    fn drain(&mut self) -> Vec<RoomOutput> {
        let mut outputs = Vec::new();
        while let Ok(output) = self.outputs.try_recv() {
            outputs.push(output);
        }
        outputs
    }

    fn text(&mut self) -> String {
        self.drain()
            .iter()
            .map(|output| output.message.text().to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[tokio::test(start_paused = true)]
async fn test_startgame_opens_lobby_with_starter() {
    let mut chat = Chat::new(RoomConfig::default());
    chat.say(42, 1, "alice", "/startgame").await;
    chat.say(42, 2, "bob", "/join").await;

    let state = chat.state(42).await;
    assert!(state.has_game);
    assert_eq!(state.phase.as_deref(), Some("lobby"));
    assert_eq!(state.players, vec!["alice", "bob"]);
    assert_eq!(state.owner.as_deref(), Some("alice"));

    let outputs = chat.drain();
    assert!(outputs.iter().all(|output| output.chat_id == 42));
    assert_eq!(
        outputs[0].message,
        Outbound::Text("alice started a new game! Join by using /join.\nalice joined!".to_string())
    );
    assert_eq!(outputs[1].message, Outbound::Text("bob joined!".to_string()));
}

#[tokio::test(start_paused = true)]
async fn test_commands_without_game_are_ignored() {
    let mut chat = Chat::new(RoomConfig::default());
    chat.say(7, 1, "alice", "/join").await;
    chat.say(7, 1, "alice", "/dudo").await;
    chat.say(7, 1, "alice", "just chatting").await;
    chat.say(7, 1, "alice", "/nonsense").await;

    let state = chat.state(7).await;
    assert!(!state.has_game);
    assert!(chat.drain().is_empty());

    chat.say(7, 1, "alice", "/help").await;
    chat.state(7).await;
    assert_eq!(chat.text(), HELP);
}

#[tokio::test(start_paused = true)]
async fn test_second_startgame_is_ignored() {
    let mut chat = Chat::new(RoomConfig::default());
    chat.say(1, 1, "alice", "/startgame").await;
    chat.state(1).await;
    chat.drain();

    chat.say(1, 2, "bob", "/startgame").await;
    let state = chat.state(1).await;
    assert_eq!(state.players, vec!["alice"]);
    assert!(chat.drain().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_rooms_are_independent() {
    let mut chat = Chat::new(RoomConfig::default());
    chat.say(1, 1, "alice", "/startgame").await;
    chat.say(2, 2, "bob", "/join").await;

    assert!(chat.state(1).await.has_game);
    assert!(!chat.state(2).await.has_game);
    assert_eq!(chat.manager.active_room_count().await, 2);
    assert!(chat.drain().iter().all(|output| output.chat_id == 1));
}

#[tokio::test(start_paused = true)]
async fn test_full_round_through_chat() {
    let mut chat = Chat::new(RoomConfig {
        bot_name: Some("dudobot".to_string()),
        ..RoomConfig::default()
    });
    chat.say(5, 1, "alice", "/startgame@dudobot").await;
    chat.say(5, 2, "bob", "/join@DudoBot").await;
    chat.state(5).await;

    sleep(Duration::from_secs(31)).await;
    assert_eq!(chat.state(5).await.phase.as_deref(), Some("awaiting question"));
    chat.drain();

    chat.say(5, 1, "alice", "/ask Hungry? ## 1").await;
    chat.state(5).await;
    let outputs = chat.drain();
    assert_eq!(
        outputs[0].message,
        Outbound::Poll {
            prompt: "alice asks 'Hungry?', starting with 1 person.".to_string()
        }
    );

    chat.press(5, 1, "yes").await;
    chat.press(5, 2, "no").await;
    let state = chat.state(5).await;
    assert_eq!(state.phase.as_deref(), Some("awaiting guess"));
    assert!(chat.text().contains("bob, it's your turn to make a guess."));

    chat.say(5, 2, "bob", "/calzo").await;
    let state = chat.state(5).await;
    assert_eq!(state.rounds_played, 1);
    assert!(chat.text().contains(
        "Round ended! bob won and alice lost. The following players answered 'yes': alice."
    ));
}

#[tokio::test(start_paused = true)]
async fn test_owner_ends_game() {
    let mut chat = Chat::new(RoomConfig::default());
    chat.say(3, 1, "alice", "/startgame").await;
    chat.say(3, 2, "bob", "/join").await;
    chat.say(3, 2, "bob", "/endgame").await;
    assert!(chat.state(3).await.has_game);

    chat.say(3, 1, "alice", "/endgame").await;
    let state = chat.state(3).await;
    assert!(!state.has_game);
    assert!(chat.text().contains("Game was cancelled by alice."));

    // A new game can be started right away.
    chat.say(3, 2, "bob", "/startgame").await;
    let state = chat.state(3).await;
    assert!(state.has_game);
    assert_eq!(state.owner.as_deref(), Some("bob"));
}

#[tokio::test(start_paused = true)]
async fn test_finished_game_is_discarded() {
    let mut chat = Chat::new(RoomConfig::default());
    chat.say(9, 1, "alice", "/startgame").await;
    chat.state(9).await;

    // Alone in the lobby when it closes.
    sleep(Duration::from_secs(31)).await;
    assert!(chat.text().contains("Ending game, not enough players :("));

    chat.say(9, 2, "bob", "/join").await;
    let state = chat.state(9).await;
    assert!(!state.has_game);
    assert!(state.phase.is_none());
    assert!(chat.drain().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_idle_room_tears_down_game() {
    let mut chat = Chat::new(RoomConfig {
        idle_timeout: Duration::from_secs(10),
        ..RoomConfig::default()
    });
    chat.say(11, 1, "alice", "/startgame").await;
    chat.state(11).await;
    chat.drain();

    sleep(Duration::from_secs(11)).await;
    assert_eq!(
        chat.text(),
        "You've been silent for too long. See ya next time!"
    );
    assert_eq!(chat.manager.active_room_count().await, 0);
    assert!(chat.manager.get_room(11).await.is_none());

    // The chat speaking again brings up a fresh room.
    chat.say(11, 1, "alice", "/help").await;
    chat.state(11).await;
    assert_eq!(chat.manager.active_room_count().await, 1);
    assert_eq!(chat.text(), HELP);
}

#[tokio::test(start_paused = true)]
async fn test_idle_room_without_game_stops_quietly() {
    let mut chat = Chat::new(RoomConfig {
        idle_timeout: Duration::from_secs(10),
        ..RoomConfig::default()
    });
    chat.say(12, 1, "alice", "hello").await;
    chat.state(12).await;

    sleep(Duration::from_secs(11)).await;
    assert!(chat.drain().is_empty());
    assert_eq!(chat.manager.active_room_count().await, 0);
}

#[tokio::test(start_paused = true)]
async fn test_close_room_destroys_game() {
    let mut chat = Chat::new(RoomConfig::default());
    chat.say(13, 1, "alice", "/startgame").await;
    chat.state(13).await;
    chat.drain();

    chat.manager.close_room(13).await.unwrap();
    assert!(chat.manager.room_state(13).await.is_err());

    sleep(Duration::from_secs(120)).await;
    assert!(chat.drain().is_empty());
}
