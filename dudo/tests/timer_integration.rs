//! Timeout tests against the tokio scheduler, run on a paused clock.

use std::time::Duration;
use tokio::{sync::mpsc, time::sleep};

use dudo::{
    Action, GameHandle, GameSettings, Outbound, Phase, PlayerId, Username,
    game::{AwaitingQuestion, Lobby, QuestionInput},
};

fn new_game() -> (GameHandle, mpsc::UnboundedReceiver<Outbound>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (GameHandle::new(GameSettings::default(), Box::new(tx)), rx)
}

fn join(player: PlayerId) -> Action {
    Action::Join {
        player,
        name: Username::new(&format!("P{player}")),
    }
}

fn drain(rx: &mut mpsc::UnboundedReceiver<Outbound>) -> String {
    let mut lines = Vec::new();
    while let Ok(message) = rx.try_recv() {
        lines.push(message.text().to_string());
    }
    lines.join("\n")
}

async fn phase(game: &GameHandle) -> Phase {
    game.lock().await.phase()
}

#[tokio::test(start_paused = true)]
async fn test_lobby_closes_after_rearm_timeout() {
    let (game, mut rx) = new_game();
    game.start().await;
    assert!(game.submit(join(1)).await);
    assert!(game.submit(join(2)).await);

    sleep(Duration::from_secs(29)).await;
    assert_eq!(phase(&game).await, Phase::Lobby(Lobby));

    sleep(Duration::from_secs(2)).await;
    assert_eq!(phase(&game).await, Phase::AwaitingQuestion(AwaitingQuestion));
    let text = drain(&mut rx);
    assert!(text.contains("Time's up!"));
    assert!(text.contains("P1, it's your turn to ask a question."));
}

#[tokio::test(start_paused = true)]
async fn test_join_pushes_lobby_deadline_back() {
    let (game, _rx) = new_game();
    game.start().await;
    game.submit(join(1)).await;
    game.submit(join(2)).await;

    sleep(Duration::from_secs(20)).await;
    game.submit(join(3)).await;

    sleep(Duration::from_secs(15)).await;
    assert_eq!(phase(&game).await, Phase::Lobby(Lobby));

    sleep(Duration::from_secs(16)).await;
    assert_eq!(phase(&game).await, Phase::AwaitingQuestion(AwaitingQuestion));
    assert_eq!(game.lock().await.players(), &[1, 2, 3]);
}

#[tokio::test(start_paused = true)]
async fn test_empty_lobby_times_out() {
    let (game, mut rx) = new_game();
    game.start().await;

    sleep(Duration::from_secs(61)).await;
    assert!(!game.is_alive().await);
    assert!(drain(&mut rx).contains("Ending game, not enough players :("));
}

#[tokio::test(start_paused = true)]
async fn test_silent_questioner_is_kicked() {
    let (game, mut rx) = new_game();
    game.start().await;
    for player in 1..=3 {
        game.submit(join(player)).await;
    }
    sleep(Duration::from_secs(31)).await;
    drain(&mut rx);

    sleep(Duration::from_secs(50)).await;
    let engine = game.lock().await;
    assert_eq!(engine.players(), &[2, 3]);
    assert_eq!(engine.head_questioner(), Some(2));
    drop(engine);
    assert!(drain(&mut rx).contains("P1 has taken too long. Kicking..."));
}

#[tokio::test(start_paused = true)]
async fn test_rejected_question_restarts_turn_clock() {
    let (game, _rx) = new_game();
    game.start().await;
    game.submit(join(1)).await;
    game.submit(join(2)).await;
    sleep(Duration::from_secs(31)).await;

    sleep(Duration::from_secs(40)).await;
    game.submit(Action::AskQuestion {
        player: 1,
        question: QuestionInput::Invalid,
    })
    .await;

    // The first deadline passes without a kick.
    sleep(Duration::from_secs(20)).await;
    assert_eq!(game.lock().await.players(), &[1, 2]);

    // The game ends when the renewed one does, as only P2 would be left.
    sleep(Duration::from_secs(31)).await;
    assert!(!game.is_alive().await);
}

#[tokio::test(start_paused = true)]
async fn test_timer_waiting_on_gate_is_superseded() {
    let (game, _rx) = new_game();
    game.start().await;
    game.submit(join(1)).await;
    game.submit(join(2)).await;

    {
        // Hold the gate across the deadline so the timer wakes up and waits.
        let mut engine = game.lock().await;
        sleep(Duration::from_secs(31)).await;
        engine.submit_action(join(3));
        engine.flush();
    }

    sleep(Duration::from_secs(1)).await;
    assert_eq!(phase(&game).await, Phase::Lobby(Lobby));

    sleep(Duration::from_secs(30)).await;
    assert_eq!(phase(&game).await, Phase::AwaitingQuestion(AwaitingQuestion));
}

#[tokio::test(start_paused = true)]
async fn test_destroyed_game_never_times_out() {
    let (game, mut rx) = new_game();
    game.start().await;
    game.submit(join(1)).await;
    game.submit(join(2)).await;
    assert!(!game.submit(Action::End { player: 1 }).await);
    drain(&mut rx);

    sleep(Duration::from_secs(120)).await;
    assert!(drain(&mut rx).is_empty());
    assert_eq!(phase(&game).await, Phase::Lobby(Lobby));
    assert!(game.lock().await.pending_timer().is_none());
}
