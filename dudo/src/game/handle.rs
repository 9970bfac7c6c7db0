//! Shared access to a running game.

use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use super::{
    actions::Action,
    entities::PlayerId,
    state_machine::{Engine, GameSettings},
    timer::TokioScheduler,
};
use crate::announce::{Announcer, MessageSink};

/// Handle to a game whose engine sits behind a single gate.
///
/// Player actions and timer callbacks both take the gate before touching the
/// engine and release it only after flushing announcements, so events for
/// one game never interleave.
#[derive(Clone, Debug)]
pub struct GameHandle {
    id: Uuid,
    gate: Arc<Mutex<Engine>>,
}

impl GameHandle {
    /// Creates a game that delivers its announcements to `sink`. Timeouts run
    /// on the current tokio runtime.
    pub fn new(settings: GameSettings, sink: Box<dyn MessageSink>) -> Self {
        let id = Uuid::new_v4();
        let gate = Arc::new_cyclic(|weak| {
            Mutex::new(Engine::new(
                id,
                settings,
                Announcer::new(sink),
                Box::new(TokioScheduler::new(weak.clone())),
            ))
        });
        Self { id, gate }
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The gate itself, for callers that need to batch several operations.
    #[must_use]
    pub fn gate(&self) -> &Arc<Mutex<Engine>> {
        &self.gate
    }

    pub async fn lock(&self) -> MutexGuard<'_, Engine> {
        self.gate.lock().await
    }

    /// Opens the lobby and flushes its announcements.
    pub async fn start(&self) {
        let mut engine = self.gate.lock().await;
        engine.start();
        engine.flush();
    }

    /// Submits an action and flushes. Returns whether the game is still
    /// alive afterwards.
    pub async fn submit(&self, action: Action) -> bool {
        let mut engine = self.gate.lock().await;
        engine.submit_action(action);
        engine.flush();
        engine.is_alive()
    }

    pub async fn destroy(&self) {
        let mut engine = self.gate.lock().await;
        engine.destroy();
        engine.flush();
    }

    pub async fn is_alive(&self) -> bool {
        self.gate.lock().await.is_alive()
    }

    pub async fn owner(&self) -> Option<PlayerId> {
        self.gate.lock().await.owner()
    }
}
