//! Cancellable timeouts.
//!
//! The engine only ever has one outstanding timeout, identified by a
//! [`TimerToken`]. Arming a new one replaces the token, so a timer that
//! already woke up and is waiting for the gate finds its token stale and
//! does nothing.

use std::{
    fmt,
    sync::Weak,
    time::Duration,
};
use tokio::{sync::Mutex, task::JoinHandle};

use super::state_machine::Engine;

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TimerToken(u64);

impl TimerToken {
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// The token armed after this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for TimerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

/// Runs [`Engine::fire_timeout`] once `after` has elapsed.
pub trait Scheduler: Send {
    fn schedule(&mut self, token: TimerToken, after: Duration);
    fn cancel(&mut self, token: TimerToken);
}

/// Schedules timeouts as tokio tasks that acquire the engine's gate before
/// firing.
pub struct TokioScheduler {
    gate: Weak<Mutex<Engine>>,
    task: Option<(TimerToken, JoinHandle<()>)>,
}

impl TokioScheduler {
    pub fn new(gate: Weak<Mutex<Engine>>) -> Self {
        Self { gate, task: None }
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&mut self, token: TimerToken, after: Duration) {
        // Re-arming from inside a firing timer aborts the running task, which
        // is harmless since it doesn't await again after taking the gate.
        if let Some((_, task)) = self.task.take() {
            task.abort();
        }

        let gate = self.gate.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(after).await;
            if let Some(gate) = gate.upgrade() {
                gate.lock().await.fire_timeout(token);
            }
        });
        self.task = Some((token, task));
    }

    fn cancel(&mut self, token: TimerToken) {
        if matches!(&self.task, Some((armed, _)) if *armed == token)
            && let Some((_, task)) = self.task.take()
        {
            task.abort();
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        if let Some((_, task)) = self.task.take() {
            task.abort();
        }
    }
}
