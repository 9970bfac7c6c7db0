//! Structured logging configuration.

use dudo::room::ChatId;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize structured logging
///
/// Log levels come from `RUST_LOG`, defaulting to `info`. Records emitted by
/// the game library through `log` are captured as well.
///
/// Logs go to stderr so they never mix with chat output on stdout.
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Structured logging initialized");
}

/// Log a chat event with structured data
pub fn log_chat_event(chat_id: ChatId, user_id: i64, message: &str) {
    tracing::debug!(chat_id = chat_id, user_id = user_id, "CHAT: {}", message);
}

/// Log a transport input that couldn't be understood
pub fn log_bad_input(line_number: usize, reason: &str) {
    tracing::warn!(line = line_number, reason = reason, "Ignoring input line");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_helpers_without_subscriber() {
        // No subscriber installed: these must be no-ops rather than panics.
        log_chat_event(1, 2, "hello");
        log_chat_event(1, 3, "[yes]");
        log_bad_input(3, "missing chat id");
    }
}
