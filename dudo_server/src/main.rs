//! Console server for the dudo game.
//!
//! Reads chat events from stdin, routes them through a RoomManager that
//! keeps one room actor per chat, and prints everything the rooms say to
//! stdout.

mod config;
mod console;
mod logging;

use std::time::Duration;

use anyhow::Error;
use ctrlc::set_handler;
use dudo::{RoomManager, room::ChatEvent};
use log::info;
use pico_args::Arguments;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::mpsc,
};

use config::ServerConfig;

const HELP: &str = "\
Run dudo games for chats typed on the console

USAGE:
  dudo_server [OPTIONS]

OPTIONS:
  --bot-name   NAME        Bot username for /command@NAME  [default: env DUDO_BOT_NAME]
  --idle-secs  N           Idle seconds before a room stops  [default: env DUDO_IDLE_TIMEOUT_SECS or 300]

FLAGS:
  -h, --help               Print help information

INPUT:
  One event per line: <chat> <user> <name> <text>
  Use [yes] or [no] as the text to answer the current poll.

ENVIRONMENT:
  DUDO_BOT_NAME            Bot username
  DUDO_LOBBY_TIMEOUT_SECS  First lobby deadline  [default: 60]
  DUDO_JOIN_TIMEOUT_SECS   Lobby deadline after a join or flee  [default: 30]
  DUDO_TURN_TIMEOUT_SECS   Deadline to ask, answer or guess  [default: 50]
  DUDO_IDLE_TIMEOUT_SECS   Idle seconds before a room stops  [default: 300]
  RUST_LOG                 Log filter  [default: info]
";

/// How long to wait for the last messages to be printed on shutdown.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

struct Args {
    bot_name: Option<String>,
    idle_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        bot_name: pargs.opt_value_from_str("--bot-name")?,
        idle_secs: pargs.opt_value_from_str("--idle-secs")?,
    };

    // Catching signals for exit.
    set_handler(|| std::process::exit(0))?;

    logging::init();

    let config = ServerConfig::from_env(args.bot_name, args.idle_secs);
    config.validate()?;
    info!(
        "Starting dudo console server (bot name: {}, timeouts: {:?})",
        config.bot_name.as_deref().unwrap_or("none"),
        config.timeouts
    );

    let (outbox, mut outputs) = mpsc::unbounded_channel();
    let manager = RoomManager::new(config.room_config(), outbox);

    let printer = tokio::spawn(async move {
        while let Some(output) = outputs.recv().await {
            println!("{}", console::format_output(&output));
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut line_number = 0;
    while let Some(line) = lines.next_line().await? {
        line_number += 1;
        if line.trim().is_empty() {
            continue;
        }

        let input = match console::parse_line(&line) {
            Ok(input) => input,
            Err(e) => {
                logging::log_bad_input(line_number, &e.to_string());
                continue;
            }
        };

        let user_id = match &input.event {
            ChatEvent::Message { user_id, .. } | ChatEvent::PollAnswer { user_id, .. } => *user_id,
        };
        logging::log_chat_event(input.chat_id, user_id, &line);
        if let Err(e) = manager.dispatch(input.chat_id, input.event).await {
            log::error!("Failed to dispatch line {line_number}: {e}");
        }
    }

    info!(
        "Input closed, stopping {} room(s)",
        manager.active_room_count().await
    );
    manager.close_all().await;
    drop(manager);

    if tokio::time::timeout(DRAIN_TIMEOUT, printer).await.is_err() {
        log::warn!("Gave up waiting for pending output");
    }

    info!("Shutting down server...");
    Ok(())
}
