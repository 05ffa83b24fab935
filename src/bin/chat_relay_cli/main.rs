// ABOUTME: Chat relay CLI - terminal chat client and history manager
// ABOUTME: Streams replies from a running relay and keeps conversations in local history
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
//!
//! Usage:
//! ```bash
//! # Ask one question (starts a new conversation)
//! chat-relay-cli send "Explain recursion"
//!
//! # Continue a stored conversation
//! chat-relay-cli send "And in Rust?" --conversation 1700000000000
//!
//! # Interactive chat
//! chat-relay-cli chat --model llama-3.3
//!
//! # One reply as a single JSON body
//! chat-relay-cli send "Hello" --no-stream
//!
//! # Manage history
//! chat-relay-cli history list
//! chat-relay-cli history show 1700000000000 --html
//! chat-relay-cli history delete 1700000000000
//!
//! # List models offered by the relay
//! chat-relay-cli models
//! ```

mod commands;
mod helpers;

use std::env;
use std::path::PathBuf;

use chat_relay::{
    client::{ChatClient, FileStorage, RelayClient, SessionStore},
    constants::{models, ports},
    errors::AppResult,
    logging::LoggingConfig,
};
use clap::{Parser, Subcommand};

type Result<T> = AppResult<T>;

#[derive(Parser)]
#[command(
    name = "chat-relay-cli",
    about = "Terminal chat client for the chat relay",
    long_about = "Sends chat turns to a running chat relay, renders the streamed reply and keeps conversation history on disk."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Relay base URL (default: $CHAT_RELAY_URL or http://127.0.0.1:3000)
    #[arg(long, global = true)]
    server: Option<String>,

    /// Model key for new conversations
    #[arg(long, short = 'm', global = true)]
    model: Option<String>,

    /// History directory (default: platform data directory)
    #[arg(long, global = true)]
    history_dir: Option<PathBuf>,

    /// Wait for the whole reply instead of streaming it
    #[arg(long, global = true)]
    no_stream: bool,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[non_exhaustive]
#[derive(Subcommand)]
enum Command {
    /// Send one message and stream the reply
    Send {
        /// Message text
        message: String,

        /// Continue a stored conversation instead of starting a new one
        #[arg(long, short = 'c')]
        conversation: Option<String>,
    },

    /// Interactive chat; `/new` starts over, `/quit` exits
    Chat {
        /// Continue a stored conversation
        #[arg(long, short = 'c')]
        conversation: Option<String>,
    },

    /// Conversation history commands
    History {
        #[command(subcommand)]
        action: HistoryCommand,
    },

    /// List the models the relay accepts
    Models,
}

#[non_exhaustive]
#[derive(Subcommand)]
enum HistoryCommand {
    /// List stored conversations, most recent first
    List,

    /// Print a stored conversation
    Show {
        /// Conversation ID
        id: String,

        /// Print formatted HTML instead of raw text
        #[arg(long)]
        html: bool,
    },

    /// Delete a stored conversation
    Delete {
        /// Conversation ID
        id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut logging = LoggingConfig::for_cli();
    if cli.verbose {
        logging.level = "debug".into();
    }
    if let Err(e) = logging.init() {
        eprintln!("Logging disabled: {e}");
    }

    let server = cli
        .server
        .or_else(|| env::var("CHAT_RELAY_URL").ok())
        .unwrap_or_else(|| format!("http://127.0.0.1:{}", ports::DEFAULT_HTTP_PORT));
    let model = cli
        .model
        .unwrap_or_else(|| models::DEFAULT_MODEL_KEY.to_owned());
    let storage = match cli.history_dir {
        Some(dir) => FileStorage::new(dir),
        None => FileStorage::default_location()?,
    };

    let streaming = !cli.no_stream;
    let relay = RelayClient::new(server)?;

    match cli.command {
        Command::Send {
            message,
            conversation,
        } => {
            let mut client = ChatClient::new(relay, SessionStore::new(storage), model)
                .with_streaming(streaming);
            commands::chat::send(&mut client, &message, conversation.as_deref()).await?;
        }
        Command::Chat { conversation } => {
            let mut client = ChatClient::new(relay, SessionStore::new(storage), model)
                .with_streaming(streaming);
            commands::chat::interactive(&mut client, conversation.as_deref()).await?;
        }
        Command::History { action } => {
            let mut store = SessionStore::new(storage);
            match action {
                HistoryCommand::List => commands::history::list(&store)?,
                HistoryCommand::Show { id, html } => commands::history::show(&store, &id, html)?,
                HistoryCommand::Delete { id } => commands::history::delete(&mut store, &id)?,
            }
        }
        Command::Models => commands::chat::models(&relay).await?,
    }

    Ok(())
}
