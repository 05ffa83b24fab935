// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
// ABOUTME: Chat commands for chat-relay-cli
// ABOUTME: One-shot send, interactive loop and model listing

use chat_relay::client::{ChatClient, HistoryStorage, RelayClient, TurnOutcome};
use chat_relay::errors::AppResult;
use tokio::io::{self, AsyncBufReadExt, BufReader};
use tracing::info;

use crate::helpers::display::StreamPrinter;

async fn run_turn<S: HistoryStorage>(
    client: &mut ChatClient<S>,
    printer: &mut StreamPrinter,
    text: &str,
) -> AppResult<TurnOutcome> {
    printer.reset();
    let outcome = client.send(text, |session| printer.update(session)).await?;
    if matches!(outcome, TurnOutcome::Completed(_)) {
        println!();
    }
    Ok(outcome)
}

/// Send one message and stream the reply
pub async fn send<S: HistoryStorage>(
    client: &mut ChatClient<S>,
    text: &str,
    conversation: Option<&str>,
) -> AppResult<()> {
    if let Some(id) = conversation {
        client.load_conversation(id)?;
    }

    let mut printer = StreamPrinter::default();
    if let TurnOutcome::Completed(saved) = run_turn(client, &mut printer, text).await? {
        info!(conversation = %saved.id, "Conversation saved");
    }
    Ok(())
}

/// Read messages from stdin until EOF or `/quit`
pub async fn interactive<S: HistoryStorage>(
    client: &mut ChatClient<S>,
    conversation: Option<&str>,
) -> AppResult<()> {
    if let Some(id) = conversation {
        client.load_conversation(id)?;
        println!("Continuing conversation {id}");
    }
    println!(
        "Model: {}. Type a message; /new starts over, /quit exits.",
        client.session().model()
    );

    let mut printer = StreamPrinter::default();
    let mut lines = BufReader::new(io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "" => {}
            "/quit" | "/exit" => break,
            "/new" => {
                client.new_chat();
                println!("Started a new conversation.");
            }
            text => {
                run_turn(client, &mut printer, text).await?;
            }
        }
    }

    Ok(())
}

/// Print the relay's model catalog
pub async fn models(relay: &RelayClient) -> AppResult<()> {
    for model in relay.list_models().await? {
        println!("{:<16} {}", model.key, model.id);
    }
    Ok(())
}
