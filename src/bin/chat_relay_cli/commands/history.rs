// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
// ABOUTME: History commands for chat-relay-cli
// ABOUTME: Lists, prints and deletes stored conversations

use chat_relay::client::{HistoryStorage, SessionStore};
use chat_relay::errors::{AppError, AppResult};

use crate::helpers::display::{display_conversation_list, display_transcript};

/// List stored conversations
pub fn list<S: HistoryStorage>(store: &SessionStore<S>) -> AppResult<()> {
    display_conversation_list(&store.list()?);
    Ok(())
}

/// Print one conversation
pub fn show<S: HistoryStorage>(store: &SessionStore<S>, id: &str, html: bool) -> AppResult<()> {
    let conversation = store
        .get(id)?
        .ok_or_else(|| AppError::not_found(format!("Conversation {id}")))?;
    display_transcript(&conversation, html);
    Ok(())
}

/// Delete one conversation
pub fn delete<S: HistoryStorage>(store: &mut SessionStore<S>, id: &str) -> AppResult<()> {
    if store.remove(id)? {
        println!("Deleted conversation {id}");
        Ok(())
    } else {
        Err(AppError::not_found(format!("Conversation {id}")))
    }
}
