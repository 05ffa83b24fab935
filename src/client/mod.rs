// ABOUTME: Chat client half: renders relayed streams into a session and persists finished turns
// ABOUTME: Ties one ChatSession, one SessionStore and one RelayClient together
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Chat Client
//!
//! The consumer side of the relay:
//!
//! - **`format`**: markdown-ish text to HTML
//! - **`renderer`**: per-chat [`ChatSession`] state machine
//! - **`session_store`**: capacity-bounded history over a storage backend
//! - **`relay_client`**: HTTP client reading the relay's event stream
//!
//! [`ChatClient::send`] runs one turn end to end and persists it once the
//! reply completes. A failed turn leaves an inline error and is not saved.

pub mod format;
pub mod relay_client;
pub mod renderer;
pub mod session_store;

pub use format::format_message;
pub use relay_client::{EventStream, ModelEntry, RelayClient};
pub use renderer::{ChatSession, MessageSlot, TurnOutcome};
pub use session_store::{FileStorage, HistoryStorage, MemoryStorage, SessionStore};

use futures_util::{stream, StreamExt};
use tracing::warn;

use crate::errors::{AppError, AppResult};
use chat_relay_core::models::{ChatMessage, StreamEvent};

/// One chat view backed by a relay and a history store
pub struct ChatClient<S: HistoryStorage> {
    session: ChatSession,
    store: SessionStore<S>,
    relay: RelayClient,
    streaming: bool,
}

impl<S: HistoryStorage> ChatClient<S> {
    /// Create a client with an empty session using `model`
    pub fn new(relay: RelayClient, store: SessionStore<S>, model: impl Into<String>) -> Self {
        Self {
            session: ChatSession::new(model),
            store,
            relay,
            streaming: true,
        }
    }

    /// Ask the relay for a single JSON reply instead of a stream
    ///
    /// The whole reply is rendered as one delta once it arrives.
    #[must_use]
    pub fn with_streaming(mut self, streaming: bool) -> Self {
        self.streaming = streaming;
        self
    }

    /// Current session state
    pub const fn session(&self) -> &ChatSession {
        &self.session
    }

    /// Mutable session state (model selection)
    pub fn session_mut(&mut self) -> &mut ChatSession {
        &mut self.session
    }

    /// History store
    pub const fn store(&self) -> &SessionStore<S> {
        &self.store
    }

    /// Run one turn: send `text`, render the streamed reply, persist on success
    ///
    /// `on_update` is called after every change to the session view. Relay
    /// and stream failures end the turn with an error slot and are reported
    /// as [`TurnOutcome::Failed`].
    ///
    /// # Errors
    ///
    /// Returns an error if `text` is blank, a turn is already in flight, or
    /// the finished conversation cannot be saved.
    pub async fn send<F>(&mut self, text: &str, mut on_update: F) -> AppResult<TurnOutcome>
    where
        F: FnMut(&ChatSession),
    {
        let messages = self.session.begin_turn(text)?;
        on_update(&self.session);

        let mut events = match self.open_reply(&messages).await {
            Ok(events) => events,
            Err(e) => {
                warn!("Chat turn failed before streaming: {}", e.message);
                self.session.fail_turn(&e.message);
                on_update(&self.session);
                return Ok(TurnOutcome::Failed(e.message));
            }
        };

        while let Some(event) = events.next().await {
            let outcome = self.session.apply_event(event);
            on_update(&self.session);

            if let Some(outcome) = outcome {
                if let TurnOutcome::Completed(conversation) = &outcome {
                    self.store.upsert(conversation.clone())?;
                }
                return Ok(outcome);
            }
        }

        Err(AppError::internal("Relay stream ended without a terminal event"))
    }

    async fn open_reply(&self, messages: &[ChatMessage]) -> AppResult<EventStream> {
        let model = self.session.model();
        if self.streaming {
            return self.relay.stream_chat(messages, model).await;
        }

        let text = self.relay.complete_chat(messages, model).await?;
        Ok(Box::pin(stream::iter([
            StreamEvent::Content(text),
            StreamEvent::Done,
        ])))
    }

    /// Start a new conversation on the next send
    pub fn new_chat(&mut self) {
        self.session.new_chat();
    }

    /// Open a stored conversation
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` for an unknown id, or an error if a turn is in flight.
    pub fn load_conversation(&mut self, id: &str) -> AppResult<()> {
        let conversation = self
            .store
            .get(id)?
            .ok_or_else(|| AppError::not_found(format!("Conversation {id}")))?;
        self.session.load_conversation(&conversation)
    }

    /// Delete a stored conversation; clears the view if it is the open one
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    pub fn delete_conversation(&mut self, id: &str) -> AppResult<bool> {
        let removed = self.store.remove(id)?;
        if self.session.conversation_id() == Some(id) {
            self.session.new_chat();
        }
        Ok(removed)
    }
}
