// ABOUTME: Per-chat session state: message list, rendered slots and the in-flight turn
// ABOUTME: Accumulates streamed deltas and re-renders the whole assistant text on each one
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Conversation Renderer
//!
//! [`ChatSession`] is the state of one chat view. A turn moves through:
//!
//! ```text
//! begin_turn ──► [User, Composing] ──first delta──► [User, Assistant] ──► complete_turn
//!                      │                                  │
//!                      └──────────── fail_turn ───────────┴──► [User, Error]
//! ```
//!
//! Only one turn may be in flight. The assistant slot is re-rendered from
//! the full accumulated text on every delta, because markup such as a code
//! fence is only well-formed once its closing marker has arrived.

use chrono::{DateTime, Local};
use tracing::debug;

use super::format::format_message;
use crate::errors::{AppError, AppResult};
use chat_relay_core::models::{ChatMessage, Conversation, MessageRole, StreamEvent};

/// One rendered entry in the conversation view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageSlot {
    /// A user message
    User {
        /// Raw text
        text: String,
        /// Formatted HTML
        html: String,
    },
    /// Transient indicator shown until the first delta arrives
    Composing,
    /// An assistant message, possibly still streaming
    Assistant {
        /// Raw accumulated text
        text: String,
        /// Formatted HTML of `text`
        html: String,
    },
    /// Inline error shown in place of a failed assistant reply
    Error {
        /// Human-readable message
        message: String,
    },
}

impl MessageSlot {
    fn from_message(message: &ChatMessage) -> Self {
        let html = format_message(&message.content);
        match message.role {
            MessageRole::User => Self::User {
                text: message.content.clone(),
                html,
            },
            MessageRole::Assistant => Self::Assistant {
                text: message.content.clone(),
                html,
            },
        }
    }
}

/// How a turn ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The reply was appended; the conversation is ready to persist
    Completed(Conversation),
    /// The turn failed; the view shows an error slot
    Failed(String),
}

/// State of one chat view
#[derive(Debug, Clone)]
pub struct ChatSession {
    conversation_id: Option<String>,
    date: String,
    model: String,
    messages: Vec<ChatMessage>,
    slots: Vec<MessageSlot>,
    streaming: bool,
    buffer: String,
}

impl ChatSession {
    /// Start an empty session using `model`
    #[must_use]
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            conversation_id: None,
            date: String::new(),
            model: model.into(),
            messages: Vec::new(),
            slots: Vec::new(),
            streaming: false,
            buffer: String::new(),
        }
    }

    /// Current conversation id, `None` until the first send
    #[must_use]
    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation_id.as_deref()
    }

    /// Selected model key
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Select a different model for subsequent turns
    pub fn set_model(&mut self, model: impl Into<String>) {
        self.model = model.into();
    }

    /// Messages of the current conversation
    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Rendered view, in display order
    #[must_use]
    pub fn slots(&self) -> &[MessageSlot] {
        &self.slots
    }

    /// Whether a turn is in flight
    #[must_use]
    pub const fn is_streaming(&self) -> bool {
        self.streaming
    }

    /// Start a turn now; see [`Self::begin_turn_at`]
    ///
    /// # Errors
    ///
    /// Returns an error if `text` is blank or a turn is already in flight.
    pub fn begin_turn(&mut self, text: &str) -> AppResult<Vec<ChatMessage>> {
        self.begin_turn_at(text, Local::now())
    }

    /// Append the user message, show the composing indicator and return the
    /// message list to send
    ///
    /// The first turn of a conversation assigns its id (Unix milliseconds of
    /// `now`) and its display date.
    ///
    /// # Errors
    ///
    /// Returns an error if `text` is blank or a turn is already in flight.
    pub fn begin_turn_at(
        &mut self,
        text: &str,
        now: DateTime<Local>,
    ) -> AppResult<Vec<ChatMessage>> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::invalid_input("Message is empty"));
        }
        if self.streaming {
            return Err(AppError::invalid_input(
                "A reply is still streaming; wait for it to finish",
            ));
        }

        if self.conversation_id.is_none() {
            self.conversation_id = Some(now.timestamp_millis().to_string());
            self.messages.clear();
            self.slots.clear();
        }
        self.date = now.format("%d/%m/%Y").to_string();

        let message = ChatMessage::user(text);
        self.slots.push(MessageSlot::from_message(&message));
        self.messages.push(message);
        self.slots.push(MessageSlot::Composing);
        self.buffer.clear();
        self.streaming = true;

        Ok(self.messages.clone())
    }

    /// Feed one relay event; returns the outcome once the turn ends
    pub fn apply_event(&mut self, event: StreamEvent) -> Option<TurnOutcome> {
        match event {
            StreamEvent::Content(delta) => {
                self.apply_delta(&delta);
                None
            }
            StreamEvent::Done => self.complete_turn().map(TurnOutcome::Completed),
            StreamEvent::Error(message) => {
                if self.fail_turn(&message) {
                    Some(TurnOutcome::Failed(message))
                } else {
                    None
                }
            }
        }
    }

    /// Append a delta and re-render the assistant slot from the full text
    pub fn apply_delta(&mut self, delta: &str) {
        if !self.streaming {
            debug!("Ignoring delta outside of a turn");
            return;
        }

        self.buffer.push_str(delta);
        let slot = MessageSlot::Assistant {
            text: self.buffer.clone(),
            html: format_message(&self.buffer),
        };

        match self.slots.last_mut() {
            Some(last @ (MessageSlot::Composing | MessageSlot::Assistant { .. })) => *last = slot,
            _ => self.slots.push(slot),
        }
    }

    /// Finish the turn: append the assistant message and return the conversation to persist
    ///
    /// Returns `None` when no turn is in flight.
    pub fn complete_turn(&mut self) -> Option<Conversation> {
        if !self.streaming {
            return None;
        }
        self.streaming = false;

        let reply = std::mem::take(&mut self.buffer);
        let message = ChatMessage::assistant(reply);
        if matches!(self.slots.last(), Some(MessageSlot::Composing)) {
            self.slots.pop();
            self.slots.push(MessageSlot::from_message(&message));
        }
        self.messages.push(message);

        Some(self.snapshot())
    }

    /// End the turn with an inline error
    ///
    /// The composing indicator or partial reply is replaced by the error. The
    /// user message stays; no assistant message is appended. Returns `false`
    /// and leaves the view untouched when no turn is in flight.
    pub fn fail_turn(&mut self, message: &str) -> bool {
        if !self.streaming {
            debug!("Ignoring error outside of a turn");
            return false;
        }
        if matches!(
            self.slots.last(),
            Some(MessageSlot::Composing | MessageSlot::Assistant { .. })
        ) {
            self.slots.pop();
        }
        self.streaming = false;
        self.buffer.clear();
        self.slots.push(MessageSlot::Error {
            message: message.to_owned(),
        });
        true
    }

    /// Clear the view and start a new conversation on the next send
    pub fn new_chat(&mut self) {
        self.conversation_id = None;
        self.date.clear();
        self.messages.clear();
        self.slots.clear();
        self.streaming = false;
        self.buffer.clear();
    }

    /// Replace the view with a stored conversation
    ///
    /// # Errors
    ///
    /// Returns an error if a turn is in flight.
    pub fn load_conversation(&mut self, conversation: &Conversation) -> AppResult<()> {
        if self.streaming {
            return Err(AppError::invalid_input(
                "A reply is still streaming; wait for it to finish",
            ));
        }

        self.conversation_id = Some(conversation.id.clone());
        self.date.clone_from(&conversation.date);
        if !conversation.model.is_empty() {
            self.model.clone_from(&conversation.model);
        }
        self.messages.clone_from(&conversation.messages);
        self.slots = self.messages.iter().map(MessageSlot::from_message).collect();
        self.buffer.clear();
        Ok(())
    }

    /// The current conversation as a storable record
    #[must_use]
    pub fn snapshot(&self) -> Conversation {
        Conversation::new(
            self.conversation_id.clone().unwrap_or_default(),
            self.messages.clone(),
            self.model.clone(),
            self.date.clone(),
        )
    }
}
