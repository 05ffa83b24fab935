// ABOUTME: Data model module: messages, conversations and relay wire events
// ABOUTME: Re-exports the types used by both the relay server and the chat client
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

mod conversation;
mod message;
mod stream_event;

pub use conversation::{derive_title, Conversation, TITLE_MAX_CHARS};
pub use message::{ChatMessage, MessageRole};
pub use stream_event::{StreamEvent, DONE_SENTINEL};
