// ABOUTME: Relay wire event: content delta, completion marker or in-band error
// ABOUTME: Encodes and decodes the `data: <payload>` frames sent to the chat client
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Downstream event schema
//!
//! Each event is one SSE frame. Payloads are `{"content": "..."}`,
//! `{"error": "..."}` or the literal `[DONE]` terminal marker.

use serde::{Deserialize, Serialize};
use serde_json::json;

/// Literal payload of the terminal frame
pub const DONE_SENTINEL: &str = "[DONE]";

/// One event of the relayed stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// Incremental text delta
    Content(String),
    /// Successful end of the stream
    Done,
    /// Failure after streaming started; terminal
    Error(String),
}

#[derive(Deserialize, Serialize)]
#[serde(untagged)]
enum Payload {
    Content { content: String },
    Error { error: String },
}

impl StreamEvent {
    /// Whether this event ends the stream
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Error(_))
    }

    /// Frame payload (the part after `data: `)
    #[must_use]
    pub fn to_data(&self) -> String {
        match self {
            Self::Content(content) => json!({ "content": content }).to_string(),
            Self::Error(error) => json!({ "error": error }).to_string(),
            Self::Done => DONE_SENTINEL.to_owned(),
        }
    }

    /// Complete SSE frame including the blank-line terminator
    #[must_use]
    pub fn to_frame(&self) -> String {
        format!("data: {}\n\n", self.to_data())
    }

    /// Parse a frame payload; `None` for payloads that are not relay events
    #[must_use]
    pub fn from_data(data: &str) -> Option<Self> {
        let data = data.trim();
        if data == DONE_SENTINEL {
            return Some(Self::Done);
        }
        match serde_json::from_str::<Payload>(data).ok()? {
            Payload::Content { content } => Some(Self::Content(content)),
            Payload::Error { error } => Some(Self::Error(error)),
        }
    }
}
