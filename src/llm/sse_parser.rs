// ABOUTME: Shared SSE (Server-Sent Events) line-buffering parser for streamed completions
// ABOUTME: Handles partial lines across TCP boundaries and multiple events per chunk
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # SSE Stream Parser
//!
//! One line-buffering parser used on both sides of the relay: the upstream
//! provider's stream and the relay's own downstream stream read by the chat
//! client.
//!
//! 1. **Multiple events per TCP chunk**: every complete line in a chunk is
//!    emitted, not just the first.
//! 2. **Frames split across chunks**: bytes are held until a newline arrives,
//!    so neither a JSON payload nor a multi-byte UTF-8 character is cut.
//!
//! ```text
//! let stream = create_sse_stream(
//!     response.bytes_stream(),
//!     |json_str| { /* parse provider-specific JSON */ },
//!     "OpenRouter",
//! );
//! ```

use std::mem;

use bytes::Bytes;
use futures_util::{pin_mut, Stream, StreamExt};

use super::{ChatStream, StreamChunk};
use crate::errors::AppError;
use chat_relay_core::models::DONE_SENTINEL;

/// A parsed SSE event from the stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseEvent {
    /// A `data:` payload (prefix stripped)
    Data(String),
    /// The `[DONE]` termination signal
    Done,
}

/// Line-buffering SSE parser
///
/// SSE streams are newline-delimited. TCP does not guarantee alignment between
/// network chunks and SSE event boundaries, so incomplete lines are buffered
/// and events are emitted only once a full line (terminated by `\n`) exists.
#[derive(Debug, Default)]
pub struct SseLineBuffer {
    /// Bytes not yet terminated by a newline
    buffer: Vec<u8>,
}

impl SseLineBuffer {
    /// Create a new empty line buffer
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes from a chunk, returning any complete SSE events
    ///
    /// Any trailing partial line stays buffered for the next `feed()` call.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<SseEvent> {
        self.buffer.extend_from_slice(bytes);

        let mut events = Vec::new();
        let mut consumed = 0;

        while let Some(offset) = self.buffer[consumed..].iter().position(|&b| b == b'\n') {
            let line_end = consumed + offset;
            if let Some(event) = parse_line(&String::from_utf8_lossy(&self.buffer[consumed..line_end]))
            {
                events.push(event);
            }
            consumed = line_end + 1;
        }

        self.buffer.drain(..consumed);
        events
    }

    /// Flush any remaining buffered content as a final event
    ///
    /// Called when the byte stream ends. A partial line without a trailing
    /// newline is parsed like a complete one.
    pub fn flush(&mut self) -> Vec<SseEvent> {
        let remaining = mem::take(&mut self.buffer);
        parse_line(&String::from_utf8_lossy(&remaining))
            .into_iter()
            .collect()
    }

    /// Whether a partial line is waiting for more bytes
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.buffer.is_empty()
    }
}

/// Parse one SSE line; non-data fields (`event:`, `id:`, `retry:`, comments) yield `None`
fn parse_line(line: &str) -> Option<SseEvent> {
    let line = line.trim_end_matches('\r');
    let data = line.strip_prefix("data:")?;
    let data = data.strip_prefix(' ').unwrap_or(data);

    if data.trim() == DONE_SENTINEL {
        return Some(SseEvent::Done);
    }
    if data.trim().is_empty() {
        return None;
    }
    Some(SseEvent::Data(data.to_owned()))
}

/// Create a properly-buffered chunk stream from a raw byte stream
///
/// `parse_data` turns one `data:` payload into a [`StreamChunk`]; returning
/// `None` drops the frame (malformed JSON, metadata-only frames). `[DONE]`
/// becomes a final chunk and nothing after it is read. A transport error
/// ends the stream with one `Err`.
///
/// Empty non-final deltas are never yielded as content. A read that yields
/// nothing else (keep-alive comments, role-only frames, a partial line)
/// produces one [`StreamChunk::heartbeat`] instead.
pub fn create_sse_stream<S, E, F>(byte_stream: S, parse_data: F, provider_name: &'static str) -> ChatStream
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
    F: Fn(&str) -> Option<Result<StreamChunk, AppError>> + Send + 'static,
{
    let stream = async_stream::stream! {
        let mut parser = SseLineBuffer::new();
        pin_mut!(byte_stream);

        while let Some(next) = byte_stream.next().await {
            match next {
                Ok(bytes) => {
                    let mut yielded = false;
                    for event in parser.feed(&bytes) {
                        match event {
                            SseEvent::Data(json_str) => {
                                match parse_data(&json_str) {
                                    Some(Ok(chunk)) if chunk.is_heartbeat() => {}
                                    Some(item) => {
                                        yielded = true;
                                        yield item;
                                    }
                                    None => {}
                                }
                            }
                            SseEvent::Done => {
                                yield Ok(StreamChunk::done());
                                return;
                            }
                        }
                    }
                    if !yielded {
                        yield Ok(StreamChunk::heartbeat());
                    }
                }
                Err(e) => {
                    yield Err(AppError::external_service(
                        provider_name,
                        format!("Stream read error: {e}"),
                    ));
                    return;
                }
            }
        }

        // Byte stream ended: flush the remaining partial line
        for event in parser.flush() {
            match event {
                SseEvent::Data(json_str) => {
                    match parse_data(&json_str) {
                        Some(Ok(chunk)) if chunk.is_heartbeat() => {}
                        Some(item) => {
                            yield item;
                        }
                        None => {}
                    }
                }
                SseEvent::Done => {
                    yield Ok(StreamChunk::done());
                    return;
                }
            }
        }
    };

    Box::pin(stream)
}
