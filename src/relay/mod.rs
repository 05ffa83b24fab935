// ABOUTME: Converts an upstream chunk stream into the relay's downstream event stream
// ABOUTME: Enforces the idle timeout and guarantees exactly one terminal event per turn
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Stream Relay
//!
//! `relay_events` owns the upstream [`ChatStream`] for the duration of one
//! turn. Each non-empty delta becomes [`StreamEvent::Content`] in upstream
//! order. The stream then ends with exactly one terminal event:
//!
//! | Upstream | Terminal event |
//! |---|---|
//! | `[DONE]` marker | `Done` (upstream is not read further) |
//! | byte stream ends | `Done` |
//! | transport error / in-band error | `Error(message)` |
//! | no upstream bytes within `idle_timeout` | `Error(message)` |
//!
//! Dropping the returned stream drops the upstream stream with it, which
//! closes the upstream connection.

use std::time::Duration;

use futures_util::{Stream, StreamExt};
use tokio::time::timeout;

use crate::config::RelayConfig;
use crate::llm::ChatStream;
use crate::logging::RelayLogger;
use chat_relay_core::models::StreamEvent;

/// Per-turn relay settings
#[derive(Debug, Clone, Copy)]
pub struct RelayOptions {
    /// Maximum wait for the next upstream bytes (heartbeats included)
    pub idle_timeout: Duration,
}

impl From<&RelayConfig> for RelayOptions {
    fn from(config: &RelayConfig) -> Self {
        Self {
            idle_timeout: config.idle_timeout,
        }
    }
}

/// Turn bookkeeping; logs a disconnect if dropped before the terminal event
struct RelayGuard {
    frames: usize,
    bytes: usize,
    finished: bool,
}

impl RelayGuard {
    const fn new() -> Self {
        Self {
            frames: 0,
            bytes: 0,
            finished: false,
        }
    }

    fn record(&mut self, delta: &str) {
        self.frames += 1;
        self.bytes += delta.len();
    }

    fn finish(&mut self) {
        self.finished = true;
        RelayLogger::log_turn_finished(self.frames, self.bytes, "done");
    }

    fn fail(&mut self, message: &str) {
        self.finished = true;
        RelayLogger::log_mid_stream_failure(self.frames, message);
        RelayLogger::log_turn_finished(self.frames, self.bytes, "error");
    }
}

impl Drop for RelayGuard {
    fn drop(&mut self) {
        if !self.finished {
            RelayLogger::log_client_disconnected(self.frames);
        }
    }
}

/// Relay an upstream chunk stream as downstream events
///
/// Nothing is emitted after the terminal event.
pub fn relay_events(
    upstream: ChatStream,
    options: RelayOptions,
) -> impl Stream<Item = StreamEvent> + Send + 'static {
    async_stream::stream! {
        let mut upstream = upstream;
        let mut guard = RelayGuard::new();

        loop {
            match timeout(options.idle_timeout, upstream.next()).await {
                Err(_) => {
                    let message = format!(
                        "Upstream sent no data for {}s",
                        options.idle_timeout.as_secs_f32()
                    );
                    guard.fail(&message);
                    yield StreamEvent::Error(message);
                    return;
                }
                Ok(None) => {
                    guard.finish();
                    yield StreamEvent::Done;
                    return;
                }
                Ok(Some(Ok(chunk))) => {
                    // Heartbeats only restart the idle timer
                    if !chunk.delta.is_empty() {
                        guard.record(&chunk.delta);
                        yield StreamEvent::Content(chunk.delta);
                    }
                    if chunk.is_final {
                        guard.finish();
                        yield StreamEvent::Done;
                        return;
                    }
                }
                Ok(Some(Err(e))) => {
                    guard.fail(&e.message);
                    yield StreamEvent::Error(e.message);
                    return;
                }
            }
        }
    }
}
