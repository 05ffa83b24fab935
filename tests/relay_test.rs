// ABOUTME: Tests for the upstream-to-downstream event relay
// ABOUTME: Feeds synthetic chunk streams and checks ordering, termination and the idle timeout
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use std::time::Duration;

use bytes::Bytes;
use chat_relay::errors::AppError;
use chat_relay::llm::sse_parser::create_sse_stream;
use chat_relay::llm::{ChatStream, StreamChunk};
use chat_relay::relay::{relay_events, RelayOptions};
use chat_relay_core::models::StreamEvent;
use futures_util::{stream, StreamExt};

fn options() -> RelayOptions {
    RelayOptions {
        idle_timeout: Duration::from_secs(5),
    }
}

fn upstream(items: Vec<Result<StreamChunk, AppError>>) -> ChatStream {
    Box::pin(stream::iter(items))
}

async fn collect(upstream: ChatStream, options: RelayOptions) -> Vec<StreamEvent> {
    relay_events(upstream, options).collect().await
}

#[tokio::test]
async fn test_deltas_relayed_in_order() {
    let events = collect(
        upstream(vec![
            Ok(StreamChunk::delta("a")),
            Ok(StreamChunk::delta("b")),
            Ok(StreamChunk::delta("c")),
            Ok(StreamChunk::done()),
        ]),
        options(),
    )
    .await;

    assert_eq!(
        events,
        vec![
            StreamEvent::Content("a".into()),
            StreamEvent::Content("b".into()),
            StreamEvent::Content("c".into()),
            StreamEvent::Done,
        ]
    );
}

#[tokio::test]
async fn test_empty_deltas_are_not_relayed() {
    let events = collect(
        upstream(vec![
            Ok(StreamChunk::delta("")),
            Ok(StreamChunk::delta("x")),
        ]),
        options(),
    )
    .await;

    assert_eq!(events, vec![StreamEvent::Content("x".into()), StreamEvent::Done]);
}

#[tokio::test]
async fn test_exhausted_upstream_counts_as_done() {
    let events = collect(upstream(Vec::new()), options()).await;
    assert_eq!(events, vec![StreamEvent::Done]);
}

#[tokio::test]
async fn test_error_is_terminal() {
    let events = collect(
        upstream(vec![
            Ok(StreamChunk::delta("Par")),
            Err(AppError::external_service("OpenRouter", "connection reset")),
            Ok(StreamChunk::delta("never")),
            Ok(StreamChunk::done()),
        ]),
        options(),
    )
    .await;

    assert_eq!(events.len(), 2);
    assert_eq!(events[0], StreamEvent::Content("Par".into()));
    let StreamEvent::Error(message) = &events[1] else {
        panic!("expected error event, got {events:?}");
    };
    assert!(message.contains("connection reset"));
}

#[tokio::test]
async fn test_idle_upstream_times_out() {
    let stalled: ChatStream =
        Box::pin(stream::iter(vec![Ok(StreamChunk::delta("Hel"))]).chain(stream::pending()));

    let events = tokio::time::timeout(
        Duration::from_secs(5),
        collect(
            stalled,
            RelayOptions {
                idle_timeout: Duration::from_millis(100),
            },
        ),
    )
    .await
    .expect("relay should give up on a silent upstream");

    assert_eq!(events.len(), 2);
    assert!(matches!(&events[1], StreamEvent::Error(m) if m.contains("no data")));
}

#[tokio::test]
async fn test_keep_alive_comments_hold_a_slow_upstream_open() {
    // Comments for twice the idle timeout, then the answer
    let bytes = async_stream::stream! {
        for _ in 0..6 {
            tokio::time::sleep(Duration::from_millis(100)).await;
            yield Ok::<_, std::io::Error>(Bytes::from_static(b": OPENROUTER PROCESSING\n\n"));
        }
        yield Ok(Bytes::from_static(b"data: Hi\n\ndata: [DONE]\n\n"));
    };
    let upstream = create_sse_stream(bytes, |data: &str| Some(Ok(StreamChunk::delta(data))), "test");

    let events = tokio::time::timeout(
        Duration::from_secs(5),
        collect(
            upstream,
            RelayOptions {
                idle_timeout: Duration::from_millis(300),
            },
        ),
    )
    .await
    .expect("relay should finish once the answer arrives");

    assert_eq!(events, vec![StreamEvent::Content("Hi".into()), StreamEvent::Done]);
}

#[tokio::test]
async fn test_heartbeats_restart_the_idle_timer() {
    let beats = stream::unfold(0_u32, |n| async move {
        if n == 5 {
            return None;
        }
        tokio::time::sleep(Duration::from_millis(80)).await;
        let chunk = if n == 4 {
            StreamChunk::delta("late")
        } else {
            StreamChunk::heartbeat()
        };
        Some((Ok::<_, AppError>(chunk), n + 1))
    });

    let events = collect(
        Box::pin(beats),
        RelayOptions {
            idle_timeout: Duration::from_millis(200),
        },
    )
    .await;

    assert_eq!(events, vec![StreamEvent::Content("late".into()), StreamEvent::Done]);
}

#[tokio::test]
async fn test_dropping_downstream_stops_reading_upstream() {
    let events = relay_events(
        Box::pin(stream::iter(vec![Ok(StreamChunk::delta("one"))]).chain(stream::pending())),
        options(),
    );
    let mut events = Box::pin(events);

    assert_eq!(events.next().await, Some(StreamEvent::Content("one".into())));
    drop(events);
}
