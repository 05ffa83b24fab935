// ABOUTME: Tests for the SSE byte-stream parser feeding the relay
// ABOUTME: Drives create_sse_stream with chunked byte streams and transport failures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use bytes::Bytes;
use chat_relay::errors::AppError;
use chat_relay::llm::sse_parser::create_sse_stream;
use chat_relay::llm::StreamChunk;
use futures_util::{stream, StreamExt};

fn parse_text(data: &str) -> Option<Result<StreamChunk, AppError>> {
    Some(Ok(StreamChunk::delta(data)))
}

fn bytes_stream(
    chunks: &[&'static str],
) -> impl futures_util::Stream<Item = Result<Bytes, std::io::Error>> + Send + 'static {
    stream::iter(
        chunks
            .iter()
            .map(|chunk| Ok(Bytes::from_static(chunk.as_bytes())))
            .collect::<Vec<_>>(),
    )
}

async fn deltas(chunks: &[&'static str]) -> Vec<Result<StreamChunk, AppError>> {
    create_sse_stream(bytes_stream(chunks), parse_text, "test")
        .filter(|item| futures_util::future::ready(!matches!(item, Ok(c) if c.is_heartbeat())))
        .collect()
        .await
}

#[tokio::test]
async fn test_lines_split_across_chunks() {
    let items = deltas(&["data: Hel", "lo\n\ndata: wor", "ld\n\n", "data: [DONE]\n\n"]).await;

    let chunks: Vec<_> = items.into_iter().map(Result::unwrap).collect();
    assert_eq!(chunks.len(), 3);
    assert_eq!(chunks[0].delta, "Hello");
    assert_eq!(chunks[1].delta, "world");
    assert!(chunks[2].is_final);
}

#[tokio::test]
async fn test_stream_stops_at_done() {
    let items = deltas(&["data: a\n\ndata: [DONE]\n\ndata: b\n\n"]).await;

    assert_eq!(items.len(), 2);
    assert!(items[1].as_ref().unwrap().is_final);
}

#[tokio::test]
async fn test_trailing_line_without_newline_is_flushed() {
    let items = deltas(&["data: first\n", "data: tail"]).await;

    let deltas: Vec<_> = items.into_iter().map(|i| i.unwrap().delta).collect();
    assert_eq!(deltas, ["first", "tail"]);
}

#[tokio::test]
async fn test_parser_can_drop_frames() {
    let items: Vec<_> = create_sse_stream(
        bytes_stream(&["data: keep\n\ndata: skip\n\ndata: keep2\n\n"]),
        |data: &str| (data != "skip").then(|| Ok(StreamChunk::delta(data))),
        "test",
    )
    .collect()
    .await;

    let deltas: Vec<_> = items.into_iter().map(|i| i.unwrap().delta).collect();
    assert_eq!(deltas, ["keep", "keep2"]);
}

#[tokio::test]
async fn test_transport_error_ends_stream_with_error() {
    let failing = stream::iter(vec![
        Ok(Bytes::from_static(b"data: partial\n\n")),
        Err(std::io::Error::other("connection reset")),
        Ok(Bytes::from_static(b"data: never\n\n")),
    ]);

    let items: Vec<_> = create_sse_stream(failing, parse_text, "test").collect().await;

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].as_ref().unwrap().delta, "partial");
    let err = items[1].as_ref().unwrap_err();
    assert!(err.message.contains("connection reset"));
}

#[tokio::test]
async fn test_reads_without_content_yield_heartbeats() {
    let items: Vec<_> = create_sse_stream(
        bytes_stream(&[": OPENROUTER PROCESSING\n\n", "data: \n\n", "data: par", "tial\n\n"]),
        parse_text,
        "test",
    )
    .collect()
    .await;

    let chunks: Vec<_> = items.into_iter().map(Result::unwrap).collect();
    assert_eq!(
        chunks,
        vec![
            StreamChunk::heartbeat(),
            StreamChunk::heartbeat(),
            StreamChunk::heartbeat(),
            StreamChunk::delta("partial"),
        ]
    );
}

#[tokio::test]
async fn test_reads_with_content_carry_no_heartbeat() {
    let items: Vec<_> = create_sse_stream(
        bytes_stream(&["data: \n\ndata: x\n\n", "data: y\n\ndata: [DONE]\n\n"]),
        |data: &str| Some(Ok(StreamChunk::delta(data.trim()))),
        "test",
    )
    .collect()
    .await;

    let chunks: Vec<_> = items.into_iter().map(Result::unwrap).collect();
    assert_eq!(
        chunks,
        vec![StreamChunk::delta("x"), StreamChunk::delta("y"), StreamChunk::done()]
    );
}
