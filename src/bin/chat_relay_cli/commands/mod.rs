// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
// ABOUTME: Re-exports command modules for chat-relay-cli
// ABOUTME: Provides access to chat and history commands

pub mod chat;
pub mod history;
