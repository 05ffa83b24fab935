// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
// ABOUTME: Re-exports helper modules for chat-relay-cli
// ABOUTME: Provides terminal display utilities

pub mod display;
