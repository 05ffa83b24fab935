// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
// ABOUTME: Output formatting helpers for chat-relay-cli
// ABOUTME: Streams assistant text to the terminal and prints history entries

use std::io::{self, Write};

use chat_relay::client::{ChatSession, MessageSlot};
use chat_relay_core::models::{Conversation, MessageRole};

/// Prints only the part of the assistant reply not yet written
#[derive(Debug, Default)]
pub struct StreamPrinter {
    printed: usize,
}

impl StreamPrinter {
    /// Reset for a new turn
    pub fn reset(&mut self) {
        self.printed = 0;
    }

    /// `ChatClient::send` update callback
    pub fn update(&mut self, session: &ChatSession) {
        match session.slots().last() {
            Some(MessageSlot::Assistant { text, .. }) => {
                if let Some(fresh) = text.get(self.printed..) {
                    print!("{fresh}");
                    // Deltas should appear as they arrive
                    let _ = io::stdout().flush();
                }
                self.printed = text.len();
            }
            Some(MessageSlot::Error { message }) => {
                if self.printed > 0 {
                    println!();
                }
                eprintln!("Error: {message}");
                self.printed = 0;
            }
            _ => {}
        }
    }
}

/// One line per stored conversation
pub fn display_conversation_list(conversations: &[Conversation]) {
    if conversations.is_empty() {
        println!("No saved conversations.");
        return;
    }

    println!("{:<15} {:<10} {:<16} TITLE", "ID", "DATE", "MODEL");
    println!("{}", "=".repeat(80));
    for conversation in conversations {
        println!(
            "{:<15} {:<10} {:<16} {}",
            conversation.id, conversation.date, conversation.model, conversation.title
        );
    }
}

/// Full transcript of a conversation
pub fn display_transcript(conversation: &Conversation, html: bool) {
    println!("{} ({}, {})", conversation.title, conversation.model, conversation.date);
    println!("{}", "=".repeat(80));

    for message in &conversation.messages {
        let speaker = match message.role {
            MessageRole::User => "You",
            MessageRole::Assistant => "Assistant",
        };
        let body = if html {
            chat_relay::client::format_message(&message.content)
        } else {
            message.content.clone()
        };
        println!("{speaker}:\n{body}\n");
    }
}
