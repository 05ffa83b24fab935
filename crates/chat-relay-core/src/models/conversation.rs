// ABOUTME: Conversation record persisted in client-side history
// ABOUTME: Holds the ordered message list plus title, model key and display date
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};

use super::message::{ChatMessage, MessageRole};

/// Maximum number of characters kept from the first user message as the title
pub const TITLE_MAX_CHARS: usize = 50;

/// Suffix appended to truncated titles
const TITLE_ELLIPSIS: &str = "...";

/// A persisted conversation
///
/// `id` is the creation timestamp in Unix milliseconds. It is unique within a
/// history blob; re-saving the same id replaces the stored entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    /// Opaque identifier (creation timestamp)
    pub id: String,
    /// Title derived from the first user message
    pub title: String,
    /// Messages in conversation order
    pub messages: Vec<ChatMessage>,
    /// Model key selected for the conversation
    #[serde(default)]
    pub model: String,
    /// Display date of the last save
    #[serde(default)]
    pub date: String,
}

impl Conversation {
    /// Build a conversation record, deriving the title from `messages`
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        messages: Vec<ChatMessage>,
        model: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: derive_title(&messages),
            messages,
            model: model.into(),
            date: date.into(),
        }
    }
}

/// Title for a message list: the first user message, cut at [`TITLE_MAX_CHARS`]
#[must_use]
pub fn derive_title(messages: &[ChatMessage]) -> String {
    let Some(first) = messages.iter().find(|m| m.role == MessageRole::User) else {
        return String::new();
    };

    if first.content.chars().count() > TITLE_MAX_CHARS {
        let mut title: String = first.content.chars().take(TITLE_MAX_CHARS).collect();
        title.push_str(TITLE_ELLIPSIS);
        title
    } else {
        first.content.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_title_is_kept() {
        let messages = vec![ChatMessage::user("Hi"), ChatMessage::assistant("Hello")];
        assert_eq!(derive_title(&messages), "Hi");
    }

    #[test]
    fn test_long_title_is_truncated_on_char_boundary() {
        let text = "ñ".repeat(60);
        let title = derive_title(&[ChatMessage::user(text)]);
        assert_eq!(title.chars().count(), TITLE_MAX_CHARS + 3);
        assert!(title.ends_with("..."));
    }

    #[test]
    fn test_missing_model_and_date_deserialize() {
        let conv: Conversation =
            serde_json::from_str(r#"{"id":"1","title":"t","messages":[]}"#).unwrap();
        assert!(conv.model.is_empty());
        assert!(conv.date.is_empty());
    }
}
