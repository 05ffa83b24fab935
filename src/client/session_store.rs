// ABOUTME: Capacity-bounded conversation history kept as one JSON blob under a fixed key
// ABOUTME: Upsert-in-place, most-recent-first listing, with in-memory and file backends
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Session Store
//!
//! History is a most-recent-first list of [`Conversation`]s serialized as a
//! single JSON array. Every mutation reads the whole blob, edits it and
//! writes it back; the capacity keeps the blob small. There is no locking:
//! two writers sharing a backend follow last-writer-wins.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::constants::history;
use crate::errors::{AppError, AppResult};
use chat_relay_core::models::{ChatMessage, Conversation};

// ============================================================================
// Storage Backends
// ============================================================================

/// Key-value blob storage, the local-storage equivalent
pub trait HistoryStorage {
    /// Read the blob stored under `key`
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn read(&self, key: &str) -> AppResult<Option<String>>;

    /// Replace the blob stored under `key`
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn write(&mut self, key: &str, value: &str) -> AppResult<()>;
}

/// Process-local storage
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    /// Create empty storage
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl HistoryStorage for MemoryStorage {
    fn read(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> AppResult<()> {
        self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// One `<key>.json` file per key inside a directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Store files under `dir`; the directory is created on first write
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store files under the platform data directory
    ///
    /// # Errors
    ///
    /// Returns an error if the platform has no data directory.
    pub fn default_location() -> AppResult<Self> {
        let base = dirs::data_dir()
            .ok_or_else(|| AppError::config_missing("No data directory available for history"))?;
        Ok(Self::new(base.join(history::DATA_DIR_NAME)))
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl HistoryStorage for FileStorage {
    fn read(&self, key: &str) -> AppResult<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::storage(format!("Failed to read history: {e}"))),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> AppResult<()> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| AppError::storage(format!("Failed to create history directory: {e}")))?;

        // Write then rename so a crash never leaves a truncated blob
        let path = self.path_for(key);
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, value)
            .and_then(|()| fs::rename(&staging, &path))
            .map_err(|e| AppError::storage(format!("Failed to write history: {e}")))
    }
}

// ============================================================================
// Store
// ============================================================================

/// Capacity-bounded conversation history over a [`HistoryStorage`] backend
#[derive(Debug)]
pub struct SessionStore<S: HistoryStorage> {
    storage: S,
    key: String,
    capacity: usize,
}

impl<S: HistoryStorage> SessionStore<S> {
    /// Store under the default key with the default capacity
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            key: history::STORAGE_KEY.to_owned(),
            capacity: history::CAPACITY,
        }
    }

    /// Override the capacity (minimum 1)
    #[must_use]
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    fn read_all(&self) -> AppResult<Vec<Conversation>> {
        let Some(blob) = self.storage.read(&self.key)? else {
            return Ok(Vec::new());
        };

        Ok(serde_json::from_str(&blob).unwrap_or_else(|e| {
            warn!(key = %self.key, "History blob is unreadable, starting empty: {e}");
            Vec::new()
        }))
    }

    fn write_all(&mut self, conversations: &[Conversation]) -> AppResult<()> {
        let blob = serde_json::to_string(conversations)?;
        self.storage.write(&self.key, &blob)
    }

    /// Insert at the front, or replace in place when the id exists, then evict overflow
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    pub fn upsert(&mut self, conversation: Conversation) -> AppResult<()> {
        let mut conversations = self.read_all()?;

        if let Some(existing) = conversations.iter_mut().find(|c| c.id == conversation.id) {
            *existing = conversation;
        } else {
            conversations.insert(0, conversation);
        }

        let evicted = self.truncate(&mut conversations);
        if evicted > 0 {
            debug!(evicted, "Evicted oldest conversations");
        }

        self.write_all(&conversations)
    }

    fn truncate(&self, conversations: &mut Vec<Conversation>) -> usize {
        let overflow = conversations.len().saturating_sub(self.capacity);
        conversations.truncate(self.capacity);
        overflow
    }

    /// Drop the oldest entries beyond capacity; returns how many were removed
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    pub fn evict_overflow(&mut self) -> AppResult<usize> {
        let mut conversations = self.read_all()?;
        let evicted = self.truncate(&mut conversations);
        if evicted > 0 {
            self.write_all(&conversations)?;
        }
        Ok(evicted)
    }

    /// All conversations, most recent first
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    pub fn list(&self) -> AppResult<Vec<Conversation>> {
        self.read_all()
    }

    /// One conversation by id
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    pub fn get(&self, id: &str) -> AppResult<Option<Conversation>> {
        Ok(self.read_all()?.into_iter().find(|c| c.id == id))
    }

    /// The message list of a conversation
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` for an unknown id, or a backend error.
    pub fn load(&self, id: &str) -> AppResult<Vec<ChatMessage>> {
        self.get(id)?
            .map(|c| c.messages)
            .ok_or_else(|| AppError::not_found(format!("Conversation {id}")))
    }

    /// Remove a conversation; returns whether it existed
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    pub fn remove(&mut self, id: &str) -> AppResult<bool> {
        let mut conversations = self.read_all()?;
        let before = conversations.len();
        conversations.retain(|c| c.id != id);
        if conversations.len() == before {
            return Ok(false);
        }
        self.write_all(&conversations)?;
        Ok(true)
    }
}
