// ABOUTME: Fixed catalog mapping short model keys to upstream model identifiers
// ABOUTME: Unknown or missing keys resolve to the configured default model
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::Serialize;
use tracing::debug;

use crate::constants::models::{DEFAULT_MODEL_KEY, MODELS};

/// A catalog lookup result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedModel {
    /// Short key the UI uses
    pub key: &'static str,
    /// Provider model identifier
    pub id: &'static str,
}

/// Model catalog with a default fallback
#[derive(Debug, Clone)]
pub struct ModelCatalog {
    default: ResolvedModel,
}

impl Default for ModelCatalog {
    fn default() -> Self {
        Self::new(DEFAULT_MODEL_KEY)
    }
}

impl ModelCatalog {
    /// Create a catalog whose fallback is `default_key`
    ///
    /// A `default_key` that is not in the catalog falls back to the built-in default.
    #[must_use]
    pub fn new(default_key: &str) -> Self {
        let default = Self::lookup(default_key)
            .or_else(|| Self::lookup(DEFAULT_MODEL_KEY))
            .unwrap_or(ResolvedModel {
                key: MODELS[0].0,
                id: MODELS[0].1,
            });
        Self { default }
    }

    fn lookup(key: &str) -> Option<ResolvedModel> {
        MODELS
            .iter()
            .find(|(k, _)| *k == key)
            .map(|&(key, id)| ResolvedModel { key, id })
    }

    /// Resolve a requested key, falling back to the default for unknown keys
    #[must_use]
    pub fn resolve(&self, requested: Option<&str>) -> ResolvedModel {
        match requested.and_then(Self::lookup) {
            Some(model) => model,
            None => {
                debug!(requested = ?requested, fallback = self.default.key, "Using default model");
                self.default.clone()
            }
        }
    }

    /// The fallback model
    #[must_use]
    pub const fn default_model(&self) -> &ResolvedModel {
        &self.default
    }

    /// All models in display order
    pub fn models(&self) -> impl Iterator<Item = ResolvedModel> + '_ {
        MODELS.iter().map(|&(key, id)| ResolvedModel { key, id })
    }
}
