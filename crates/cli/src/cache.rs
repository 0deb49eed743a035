//! Disk-persisted response cache.
//!
//! Memoizes (question, model, temperature, prompt name) → answer so that
//! re-running the same comparison does not re-bill every model call. The
//! cache is a JSON document under `.promptdeck/` that survives process
//! restarts and is cleared explicitly by the user.

use promptdeck_core::AppResult;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

// Unlikely to appear in question text, unlike most printable separators
const KEY_SEP: char = '\u{1f}';

/// Persistent answer cache keyed by the full request coordinates.
pub struct ResponseCache {
    path: PathBuf,
    entries: HashMap<String, String>,
}

impl ResponseCache {
    /// Load the cache from disk. An absent or corrupt document yields an
    /// empty cache; the cache is an optimization, never a failure source.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!("Ignoring corrupt response cache {:?}: {}", path, e);
                    HashMap::new()
                }
            },
            Err(_) => HashMap::new(),
        };

        Self { path, entries }
    }

    fn key(question: &str, model: &str, temperature: Option<f32>, prompt_name: &str) -> String {
        let temperature = temperature
            .map(|t| format!("{:.2}", t))
            .unwrap_or_else(|| "default".to_string());
        format!(
            "{}{sep}{}{sep}{}{sep}{}",
            model,
            prompt_name,
            temperature,
            question,
            sep = KEY_SEP
        )
    }

    /// Look up a previously recorded answer.
    pub fn get(
        &self,
        question: &str,
        model: &str,
        temperature: Option<f32>,
        prompt_name: &str,
    ) -> Option<&str> {
        self.entries
            .get(&Self::key(question, model, temperature, prompt_name))
            .map(String::as_str)
    }

    /// Record an answer and persist the cache. A save failure is logged
    /// and otherwise ignored: losing a cache entry must never fail the run
    /// that produced the answer.
    pub fn put(
        &mut self,
        question: &str,
        model: &str,
        temperature: Option<f32>,
        prompt_name: &str,
        answer: &str,
    ) {
        self.entries.insert(
            Self::key(question, model, temperature, prompt_name),
            answer.to_string(),
        );

        if let Err(e) = self.save() {
            tracing::warn!("Failed to persist response cache {:?}: {}", self.path, e);
        }
    }

    fn save(&self) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let serialized = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(&self.path, serialized)?;
        Ok(())
    }

    /// Number of cached answers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no answers.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Delete the persisted cache document.
    pub fn clear(path: &Path) -> AppResult<usize> {
        let cache = Self::load(path);
        let count = cache.len();

        if path.exists() {
            std::fs::remove_file(path)?;
        }

        Ok(count)
    }
}
