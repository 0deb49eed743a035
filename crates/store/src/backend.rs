//! Custom-prompt backend trait.
//!
//! The store depends only on this capability set; the concrete persistence
//! mechanism (local JSON document or remote table) is selected by
//! configuration at construction time.

use crate::template::PromptTemplate;
use promptdeck_core::AppResult;
use std::collections::BTreeMap;

/// Persistence backend for custom prompts.
///
/// The backend is the single source of truth for custom prompts across
/// process restarts. Implementations must be shareable across the
/// concurrent operations the UI triggers.
#[async_trait::async_trait]
pub trait CustomPromptBackend: Send + Sync {
    /// Identifying tag for this backend ("file" or "remote"). Collaborators
    /// use it to decide whether to show backend-specific affordances.
    fn name(&self) -> &'static str;

    /// Load every custom prompt, keyed by name.
    async fn load_all(&self) -> AppResult<BTreeMap<String, PromptTemplate>>;

    /// Persist one prompt, overwriting any existing entry with that name.
    async fn add(&self, name: &str, template: &PromptTemplate) -> AppResult<()>;
}
