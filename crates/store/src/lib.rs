//! Prompt store for the promptdeck CLI.
//!
//! This crate owns the merged view of built-in ("system") prompt templates
//! and user-authored ("custom") templates. System prompts are read from a
//! bundled JSON file and never mutated at runtime; custom prompts are
//! delegated to a pluggable [`CustomPromptBackend`] with two
//! implementations:
//!
//! - [`FileBackend`] — a JSON document on local disk, rewritten wholesale on
//!   every add
//! - [`RemoteTableBackend`] — a hosted table-style service accessed over
//!   HTTP, one row per prompt, upsert semantics
//!
//! Every write goes to the backend first and then triggers a full reload of
//! the merged view, so the backend stays the single source of truth for
//! custom prompts across restarts.

pub mod backend;
pub mod file;
pub mod remote;
pub mod store;
pub mod template;

// Re-export main types
pub use backend::CustomPromptBackend;
pub use file::FileBackend;
pub use remote::RemoteTableBackend;
pub use store::PromptStore;
pub use template::{Origin, PromptEntry, PromptRow, PromptTemplate};
