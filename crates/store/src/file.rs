//! File-based custom-prompt backend.
//!
//! Custom prompts live in a single JSON document: top-level keys are prompt
//! names, values are `{"template": ..., "input_variables": [...]}`. The
//! whole document is read and rewritten on every add.

use crate::backend::CustomPromptBackend;
use crate::template::PromptTemplate;
use promptdeck_core::{AppError, AppResult};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// Custom-prompt backend storing all prompts in one JSON file.
///
/// The write lock serializes the read-modify-write sequence against other
/// adds in this process. It does not protect against external processes
/// editing the same file, and the rewrite is not atomic: a crash mid-write
/// can corrupt the document.
pub struct FileBackend {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileBackend {
    /// Create a backend over the given document path. The file does not
    /// need to exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Parse the document into a name → template map.
    ///
    /// An absent or malformed file yields an empty map: "no custom prompts
    /// yet" is normal first-run state, so read failures here are only
    /// logged.
    fn read_document(path: &Path) -> BTreeMap<String, PromptTemplate> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                tracing::debug!("No custom prompts file at {:?}: {}", path, e);
                return BTreeMap::new();
            }
        };

        match serde_json::from_str(&contents) {
            Ok(prompts) => prompts,
            Err(e) => {
                tracing::warn!("Ignoring malformed custom prompts file {:?}: {}", path, e);
                BTreeMap::new()
            }
        }
    }
}

#[async_trait::async_trait]
impl CustomPromptBackend for FileBackend {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn load_all(&self) -> AppResult<BTreeMap<String, PromptTemplate>> {
        Ok(Self::read_document(&self.path))
    }

    async fn add(&self, name: &str, template: &PromptTemplate) -> AppResult<()> {
        // The lock must cover the whole read-modify-write: the document is
        // rewritten wholesale, so a concurrent add could otherwise be lost.
        let _guard = self.write_lock.lock().await;

        let mut prompts = Self::read_document(&self.path);
        prompts.insert(name.to_string(), template.clone());

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    AppError::BackendWrite(format!(
                        "Failed to create directory {:?}: {}",
                        parent, e
                    ))
                })?;
            }
        }

        let serialized = serde_json::to_string_pretty(&prompts)
            .map_err(|e| AppError::BackendWrite(format!("Failed to serialize prompts: {}", e)))?;

        std::fs::write(&self.path, serialized).map_err(|e| {
            AppError::BackendWrite(format!(
                "Failed to write custom prompts file {:?}: {}",
                self.path, e
            ))
        })?;

        tracing::info!("Saved custom prompt '{}' to {:?}", name, self.path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn backend_in(dir: &TempDir) -> FileBackend {
        FileBackend::new(dir.path().join("custom_prompts.json"))
    }

    #[tokio::test]
    async fn test_load_all_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let backend = backend_in(&dir);

        let prompts = backend.load_all().await.unwrap();
        assert!(prompts.is_empty());
    }

    #[tokio::test]
    async fn test_load_all_malformed_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom_prompts.json");
        std::fs::write(&path, "{ not json").unwrap();

        let backend = FileBackend::new(&path);
        let prompts = backend.load_all().await.unwrap();
        assert!(prompts.is_empty());
    }

    #[tokio::test]
    async fn test_sequential_adds_accumulate() {
        let dir = TempDir::new().unwrap();
        let backend = backend_in(&dir);

        backend
            .add("a", &PromptTemplate::for_question("A: {{question}}"))
            .await
            .unwrap();
        backend
            .add("b", &PromptTemplate::for_question("B: {{question}}"))
            .await
            .unwrap();

        let prompts = backend.load_all().await.unwrap();
        assert_eq!(prompts.len(), 2);
        assert_eq!(prompts["a"].template, "A: {{question}}");
        assert_eq!(prompts["b"].template, "B: {{question}}");
    }

    #[tokio::test]
    async fn test_re_add_overwrites_only_that_entry() {
        let dir = TempDir::new().unwrap();
        let backend = backend_in(&dir);

        backend
            .add("a", &PromptTemplate::for_question("old"))
            .await
            .unwrap();
        backend
            .add("b", &PromptTemplate::for_question("keep"))
            .await
            .unwrap();
        backend
            .add("a", &PromptTemplate::for_question("new"))
            .await
            .unwrap();

        let prompts = backend.load_all().await.unwrap();
        assert_eq!(prompts.len(), 2);
        assert_eq!(prompts["a"].template, "new");
        assert_eq!(prompts["b"].template, "keep");
    }

    #[tokio::test]
    async fn test_add_creates_parent_directory() {
        let dir = TempDir::new().unwrap();
        let backend = FileBackend::new(dir.path().join("nested/state/custom.json"));

        backend
            .add("a", &PromptTemplate::for_question("{{question}}"))
            .await
            .unwrap();

        assert_eq!(backend.load_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_write_failure_surfaces_backend_write_error() {
        let dir = TempDir::new().unwrap();
        // The document path is an existing directory, so the write must fail
        let backend = FileBackend::new(dir.path());

        let result = backend
            .add("a", &PromptTemplate::for_question("{{question}}"))
            .await;
        assert!(matches!(result, Err(AppError::BackendWrite(_))));
    }

    #[tokio::test]
    async fn test_document_shape_on_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom_prompts.json");
        let backend = FileBackend::new(&path);

        backend
            .add("summarize", &PromptTemplate::for_question("Summarize: {{question}}"))
            .await
            .unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["summarize"]["template"], "Summarize: {{question}}");
        assert_eq!(raw["summarize"]["input_variables"][0], "question");
    }

    #[test]
    fn test_backend_name() {
        let backend = FileBackend::new("custom_prompts.json");
        assert_eq!(backend.name(), "file");
    }
}
