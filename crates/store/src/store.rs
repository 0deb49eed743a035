//! The merged prompt store.
//!
//! Owns the in-memory mapping of prompt name → entry, built from the
//! bundled system prompts file plus whatever the configured custom-prompt
//! backend returns. Custom entries override system entries on name
//! collision.

use crate::backend::CustomPromptBackend;
use crate::template::{Origin, PromptEntry, PromptRow, PromptTemplate};
use promptdeck_core::{AppError, AppResult};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use tokio::sync::Mutex;

/// Merged view over system and custom prompts.
///
/// Constructed once per process. `load` rebuilds the whole mapping and
/// swaps it in atomically; readers only ever observe a complete snapshot.
/// Two locks, never nested: `load_lock` serializes `load`/`add` against
/// each other, and the `RwLock` guards the snapshot swap against readers.
pub struct PromptStore {
    system_prompts_file: PathBuf,
    backend: Arc<dyn CustomPromptBackend>,
    prompts: RwLock<BTreeMap<String, PromptEntry>>,
    load_lock: Mutex<()>,
}

impl PromptStore {
    /// Construct the store and perform the initial load.
    ///
    /// A missing or unreadable system prompts file is a fatal configuration
    /// error: the application cannot run without its built-in prompts.
    pub async fn open(
        system_prompts_file: impl Into<PathBuf>,
        backend: Arc<dyn CustomPromptBackend>,
    ) -> AppResult<Self> {
        let store = Self {
            system_prompts_file: system_prompts_file.into(),
            backend,
            prompts: RwLock::new(BTreeMap::new()),
            load_lock: Mutex::new(()),
        };
        store.load().await?;
        Ok(store)
    }

    /// Rebuild the merged mapping from the system file and the backend.
    ///
    /// If the backend read fails, the failure is logged and the previous
    /// mapping is left untouched: custom prompts that were already loaded
    /// keep being served through a backend outage. Only a system-file
    /// failure is returned as an error.
    pub async fn load(&self) -> AppResult<()> {
        let _guard = self.load_lock.lock().await;

        let system = self.read_system_prompts()?;
        let mut merged: BTreeMap<String, PromptEntry> = system
            .into_iter()
            .map(|(name, template)| {
                (
                    name,
                    PromptEntry {
                        origin: Origin::System,
                        template,
                    },
                )
            })
            .collect();

        let custom = match self.backend.load_all().await {
            Ok(custom) => custom,
            Err(e) => {
                // Stay available: abandon the refresh before the
                // system-only mapping can overwrite a richer previous state
                tracing::warn!(
                    "Failed to load custom prompts from {} backend, keeping previous prompts: {}",
                    self.backend.name(),
                    e
                );
                return Ok(());
            }
        };

        for (name, template) in custom {
            merged.insert(
                name,
                PromptEntry {
                    origin: Origin::Custom,
                    template,
                },
            );
        }

        tracing::debug!("Loaded {} prompts into store", merged.len());

        let mut prompts = self.prompts.write().unwrap_or_else(|e| e.into_inner());
        *prompts = merged;
        Ok(())
    }

    fn read_system_prompts(&self) -> AppResult<BTreeMap<String, PromptTemplate>> {
        let contents = std::fs::read_to_string(&self.system_prompts_file).map_err(|e| {
            AppError::Config(format!(
                "Failed to read system prompts file {:?}: {}",
                self.system_prompts_file, e
            ))
        })?;

        serde_json::from_str(&contents).map_err(|e| {
            AppError::Config(format!(
                "Failed to parse system prompts file {:?}: {}",
                self.system_prompts_file, e
            ))
        })
    }

    /// Look up a prompt template by name. A missing name is an expected
    /// condition (stale UI selection), never an error.
    pub fn get(&self, name: &str) -> Option<PromptTemplate> {
        let prompts = self.prompts.read().unwrap_or_else(|e| e.into_inner());
        prompts.get(name).map(|entry| entry.template.clone())
    }

    /// All known prompt names, sorted case-insensitively. Byte order breaks
    /// ties so the listing is deterministic.
    pub fn list_names(&self) -> Vec<String> {
        let prompts = self.prompts.read().unwrap_or_else(|e| e.into_inner());
        let mut names: Vec<String> = prompts.keys().cloned().collect();
        names.sort_by(|a, b| {
            a.to_lowercase()
                .cmp(&b.to_lowercase())
                .then_with(|| a.cmp(b))
        });
        names
    }

    /// Tabular snapshot of every entry, in mapping (name) order, for
    /// display and export.
    pub fn data(&self) -> Vec<PromptRow> {
        let prompts = self.prompts.read().unwrap_or_else(|e| e.into_inner());
        prompts
            .iter()
            .map(|(name, entry)| PromptRow {
                name: name.clone(),
                origin: entry.origin,
                template: entry.template.template.clone(),
                input_variables: entry.template.input_variables.clone(),
            })
            .collect()
    }

    /// Persist a custom prompt and refresh the merged view.
    ///
    /// The template always declares the single `question` variable. The
    /// write goes to the backend first; a backend write error propagates to
    /// the caller untouched. On success the whole mapping is reloaded —
    /// the backend stays the single source of truth, at the cost of one
    /// extra round trip per (rare, user-initiated) write.
    pub async fn add(&self, name: &str, template_text: &str) -> AppResult<()> {
        let template = PromptTemplate::for_question(template_text);
        self.backend.add(name, &template).await?;
        self.load().await
    }

    /// Identifying tag of the configured backend.
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;
    use tempfile::TempDir;

    /// In-memory backend with a switchable failure mode.
    struct MockBackend {
        prompts: StdMutex<BTreeMap<String, PromptTemplate>>,
        fail_loads: StdMutex<bool>,
        fail_adds: StdMutex<bool>,
    }

    impl MockBackend {
        fn new() -> Self {
            Self {
                prompts: StdMutex::new(BTreeMap::new()),
                fail_loads: StdMutex::new(false),
                fail_adds: StdMutex::new(false),
            }
        }

        fn set_fail_loads(&self, fail: bool) {
            *self.fail_loads.lock().unwrap() = fail;
        }

        fn set_fail_adds(&self, fail: bool) {
            *self.fail_adds.lock().unwrap() = fail;
        }
    }

    #[async_trait::async_trait]
    impl CustomPromptBackend for MockBackend {
        fn name(&self) -> &'static str {
            "mock"
        }

        async fn load_all(&self) -> AppResult<BTreeMap<String, PromptTemplate>> {
            if *self.fail_loads.lock().unwrap() {
                return Err(AppError::BackendRead("mock outage".to_string()));
            }
            Ok(self.prompts.lock().unwrap().clone())
        }

        async fn add(&self, name: &str, template: &PromptTemplate) -> AppResult<()> {
            if *self.fail_adds.lock().unwrap() {
                return Err(AppError::BackendWrite("mock disk full".to_string()));
            }
            self.prompts
                .lock()
                .unwrap()
                .insert(name.to_string(), template.clone());
            Ok(())
        }
    }

    fn write_system_prompts(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("prompts.json");
        let document = serde_json::json!({
            "default": {
                "template": "Answer: {{question}}",
                "input_variables": ["question"],
            },
            "Translate": {
                "template": "Translate to French: {{question}}",
                "input_variables": ["question"],
            },
            "explain_code": {
                "template": "Explain this code: {{question}}",
                "input_variables": ["question"],
            },
        });
        std::fs::write(&path, serde_json::to_string_pretty(&document).unwrap()).unwrap();
        path
    }

    async fn open_store(dir: &TempDir) -> (PromptStore, Arc<MockBackend>) {
        let backend = Arc::new(MockBackend::new());
        let store = PromptStore::open(write_system_prompts(dir), backend.clone())
            .await
            .unwrap();
        (store, backend)
    }

    #[tokio::test]
    async fn test_open_fails_without_system_prompts_file() {
        let dir = TempDir::new().unwrap();
        let backend = Arc::new(MockBackend::new());
        let result = PromptStore::open(dir.path().join("missing.json"), backend).await;
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[tokio::test]
    async fn test_add_then_get_round_trips() {
        let dir = TempDir::new().unwrap();
        let (store, _) = open_store(&dir).await;

        store.add("mine", "Be terse: {{question}}").await.unwrap();

        let template = store.get("mine").expect("added prompt must resolve");
        assert_eq!(template.template, "Be terse: {{question}}");
        assert_eq!(template.input_variables, vec!["question".to_string()]);
    }

    #[tokio::test]
    async fn test_get_unknown_name_is_none() {
        let dir = TempDir::new().unwrap();
        let (store, _) = open_store(&dir).await;
        assert!(store.get("nope").is_none());
    }

    #[tokio::test]
    async fn test_custom_overrides_system_on_collision() {
        let dir = TempDir::new().unwrap();
        let (store, _) = open_store(&dir).await;

        assert_eq!(store.get("default").unwrap().template, "Answer: {{question}}");

        store.add("default", "Custom: {{question}}").await.unwrap();

        assert_eq!(store.get("default").unwrap().template, "Custom: {{question}}");
        let row = store
            .data()
            .into_iter()
            .find(|row| row.name == "default")
            .unwrap();
        assert_eq!(row.origin, Origin::Custom);
    }

    #[tokio::test]
    async fn test_list_names_sorted_case_insensitively_no_duplicates() {
        let dir = TempDir::new().unwrap();
        let (store, _) = open_store(&dir).await;

        store.add("another", "{{question}}").await.unwrap();
        // Collides with the system prompt; must not produce a duplicate
        store.add("Translate", "{{question}}").await.unwrap();

        let names = store.list_names();
        assert_eq!(
            names,
            vec!["another", "default", "explain_code", "Translate"]
        );
    }

    #[tokio::test]
    async fn test_backend_outage_preserves_previous_mapping() {
        let dir = TempDir::new().unwrap();
        let (store, backend) = open_store(&dir).await;

        store.add("survivor", "{{question}}").await.unwrap();
        assert!(store.get("survivor").is_some());

        backend.set_fail_loads(true);
        // The refresh is abandoned, not an error
        store.load().await.unwrap();

        assert!(store.get("survivor").is_some());
        assert!(store.list_names().contains(&"survivor".to_string()));
    }

    #[tokio::test]
    async fn test_backend_write_error_propagates_and_leaves_store_unchanged() {
        let dir = TempDir::new().unwrap();
        let (store, backend) = open_store(&dir).await;

        backend.set_fail_adds(true);
        let result = store.add("mine", "{{question}}").await;

        assert!(matches!(result, Err(AppError::BackendWrite(_))));
        assert!(store.get("mine").is_none());
    }

    #[tokio::test]
    async fn test_data_has_one_row_per_entry_with_origins() {
        let dir = TempDir::new().unwrap();
        let (store, _) = open_store(&dir).await;

        store.add("mine", "M: {{question}}").await.unwrap();

        let rows = store.data();
        assert_eq!(rows.len(), 4);
        // Mapping order is name order
        let names: Vec<&str> = rows.iter().map(|row| row.name.as_str()).collect();
        assert_eq!(names, vec!["Translate", "default", "explain_code", "mine"]);

        for row in &rows {
            let expected = if row.name == "mine" {
                Origin::Custom
            } else {
                Origin::System
            };
            assert_eq!(row.origin, expected);
            assert_eq!(row.input_variables, vec!["question".to_string()]);
        }
    }

    #[tokio::test]
    async fn test_add_refreshes_from_backend() {
        let dir = TempDir::new().unwrap();
        let (store, backend) = open_store(&dir).await;

        // A prompt written to the backend out of band appears after the
        // reload that add triggers
        backend
            .prompts
            .lock()
            .unwrap()
            .insert("side_loaded".to_string(), PromptTemplate::for_question("S"));

        assert!(store.get("side_loaded").is_none());
        store.add("mine", "{{question}}").await.unwrap();
        assert!(store.get("side_loaded").is_some());
    }

    #[tokio::test]
    async fn test_backend_name_is_exposed() {
        let dir = TempDir::new().unwrap();
        let (store, _) = open_store(&dir).await;
        assert_eq!(store.backend_name(), "mock");
    }
}
