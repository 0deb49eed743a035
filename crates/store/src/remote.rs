//! Remote table-backed custom-prompt backend.
//!
//! Prompts live in a hosted Supabase-style table named `prompts` with two
//! columns: `name` (unique key) and `prompt` (a nested JSON object
//! `{"template", "input_variables"}`). Reads select all rows; writes are
//! upserts keyed by `name`.

use crate::backend::CustomPromptBackend;
use crate::template::PromptTemplate;
use promptdeck_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const TABLE: &str = "prompts";

// Upsert keyed by name: repeated adds overwrite, never duplicate
const UPSERT_PREFER: (&str, &str) = ("Prefer", "resolution=merge-duplicates");

/// One row of the remote prompts table.
#[derive(Debug, Serialize, Deserialize)]
struct PromptRecord {
    name: String,
    prompt: serde_json::Value,
}

/// Custom-prompt backend over a hosted table service.
///
/// Calls have no built-in timeout or retry; a caller needing responsiveness
/// must impose its own cancellation at the boundary.
pub struct RemoteTableBackend {
    endpoint: String,
    key: String,
    client: reqwest::Client,
}

impl RemoteTableBackend {
    /// Create a backend from explicit configuration, falling back to the
    /// `SUPABASE_URL` / `SUPABASE_KEY` environment variables.
    ///
    /// Fails fast with a configuration error if either value is missing;
    /// startup must stop rather than run with a half-configured backend.
    pub fn new(endpoint: Option<String>, key: Option<String>) -> AppResult<Self> {
        Self::with_env(endpoint, key, |name| std::env::var(name).ok())
    }

    /// Construction with an injectable environment lookup, so the fallback
    /// path is testable without touching the process environment.
    fn with_env(
        endpoint: Option<String>,
        key: Option<String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> AppResult<Self> {
        let endpoint = endpoint.or_else(|| env("SUPABASE_URL")).ok_or_else(|| {
            AppError::Config("Remote prompt backend requires SUPABASE_URL".to_string())
        })?;
        let key = key.or_else(|| env("SUPABASE_KEY")).ok_or_else(|| {
            AppError::Config("Remote prompt backend requires SUPABASE_KEY".to_string())
        })?;

        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            key,
            client: reqwest::Client::new(),
        })
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.endpoint, TABLE)
    }

    fn select_url(&self) -> String {
        format!("{}?select=*", self.table_url())
    }

    fn upsert_url(&self) -> String {
        format!("{}?on_conflict=name", self.table_url())
    }

    /// Convert fetched rows into the name → template map.
    ///
    /// A row whose nested prompt object is missing required fields is a
    /// malformed-record error surfaced to the caller, not silently skipped.
    /// A reachable service returning garbage is a bug worth seeing, unlike
    /// the file backend's absent-file case.
    fn parse_rows(rows: Vec<PromptRecord>) -> AppResult<BTreeMap<String, PromptTemplate>> {
        let mut prompts = BTreeMap::new();
        for row in rows {
            let template: PromptTemplate =
                serde_json::from_value(row.prompt).map_err(|e| {
                    AppError::MalformedRecord(format!(
                        "Row '{}' does not contain a valid prompt template: {}",
                        row.name, e
                    ))
                })?;
            prompts.insert(row.name, template);
        }
        Ok(prompts)
    }

    /// Upsert payload for one prompt, keyed by name. The same
    /// [`PromptRecord`] type that rows are read into defines the written
    /// row shape.
    fn upsert_body(name: &str, template: &PromptTemplate) -> AppResult<serde_json::Value> {
        let rows = vec![PromptRecord {
            name: name.to_string(),
            prompt: serde_json::to_value(template)?,
        }];
        Ok(serde_json::to_value(rows)?)
    }
}

#[async_trait::async_trait]
impl CustomPromptBackend for RemoteTableBackend {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn load_all(&self) -> AppResult<BTreeMap<String, PromptTemplate>> {
        tracing::debug!("Loading custom prompts from {}", self.table_url());

        let response = self
            .client
            .get(self.select_url())
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
            .send()
            .await
            .map_err(|e| AppError::BackendRead(format!("Failed to query prompts table: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::BackendRead(format!(
                "Prompts table read failed ({}): {}",
                status, error_text
            )));
        }

        let rows: Vec<PromptRecord> = response
            .json()
            .await
            .map_err(|e| AppError::BackendRead(format!("Failed to parse prompts rows: {}", e)))?;

        tracing::info!("Loaded {} custom prompts from remote table", rows.len());
        Self::parse_rows(rows)
    }

    async fn add(&self, name: &str, template: &PromptTemplate) -> AppResult<()> {
        let body = Self::upsert_body(name, template)?;

        let response = self
            .client
            .post(self.upsert_url())
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
            .header(UPSERT_PREFER.0, UPSERT_PREFER.1)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::BackendWrite(format!("Failed to upsert prompt: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::BackendWrite(format!(
                "Prompt upsert failed ({}): {}",
                status, error_text
            )));
        }

        tracing::info!("Upserted custom prompt '{}' to remote table", name);
        Ok(())
    }
}
