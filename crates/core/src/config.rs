//! Configuration management for the promptdeck CLI.
//!
//! Configuration is read from the process environment at startup and then
//! overridden by command-line flags. Mutable state (the custom prompts file
//! and the response cache) lives under `.promptdeck/` in the workspace.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{AppError, AppResult};

/// Which backend persists custom prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptBackendKind {
    /// JSON document on local disk
    File,
    /// Hosted table-style service accessed over HTTP
    Remote,
}

impl std::str::FromStr for PromptBackendKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "file" => Ok(PromptBackendKind::File),
            "remote" | "supabase" => Ok(PromptBackendKind::Remote),
            other => Err(AppError::Config(format!(
                "Unknown prompt backend: {}. Supported: file, remote",
                other
            ))),
        }
    }
}

impl std::fmt::Display for PromptBackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PromptBackendKind::File => write!(f, "file"),
            PromptBackendKind::Remote => write!(f, "remote"),
        }
    }
}

/// Main application configuration.
///
/// This struct holds all global configuration options that affect
/// CLI behavior across commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .promptdeck/)
    pub workspace: PathBuf,

    /// Path to the bundled system prompts file (read-only)
    pub system_prompts_file: PathBuf,

    /// Backend used to persist custom prompts
    pub prompt_backend: PromptBackendKind,

    /// Path to the custom prompts file (file backend only)
    pub custom_prompts_file: PathBuf,

    /// Remote backend endpoint (SUPABASE_URL)
    pub supabase_url: Option<String>,

    /// Remote backend access credential (SUPABASE_KEY)
    pub supabase_key: Option<String>,

    /// Base URL for the Ollama provider
    pub ollama_endpoint: String,

    /// API key for the OpenAI provider
    pub openai_api_key: Option<String>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        let workspace = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            system_prompts_file: workspace.join("prompts.json"),
            custom_prompts_file: workspace.join(".promptdeck/custom_prompts.json"),
            workspace,
            prompt_backend: PromptBackendKind::File,
            supabase_url: None,
            supabase_key: None,
            ollama_endpoint: "http://localhost:11434".to_string(),
            openai_api_key: None,
            log_level: None,
            verbose: false,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and defaults.
    ///
    /// Environment variables:
    /// - `PROMPTDECK_WORKSPACE`: Override workspace path
    /// - `PROMPTDECK_SYSTEM_PROMPTS`: Path to the system prompts file
    /// - `PROMPTDECK_PROMPT_BACKEND`: Custom-prompt backend ("file" or "remote")
    /// - `PROMPTDECK_CUSTOM_PROMPTS_FILE`: Path to the custom prompts file
    /// - `SUPABASE_URL` / `SUPABASE_KEY`: Remote backend endpoint and credential
    /// - `PROMPTDECK_OLLAMA_ENDPOINT`: Ollama base URL
    /// - `OPENAI_API_KEY`: OpenAI credential
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Ok(workspace) = std::env::var("PROMPTDECK_WORKSPACE") {
            config.workspace = PathBuf::from(workspace);
            config.system_prompts_file = config.workspace.join("prompts.json");
            config.custom_prompts_file = config.workspace.join(".promptdeck/custom_prompts.json");
        }

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        if let Ok(path) = std::env::var("PROMPTDECK_SYSTEM_PROMPTS") {
            config.system_prompts_file = PathBuf::from(path);
        }

        if let Ok(backend) = std::env::var("PROMPTDECK_PROMPT_BACKEND") {
            config.prompt_backend = backend.parse()?;
        }

        if let Ok(path) = std::env::var("PROMPTDECK_CUSTOM_PROMPTS_FILE") {
            config.custom_prompts_file = PathBuf::from(path);
        }

        config.supabase_url = std::env::var("SUPABASE_URL").ok();
        config.supabase_key = std::env::var("SUPABASE_KEY").ok();

        if let Ok(endpoint) = std::env::var("PROMPTDECK_OLLAMA_ENDPOINT") {
            config.ollama_endpoint = endpoint;
        }

        config.openai_api_key = std::env::var("OPENAI_API_KEY").ok();
        config.log_level = std::env::var("RUST_LOG").ok();

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Command-line flags take precedence over environment variables.
    pub fn with_overrides(
        mut self,
        workspace: Option<PathBuf>,
        backend: Option<PromptBackendKind>,
        custom_prompts_file: Option<PathBuf>,
        system_prompts_file: Option<PathBuf>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(workspace) = workspace {
            self.system_prompts_file = workspace.join("prompts.json");
            self.custom_prompts_file = workspace.join(".promptdeck/custom_prompts.json");
            self.workspace = workspace;
        }

        if let Some(backend) = backend {
            self.prompt_backend = backend;
        }

        if let Some(path) = custom_prompts_file {
            self.custom_prompts_file = path;
        }

        if let Some(path) = system_prompts_file {
            self.system_prompts_file = path;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .promptdeck state directory.
    pub fn state_dir(&self) -> PathBuf {
        self.workspace.join(".promptdeck")
    }

    /// Ensure the .promptdeck state directory exists.
    pub fn ensure_state_dir(&self) -> AppResult<()> {
        let state_dir = self.state_dir();
        if !state_dir.exists() {
            std::fs::create_dir_all(&state_dir).map_err(|e| {
                AppError::Config(format!("Failed to create .promptdeck directory: {}", e))
            })?;
        }
        Ok(())
    }

    /// Path of the persisted response cache.
    pub fn response_cache_file(&self) -> PathBuf {
        self.state_dir().join("answers.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.prompt_backend, PromptBackendKind::File);
        assert_eq!(config.ollama_endpoint, "http://localhost:11434");
        assert!(!config.verbose);
        assert!(!config.no_color);
    }

    #[test]
    fn test_backend_kind_parsing() {
        assert_eq!(
            "file".parse::<PromptBackendKind>().unwrap(),
            PromptBackendKind::File
        );
        assert_eq!(
            "remote".parse::<PromptBackendKind>().unwrap(),
            PromptBackendKind::Remote
        );
        // The original deployment name for the remote backend still works
        assert_eq!(
            "supabase".parse::<PromptBackendKind>().unwrap(),
            PromptBackendKind::Remote
        );
        assert!("redis".parse::<PromptBackendKind>().is_err());
    }

    #[test]
    fn test_state_dir() {
        let config = AppConfig::default();
        assert!(config.state_dir().ends_with(".promptdeck"));
        assert!(config.response_cache_file().ends_with(".promptdeck/answers.json"));
    }

    #[test]
    fn test_with_overrides() {
        let config = AppConfig::default();
        let overridden = config.with_overrides(
            None,
            Some(PromptBackendKind::Remote),
            Some(PathBuf::from("/tmp/custom.json")),
            None,
            None,
            true,
            false,
        );

        assert_eq!(overridden.prompt_backend, PromptBackendKind::Remote);
        assert_eq!(
            overridden.custom_prompts_file,
            PathBuf::from("/tmp/custom.json")
        );
        assert!(overridden.verbose);
        assert_eq!(overridden.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_workspace_override_moves_default_paths() {
        let config = AppConfig::default();
        let overridden = config.with_overrides(
            Some(PathBuf::from("/srv/deck")),
            None,
            None,
            None,
            None,
            false,
            false,
        );

        assert_eq!(overridden.workspace, PathBuf::from("/srv/deck"));
        assert_eq!(
            overridden.system_prompts_file,
            PathBuf::from("/srv/deck/prompts.json")
        );
        assert_eq!(
            overridden.custom_prompts_file,
            PathBuf::from("/srv/deck/.promptdeck/custom_prompts.json")
        );
    }
}
