//! LLM provider factory.
//!
//! This module creates LLM clients from provider names and maps playground
//! model identifiers to the provider that serves them, so one run can fan a
//! question out across models from different providers.

use crate::client::LlmClient;
use crate::providers::{OllamaClient, OpenAiClient};
use promptdeck_core::{AppError, AppResult};
use std::sync::Arc;

/// Resolve the provider that serves a given model identifier.
///
/// Hosted gpt-* models go to OpenAI; everything else is assumed to be
/// available through the local Ollama runtime.
pub fn resolve_provider(model: &str) -> &'static str {
    if model.to_lowercase().starts_with("gpt-") {
        "openai"
    } else {
        "ollama"
    }
}

/// Create an LLM client for the given provider.
///
/// # Arguments
/// * `provider` - Provider identifier ("ollama", "openai")
/// * `endpoint` - Optional custom endpoint URL
/// * `api_key` - Optional API key (for providers that require it)
///
/// # Errors
/// Returns a configuration error if the provider is unknown or a required
/// credential is missing.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
) -> AppResult<Arc<dyn LlmClient>> {
    match provider.to_lowercase().as_str() {
        "ollama" => {
            let base_url = endpoint.unwrap_or("http://localhost:11434");
            Ok(Arc::new(OllamaClient::with_base_url(base_url)))
        }
        "openai" => {
            let api_key = api_key.ok_or_else(|| {
                AppError::Config("OpenAI provider requires an API key (OPENAI_API_KEY)".to_string())
            })?;
            let client = match endpoint {
                Some(endpoint) => OpenAiClient::with_base_url(api_key, endpoint),
                None => OpenAiClient::new(api_key),
            };
            Ok(Arc::new(client))
        }
        other => Err(AppError::Config(format!("Unknown provider: {}", other))),
    }
}
