//! LLM integration crate for the promptdeck CLI.
//!
//! This crate provides a provider-agnostic abstraction for the model
//! backends the playground fans questions out to. Providers implement a
//! unified trait-based interface and are selected per model id, so one run
//! can mix models from different providers.
//!
//! # Providers
//! - **Ollama**: Local LLM runtime
//! - **OpenAI**: Hosted chat completion API (gpt-* models)
//!
//! # Example
//! ```no_run
//! use promptdeck_llm::{LlmClient, LlmRequest, providers::OllamaClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OllamaClient::new();
//! let request = LlmRequest::new("Hello, world!", "llama3.2");
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;

// Re-export main types
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::{create_client, resolve_provider};
pub use providers::{OllamaClient, OpenAiClient};
