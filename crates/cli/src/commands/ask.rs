//! Ask command handler.
//!
//! Fans one question out across every selected (model, prompt) combination
//! and prints the answers side by side. Individual cell failures (stale
//! prompt name, provider error) stay in the grid; they never abort the
//! other combinations.

use crate::cache::ResponseCache;
use clap::Args;
use promptdeck_core::{config::AppConfig, AppError, AppResult};
use promptdeck_llm::{create_client, resolve_provider, LlmClient, LlmRequest};
use promptdeck_store::PromptStore;
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Ask a question across model and prompt combinations
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: Option<String>,

    /// Read the question from a file
    #[arg(short, long, conflicts_with = "question")]
    pub file: Option<PathBuf>,

    /// Prompt template name (repeatable)
    #[arg(short, long = "prompt", default_values_t = vec!["default".to_string()])]
    pub prompts: Vec<String>,

    /// Model identifier (repeatable)
    #[arg(short, long = "model", default_values_t = vec!["llama3.2".to_string()])]
    pub models: Vec<String>,

    /// Temperature for response generation (0.0-2.0)
    #[arg(short, long)]
    pub temperature: Option<f32>,

    /// Maximum tokens in each response
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// Include the rendered prompt in the report
    #[arg(long)]
    pub show_prompt: bool,

    /// Bypass the persisted response cache
    #[arg(long)]
    pub no_cache: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// One cell of the comparison grid.
#[derive(Debug, Serialize)]
struct AnswerCell {
    model: String,
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    rendered_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    cached: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig, store: &PromptStore) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask command options: {:?}", self);

        let question = self
            .get_question()
            .ok_or_else(|| AppError::Config("No question provided".to_string()))?;

        let mut cache = if self.no_cache {
            None
        } else {
            Some(ResponseCache::load(config.response_cache_file()))
        };

        let mut cells = Vec::new();

        for model in &self.models {
            let client = self.client_for(config, model);

            for prompt_name in &self.prompts {
                let cell = self
                    .run_cell(
                        store,
                        &question,
                        model,
                        prompt_name,
                        client.as_ref(),
                        cache.as_mut(),
                    )
                    .await;
                cells.push(cell);
            }
        }

        if self.json {
            let json = serde_json::to_string_pretty(&cells)
                .map_err(|e| AppError::Serialization(e.to_string()))?;
            println!("{}", json);
        } else {
            self.print_report(&question, &cells);
        }

        Ok(())
    }

    /// Create the client serving a model, keeping the failure for the grid.
    fn client_for(
        &self,
        config: &AppConfig,
        model: &str,
    ) -> Result<Arc<dyn LlmClient>, String> {
        let provider = resolve_provider(model);
        let endpoint = match provider {
            "ollama" => Some(config.ollama_endpoint.as_str()),
            _ => None,
        };

        create_client(provider, endpoint, config.openai_api_key.as_deref())
            .map_err(|e| e.to_string())
    }

    /// Produce one grid cell for a (model, prompt) pair.
    async fn run_cell(
        &self,
        store: &PromptStore,
        question: &str,
        model: &str,
        prompt_name: &str,
        client: Result<&Arc<dyn LlmClient>, &String>,
        cache: Option<&mut ResponseCache>,
    ) -> AnswerCell {
        let mut cell = AnswerCell {
            model: model.to_string(),
            prompt: prompt_name.to_string(),
            rendered_prompt: None,
            answer: None,
            error: None,
            cached: false,
        };

        let template = match store.get(prompt_name) {
            Some(template) => template,
            None => {
                cell.error = Some(format!("Unknown prompt: {}", prompt_name));
                return cell;
            }
        };

        let mut variables = HashMap::new();
        variables.insert("question".to_string(), question.to_string());

        let rendered = match template.render(&variables) {
            Ok(rendered) => rendered,
            Err(e) => {
                cell.error = Some(e.to_string());
                return cell;
            }
        };

        if self.show_prompt {
            cell.rendered_prompt = Some(rendered.clone());
        }

        if let Some(cache) = &cache {
            if let Some(answer) = cache.get(question, model, self.temperature, prompt_name) {
                tracing::debug!("Cache hit for {} x {}", model, prompt_name);
                cell.answer = Some(answer.to_string());
                cell.cached = true;
                return cell;
            }
        }

        let client = match client {
            Ok(client) => client,
            Err(e) => {
                cell.error = Some(e.clone());
                return cell;
            }
        };

        let mut request = LlmRequest::new(rendered, model);
        if let Some(temperature) = self.temperature {
            request = request.with_temperature(temperature);
        }
        if let Some(max_tokens) = self.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }

        match client.complete(&request).await {
            Ok(response) => {
                if let Some(cache) = cache {
                    cache.put(
                        question,
                        model,
                        self.temperature,
                        prompt_name,
                        &response.content,
                    );
                }
                cell.answer = Some(response.content);
            }
            Err(e) => {
                tracing::warn!("Completion failed for {} x {}: {}", model, prompt_name, e);
                cell.error = Some(e.to_string());
            }
        }

        cell
    }

    /// Print the comparison report to stdout.
    fn print_report(&self, question: &str, cells: &[AnswerCell]) {
        println!("# {}", question);

        for cell in cells {
            let cached = if cell.cached { " (cached)" } else { "" };
            println!();
            println!("## {} x {}{}", cell.model, cell.prompt, cached);

            if let Some(ref rendered) = cell.rendered_prompt {
                println!("> {}", rendered.replace('\n', "\n> "));
                println!();
            }

            match (&cell.answer, &cell.error) {
                (Some(answer), _) => println!("{}", answer),
                (None, Some(error)) => println!("ERROR: {}", error),
                (None, None) => println!("ERROR: no answer"),
            }
        }
    }

    /// Get the question text from the positional argument or a file.
    fn get_question(&self) -> Option<String> {
        self.question.clone().or_else(|| {
            self.file.as_ref().and_then(|path| {
                std::fs::read_to_string(path)
                    .map_err(|e| tracing::error!("Failed to read question file: {}", e))
                    .ok()
                    .map(|contents| contents.trim_end().to_string())
            })
        })
    }
}
