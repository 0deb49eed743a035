//! Prompts command handler.
//!
//! Browses the merged prompt store and persists new custom prompts through
//! the configured backend.

use clap::{Args, Subcommand};
use promptdeck_core::{AppError, AppResult};
use promptdeck_store::PromptStore;

/// Browse, export, and add prompt templates
#[derive(Args, Debug)]
pub struct PromptsCommand {
    #[command(subcommand)]
    action: PromptsAction,
}

#[derive(Subcommand, Debug)]
enum PromptsAction {
    /// List all prompt names with their origin
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one prompt template
    Show {
        /// Prompt name
        name: String,
    },

    /// Persist a new custom prompt
    Add {
        /// Prompt name (overwrites an existing custom prompt of that name)
        name: String,

        /// Template text; must reference the question as {{question}}
        #[arg(long)]
        template: String,
    },

    /// Export the full prompt table
    Export {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

impl PromptsCommand {
    /// Execute the prompts command.
    pub async fn execute(&self, store: &PromptStore) -> AppResult<()> {
        tracing::info!("Executing prompts command");

        match &self.action {
            PromptsAction::List { json } => self.list(store, *json),
            PromptsAction::Show { name } => self.show(store, name),
            PromptsAction::Add { name, template } => self.add(store, name, template).await,
            PromptsAction::Export { json } => self.export(store, *json),
        }
    }

    fn list(&self, store: &PromptStore, json: bool) -> AppResult<()> {
        let names = store.list_names();

        if json {
            println!("{}", serde_json::to_string_pretty(&names)?);
            return Ok(());
        }

        // data() is keyed the same way; collect origins for display
        let rows = store.data();
        for name in names {
            let origin = rows
                .iter()
                .find(|row| row.name == name)
                .map(|row| row.origin.to_string())
                .unwrap_or_default();
            println!("{:<10} {}", origin, name);
        }

        Ok(())
    }

    fn show(&self, store: &PromptStore, name: &str) -> AppResult<()> {
        match store.get(name) {
            Some(template) => {
                println!("{}", template.template);
                tracing::debug!("Variables: {:?}", template.input_variables);
                Ok(())
            }
            None => Err(AppError::Other(format!(
                "Prompt not found: {}. Use 'promptdeck prompts list' to see available prompts.",
                name
            ))),
        }
    }

    async fn add(&self, store: &PromptStore, name: &str, template: &str) -> AppResult<()> {
        // A backend write error propagates as-is; it must reach the user
        store.add(name, template).await?;

        println!("Saved custom prompt '{}' ({} backend)", name, store.backend_name());
        Ok(())
    }

    fn export(&self, store: &PromptStore, json: bool) -> AppResult<()> {
        let rows = store.data();

        if json {
            println!("{}", serde_json::to_string_pretty(&rows)?);
            return Ok(());
        }

        for row in rows {
            println!(
                "{:<10} {:<24} {}",
                row.origin,
                row.name,
                row.template.replace('\n', "\\n")
            );
        }

        Ok(())
    }
}
