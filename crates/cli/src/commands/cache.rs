//! Cache command handler.
//!
//! Manages the disk-persisted response cache.

use crate::cache::ResponseCache;
use clap::{Args, Subcommand};
use promptdeck_core::{config::AppConfig, AppResult};

/// Manage the persisted response cache
#[derive(Args, Debug)]
pub struct CacheCommand {
    #[command(subcommand)]
    action: CacheAction,
}

#[derive(Subcommand, Debug)]
enum CacheAction {
    /// Delete every cached answer
    Clear,

    /// Show how many answers are cached
    Status,
}

impl CacheCommand {
    /// Execute the cache command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing cache command");
        let path = config.response_cache_file();

        match self.action {
            CacheAction::Clear => {
                let cleared = ResponseCache::clear(&path)?;
                println!("Cleared {} cached answers", cleared);
            }
            CacheAction::Status => {
                let cache = ResponseCache::load(&path);
                println!("{} cached answers in {:?}", cache.len(), path);
            }
        }

        Ok(())
    }
}
