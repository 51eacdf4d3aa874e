//! Runtime initialization and setup
//!
//! This module handles application startup: logging first, then the kitchen
//! configuration.

use crate::app::{config::AppConfig, logging::init_logging};
use crate::config::{ConfigLoader, KitchenConfig};
use anyhow::{Context, Result};
use tracing::debug;

/// Initialize logging and load the kitchen configuration
pub async fn initialize_app(config: &AppConfig) -> Result<KitchenConfig> {
    init_logging(config);
    load_kitchen_config(config).await
}

/// Resolve the kitchen configuration from the file, the working directory and the environment
pub async fn load_kitchen_config(config: &AppConfig) -> Result<KitchenConfig> {
    let mut loader = ConfigLoader::new().with_burners(config.burners);
    if let Some(path) = &config.config_file {
        loader = loader.with_file(path);
    } else if let Some(dir) = &config.working_dir {
        loader = loader.with_search_dir(dir);
    }

    let kitchen = loader
        .load()
        .await
        .context("Failed to load kitchen configuration")?;
    debug!(?kitchen, "Kitchen configuration loaded");
    Ok(kitchen)
}
