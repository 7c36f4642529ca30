//! Static site build command.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use inkpress_static::StaticBuilder;

use crate::config;

/// Run the build command.
pub async fn run(config_path: &Path, output: Option<PathBuf>) -> Result<()> {
    tracing::info!("Building site...");

    let config = config::build_config(config_path, output)?;
    let builder = StaticBuilder::new(config);

    let result = tokio::task::spawn_blocking(move || builder.build())
        .await
        .context("Build task panicked")??;

    tracing::info!(
        "Built {} posts, {} pages and {} tags ({} listing pages, {} files) in {}ms",
        result.posts,
        result.pages,
        result.tags,
        result.listing_pages,
        result.files,
        result.duration_ms
    );
    tracing::info!("Output: {}", result.output_dir.display());

    Ok(())
}
