//! Watch command: build, then rebuild on change until interrupted.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use inkpress_static::StaticBuilder;
use inkpress_watch::SiteWatcher;

use crate::config;

/// Run the watch command.
pub async fn run(config_path: &Path, output: Option<PathBuf>) -> Result<()> {
    let config = config::build_config(config_path, output)?;
    let builder = Arc::new(StaticBuilder::new(config));

    let initial = Arc::clone(&builder);
    match tokio::task::spawn_blocking(move || initial.build())
        .await
        .context("Build task panicked")?
    {
        Ok(result) => tracing::info!(
            "Built {} files in {}ms",
            result.files,
            result.duration_ms
        ),
        // keep watching so the next edit can fix it
        Err(e) => tracing::error!("Initial build failed: {}", e),
    }

    let watcher = SiteWatcher::start(builder).context("Failed to start watcher")?;
    tracing::info!("Watching for changes, press Ctrl+C to stop");

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl+C")?;

    tracing::info!("Stopping watcher...");
    tokio::task::spawn_blocking(move || watcher.stop())
        .await
        .context("Watcher shutdown panicked")?;

    Ok(())
}
