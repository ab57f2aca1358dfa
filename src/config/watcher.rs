//! Configuration file watcher for hot-reload support
//!
//! Only the runtime settings are applied live; grid layout changes need a
//! restart because the grid is immutable once the controller is built.

use anyhow::{Context, Result};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::Path;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::SurfaceConfig;

/// Time to let editors finish writing before re-reading the file
const RELOAD_DEBOUNCE: Duration = Duration::from_millis(100);

/// Monitors the config file and yields re-parsed configurations
pub struct ConfigWatcher {
    _watcher: RecommendedWatcher,
    rx: mpsc::Receiver<SurfaceConfig>,
}

impl ConfigWatcher {
    /// Load the initial config and start watching the file
    pub async fn new(config_path: String) -> Result<(Self, SurfaceConfig)> {
        let (tx, rx) = mpsc::channel(10);

        let initial_config = SurfaceConfig::load(&config_path)
            .await
            .context("Failed to load initial config")?;

        let reload_path = config_path.clone();

        // notify callbacks run on their own OS thread, outside the runtime
        let runtime_handle = tokio::runtime::Handle::current();

        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            let event = match res {
                Ok(event) => event,
                Err(e) => {
                    error!("Watch error: {}", e);
                    return;
                },
            };

            if !matches!(event.kind, EventKind::Modify(_)) {
                return;
            }
            debug!("Config file modified: {:?}", event.paths);

            let path = reload_path.clone();
            let tx = tx.clone();
            runtime_handle.spawn(async move {
                tokio::time::sleep(RELOAD_DEBOUNCE).await;

                match SurfaceConfig::load(&path).await {
                    Ok(config) => {
                        if let Err(e) = tx.send(config).await {
                            error!("Failed to send config update: {}", e);
                        }
                    },
                    Err(e) => warn!("Failed to reload config (keeping old config): {:#}", e),
                }
            });
        })?;

        watcher
            .watch(Path::new(&config_path), RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch config file: {}", config_path))?;

        info!("Config file watcher started for: {}", config_path);

        Ok((
            Self {
                _watcher: watcher,
                rx,
            },
            initial_config,
        ))
    }

    /// Wait for the next successfully parsed configuration
    pub async fn next_config(&mut self) -> Option<SurfaceConfig> {
        self.rx.recv().await
    }
}
