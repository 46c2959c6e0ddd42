mod wiring;

use crate::configuration::Configuration;
use crate::persister::SyncReport;
use crate::{cli, logging, storage};
use anyhow::{Context as AnyhowContext, Result};
use std::path::Path;
use tracing::instrument::WithSubscriber;
use tracing::Dispatch;

/// Everything a sync run needs, built once at startup.
pub struct App {
    pub config: Configuration,
    pub logger: Dispatch,
    pub storage: storage::SqliteStorage,
}

impl App {
    pub fn from_cli() -> Result<Self> {
        let cli = cli::parse();
        Self::from_config_path(&cli.config)
    }

    /// Any error here is a startup error and ends the process.
    pub fn from_config_path(path: &Path) -> Result<Self> {
        let config = Configuration::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?;
        let logger = logging::init(&config.logging).context("initializing logging")?;

        let storage = tracing::dispatcher::with_default(&logger, || {
            log_startup_info(&config);
            wiring::init_storage(&config.database)
        })?;

        Ok(Self {
            config,
            logger,
            storage,
        })
    }

    /// Fetches once and persists the result. Returns `None` when there was
    /// nothing to persist; fetch failures are logged, not returned.
    pub async fn sync(&self) -> Result<Option<SyncReport>> {
        async {
            let records = {
                let fetcher = wiring::build_fetcher(&self.config.api, self.logger.clone())?;
                fetcher.fetch(&self.config.api.url).await
            };

            let records = match records {
                Some(records) if !records.is_empty() => records,
                _ => {
                    log::error!("No data retrieved from API.");
                    return Ok(None);
                }
            };
            log::info!("📥 Fetched {} records", records.len());

            let persister = wiring::build_persister(self.storage.clone(), self.logger.clone());
            let report = persister.persist(&records);
            log::info!(
                "✅ Sync complete: {} inserted, {} skipped, {} failed",
                report.inserted,
                report.skipped,
                report.failed
            );
            Ok::<_, anyhow::Error>(Some(report))
        }
        .with_subscriber(self.logger.clone())
        .await
    }
}

fn log_startup_info(config: &Configuration) {
    log::info!("🚀 Starting datasync");
    log::info!("🔗 API URL: {}", config.api.url);
    log::info!("⏱️ API timeout: {:?}", config.api.timeout);
    log::info!(
        "📂 Database: {} ({})",
        config.database.url,
        config.database.path.to_string_lossy()
    );
    if let Some(path) = config.logging.file.as_deref() {
        log::info!("📝 Log file: {}", path.to_string_lossy());
    }
}

// --- Entry Point ---

pub async fn run() -> Result<()> {
    let app = App::from_cli()?;
    app.sync().await?;
    Ok(())
}
