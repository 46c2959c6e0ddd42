use anyhow::{Context, Result};
use tracing::Dispatch;

use crate::configuration::{ApiConfig, DatabaseConfig};
use crate::{fetcher, persister, storage};

pub fn init_storage(db: &DatabaseConfig) -> Result<storage::SqliteStorage> {
    if let Some(parent) = db.path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating database directory {}", parent.display()))?;
    }
    let sqlite = storage::SqliteStorage::new(&db.path, storage::DATA_ENTRIES);
    sqlite.migrate().context("migrating storage")?;
    Ok(sqlite)
}

pub fn build_fetcher(api: &ApiConfig, logger: Dispatch) -> Result<fetcher::Fetcher> {
    fetcher::Fetcher::new(api.timeout, logger).context("failed to create HTTP client")
}

pub fn build_persister(
    storage: storage::SqliteStorage,
    logger: Dispatch,
) -> persister::Persister<storage::SqliteStorage> {
    persister::Persister::new(storage, logger)
}
