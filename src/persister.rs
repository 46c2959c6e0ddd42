use anyhow::Result;
use tracing::Dispatch;

use crate::record::Record;
use crate::storage::{Storage, StorageRead, StorageTx, StorageWrite};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub inserted: usize,
    pub skipped: usize,
    pub failed: usize,
}

#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    Inserted,
    AlreadyExists,
}

pub struct Persister<S: Storage> {
    storage: S,
    dispatch: Dispatch,
}

impl<S: Storage> Persister<S> {
    pub fn new(storage: S, dispatch: Dispatch) -> Self {
        Self { storage, dispatch }
    }

    #[cfg(test)]
    fn storage(&self) -> &S {
        &self.storage
    }

    /// Inserts each record whose id is not stored yet, one transaction per
    /// record. A failing record is logged and does not stop the rest.
    pub fn persist(&self, records: &[Record]) -> SyncReport {
        tracing::dispatcher::with_default(&self.dispatch, || {
            let mut report = SyncReport::default();
            for record in records {
                match self.persist_one(record) {
                    Ok(outcome) => {
                        println!("{}", progress_line(&outcome, &record.title));
                        match outcome {
                            Outcome::Inserted => report.inserted += 1,
                            Outcome::AlreadyExists => report.skipped += 1,
                        }
                    }
                    Err(e) => {
                        log::error!("Database error: {:#} (id={})", e, record.id);
                        report.failed += 1;
                    }
                }
            }
            report
        })
    }

    fn persist_one(&self, record: &Record) -> Result<Outcome> {
        let tx = self.storage.begin_tx()?;
        if tx.load_entry(record.id)?.is_some() {
            log::debug!("skipping id={}: already stored", record.id);
            return Ok(Outcome::AlreadyExists);
        }
        tx.insert_entry(record)?;
        tx.commit()?;
        log::debug!("stored id={}", record.id);
        Ok(Outcome::Inserted)
    }
}

// Two spaces after the colon; downstream tooling matches this exact text.
fn progress_line(outcome: &Outcome, title: &str) -> String {
    match outcome {
        Outcome::Inserted => format!("Database record created for movie:  {title}"),
        Outcome::AlreadyExists => format!("Database record already exists for movie:  {title}"),
    }
}
