use anyhow::Result;

use crate::record::Record;

pub trait StorageRead {
    fn load_entry(&self, id: i64) -> Result<Option<Record>>;
    fn list_entries(&self) -> Result<Vec<Record>>;
}

pub trait StorageWrite {
    fn insert_entry(&self, record: &Record) -> Result<()>;
}

/// A unit of work. Dropping it without `commit` rolls it back.
pub trait StorageTx: StorageRead + StorageWrite {
    fn commit(self) -> Result<()>;
}

pub trait Storage: StorageRead {
    type Tx: StorageTx;

    fn begin_tx(&self) -> Result<Self::Tx>;
}
