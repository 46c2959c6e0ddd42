pub mod schema;
pub mod sqlite;
pub mod traits;

pub use schema::{Column, SqlType, TableSchema, DATA_ENTRIES};
pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageRead, StorageTx, StorageWrite};
