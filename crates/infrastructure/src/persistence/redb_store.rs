//! Redb-backed document store
//!
//! Every collection is its own redb table mapping string keys to
//! JSON-encoded documents. Reads of a collection that was never written
//! behave like an empty table.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use application::{ApplicationError, KeyValueStorePort};
use async_trait::async_trait;
use redb::{
    Database, DatabaseError, ReadOnlyTable, ReadTransaction, ReadableDatabase, ReadableTable,
    StorageError, TableDefinition, TableError,
};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::error::{map_join_error, map_redb_error};

/// Whether `create` failed because the file content is unusable, as
/// opposed to the file being unreachable right now
fn is_corrupt(err: &DatabaseError) -> bool {
    match err {
        DatabaseError::Storage(StorageError::Corrupted(_)) => true,
        DatabaseError::Storage(StorageError::Io(e)) => matches!(
            e.kind(),
            std::io::ErrorKind::UnexpectedEof | std::io::ErrorKind::InvalidData
        ),
        _ => false,
    }
}

fn collection_table(collection: &str) -> TableDefinition<'_, &'static str, &'static str> {
    TableDefinition::new(collection)
}

/// Open a collection for reading, `None` if it was never created
fn open_read(
    txn: &ReadTransaction,
    collection: &str,
) -> Result<Option<ReadOnlyTable<&'static str, &'static str>>, redb::Error> {
    match txn.open_table(collection_table(collection)) {
        Ok(table) => Ok(Some(table)),
        Err(TableError::TableDoesNotExist(_)) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Persistent JSON document store on redb
pub struct RedbKeyValueStore {
    db: Arc<Database>,
    path: Option<PathBuf>,
}

impl std::fmt::Debug for RedbKeyValueStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbKeyValueStore")
            .field("db", &"<Database>")
            .field("path", &self.path)
            .finish()
    }
}

impl RedbKeyValueStore {
    /// Open or create the store at `path`
    ///
    /// Missing parent directories are created. A file that redb cannot open
    /// is removed and recreated; stored sessions are then lost and users
    /// have to log in again. A file locked by another process, or one that
    /// cannot be read for I/O reasons, is left alone and reported.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened after retry.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ApplicationError> {
        let path_buf = path.as_ref().to_path_buf();

        if let Some(parent) = path_buf.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                ApplicationError::Internal(format!(
                    "Failed to create storage directory {}: {e}",
                    parent.display()
                ))
            })?;
        }

        let db = match Database::create(&path_buf) {
            Ok(db) => db,
            Err(DatabaseError::DatabaseAlreadyOpen) => {
                return Err(ApplicationError::Internal(format!(
                    "Database {} is in use by another process",
                    path_buf.display()
                )));
            },
            Err(e) if !is_corrupt(&e) => {
                return Err(ApplicationError::Internal(format!(
                    "Failed to open Redb database {}: {e}",
                    path_buf.display()
                )));
            },
            Err(e) => {
                warn!(
                    path = %path_buf.display(),
                    error = %e,
                    "Database corrupted or incompatible, recreating"
                );
                if path_buf.exists() {
                    fs::remove_file(&path_buf).map_err(|e| {
                        ApplicationError::Internal(format!(
                            "Failed to remove corrupted database: {e}"
                        ))
                    })?;
                }
                Database::create(&path_buf).map_err(|e| {
                    ApplicationError::Internal(format!("Failed to create Redb database: {e}"))
                })?
            },
        };

        debug!(path = %path_buf.display(), "Opened key-value store");
        Ok(Self {
            db: Arc::new(db),
            path: Some(path_buf),
        })
    }

    /// Create a store that lives only in memory
    ///
    /// # Errors
    ///
    /// Returns an error if redb fails to initialize the backend.
    pub fn in_memory() -> Result<Self, ApplicationError> {
        let db = Database::builder()
            .create_with_backend(redb::backends::InMemoryBackend::new())
            .map_err(|e| {
                ApplicationError::Internal(format!("Failed to create in-memory Redb: {e}"))
            })?;

        Ok(Self {
            db: Arc::new(db),
            path: None,
        })
    }

    /// Location of the database file, `None` for in-memory stores
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn decode(collection: &str, key: &str, raw: &str) -> Result<Value, ApplicationError> {
        serde_json::from_str(raw).map_err(|e| {
            ApplicationError::Internal(format!(
                "Corrupt document {collection}/{key}: {e}"
            ))
        })
    }
}

#[async_trait]
impl KeyValueStorePort for RedbKeyValueStore {
    #[instrument(skip(self), level = "debug")]
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Value>, ApplicationError> {
        let db = Arc::clone(&self.db);
        let (name, key_owned) = (collection.to_string(), key.to_string());

        let raw = tokio::task::spawn_blocking(move || {
            let read_txn = db.begin_read()?;
            let Some(table) = open_read(&read_txn, &name)? else {
                return Ok(None);
            };
            Ok::<_, redb::Error>(table.get(key_owned.as_str())?.map(|v| v.value().to_string()))
        })
        .await
        .map_err(map_join_error)?
        .map_err(map_redb_error)?;

        raw.map(|raw| Self::decode(collection, key, &raw)).transpose()
    }

    #[instrument(skip(self, value), level = "debug")]
    async fn put(&self, collection: &str, key: &str, value: Value) -> Result<(), ApplicationError> {
        let encoded = serde_json::to_string(&value)
            .map_err(|e| ApplicationError::Internal(format!("Document serialize error: {e}")))?;
        let db = Arc::clone(&self.db);
        let (name, key_owned) = (collection.to_string(), key.to_string());

        tokio::task::spawn_blocking(move || {
            let write_txn = db.begin_write()?;
            {
                let mut table = write_txn.open_table(collection_table(&name))?;
                table.insert(key_owned.as_str(), encoded.as_str())?;
            }
            write_txn.commit()?;
            Ok::<_, redb::Error>(())
        })
        .await
        .map_err(map_join_error)?
        .map_err(map_redb_error)?;

        debug!("Document stored");
        Ok(())
    }

    #[instrument(skip(self), level = "debug")]
    async fn remove(&self, collection: &str, key: &str) -> Result<bool, ApplicationError> {
        let db = Arc::clone(&self.db);
        let (name, key_owned) = (collection.to_string(), key.to_string());

        tokio::task::spawn_blocking(move || {
            let write_txn = db.begin_write()?;
            let mut table = write_txn.open_table(collection_table(&name))?;
            let existed = table.remove(key_owned.as_str())?.is_some();
            drop(table);
            write_txn.commit()?;
            Ok::<_, redb::Error>(existed)
        })
        .await
        .map_err(map_join_error)?
        .map_err(map_redb_error)
    }

    #[instrument(skip(self), level = "debug")]
    async fn list(&self, collection: &str) -> Result<Vec<(String, Value)>, ApplicationError> {
        let db = Arc::clone(&self.db);
        let name = collection.to_string();

        let rows = tokio::task::spawn_blocking(move || {
            let read_txn = db.begin_read()?;
            let Some(table) = open_read(&read_txn, &name)? else {
                return Ok(Vec::new());
            };
            let mut rows = Vec::new();
            for row in table.iter()? {
                let (key, value) = row?;
                rows.push((key.value().to_string(), value.value().to_string()));
            }
            Ok::<_, redb::Error>(rows)
        })
        .await
        .map_err(map_join_error)?
        .map_err(map_redb_error)?;

        rows.into_iter()
            .map(|(key, raw)| {
                let value = Self::decode(collection, &key, &raw)?;
                Ok((key, value))
            })
            .collect()
    }

    async fn is_healthy(&self) -> bool {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || db.begin_read().is_ok())
            .await
            .unwrap_or(false)
    }
}
