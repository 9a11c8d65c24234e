//! Durable single-slot text register backed by SQLite.
//!
//! The connection sits behind a mutex and every operation runs on the
//! blocking pool. Append holds the mutex for its whole read-modify-write
//! and runs inside a `BEGIN IMMEDIATE` transaction, so concurrent appends
//! from this process or another one sharing the file cannot lose updates.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use rusqlite::{Connection, TransactionBehavior};
use tokio::fs;
use tracing::{debug, info};

use super::error::StoreError;
use super::schema;
use crate::domain::{join_content, trim_addition};

/// How long a writer waits on a database file locked by another process
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Operations on the single content record
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Whether the record has been created
    async fn is_initialized(&self) -> Result<bool, StoreError>;

    /// Create the record with `seed` unless it already exists
    async fn initialize(&self, seed: &str) -> Result<(), StoreError>;

    /// Current text, empty if the record was never created
    async fn get(&self) -> Result<String, StoreError>;

    /// Append trimmed `text` and return the full updated content
    async fn append(&self, text: &str) -> Result<String, StoreError>;
}

type SharedConnection = Arc<Mutex<Option<Connection>>>;

/// SQLite implementation of [`ContentStore`]
///
/// Cloning is cheap and every clone shares the same connection.
#[derive(Clone)]
pub struct SqliteContentStore {
    conn: SharedConnection,
    location: Arc<str>,
}

impl SqliteContentStore {
    /// Open (or create) the database file and apply the schema
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let location = path.display().to_string();
        let conn = tokio::task::spawn_blocking(move || -> Result<Connection, StoreError> {
            let mut conn = Connection::open(&path)?;
            configure(&mut conn)?;
            Ok(conn)
        })
        .await??;

        info!("Opened content store at {}", location);
        Ok(Self::from_connection(conn, location))
    }

    /// Open a private in-memory store (nothing survives `close`)
    pub async fn open_in_memory() -> Result<Self, StoreError> {
        let conn = tokio::task::spawn_blocking(|| -> Result<Connection, StoreError> {
            let mut conn = Connection::open_in_memory()?;
            configure(&mut conn)?;
            Ok(conn)
        })
        .await??;

        Ok(Self::from_connection(conn, ":memory:".to_string()))
    }

    fn from_connection(conn: Connection, location: String) -> Self {
        Self {
            conn: Arc::new(Mutex::new(Some(conn))),
            location: location.into(),
        }
    }

    /// Where the store lives (file path or `:memory:`)
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Flush and close the connection. Later calls fail with `Unavailable`.
    pub async fn close(&self) -> Result<(), StoreError> {
        let conn = Arc::clone(&self.conn);
        let closed = tokio::task::spawn_blocking(move || -> Result<bool, StoreError> {
            let mut guard = lock(&conn)?;
            match guard.take() {
                Some(conn) => {
                    conn.close().map_err(|(_, err)| StoreError::from(err))?;
                    Ok(true)
                }
                None => Ok(false),
            }
        })
        .await??;

        if closed {
            info!("Closed content store at {}", self.location);
        }
        Ok(())
    }

    /// Run `op` against the open connection on the blocking pool
    async fn with_connection<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = lock(&conn)?;
            let conn = guard
                .as_mut()
                .ok_or_else(|| StoreError::unavailable("store is closed"))?;
            op(conn)
        })
        .await?
    }
}

#[async_trait]
impl ContentStore for SqliteContentStore {
    async fn is_initialized(&self) -> Result<bool, StoreError> {
        self.with_connection(|conn| Ok(schema::read_record(conn)?.is_some()))
            .await
    }

    async fn initialize(&self, seed: &str) -> Result<(), StoreError> {
        let seed = seed.to_string();
        let inserted = self
            .with_connection(move |conn| Ok(schema::insert_if_absent(conn, &seed)?))
            .await?;

        if inserted {
            info!("Initialized content record");
        } else {
            debug!("Content record already present, initialization skipped");
        }
        Ok(())
    }

    async fn get(&self) -> Result<String, StoreError> {
        self.with_connection(|conn| Ok(schema::read_record(conn)?.unwrap_or_default()))
            .await
    }

    async fn append(&self, text: &str) -> Result<String, StoreError> {
        let addition = trim_addition(text).ok_or(StoreError::InvalidInput)?.to_string();

        let updated = self
            .with_connection(move |conn| {
                let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
                let current = schema::read_record(&tx)?.unwrap_or_default();
                let updated = join_content(&current, &addition);
                schema::write_record(&tx, &updated)?;
                tx.commit()?;
                Ok(updated)
            })
            .await?;

        debug!("Appended to content record, now {} bytes", updated.len());
        Ok(updated)
    }
}

fn configure(conn: &mut Connection) -> Result<(), StoreError> {
    conn.busy_timeout(BUSY_TIMEOUT)?;
    schema::apply_schema(conn)
}

fn lock(conn: &SharedConnection) -> Result<MutexGuard<'_, Option<Connection>>, StoreError> {
    conn.lock()
        .map_err(|_| StoreError::unavailable("store lock poisoned"))
}
