//! Persistent store for per-conversation navigation state
//!
//! The navigator keeps nothing in process memory between actions: the
//! window stack, the message ledger and the conversation mode all live in
//! a key/value store addressed by `(conversation, field)`.

mod schema;

use crate::ids::{ConversationId, MessageId};
use crate::stack::NavigationStack;
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

pub use schema::SCHEMA;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Corrupt {field} value: {source}")]
    Corrupt {
        field: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to encode {field}: {source}")]
    Encode {
        field: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("Store lock poisoned")]
    Poisoned,
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Per-conversation fields kept in the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Stack,
    Ledger,
    Mode,
}

impl Field {
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Stack => "navigation_stack",
            Field::Ledger => "message_ledger",
            Field::Mode => "mode",
        }
    }
}

/// Key/value storage keyed by `(conversation, field)`
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, conv: ConversationId, field: Field) -> StoreResult<Option<String>>;

    async fn set(&self, conv: ConversationId, field: Field, value: &str) -> StoreResult<()>;

    async fn remove(&self, conv: ConversationId, field: Field) -> StoreResult<()>;
}

#[async_trait]
impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    async fn get(&self, conv: ConversationId, field: Field) -> StoreResult<Option<String>> {
        (**self).get(conv, field).await
    }

    async fn set(&self, conv: ConversationId, field: Field, value: &str) -> StoreResult<()> {
        (**self).set(conv, field, value).await
    }

    async fn remove(&self, conv: ConversationId, field: Field) -> StoreResult<()> {
        (**self).remove(conv, field).await
    }
}

// ============================================================================
// SQLite backend
// ============================================================================

/// Thread-safe SQLite handle
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open or create database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.run_migrations()?;
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.run_migrations()?;
        Ok(store)
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    fn run_migrations(&self) -> StoreResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Drop every field of a conversation
    pub fn forget(&self, conv: ConversationId) -> StoreResult<usize> {
        let conn = self.lock()?;
        let removed = conn.execute(
            "DELETE FROM conversation_fields WHERE conversation_id = ?1",
            params![conv.0],
        )?;
        Ok(removed)
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, conv: ConversationId, field: Field) -> StoreResult<Option<String>> {
        let conn = self.lock()?;
        let value = conn
            .query_row(
                "SELECT value FROM conversation_fields WHERE conversation_id = ?1 AND field = ?2",
                params![conv.0, field.as_str()],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    async fn set(&self, conv: ConversationId, field: Field, value: &str) -> StoreResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO conversation_fields (conversation_id, field, value, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(conversation_id, field) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![conv.0, field.as_str(), value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    async fn remove(&self, conv: ConversationId, field: Field) -> StoreResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "DELETE FROM conversation_fields WHERE conversation_id = ?1 AND field = ?2",
            params![conv.0, field.as_str()],
        )?;
        Ok(())
    }
}

// ============================================================================
// Typed view
// ============================================================================

/// Typed access to a conversation's stack, ledger and mode
#[derive(Clone)]
pub struct ConversationStore<S> {
    inner: S,
}

impl<S: KeyValueStore> ConversationStore<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    async fn load<T: DeserializeOwned + Default>(&self, conv: ConversationId, field: Field) -> StoreResult<T> {
        match self.inner.get(conv, field).await? {
            Some(raw) => serde_json::from_str(&raw).map_err(|source| StoreError::Corrupt {
                field: field.as_str(),
                source,
            }),
            None => Ok(T::default()),
        }
    }

    async fn save<T: Serialize + ?Sized>(&self, conv: ConversationId, field: Field, value: &T) -> StoreResult<()> {
        let raw = serde_json::to_string(value).map_err(|source| StoreError::Encode {
            field: field.as_str(),
            source,
        })?;
        self.inner.set(conv, field, &raw).await
    }

    /// Empty stack for a conversation seen for the first time
    pub async fn load_stack(&self, conv: ConversationId) -> StoreResult<NavigationStack> {
        self.load(conv, Field::Stack).await
    }

    pub async fn save_stack(&self, conv: ConversationId, stack: &NavigationStack) -> StoreResult<()> {
        self.save(conv, Field::Stack, stack).await
    }

    /// Live message ids, oldest first
    pub async fn load_ledger(&self, conv: ConversationId) -> StoreResult<Vec<MessageId>> {
        self.load(conv, Field::Ledger).await
    }

    pub async fn save_ledger(&self, conv: ConversationId, ledger: &[MessageId]) -> StoreResult<()> {
        self.save(conv, Field::Ledger, ledger).await
    }

    pub async fn mode(&self, conv: ConversationId) -> StoreResult<Option<String>> {
        self.load(conv, Field::Mode).await
    }

    pub async fn set_mode(&self, conv: ConversationId, mode: Option<&str>) -> StoreResult<()> {
        match mode {
            Some(mode) => self.save(conv, Field::Mode, mode).await,
            None => self.inner.remove(conv, Field::Mode).await,
        }
    }
}
