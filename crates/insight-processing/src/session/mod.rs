//! In-memory session store.
//!
//! Maps an opaque session id to the current table for that session.
//!
//! # Thread Safety
//!
//! The id map is wrapped in a `parking_lot::RwLock`; each session's table
//! sits behind its own `RwLock` so work on one session never blocks
//! another. Readers get a clone of the table (column data is reference
//! counted, so this is cheap) and can never mutate the stored value.
//!
//! [`SessionStore::update`] holds the session's write lock across the whole
//! read-compute-write cycle, so two updates to the same id run one after
//! the other instead of racing.

use crate::error::{InsightError, Result};
use chrono::Local;
use parking_lot::RwLock;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Session metadata kept next to the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMetadata {
    pub filename: String,
    pub created_at: String,
    pub updated_at: String,
    pub operations_applied: Vec<String>,
}

#[derive(Debug)]
struct SessionSlot {
    table: DataFrame,
    metadata: SessionMetadata,
}

type Session = Arc<RwLock<SessionSlot>>;

/// Snapshot of a session at the time of reading.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub id: String,
    pub table: DataFrame,
    pub metadata: SessionMetadata,
}

/// Process-local store of session tables.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

static_assertions::assert_impl_all!(SessionStore: Send, Sync);

fn timestamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

impl SessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a table under a fresh id and return the id.
    pub fn create(&self, table: DataFrame, filename: impl Into<String>) -> String {
        let id = Uuid::new_v4().to_string();
        let now = timestamp();
        let slot = SessionSlot {
            table,
            metadata: SessionMetadata {
                filename: filename.into(),
                created_at: now.clone(),
                updated_at: now,
                operations_applied: Vec::new(),
            },
        };

        {
            let mut sessions = self.sessions.write();
            sessions.insert(id.clone(), Arc::new(RwLock::new(slot)));
        }

        info!("Created session {}", id);
        id
    }

    fn session(&self, id: &str) -> Result<Session> {
        self.sessions
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| InsightError::SessionNotFound(id.to_string()))
    }

    /// Current table of a session.
    pub fn get(&self, id: &str) -> Result<DataFrame> {
        let session = self.session(id)?;
        let slot = session.read();
        Ok(slot.table.clone())
    }

    /// Current table plus metadata of a session.
    pub fn snapshot(&self, id: &str) -> Result<SessionSnapshot> {
        let session = self.session(id)?;
        let slot = session.read();
        Ok(SessionSnapshot {
            id: id.to_string(),
            table: slot.table.clone(),
            metadata: slot.metadata.clone(),
        })
    }

    /// Replace a session's table wholesale.
    pub fn replace(&self, id: &str, table: DataFrame) -> Result<()> {
        let session = self.session(id)?;
        {
            let mut slot = session.write();
            slot.table = table;
            slot.metadata.updated_at = timestamp();
        }
        debug!("Replaced table of session {}", id);
        Ok(())
    }

    /// Run a read-compute-write cycle under the session's exclusive lock.
    ///
    /// `f` receives the current table and returns the new table plus a
    /// value for the caller. The table is only swapped when `f` succeeds;
    /// on error the stored table is left exactly as it was.
    /// `operations` are appended to the session history on success.
    pub fn update<T, F>(&self, id: &str, operations: &[String], f: F) -> Result<T>
    where
        F: FnOnce(&DataFrame) -> Result<(DataFrame, T)>,
    {
        let session = self.session(id)?;
        let mut slot = session.write();

        let (table, value) = f(&slot.table)?;
        slot.table = table;
        slot.metadata.updated_at = timestamp();
        slot.metadata
            .operations_applied
            .extend(operations.iter().cloned());

        debug!("Updated session {} ({:?})", id, operations);
        Ok(value)
    }

    /// Remove a session.
    pub fn delete(&self, id: &str) -> Result<()> {
        let removed = {
            let mut sessions = self.sessions.write();
            sessions.remove(id)
        };

        match removed {
            Some(_) => {
                info!("Deleted session {}", id);
                Ok(())
            }
            None => Err(InsightError::SessionNotFound(id.to_string())),
        }
    }

    /// Check whether a session exists.
    pub fn contains(&self, id: &str) -> bool {
        self.sessions.read().contains_key(id)
    }

    /// Ids of all live sessions.
    pub fn ids(&self) -> Vec<String> {
        self.sessions.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }

    /// Drop every session.
    pub fn clear(&self) {
        let mut sessions = self.sessions.write();
        let count = sessions.len();
        sessions.clear();
        info!("Cleared {} sessions", count);
    }
}
