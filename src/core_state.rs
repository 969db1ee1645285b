//! Shared application state for the HTTP layer.
//!
//! `CoreState` owns the single SQLite connection for the lifetime of
//! the process. Handlers borrow it through `open_db()`, one storage
//! operation per request.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::Connection;

use crate::db;

/// Errors from acquiring state.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Internal lock poisoned")]
    LockPoisoned,
    #[error("Database error: {0}")]
    Database(#[from] db::DatabaseError),
}

pub struct CoreState {
    conn: Mutex<Connection>,
}

impl CoreState {
    /// Open (or create) the database file and run migrations.
    pub fn open(path: &Path) -> Result<Self, CoreError> {
        let conn = db::open_database(path)?;
        tracing::info!(path = %path.display(), "Patient database opened");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// State backed by a fresh in-memory database.
    pub fn in_memory() -> Result<Self, CoreError> {
        let conn = db::open_memory_database()?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Borrow the shared connection.
    pub fn open_db(&self) -> Result<MutexGuard<'_, Connection>, CoreError> {
        self.conn.lock().map_err(|_| CoreError::LockPoisoned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_state_has_schema() {
        let state = CoreState::in_memory().unwrap();
        let conn = state.open_db().unwrap();
        assert_eq!(db::count_patients(&conn).unwrap(), 0);
    }

    #[test]
    fn file_state_creates_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("patients.db");
        let state = CoreState::open(&path).unwrap();
        assert!(path.exists());
        assert_eq!(db::count_patients(&state.open_db().unwrap()).unwrap(), 0);
    }
}
