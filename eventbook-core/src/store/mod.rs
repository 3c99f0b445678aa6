//! Local event database.
//!
//! An SQLite file holding the event collection and the taxonomy collections.
//! The store keeps no notion of "current state" beyond what is on disk: the
//! event manager writes through it on every mutation and reads it back once
//! at startup.

mod events;
mod schema;
mod taxonomy;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rusqlite::Connection;
use tracing::debug;

use crate::error::EventBookResult;

pub use schema::SCHEMA_VERSION;

/// Handle to the event database.
///
/// Opened once per process; clones share the same connection.
#[derive(Clone)]
pub struct EventStore {
    conn: Arc<Mutex<Connection>>,
    path: Option<PathBuf>,
}

impl EventStore {
    /// Open (creating on first use) the database at `path` and bring its
    /// schema up to date.
    pub fn open(path: impl AsRef<Path>) -> EventBookResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode = WAL; PRAGMA foreign_keys = ON;")?;
        schema::run_migrations(&conn)?;

        debug!(path = %path.display(), "opened event store");

        Ok(EventStore {
            conn: Arc::new(Mutex::new(conn)),
            path: Some(path.to_path_buf()),
        })
    }

    /// Open a throwaway database that lives only in memory.
    pub fn open_in_memory() -> EventBookResult<Self> {
        let conn = Connection::open_in_memory()?;
        schema::run_migrations(&conn)?;

        Ok(EventStore {
            conn: Arc::new(Mutex::new(conn)),
            path: None,
        })
    }

    /// Database file, or `None` for an in-memory store.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
