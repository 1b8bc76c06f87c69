//! Shared relational store
//!
//! The hierarchy lives in four SQLite tables (`okrs`, `key_results`,
//! `quality_checklist`, `actions`) that several clients can open at once.
//! Subtree deletion is left to the database: every reference to `okrs(id)`
//! is declared `ON DELETE CASCADE`, and [`RemoteStore::open`] refuses a
//! database where that is not the case.

mod feed;
mod rows;
mod schema;

use std::path::Path;
use std::time::Duration;

use rusqlite::{params, Connection, Row};
use tracing::debug;

use crate::core::hierarchy::sort_okrs;
use crate::entities::Okr;
use crate::store::{
    Backend, ChangeCallback, ChangeFeed, OkrStore, StoreError, SubscriptionHandle,
};

use feed::FeedState;
use rows::{ActionRow, ChecklistRow, KeyResultRow, OkrRow};

pub use schema::WATCHED_TABLES;

/// Connection to the shared OKR database
pub struct RemoteStore {
    conn: Connection,
    location: String,
    feed: FeedState,
}

impl RemoteStore {
    /// Open (creating if needed) the shared database at `path`
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }
        let conn = Connection::open(path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;
        Self::from_connection(conn, path.display().to_string())
    }

    /// Private database, mostly for tests
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Self::from_connection(conn, ":memory:".to_string())
    }

    fn from_connection(conn: Connection, location: String) -> Result<Self, StoreError> {
        let mut store = Self {
            conn,
            location,
            feed: FeedState::default(),
        };
        store.init_schema()?;
        store.verify_cascades()?;
        store.feed.attach(&store.conn)?;
        debug!(location = %store.location, "opened remote store");
        Ok(store)
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn subscriber_count(&self) -> usize {
        self.feed.subscriber_count()
    }

    fn exists(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM okrs WHERE id = ?1)",
            params![id],
            |row| row.get(0),
        )?)
    }
}

fn select<T>(
    conn: &Connection,
    sql: &str,
    map: fn(&Row<'_>) -> rusqlite::Result<T>,
) -> Result<Vec<T>, StoreError> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map([], map)?.collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

impl OkrStore for RemoteStore {
    fn backend(&self) -> Backend {
        Backend::Remote
    }

    fn read_all(&mut self) -> Result<Vec<Okr>, StoreError> {
        // One read transaction so all four tables come from the same snapshot
        let tx = self.conn.transaction()?;
        let okr_rows = select(&tx, OkrRow::SELECT, OkrRow::from_row)?;
        let key_result_rows = select(&tx, KeyResultRow::SELECT, KeyResultRow::from_row)?;
        let checklist_rows = select(&tx, ChecklistRow::SELECT, ChecklistRow::from_row)?;
        let action_rows = select(&tx, ActionRow::SELECT, ActionRow::from_row)?;
        tx.commit()?;

        let mut okrs = rows::assemble(okr_rows, key_result_rows, checklist_rows, action_rows)?;
        sort_okrs(&mut okrs);
        Ok(okrs)
    }

    fn create(&mut self, okr: &Okr) -> Result<(), StoreError> {
        if self.exists(&okr.id)? {
            return Err(StoreError::DuplicateId(okr.id.clone()));
        }
        let tx = self.conn.transaction()?;
        rows::insert_okr(&tx, okr)?;
        rows::insert_nested(&tx, okr)?;
        tx.commit()?;
        Ok(())
    }

    fn replace(&mut self, okr: &Okr) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        if rows::update_okr(&tx, okr)? == 0 {
            return Err(StoreError::NotFound(okr.id.clone()));
        }
        rows::delete_nested(&tx, &okr.id)?;
        rows::insert_nested(&tx, okr)?;
        tx.commit()?;
        Ok(())
    }

    fn remove(&mut self, id: &str) -> Result<(), StoreError> {
        // Descendants and nested rows go with it via ON DELETE CASCADE
        let deleted = self
            .conn
            .execute("DELETE FROM okrs WHERE id = ?1", params![id])?;
        debug!(id, deleted, "removed OKR subtree");
        Ok(())
    }
}

impl ChangeFeed for RemoteStore {
    fn subscribe(&mut self, on_change: ChangeCallback) -> SubscriptionHandle {
        self.feed.subscribe(on_change)
    }

    fn unsubscribe(&mut self, handle: SubscriptionHandle) -> bool {
        self.feed.unsubscribe(handle)
    }

    fn poll_changes(&mut self) -> Result<usize, StoreError> {
        self.feed.poll(&self.conn)
    }
}
