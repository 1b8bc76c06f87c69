//! Change notifications for the shared store
//!
//! Two sources mark the feed dirty:
//! - SQLite's update hook, for writes made through this connection
//! - `PRAGMA data_version`, which moves whenever another connection commits
//!
//! Nothing runs on a background thread. Callers call
//! [`ChangeFeed::poll_changes`] and subscribers fire from inside that call,
//! once per detected change, with no payload.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rusqlite::hooks::Action;
use rusqlite::Connection;
use tracing::trace;

use super::schema::WATCHED_TABLES;
use crate::store::{ChangeCallback, StoreError, SubscriptionHandle};

#[derive(Default)]
pub(super) struct FeedState {
    subscribers: Vec<(SubscriptionHandle, ChangeCallback)>,
    next_handle: u64,
    dirty: Arc<AtomicBool>,
    data_version: i64,
}

impl FeedState {
    /// Hook the connection so local writes to watched tables mark the feed dirty
    pub(super) fn attach(&mut self, conn: &Connection) -> Result<(), StoreError> {
        let dirty = Arc::clone(&self.dirty);
        conn.update_hook(Some(
            move |_: Action, _: &str, table: &str, _: i64| {
                if WATCHED_TABLES.contains(&table) {
                    dirty.store(true, Ordering::Release);
                }
            },
        ));
        self.data_version = data_version(conn)?;
        Ok(())
    }

    pub(super) fn subscribe(&mut self, on_change: ChangeCallback) -> SubscriptionHandle {
        self.next_handle += 1;
        let handle = SubscriptionHandle(self.next_handle);
        self.subscribers.push((handle, on_change));
        handle
    }

    pub(super) fn unsubscribe(&mut self, handle: SubscriptionHandle) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(h, _)| *h != handle);
        self.subscribers.len() != before
    }

    pub(super) fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    pub(super) fn poll(&mut self, conn: &Connection) -> Result<usize, StoreError> {
        let version = data_version(conn)?;
        let external = version != self.data_version;
        self.data_version = version;
        let local = self.dirty.swap(false, Ordering::AcqRel);

        if !(external || local) {
            return Ok(0);
        }

        trace!(external, local, subscribers = self.subscribers.len(), "remote change detected");
        for (_, callback) in self.subscribers.iter_mut() {
            callback();
        }
        Ok(self.subscribers.len())
    }
}

fn data_version(conn: &Connection) -> Result<i64, StoreError> {
    Ok(conn.query_row("PRAGMA data_version", [], |row| row.get(0))?)
}
