//! Persistence adapters for the goal hierarchy
//!
//! Two backends implement the same [`OkrStore`] contract:
//! - [`local::LocalStore`]: the whole hierarchy as one serialized blob under a
//!   single key of a key-value store
//! - [`remote::RemoteStore`]: four relational tables shared between clients,
//!   with a [`ChangeFeed`] that signals "something changed, reload"
//!
//! Both return OKRs fully materialized and in the same order
//! ([`crate::core::hierarchy::display_order`]).

pub mod local;
pub mod migrate;
pub mod remote;
pub mod seed;

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::entities::Okr;

pub use local::{FileKeyValueStore, KeyValueStore, LocalStore, MemoryKeyValueStore};
pub use remote::RemoteStore;

/// Which backend an adapter talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Local,
    Remote,
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Backend::Local => write!(f, "local"),
            Backend::Remote => write!(f, "remote"),
        }
    }
}

/// CRUD contract shared by both backends
///
/// Updates are full-object replacements: nested key results, actions and
/// checklist items are replaced wholesale, never diffed.
pub trait OkrStore {
    fn backend(&self) -> Backend;

    /// Every OKR with nested entities, in display order
    fn read_all(&mut self) -> Result<Vec<Okr>, StoreError>;

    /// Insert a brand-new OKR and everything nested in it
    fn create(&mut self, okr: &Okr) -> Result<(), StoreError>;

    /// Replace an existing OKR wholesale
    fn replace(&mut self, okr: &Okr) -> Result<(), StoreError>;

    /// Delete an OKR together with all of its descendants
    fn remove(&mut self, id: &str) -> Result<(), StoreError>;
}

/// The local adapter as seen by the coordinator
pub trait LocalBackend: OkrStore {
    /// Discard unreadable local data and start over
    fn reset(&mut self) -> Result<Vec<Okr>, StoreError>;
}

/// Opaque token returned by [`ChangeFeed::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle(pub(crate) u64);

pub type ChangeCallback = Box<dyn FnMut() + Send>;

/// A no-payload "reload everything" signal
pub trait ChangeFeed {
    fn subscribe(&mut self, on_change: ChangeCallback) -> SubscriptionHandle;

    /// Returns false when the handle was not subscribed
    fn unsubscribe(&mut self, handle: SubscriptionHandle) -> bool;

    /// Deliver pending notifications; returns how many callbacks ran
    fn poll_changes(&mut self) -> Result<usize, StoreError>;
}

/// A backend the coordinator can run in remote mode
pub trait RemoteBackend: OkrStore + ChangeFeed {}

impl<T: OkrStore + ChangeFeed> RemoteBackend for T {}

/// Errors raised by persistence adapters
#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error("IO error on {path}: {source}")]
    #[diagnostic(code(okr::store::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Database error: {0}")]
    #[diagnostic(code(okr::store::sqlite))]
    Sqlite(#[from] rusqlite::Error),

    #[error("Failed to serialize OKRs: {0}")]
    #[diagnostic(code(okr::store::serialize))]
    Serialize(#[source] serde_json::Error),

    #[error("Local store '{key}' does not contain valid OKR data: {source}")]
    #[diagnostic(
        code(okr::store::corrupt_local_state),
        help("the local store can be discarded and re-seeded")
    )]
    CorruptLocalState {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("An OKR with id {0} already exists")]
    #[diagnostic(code(okr::store::duplicate_id))]
    DuplicateId(String),

    #[error("OKR not found: {0}")]
    #[diagnostic(code(okr::store::not_found))]
    NotFound(String),

    #[error("Table '{table}' does not cascade deletes from okrs(id)")]
    #[diagnostic(
        code(okr::store::cascade_not_configured),
        help("deleting an OKR would orphan rows; recreate the table with ON DELETE CASCADE")
    )]
    CascadeNotConfigured { table: String },

    #[error("Invalid row in '{table}': {message}")]
    #[diagnostic(code(okr::store::invalid_row))]
    InvalidRow { table: String, message: String },

    #[error("Embedded seed data is missing or invalid: {0}")]
    #[diagnostic(code(okr::store::seed))]
    Seed(String),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}
