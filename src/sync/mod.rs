//! Synchronization between the local and shared stores
//!
//! [`open`] builds the [`SyncCoordinator`] for a workspace: remote-active
//! when a shared database is configured, local-only otherwise. The choice is
//! made once per session.

pub mod coordinator;

use miette::Diagnostic;
use thiserror::Error;
use tracing::debug;

use crate::core::{Config, Workspace};
use crate::entities::ValidationError;
use crate::store::{FileKeyValueStore, LocalBackend, LocalStore, RemoteStore, StoreError};

pub use coordinator::{Mode, SyncCoordinator};

/// The coordinator operation a result refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Read,
    Create,
    Replace,
    Remove,
    Poll,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Read => write!(f, "read"),
            Operation::Create => write!(f, "create"),
            Operation::Replace => write!(f, "update"),
            Operation::Remove => write!(f, "delete"),
            Operation::Poll => write!(f, "change poll"),
        }
    }
}

/// A shared-store failure that the local store absorbed
///
/// Returned as a value inside [`SyncOutcome::Fallback`], never as an `Err`.
#[derive(Debug, Error, Diagnostic)]
#[error("Shared store {operation} failed")]
#[diagnostic(code(okr::sync::remote_fallback), severity(Warning))]
pub struct RemoteFailure {
    pub operation: Operation,
    #[source]
    pub source: StoreError,
    #[help]
    help: String,
}

impl RemoteFailure {
    pub fn new(operation: Operation, source: StoreError) -> Self {
        let help = match operation {
            Operation::Read => "showing local data, which may be out of date",
            Operation::Poll => "live updates are paused until the shared store is reachable",
            Operation::Create | Operation::Replace | Operation::Remove => {
                "the change was saved locally instead; local and shared data now differ until the next successful shared write"
            }
        };
        Self {
            operation,
            source,
            help: help.to_string(),
        }
    }
}

/// Result of a coordinator operation that did not fail outright
#[must_use]
#[derive(Debug)]
pub enum SyncOutcome {
    /// The authoritative backend handled it
    Synced,
    /// The shared store failed and local data was used instead
    Fallback(RemoteFailure),
}

impl SyncOutcome {
    pub fn is_synced(&self) -> bool {
        matches!(self, SyncOutcome::Synced)
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, SyncOutcome::Fallback(_))
    }

    pub fn failure(&self) -> Option<&RemoteFailure> {
        match self {
            SyncOutcome::Synced => None,
            SyncOutcome::Fallback(failure) => Some(failure),
        }
    }
}

/// Coordinator failures that left nothing saved
#[derive(Debug, Error, Diagnostic)]
pub enum SyncError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Invalid(#[from] ValidationError),

    #[error("OKR not found: {0}")]
    #[diagnostic(code(okr::sync::not_found))]
    NotFound(String),

    #[error("An OKR with id {0} already exists")]
    #[diagnostic(code(okr::sync::already_exists))]
    AlreadyExists(String),

    #[error("Local store {operation} failed")]
    #[diagnostic(code(okr::sync::local_failed))]
    Local {
        operation: Operation,
        #[source]
        source: StoreError,
    },

    #[error("Shared store {operation} failed ({remote}) and the local fallback failed too")]
    #[diagnostic(code(okr::sync::both_failed), help("nothing was saved"))]
    BothFailed {
        operation: Operation,
        remote: StoreError,
        #[source]
        local: StoreError,
    },

    #[error("Could not open local store")]
    #[diagnostic(code(okr::sync::open_local))]
    OpenLocal(#[source] StoreError),

    #[error("Could not open shared database {location}")]
    #[diagnostic(
        code(okr::sync::open_remote),
        help("fix or unset remote_database to keep working locally")
    )]
    OpenRemote {
        location: String,
        #[source]
        source: StoreError,
    },
}

/// Build the coordinator for `workspace` from `config`
pub fn open(workspace: &Workspace, config: &Config) -> Result<SyncCoordinator, SyncError> {
    let kv = FileKeyValueStore::open(workspace.store_dir()).map_err(SyncError::OpenLocal)?;
    let local: Box<dyn LocalBackend> = Box::new(LocalStore::new(kv, config.storage_key()));

    let Some(path) = config.remote_database_path(workspace) else {
        debug!(key = config.storage_key(), "local-only session");
        return Ok(SyncCoordinator::local_only(local));
    };

    let remote = RemoteStore::open(&path).map_err(|source| SyncError::OpenRemote {
        location: path.display().to_string(),
        source,
    })?;
    debug!(location = remote.location(), "shared session");
    Ok(SyncCoordinator::with_remote(local, Box::new(remote)))
}
