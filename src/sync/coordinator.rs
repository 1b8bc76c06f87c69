//! Synchronization coordinator
//!
//! Owns the in-memory view of the hierarchy and routes every mutation to the
//! right backend. The mode is fixed at construction:
//!
//! - `LocalOnly`: every operation goes straight to the local store.
//! - `RemoteActive`: mutations hit the shared store first and the view is
//!   reloaded from it afterwards. When the shared store fails, the same
//!   mutation is written locally and a [`SyncOutcome::Fallback`] is returned.
//!   The failed remote write is never retried.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::{Operation, RemoteFailure, SyncError, SyncOutcome};
use crate::core::hierarchy::{sort_okrs, HierarchyIndex};
use crate::core::identity::{assign_display_id, new_id};
use crate::entities::{CheckIn, Okr, ValidationError};
use crate::store::{LocalBackend, OkrStore, RemoteBackend, StoreError, SubscriptionHandle};

/// Which backend is authoritative for this session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    LocalOnly,
    RemoteActive,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::LocalOnly => write!(f, "local-only"),
            Mode::RemoteActive => write!(f, "remote-active"),
        }
    }
}

struct RemoteLink {
    backend: Box<dyn RemoteBackend>,
    subscription: SubscriptionHandle,
    /// Set by the change feed, cleared by the next reload
    pending: Arc<AtomicBool>,
}

enum Mutation<'a> {
    Create(&'a Okr),
    Replace(&'a Okr),
    Remove(&'a str),
}

impl Mutation<'_> {
    fn operation(&self) -> Operation {
        match self {
            Mutation::Create(_) => Operation::Create,
            Mutation::Replace(_) => Operation::Replace,
            Mutation::Remove(_) => Operation::Remove,
        }
    }

    fn apply_to<S: OkrStore + ?Sized>(&self, store: &mut S) -> Result<(), StoreError> {
        match self {
            Mutation::Create(okr) => store.create(okr),
            Mutation::Replace(okr) => store.replace(okr),
            Mutation::Remove(id) => store.remove(id),
        }
    }
}

pub struct SyncCoordinator {
    local: Box<dyn LocalBackend>,
    remote: Option<RemoteLink>,
    state: Vec<Okr>,
}

impl SyncCoordinator {
    pub fn local_only(local: Box<dyn LocalBackend>) -> Self {
        Self {
            local,
            remote: None,
            state: Vec::new(),
        }
    }

    /// Remote-active coordinator; subscribes to the change feed immediately
    pub fn with_remote(local: Box<dyn LocalBackend>, mut backend: Box<dyn RemoteBackend>) -> Self {
        let pending = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&pending);
        let subscription = backend.subscribe(Box::new(move || {
            flag.store(true, Ordering::Release);
        }));

        Self {
            local,
            remote: Some(RemoteLink {
                backend,
                subscription,
                pending,
            }),
            state: Vec::new(),
        }
    }

    pub fn mode(&self) -> Mode {
        if self.remote.is_some() {
            Mode::RemoteActive
        } else {
            Mode::LocalOnly
        }
    }

    /// Current view, in display order. Empty until [`Self::load`] runs.
    pub fn okrs(&self) -> &[Okr] {
        &self.state
    }

    pub fn get(&self, id: &str) -> Option<&Okr> {
        self.state.iter().find(|okr| okr.id == id)
    }

    pub fn local_store(&mut self) -> &mut dyn LocalBackend {
        self.local.as_mut()
    }

    /// Refresh the view from the authoritative backend
    pub fn load(&mut self) -> Result<SyncOutcome, SyncError> {
        let Some(remote) = self.remote.as_mut() else {
            self.state = self.read_local()?;
            return Ok(SyncOutcome::Synced);
        };

        remote.pending.store(false, Ordering::Release);
        match remote.backend.read_all() {
            Ok(okrs) => {
                debug!(count = okrs.len(), "loaded from shared store");
                self.state = okrs;
                Ok(SyncOutcome::Synced)
            }
            Err(source) => {
                warn!(error = %source, "shared store read failed, showing local data");
                self.state = self.read_local()?;
                Ok(SyncOutcome::Fallback(RemoteFailure::new(Operation::Read, source)))
            }
        }
    }

    /// Deliver pending change notifications; reloads when something changed.
    /// Returns `None` when there was nothing to do.
    pub fn pump(&mut self) -> Result<Option<SyncOutcome>, SyncError> {
        let Some(remote) = self.remote.as_mut() else {
            return Ok(None);
        };

        if let Err(source) = remote.backend.poll_changes() {
            warn!(error = %source, "could not poll shared store for changes");
            return Ok(Some(SyncOutcome::Fallback(RemoteFailure::new(
                Operation::Poll,
                source,
            ))));
        }

        if !remote.pending.swap(false, Ordering::AcqRel) {
            return Ok(None);
        }

        info!("shared store changed, reloading");
        self.load().map(Some)
    }

    /// Insert a new OKR. An empty id is replaced by a fresh one and a root
    /// without a display id gets the next free `OKR-<n>`.
    pub fn create(&mut self, mut okr: Okr) -> Result<(Okr, SyncOutcome), SyncError> {
        if okr.id.trim().is_empty() {
            okr.id = new_id("okr");
        }
        if self.get(&okr.id).is_some() {
            return Err(SyncError::AlreadyExists(okr.id));
        }
        if okr.is_root() && okr.display_id.is_none() {
            let display_id =
                assign_display_id(self.state.iter().filter(|existing| existing.is_root()))
                    .map_err(ValidationError::DisplayIdsExhausted)?;
            okr.display_id = Some(display_id);
        }

        okr.validate()?;
        self.check_display_id(&okr)?;
        self.check_parent(&okr)?;

        let outcome = self.apply(Mutation::Create(&okr))?;
        Ok((okr, outcome))
    }

    /// Replace an OKR wholesale; its display id and creation time may not change
    pub fn replace(&mut self, okr: &Okr) -> Result<SyncOutcome, SyncError> {
        let current = self
            .get(&okr.id)
            .ok_or_else(|| SyncError::NotFound(okr.id.clone()))?;
        if current.display_id != okr.display_id {
            return Err(ValidationError::DisplayIdChanged {
                id: okr.id.clone(),
                from: current.display_id.clone(),
                to: okr.display_id.clone(),
            }
            .into());
        }
        if current.created_at != okr.created_at {
            return Err(ValidationError::CreatedAtChanged { id: okr.id.clone() }.into());
        }

        okr.validate()?;
        self.check_parent(okr)?;

        self.apply(Mutation::Replace(okr))
    }

    /// Delete an OKR and its whole subtree
    pub fn remove(&mut self, id: &str) -> Result<SyncOutcome, SyncError> {
        if self.get(id).is_none() {
            return Err(SyncError::NotFound(id.to_string()));
        }
        self.apply(Mutation::Remove(id))
    }

    /// Apply a check-in and store the result as a replacement
    pub fn check_in(
        &mut self,
        id: &str,
        check_in: &CheckIn,
        now: DateTime<Utc>,
    ) -> Result<SyncOutcome, SyncError> {
        let current = self
            .get(id)
            .ok_or_else(|| SyncError::NotFound(id.to_string()))?;
        let updated = check_in.apply(current, now)?;
        self.replace(&updated)
    }

    fn check_display_id(&self, okr: &Okr) -> Result<(), SyncError> {
        let Some(display_id) = okr.display_id.as_deref() else {
            return Ok(());
        };
        match self
            .state
            .iter()
            .find(|other| other.id != okr.id && other.display_id.as_deref() == Some(display_id))
        {
            Some(existing) => Err(ValidationError::DuplicateDisplayId {
                display_id: display_id.to_string(),
                existing: existing.id.clone(),
            }
            .into()),
            None => Ok(()),
        }
    }

    fn check_parent(&self, okr: &Okr) -> Result<(), SyncError> {
        let Some(parent_id) = okr.parent_id.as_deref() else {
            return Ok(());
        };
        let index = HierarchyIndex::new(&self.state);
        if !index.contains(parent_id) {
            return Err(ValidationError::UnknownParent {
                parent_id: parent_id.to_string(),
            }
            .into());
        }
        if index.would_create_cycle(&okr.id, parent_id) {
            return Err(ValidationError::Cycle {
                id: okr.id.clone(),
                parent_id: parent_id.to_string(),
            }
            .into());
        }
        Ok(())
    }

    fn apply(&mut self, mutation: Mutation<'_>) -> Result<SyncOutcome, SyncError> {
        let operation = mutation.operation();

        let Some(remote) = self.remote.as_mut() else {
            mutation
                .apply_to(self.local.as_mut())
                .map_err(|source| SyncError::Local { operation, source })?;
            self.state = self.read_local()?;
            return Ok(SyncOutcome::Synced);
        };

        match mutation.apply_to(remote.backend.as_mut()) {
            Ok(()) => {
                debug!(%operation, "shared store updated");
                // Our own write is about to be reloaded; drop its notification
                if let Err(e) = remote.backend.poll_changes() {
                    debug!(error = %e, "could not drain change feed");
                }
                self.load()
            }
            Err(remote_error) => {
                warn!(%operation, error = %remote_error, "shared store write failed, saving locally");
                if let Err(local_error) = self.write_fallback(&mutation) {
                    return Err(SyncError::BothFailed {
                        operation,
                        remote: remote_error,
                        local: local_error,
                    });
                }
                self.state = self.read_local()?;
                Ok(SyncOutcome::Fallback(RemoteFailure::new(operation, remote_error)))
            }
        }
    }

    // The local store may have drifted from the shared one, so a create can
    // land on an existing id and a replace on a missing one
    fn write_fallback(&mut self, mutation: &Mutation<'_>) -> Result<(), StoreError> {
        match (mutation.apply_to(self.local.as_mut()), mutation) {
            (Err(StoreError::NotFound(_)), Mutation::Replace(okr)) => {
                warn!(id = %okr.id, "OKR missing from local store, creating it");
                self.local.create(okr)
            }
            (Err(StoreError::DuplicateId(_)), Mutation::Create(okr)) => {
                warn!(id = %okr.id, "OKR already in local store, replacing it");
                self.local.replace(okr)
            }
            (result, _) => result,
        }
    }

    fn read_local(&mut self) -> Result<Vec<Okr>, SyncError> {
        let local_error = |source: StoreError| SyncError::Local {
            operation: Operation::Read,
            source,
        };
        match self.local.read_all() {
            Ok(okrs) => Ok(okrs),
            Err(StoreError::CorruptLocalState { key, source }) => {
                warn!(%key, error = %source, "local store is unreadable, starting over");
                let mut okrs = self.local.reset().map_err(local_error)?;
                sort_okrs(&mut okrs);
                Ok(okrs)
            }
            Err(source) => Err(local_error(source)),
        }
    }
}

impl Drop for SyncCoordinator {
    fn drop(&mut self) {
        if let Some(remote) = self.remote.as_mut() {
            remote.backend.unsubscribe(remote.subscription);
        }
    }
}
