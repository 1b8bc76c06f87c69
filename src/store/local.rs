//! Local adapter: the whole hierarchy as one JSON blob in a key-value store
//!
//! Every operation is a synchronous read-modify-write of the blob. A
//! companion `<key>_version` entry records which migrations have run.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::core::hierarchy::{collect_descendants, sort_okrs};
use crate::entities::Okr;
use crate::store::migrate::{self, CURRENT_VERSION};
use crate::store::seed::seed_okrs;
use crate::store::{Backend, LocalBackend, OkrStore, StoreError};

/// Default key the hierarchy is stored under
pub const DEFAULT_STORAGE_KEY: &str = "okrs";

/// Minimal string key-value storage
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// One file per key inside a directory
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    dir: PathBuf,
}

impl FileKeyValueStore {
    /// Open (creating if needed) a store rooted at `dir`
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| StoreError::io(&dir, e))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing `key`. Bytes outside `[A-Za-z0-9._-]` are written as
    /// `%XX`, so distinct keys never share a file.
    pub fn path_for(&self, key: &str) -> PathBuf {
        let mut name = String::with_capacity(key.len() + 5);
        for byte in key.bytes() {
            if byte.is_ascii_alphanumeric() || matches!(byte, b'.' | b'_' | b'-') {
                name.push(char::from(byte));
            } else {
                name.push_str(&format!("%{:02X}", byte));
            }
        }
        self.dir.join(format!("{}.json", name))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key);
        // Write-then-rename so a crash never leaves a half-written blob
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).map_err(|e| StoreError::io(&tmp, e))?;
        fs::rename(&tmp, &path).map_err(|e| StoreError::io(&path, e))
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }
}

/// In-memory store, used for tests and ephemeral sessions
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyValueStore {
    entries: HashMap<String, String>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// The local persistence adapter
#[derive(Debug)]
pub struct LocalStore<K: KeyValueStore = FileKeyValueStore> {
    kv: K,
    key: String,
    version_key: String,
    seed_on_empty: bool,
}

impl<K: KeyValueStore> LocalStore<K> {
    pub fn new(kv: K, key: impl Into<String>) -> Self {
        let key = key.into();
        let version_key = format!("{}_version", key);
        Self {
            kv,
            key,
            version_key,
            seed_on_empty: true,
        }
    }

    /// Start empty instead of writing the demo dataset on first read
    pub fn without_seed(mut self) -> Self {
        self.seed_on_empty = false;
        self
    }

    pub fn storage_key(&self) -> &str {
        &self.key
    }

    pub fn kv_mut(&mut self) -> &mut K {
        &mut self.kv
    }

    /// Version marker of the stored blob; a blob without one predates versioning
    pub fn stored_version(&self) -> Result<Option<u32>, StoreError> {
        let Some(raw) = self.kv.get(&self.version_key)? else {
            return Ok(None);
        };
        match raw.trim().parse::<u32>() {
            Ok(version) => Ok(Some(version)),
            Err(_) => {
                warn!(key = %self.version_key, value = %raw.trim(), "unreadable version marker, treating as 1");
                Ok(Some(1))
            }
        }
    }

    /// Discard the stored blob and start over (re-seeding if enabled)
    pub fn reset(&mut self) -> Result<Vec<Okr>, StoreError> {
        warn!(key = %self.key, "discarding local store");
        self.kv.remove(&self.key)?;
        self.kv.remove(&self.version_key)?;
        self.load()
    }

    /// Replace the stored hierarchy wholesale
    pub fn overwrite(&mut self, okrs: &[Okr]) -> Result<(), StoreError> {
        self.save(okrs)?;
        self.kv
            .set(&self.version_key, &CURRENT_VERSION.to_string())
    }

    fn load(&mut self) -> Result<Vec<Okr>, StoreError> {
        let Some(raw) = self.kv.get(&self.key)? else {
            let okrs = if self.seed_on_empty {
                let seed = seed_okrs()?;
                info!(key = %self.key, count = seed.len(), "seeding empty local store");
                seed
            } else {
                Vec::new()
            };
            self.overwrite(&okrs)?;
            return Ok(okrs);
        };

        let mut okrs: Vec<Okr> =
            serde_json::from_str(&raw).map_err(|source| StoreError::CorruptLocalState {
                key: self.key.clone(),
                source,
            })?;

        let version = self.stored_version()?.unwrap_or(1);
        if version > CURRENT_VERSION {
            warn!(
                stored = version,
                current = CURRENT_VERSION,
                "local store written by a newer version, skipping migrations"
            );
        } else if version < CURRENT_VERSION {
            let report = migrate::migrate(&mut okrs, version)?;
            info!(
                from = report.from,
                to = report.to,
                changed = report.changed,
                "migrated local store"
            );
            self.overwrite(&okrs)?;
        }

        Ok(okrs)
    }

    fn save(&mut self, okrs: &[Okr]) -> Result<(), StoreError> {
        let json = serde_json::to_string(okrs).map_err(StoreError::Serialize)?;
        self.kv.set(&self.key, &json)
    }
}

impl<K: KeyValueStore> OkrStore for LocalStore<K> {
    fn backend(&self) -> Backend {
        Backend::Local
    }

    fn read_all(&mut self) -> Result<Vec<Okr>, StoreError> {
        let mut okrs = self.load()?;
        sort_okrs(&mut okrs);
        Ok(okrs)
    }

    fn create(&mut self, okr: &Okr) -> Result<(), StoreError> {
        let mut okrs = self.load()?;
        if okrs.iter().any(|existing| existing.id == okr.id) {
            return Err(StoreError::DuplicateId(okr.id.clone()));
        }
        okrs.push(okr.clone());
        debug!(id = %okr.id, "local create");
        self.save(&okrs)
    }

    fn replace(&mut self, okr: &Okr) -> Result<(), StoreError> {
        let mut okrs = self.load()?;
        let slot = okrs
            .iter_mut()
            .find(|existing| existing.id == okr.id)
            .ok_or_else(|| StoreError::NotFound(okr.id.clone()))?;
        // createdAt is fixed at creation
        let created_at = slot.created_at;
        *slot = okr.clone();
        slot.created_at = created_at;
        debug!(id = %okr.id, "local replace");
        self.save(&okrs)
    }

    fn remove(&mut self, id: &str) -> Result<(), StoreError> {
        let mut okrs = self.load()?;
        let doomed = collect_descendants(id, &okrs);
        let before = okrs.len();
        okrs.retain(|okr| !doomed.contains(&okr.id));
        debug!(id, removed = before - okrs.len(), "local cascade delete");
        if okrs.len() == before {
            return Ok(());
        }
        // One rewrite removes the whole subtree
        self.save(&okrs)
    }
}

impl<K: KeyValueStore> LocalBackend for LocalStore<K> {
    fn reset(&mut self) -> Result<Vec<Okr>, StoreError> {
        LocalStore::<K>::reset(self)
    }
}
