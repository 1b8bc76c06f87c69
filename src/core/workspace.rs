//! Workspace discovery and structure

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the per-workspace directory
pub const WORKSPACE_DIR: &str = ".okr";

/// A directory tree holding a `.okr/` folder with config and local store
#[derive(Debug, Clone)]
pub struct Workspace {
    /// Parent of `.okr/`
    root: PathBuf,
}

impl Workspace {
    /// Find the workspace by walking up from the current directory
    pub fn discover() -> Result<Self, WorkspaceError> {
        let current =
            std::env::current_dir().map_err(|e| WorkspaceError::IoError(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find the workspace by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, WorkspaceError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| WorkspaceError::IoError(e.to_string()))?;

        loop {
            if current.join(WORKSPACE_DIR).is_dir() {
                return Ok(Self { root: current });
            }

            if !current.pop() {
                return Err(WorkspaceError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Create a new workspace at the given path
    pub fn init(path: &Path) -> Result<Self, WorkspaceError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        if root.join(WORKSPACE_DIR).exists() {
            return Err(WorkspaceError::AlreadyExists(root));
        }
        Self::create(root)
    }

    /// Initialize even if `.okr/` exists; the config file is rewritten,
    /// the local store is left alone
    pub fn init_force(path: &Path) -> Result<Self, WorkspaceError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        Self::create(root)
    }

    fn create(root: PathBuf) -> Result<Self, WorkspaceError> {
        let workspace = Self { root };
        std::fs::create_dir_all(workspace.store_dir())
            .map_err(|e| WorkspaceError::IoError(e.to_string()))?;
        std::fs::write(workspace.config_path(), Self::default_config())
            .map_err(|e| WorkspaceError::IoError(e.to_string()))?;
        Ok(workspace)
    }

    fn default_config() -> &'static str {
        r#"# OKR workspace configuration

# Default owner for new OKRs and actions
# owner: ""

# Key the local store saves the hierarchy under
# storage_key: okrs

# Shared database; when set, the remote store is authoritative
# remote_database: ""

# Default output format (auto, yaml, tsv, json, csv, md, id)
# default_format: auto
"#
    }

    /// Workspace root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The `.okr/` directory
    pub fn okr_dir(&self) -> PathBuf {
        self.root.join(WORKSPACE_DIR)
    }

    pub fn config_path(&self) -> PathBuf {
        self.okr_dir().join("config.yaml")
    }

    /// Directory backing the local key-value store
    pub fn store_dir(&self) -> PathBuf {
        self.okr_dir().join("store")
    }

    /// Resolve a possibly relative path against the workspace root
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("not an OKR workspace (searched from {searched_from:?}). Run 'okr init' to create one.")]
    NotFound { searched_from: PathBuf },

    #[error("OKR workspace already exists at {0:?}")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    IoError(String),
}
