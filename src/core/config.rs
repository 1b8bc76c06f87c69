//! Configuration management with layered hierarchy

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::workspace::Workspace;
use crate::store::local::DEFAULT_STORAGE_KEY;

/// Settable keys and what they control
pub const CONFIG_KEYS: &[(&str, &str)] = &[
    ("owner", "Default owner for new OKRs and actions"),
    ("storage_key", "Key the local store saves the hierarchy under"),
    (
        "remote_database",
        "Shared SQLite database; enables the remote store when set",
    ),
    (
        "default_format",
        "Default output format (yaml, json, tsv, etc.)",
    ),
];

/// OKR configuration with layered hierarchy
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default owner for new OKRs and actions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    /// Key the local blob is stored under
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_key: Option<String>,

    /// Path of the shared database; relative paths resolve against the workspace
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_database: Option<String>,

    /// Default output format
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_format: Option<String>,
}

impl Config {
    /// Load configuration for a known (or absent) workspace
    pub fn load_for(workspace: Option<&Workspace>) -> Self {
        let global = Self::global_config_path();
        let local = workspace.map(Workspace::config_path);
        Self::load_from(global.as_deref(), local.as_deref(), |name| {
            std::env::var(name).ok()
        })
    }

    /// Merge defaults, the global file, the workspace file and environment
    pub fn load_from(
        global_path: Option<&Path>,
        workspace_path: Option<&Path>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let mut config = Config::default();

        // 1. Global user config (~/.config/okr/config.yaml)
        if let Some(global) = global_path.and_then(Self::read_file) {
            config.merge(global);
        }

        // 2. Workspace config (.okr/config.yaml)
        if let Some(local) = workspace_path.and_then(Self::read_file) {
            config.merge(local);
        }

        // 3. Environment variables
        let from_env = Config {
            owner: env("OKR_OWNER"),
            storage_key: env("OKR_STORAGE_KEY"),
            remote_database: env("OKR_REMOTE_DATABASE"),
            default_format: env("OKR_FORMAT"),
        };
        config.merge(from_env);

        config
    }

    fn read_file(path: &Path) -> Option<Config> {
        let contents = std::fs::read_to_string(path).ok()?;
        match serde_yml::from_str::<Option<Config>>(&contents) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config file");
                None
            }
        }
    }

    /// Get the path to the global config file
    pub fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "okr")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.owner.is_some() {
            self.owner = other.owner;
        }
        if other.storage_key.is_some() {
            self.storage_key = other.storage_key;
        }
        if other.remote_database.is_some() {
            self.remote_database = other.remote_database;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
    }

    /// Look up a key by its name in [`CONFIG_KEYS`]
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "owner" => self.owner.clone(),
            "storage_key" => self.storage_key.clone(),
            "remote_database" => self.remote_database.clone(),
            "default_format" => self.default_format.clone(),
            _ => None,
        }
    }

    pub fn is_valid_key(key: &str) -> bool {
        CONFIG_KEYS.iter().any(|(k, _)| *k == key)
    }

    /// Owner name, falling back to git config or username
    pub fn owner(&self) -> String {
        if let Some(owner) = self.owner.as_deref().filter(|o| !o.is_empty()) {
            return owner.to_string();
        }

        if let Ok(output) = std::process::Command::new("git")
            .args(["config", "user.name"])
            .output()
        {
            if output.status.success() {
                let name = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !name.is_empty() {
                    return name;
                }
            }
        }

        std::env::var("USER")
            .or_else(|_| std::env::var("USERNAME"))
            .unwrap_or_else(|_| "unknown".to_string())
    }

    pub fn storage_key(&self) -> &str {
        self.storage_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .unwrap_or(DEFAULT_STORAGE_KEY)
    }

    /// Whether the remote store should be authoritative
    pub fn is_remote_configured(&self) -> bool {
        self.remote_database
            .as_deref()
            .is_some_and(|db| !db.trim().is_empty())
    }

    /// Remote database path, resolved against the workspace root
    pub fn remote_database_path(&self, workspace: &Workspace) -> Option<PathBuf> {
        if !self.is_remote_configured() {
            return None;
        }
        self.remote_database
            .as_deref()
            .map(|db| workspace.resolve(db.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_defaults_when_nothing_is_configured() {
        let config = Config::load_from(None, None, no_env);
        assert_eq!(config, Config::default());
        assert_eq!(config.storage_key(), DEFAULT_STORAGE_KEY);
        assert!(!config.is_remote_configured());
    }

    #[test]
    fn test_workspace_overrides_global_and_env_overrides_both() {
        let tmp = tempdir().unwrap();
        let global = tmp.path().join("global.yaml");
        let local = tmp.path().join("local.yaml");
        std::fs::write(&global, "owner: Global\nstorage_key: shared\n").unwrap();
        std::fs::write(&local, "owner: Local\n").unwrap();

        let config = Config::load_from(Some(&global), Some(&local), no_env);
        assert_eq!(config.owner.as_deref(), Some("Local"));
        assert_eq!(config.storage_key(), "shared");

        let env: HashMap<&str, &str> = [("OKR_OWNER", "Env"), ("OKR_REMOTE_DATABASE", "okrs.db")]
            .into_iter()
            .collect();
        let config = Config::load_from(Some(&global), Some(&local), |name| {
            env.get(name).map(|v| v.to_string())
        });
        assert_eq!(config.owner.as_deref(), Some("Env"));
        assert!(config.is_remote_configured());
    }

    #[test]
    fn test_empty_and_commented_files_are_ignored() {
        let tmp = tempdir().unwrap();
        let local = tmp.path().join("config.yaml");
        std::fs::write(&local, "# owner: nobody\n").unwrap();

        let config = Config::load_from(None, Some(&local), no_env);
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_blank_remote_database_is_not_configured() {
        let config = Config {
            remote_database: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(!config.is_remote_configured());
    }

    #[test]
    fn test_remote_path_resolves_against_workspace() {
        let tmp = tempdir().unwrap();
        let workspace = Workspace::init(tmp.path()).unwrap();
        let config = Config {
            remote_database: Some("shared/okrs.db".to_string()),
            ..Default::default()
        };
        assert_eq!(
            config.remote_database_path(&workspace),
            Some(workspace.root().join("shared/okrs.db"))
        );
    }

    #[test]
    fn test_get_by_key() {
        let config = Config {
            owner: Some("Dana".to_string()),
            ..Default::default()
        };
        assert_eq!(config.get("owner").as_deref(), Some("Dana"));
        assert_eq!(config.get("nope"), None);
        assert!(Config::is_valid_key("remote_database"));
        assert!(!Config::is_valid_key("editor"));
    }
}
