//! Relational schema for the shared store

use rusqlite::params;

use super::RemoteStore;
use crate::store::StoreError;

/// Current schema version
pub(super) const SCHEMA_VERSION: i32 = 1;

/// Tables whose changes are broadcast to subscribers
pub const WATCHED_TABLES: &[&str] = &["okrs", "key_results", "quality_checklist", "actions"];

/// `(table, column)` pairs that must cascade deletes from `okrs(id)`
const CASCADING_REFERENCES: &[(&str, &str)] = &[
    ("okrs", "parent_id"),
    ("key_results", "okr_id"),
    ("quality_checklist", "okr_id"),
    ("actions", "okr_id"),
];

impl RemoteStore {
    /// Create tables if missing
    pub(super) fn init_schema(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            r#"
            -- Schema version tracking
            CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY
            );

            -- Goal nodes; deleting a node deletes its whole subtree
            CREATE TABLE IF NOT EXISTS okrs (
                id TEXT PRIMARY KEY,
                display_id TEXT UNIQUE,
                objective TEXT NOT NULL,
                created_at TEXT NOT NULL,
                parent_id TEXT REFERENCES okrs(id) ON DELETE CASCADE,
                area TEXT,
                owner TEXT,
                challenges TEXT,
                needs TEXT,
                comments TEXT,
                status TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_okrs_parent ON okrs(parent_id);

            CREATE TABLE IF NOT EXISTS key_results (
                id TEXT PRIMARY KEY,
                okr_id TEXT NOT NULL REFERENCES okrs(id) ON DELETE CASCADE,
                metric_name TEXT NOT NULL,
                from_value REAL NOT NULL,
                to_value REAL NOT NULL,
                unit TEXT,
                current_value REAL,
                status TEXT,
                function TEXT,
                sort_order INTEGER NOT NULL DEFAULT 0
            );
            CREATE INDEX IF NOT EXISTS idx_key_results_okr ON key_results(okr_id);

            CREATE TABLE IF NOT EXISTS quality_checklist (
                id TEXT PRIMARY KEY,
                okr_id TEXT NOT NULL REFERENCES okrs(id) ON DELETE CASCADE,
                item_id TEXT NOT NULL,
                checked INTEGER NOT NULL DEFAULT 0,
                UNIQUE (okr_id, item_id)
            );
            CREATE INDEX IF NOT EXISTS idx_quality_checklist_okr ON quality_checklist(okr_id);

            CREATE TABLE IF NOT EXISTS actions (
                id TEXT PRIMARY KEY,
                okr_id TEXT NOT NULL REFERENCES okrs(id) ON DELETE CASCADE,
                text TEXT NOT NULL,
                owner TEXT NOT NULL,
                due_date TEXT NOT NULL,
                completed INTEGER NOT NULL DEFAULT 0,
                completed_at TEXT,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_actions_okr ON actions(okr_id);
            "#,
        )?;

        self.conn.execute(
            "INSERT OR REPLACE INTO schema_version (version) VALUES (?1)",
            params![SCHEMA_VERSION],
        )?;

        Ok(())
    }

    /// Refuse to run against a schema where deleting an OKR would orphan rows
    pub(super) fn verify_cascades(&self) -> Result<(), StoreError> {
        let enforced: i64 = self
            .conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))?;
        if enforced != 1 {
            return Err(StoreError::CascadeNotConfigured {
                table: "okrs (foreign keys disabled)".to_string(),
            });
        }

        for (table, column) in CASCADING_REFERENCES {
            let mut stmt = self
                .conn
                .prepare(&format!("PRAGMA foreign_key_list({})", table))?;
            // Columns: id, seq, table, from, to, on_update, on_delete, match
            let references = stmt
                .query_map([], |row| {
                    Ok((
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, Option<String>>(4)?,
                        row.get::<_, String>(6)?,
                    ))
                })?
                .collect::<Result<Vec<_>, _>>()?;

            let cascades = references.iter().any(|(target, from, to, on_delete)| {
                target == "okrs"
                    && from == column
                    && to.as_deref().map_or(true, |to| to == "id")
                    && on_delete.eq_ignore_ascii_case("CASCADE")
            });

            if !cascades {
                return Err(StoreError::CascadeNotConfigured {
                    table: table.to_string(),
                });
            }
        }

        Ok(())
    }
}
