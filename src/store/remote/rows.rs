//! Conversion between OKRs and rows of the four relational tables
//!
//! Rows are first read into raw structs (plain SQL types) and converted to
//! entities afterwards, so conversion failures surface as `StoreError`s
//! naming the offending table.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::{params, Row, Transaction};
use tracing::warn;

use crate::core::entity::Status;
use crate::entities::{Action, KeyResult, KeyResultUnit, Okr, QualityCheck, QualityChecklistItem};
use crate::store::StoreError;

pub(super) struct OkrRow {
    id: String,
    display_id: Option<String>,
    objective: String,
    created_at: String,
    parent_id: Option<String>,
    area: Option<String>,
    owner: Option<String>,
    challenges: Option<String>,
    needs: Option<String>,
    comments: Option<String>,
    status: Option<String>,
}

impl OkrRow {
    pub(super) const SELECT: &'static str = "SELECT id, display_id, objective, created_at, parent_id, area, owner, challenges, needs, comments, status FROM okrs";

    pub(super) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            display_id: row.get("display_id")?,
            objective: row.get("objective")?,
            created_at: row.get("created_at")?,
            parent_id: row.get("parent_id")?,
            area: row.get("area")?,
            owner: row.get("owner")?,
            challenges: row.get("challenges")?,
            needs: row.get("needs")?,
            comments: row.get("comments")?,
            status: row.get("status")?,
        })
    }
}

pub(super) struct KeyResultRow {
    id: String,
    okr_id: String,
    metric_name: String,
    from_value: f64,
    to_value: f64,
    unit: Option<String>,
    current_value: Option<f64>,
    status: Option<String>,
    function: Option<String>,
    sort_order: i64,
}

impl KeyResultRow {
    pub(super) const SELECT: &'static str = "SELECT id, okr_id, metric_name, from_value, to_value, unit, current_value, status, function, sort_order FROM key_results";

    pub(super) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            okr_id: row.get("okr_id")?,
            metric_name: row.get("metric_name")?,
            from_value: row.get("from_value")?,
            to_value: row.get("to_value")?,
            unit: row.get("unit")?,
            current_value: row.get("current_value")?,
            status: row.get("status")?,
            function: row.get("function")?,
            sort_order: row.get("sort_order")?,
        })
    }

    fn into_key_result(self) -> KeyResult {
        KeyResult {
            id: self.id,
            metric_name: self.metric_name,
            from: self.from_value,
            to: self.to_value,
            unit: self
                .unit
                .and_then(|unit| unit.parse::<KeyResultUnit>().ok())
                .unwrap_or_default(),
            current: self.current_value,
            status: parse_status(self.status),
            function: self.function,
        }
    }
}

pub(super) struct ChecklistRow {
    okr_id: String,
    item_id: String,
    checked: bool,
}

impl ChecklistRow {
    pub(super) const SELECT: &'static str =
        "SELECT okr_id, item_id, checked FROM quality_checklist ORDER BY rowid";

    pub(super) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            okr_id: row.get("okr_id")?,
            item_id: row.get("item_id")?,
            checked: row.get("checked")?,
        })
    }
}

pub(super) struct ActionRow {
    id: String,
    okr_id: String,
    text: String,
    owner: String,
    due_date: String,
    completed: bool,
    completed_at: Option<String>,
    created_at: String,
}

impl ActionRow {
    pub(super) const SELECT: &'static str = "SELECT id, okr_id, text, owner, due_date, completed, completed_at, created_at FROM actions ORDER BY rowid";

    pub(super) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            okr_id: row.get("okr_id")?,
            text: row.get("text")?,
            owner: row.get("owner")?,
            due_date: row.get("due_date")?,
            completed: row.get("completed")?,
            completed_at: row.get("completed_at")?,
            created_at: row.get("created_at")?,
        })
    }

    fn into_action(self) -> Result<Action, StoreError> {
        let due_date = NaiveDate::parse_from_str(&self.due_date, "%Y-%m-%d").map_err(|e| {
            invalid("actions", format!("due_date '{}' of {}: {}", self.due_date, self.id, e))
        })?;
        let completed_at = match non_empty(self.completed_at) {
            Some(raw) => Some(parse_timestamp("actions", &raw)?),
            None => None,
        };
        Ok(Action {
            created_at: parse_timestamp("actions", &self.created_at)?,
            id: self.id,
            text: self.text,
            owner: self.owner,
            due_date,
            completed: self.completed,
            completed_at,
        })
    }
}

/// Join the four tables in-process into fully materialized OKRs
pub(super) fn assemble(
    okr_rows: Vec<OkrRow>,
    key_result_rows: Vec<KeyResultRow>,
    checklist_rows: Vec<ChecklistRow>,
    action_rows: Vec<ActionRow>,
) -> Result<Vec<Okr>, StoreError> {
    let mut key_results: HashMap<String, Vec<KeyResultRow>> = HashMap::new();
    for row in key_result_rows {
        key_results.entry(row.okr_id.clone()).or_default().push(row);
    }

    let mut checklists: HashMap<String, Vec<QualityChecklistItem>> = HashMap::new();
    for row in checklist_rows {
        match row.item_id.parse::<QualityCheck>() {
            Ok(id) => checklists.entry(row.okr_id).or_default().push(QualityChecklistItem {
                id,
                checked: row.checked,
            }),
            Err(_) => warn!(okr = %row.okr_id, item = %row.item_id, "skipping unknown checklist item"),
        }
    }

    let mut actions: HashMap<String, Vec<Action>> = HashMap::new();
    for row in action_rows {
        let okr_id = row.okr_id.clone();
        actions.entry(okr_id).or_default().push(row.into_action()?);
    }

    okr_rows
        .into_iter()
        .map(|row| {
            let mut krs = key_results.remove(&row.id).unwrap_or_default();
            krs.sort_by_key(|kr| kr.sort_order);

            Ok(Okr {
                created_at: parse_timestamp("okrs", &row.created_at)?,
                key_results: krs.into_iter().map(KeyResultRow::into_key_result).collect(),
                quality_checklist: checklists.remove(&row.id).unwrap_or_default(),
                actions: actions.remove(&row.id).unwrap_or_default(),
                display_id: row.display_id,
                objective: row.objective,
                parent_id: row.parent_id,
                area: row.area,
                owner: row.owner,
                challenges: row.challenges,
                needs: row.needs,
                comments: row.comments,
                status: parse_status(row.status),
                id: row.id,
            })
        })
        .collect()
}

pub(super) fn insert_okr(tx: &Transaction<'_>, okr: &Okr) -> Result<(), StoreError> {
    tx.execute(
        "INSERT INTO okrs (id, display_id, objective, created_at, parent_id, area, owner, challenges, needs, comments, status)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            okr.id,
            okr.display_id,
            okr.objective,
            timestamp(&okr.created_at),
            okr.parent_id,
            okr.area,
            okr.owner,
            okr.challenges,
            okr.needs,
            okr.comments,
            okr.status.map(|s| s.as_str()),
        ],
    )?;
    Ok(())
}

/// Rewrite the `okrs` row in place; returns the number of rows matched
pub(super) fn update_okr(tx: &Transaction<'_>, okr: &Okr) -> Result<usize, StoreError> {
    let updated = tx.execute(
        "UPDATE okrs SET display_id = ?2, objective = ?3, parent_id = ?4, area = ?5, owner = ?6,
             challenges = ?7, needs = ?8, comments = ?9, status = ?10
         WHERE id = ?1",
        params![
            okr.id,
            okr.display_id,
            okr.objective,
            okr.parent_id,
            okr.area,
            okr.owner,
            okr.challenges,
            okr.needs,
            okr.comments,
            okr.status.map(|s| s.as_str()),
        ],
    )?;
    Ok(updated)
}

/// Insert every key result, checklist item and action owned by `okr`
pub(super) fn insert_nested(tx: &Transaction<'_>, okr: &Okr) -> Result<(), StoreError> {
    {
        let mut stmt = tx.prepare(
            "INSERT INTO key_results (id, okr_id, metric_name, from_value, to_value, unit, current_value, status, function, sort_order)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        )?;
        for (index, kr) in okr.key_results.iter().enumerate() {
            stmt.execute(params![
                kr.id,
                okr.id,
                kr.metric_name,
                kr.from,
                kr.to,
                kr.unit.as_str(),
                kr.current,
                kr.status.map(|s| s.as_str()),
                kr.function,
                index as i64,
            ])?;
        }
    }

    {
        let mut stmt = tx.prepare(
            "INSERT INTO quality_checklist (id, okr_id, item_id, checked) VALUES (?1, ?2, ?3, ?4)",
        )?;
        for item in &okr.quality_checklist {
            stmt.execute(params![
                format!("{}:{}", okr.id, item.id),
                okr.id,
                item.id.as_str(),
                item.checked,
            ])?;
        }
    }

    {
        let mut stmt = tx.prepare(
            "INSERT INTO actions (id, okr_id, text, owner, due_date, completed, completed_at, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )?;
        for action in &okr.actions {
            stmt.execute(params![
                action.id,
                okr.id,
                action.text,
                action.owner,
                action.due_date.format("%Y-%m-%d").to_string(),
                action.completed,
                action.completed_at.as_ref().map(timestamp),
                timestamp(&action.created_at),
            ])?;
        }
    }

    Ok(())
}

/// Drop every nested row owned by `okr_id`, leaving the `okrs` row
pub(super) fn delete_nested(tx: &Transaction<'_>, okr_id: &str) -> Result<(), StoreError> {
    tx.execute("DELETE FROM key_results WHERE okr_id = ?1", params![okr_id])?;
    tx.execute("DELETE FROM quality_checklist WHERE okr_id = ?1", params![okr_id])?;
    tx.execute("DELETE FROM actions WHERE okr_id = ?1", params![okr_id])?;
    Ok(())
}

fn timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn parse_timestamp(table: &str, raw: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| invalid(table, format!("timestamp '{}': {}", raw, e)))
}

fn parse_status(raw: Option<String>) -> Option<Status> {
    raw.and_then(|s| s.parse::<Status>().ok())
}

// Other clients may write empty strings where we would write NULL
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

fn invalid(table: &str, message: String) -> StoreError {
    StoreError::InvalidRow {
        table: table.to_string(),
        message,
    }
}
