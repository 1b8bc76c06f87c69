//! `okr actions` command - Actions across every OKR

use chrono::{Local, NaiveDate};
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{effective_format, open_session};
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::progress::{action_bucket, ActionBucket};
use crate::entities::{Action, Okr};

#[derive(clap::Args, Debug)]
pub struct ActionsArgs {
    /// Only actions in this bucket (overdue, open, completed)
    #[arg(long, short = 'b')]
    pub bucket: Option<ActionBucket>,

    /// Filter by owner (substring, case-insensitive)
    #[arg(long, short = 'o')]
    pub owner: Option<String>,
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("okr", "OKR", 14),
    ColumnDef::new("text", "ACTION", 48),
    ColumnDef::new("owner", "OWNER", 18),
    ColumnDef::new("due", "DUE", 12),
    ColumnDef::new("bucket", "STATE", 10),
];

#[derive(serde::Serialize)]
struct ActionEntry<'a> {
    okr_id: &'a str,
    okr: String,
    bucket: ActionBucket,
    #[serde(flatten)]
    action: &'a Action,
}

pub fn run(args: ActionsArgs, global: &GlobalOpts) -> Result<()> {
    let session = open_session(global)?;
    let today = Local::now().date_naive();
    let entries = collect(session.coordinator.okrs(), &args, today);

    match effective_format(global, &session.config) {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&entries).into_diagnostic()?);
            Ok(())
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&entries).into_diagnostic()?);
            Ok(())
        }
        format => {
            let rows = entries.iter().map(|entry| {
                TableRow::new(entry.action.id.clone())
                    .cell("okr", CellValue::text(entry.okr.clone()))
                    .cell("text", CellValue::text(entry.action.text.clone()))
                    .cell("owner", CellValue::text(entry.action.owner.clone()))
                    .cell("due", CellValue::Date(entry.action.due_date))
                    .cell("bucket", CellValue::Bucket(entry.bucket))
            });
            TableFormatter::new(COLUMNS, "action").output(rows, format)
        }
    }
}

/// Overdue first, then open, then completed; each by due date
fn collect<'a>(okrs: &'a [Okr], args: &ActionsArgs, today: NaiveDate) -> Vec<ActionEntry<'a>> {
    let needle = args.owner.as_deref().map(str::to_lowercase);
    let mut entries: Vec<ActionEntry<'a>> = okrs
        .iter()
        .flat_map(|okr| {
            okr.actions.iter().map(move |action| ActionEntry {
                okr_id: okr.id.as_str(),
                okr: okr.label(),
                bucket: action_bucket(action, today),
                action,
            })
        })
        .filter(|entry| args.bucket.map_or(true, |bucket| entry.bucket == bucket))
        .filter(|entry| {
            needle
                .as_deref()
                .map_or(true, |needle| entry.action.owner.to_lowercase().contains(needle))
        })
        .collect();

    entries.sort_by_key(|entry| (bucket_rank(entry.bucket), entry.action.due_date));
    entries
}

fn bucket_rank(bucket: ActionBucket) -> u8 {
    match bucket {
        ActionBucket::Overdue => 0,
        ActionBucket::Open => 1,
        ActionBucket::Completed => 2,
    }
}
