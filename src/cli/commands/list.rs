//! `okr list` command - OKRs as a table or an indented tree

use miette::{IntoDiagnostic, Result};
use std::collections::HashSet;

use crate::cli::helpers::{effective_format, open_session};
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::progress::okr_progress;
use crate::core::search::{expanded_ids, SearchIndex};
use crate::core::{HierarchyIndex, Status};
use crate::entities::{checklist_score, Okr};

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Indent area OKRs under their parents
    #[arg(long, short = 't')]
    pub tree: bool,

    /// Only OKRs matching this text (objective, key result, area or owner)
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Filter by area (case-insensitive)
    #[arg(long, short = 'a')]
    pub area: Option<String>,

    /// Filter by owner (substring, case-insensitive)
    #[arg(long, short = 'o')]
    pub owner: Option<String>,

    /// Filter by status (on-track, progressing, off-track)
    #[arg(long)]
    pub status: Option<Status>,

    /// Only global OKRs
    #[arg(long)]
    pub roots: bool,
}

/// Columns shared by every OKR table
pub const OKR_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("okr", "OKR", 10),
    ColumnDef::new("objective", "OBJECTIVE", 48),
    ColumnDef::new("area", "AREA", 16),
    ColumnDef::new("owner", "OWNER", 18),
    ColumnDef::new("status", "STATUS", 12),
    ColumnDef::new("progress", "PROGRESS", 9),
    ColumnDef::new("krs", "KRS", 4),
    ColumnDef::new("quality", "QUALITY", 8),
];

pub fn run(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let session = open_session(global)?;
    let okrs = session.coordinator.okrs();
    let query = args.search.as_deref().unwrap_or("");

    let rows: Vec<(usize, &Okr)> = if args.tree {
        visible_tree(okrs, query)
    } else {
        let mut search = SearchIndex::new(okrs, query);
        okrs.iter()
            .filter(|okr| query.trim().is_empty() || search.matches(&okr.id))
            .map(|okr| (0, okr))
            .collect()
    };
    let rows: Vec<(usize, &Okr)> = rows
        .into_iter()
        .filter(|(_, okr)| keep(&args, okr))
        .collect();

    let format = match effective_format(global, &session.config) {
        OutputFormat::Auto => OutputFormat::Tsv,
        f => f,
    };
    print_okrs(&rows, format)
}

/// Rows for `--tree`: roots that match (or have a matching descendant), and
/// below them only children of expanded nodes. No query shows everything.
pub fn visible_tree<'a>(okrs: &'a [Okr], query: &str) -> Vec<(usize, &'a Okr)> {
    let flat = HierarchyIndex::new(okrs).flatten();
    if query.trim().is_empty() {
        return flat;
    }

    let expanded = expanded_ids(okrs, query, &HashSet::new());
    let mut search = SearchIndex::new(okrs, query);
    let mut shown: HashSet<&str> = HashSet::new();
    let mut out = Vec::new();
    for (depth, okr) in flat {
        let visible = match okr.parent_id.as_deref() {
            Some(parent) if depth > 0 => shown.contains(parent) && expanded.contains(parent),
            _ => search.matches(&okr.id),
        };
        if visible {
            shown.insert(okr.id.as_str());
            out.push((depth, okr));
        }
    }
    out
}

fn keep(args: &ListArgs, okr: &Okr) -> bool {
    if args.roots && !okr.is_root() {
        return false;
    }
    if let Some(area) = &args.area {
        if !okr.area.as_deref().is_some_and(|a| a.eq_ignore_ascii_case(area)) {
            return false;
        }
    }
    if let Some(owner) = &args.owner {
        let needle = owner.to_lowercase();
        if !okr
            .owner
            .as_deref()
            .is_some_and(|o| o.to_lowercase().contains(&needle))
        {
            return false;
        }
    }
    if let Some(status) = args.status {
        if okr.status != Some(status) {
            return false;
        }
    }
    true
}

/// Render OKRs with their tree depth in any output format
pub fn print_okrs(rows: &[(usize, &Okr)], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let okrs: Vec<&Okr> = rows.iter().map(|(_, okr)| *okr).collect();
            println!("{}", serde_json::to_string_pretty(&okrs).into_diagnostic()?);
            Ok(())
        }
        OutputFormat::Yaml => {
            let okrs: Vec<&Okr> = rows.iter().map(|(_, okr)| *okr).collect();
            print!("{}", serde_yml::to_string(&okrs).into_diagnostic()?);
            Ok(())
        }
        _ => TableFormatter::new(OKR_COLUMNS, "OKR")
            .output(rows.iter().map(|(depth, okr)| okr_row(okr, *depth)), format),
    }
}

pub fn okr_row(okr: &Okr, depth: usize) -> TableRow {
    let (checked, total) = checklist_score(&okr.quality_checklist);
    let objective = if depth == 0 {
        okr.objective.clone()
    } else {
        format!("{}└ {}", "  ".repeat(depth - 1), okr.objective)
    };

    TableRow::new(okr.id.clone())
        .cell("okr", CellValue::text(okr.display_id.as_deref().unwrap_or("-")))
        .cell("objective", CellValue::Text(objective))
        .cell("area", CellValue::optional(okr.area.as_deref()))
        .cell("owner", CellValue::optional(okr.owner.as_deref()))
        .cell("status", CellValue::Status(okr.status))
        .cell("progress", CellValue::Progress(okr_progress(okr)))
        .cell("krs", CellValue::Number(okr.key_results.len() as i64))
        .cell("quality", CellValue::Quality(checked, total))
}
