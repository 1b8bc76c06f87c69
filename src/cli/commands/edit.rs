//! `okr edit` command - Change an OKR's definition
//!
//! Progress and narrative fields are recorded with `okr checkin`; this
//! command covers what the OKR *is*: objective, ownership, placement, key
//! results and the quality checklist.

use console::style;
use miette::Result;

use crate::cli::helpers::{open_session, parse_key_result, report_outcome, resolve_key_result, resolve_okr};
use crate::cli::GlobalOpts;
use crate::entities::{Okr, QualityCheck, QualityChecklistItem};

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// OKR reference (OKR-3, 3, full id or id prefix)
    pub okr: String,

    /// New objective
    #[arg(long, short = 'O')]
    pub objective: Option<String>,

    /// New area (empty string clears it)
    #[arg(long, short = 'a')]
    pub area: Option<String>,

    /// New owner (empty string clears it)
    #[arg(long, short = 'o')]
    pub owner: Option<String>,

    /// Move an area OKR under another parent
    #[arg(long, short = 'p')]
    pub parent: Option<String>,

    /// Add a key result as METRIC:FROM:TO[:UNIT]; repeatable
    #[arg(long = "add-kr", value_name = "METRIC:FROM:TO[:UNIT]")]
    pub add_kr: Vec<String>,

    /// Remove a key result by position, id or metric name; repeatable
    #[arg(long = "remove-kr", value_name = "KR")]
    pub remove_kr: Vec<String>,

    /// Tick a quality checklist item; repeatable
    #[arg(long)]
    pub check: Vec<QualityCheck>,

    /// Untick a quality checklist item; repeatable
    #[arg(long)]
    pub uncheck: Vec<QualityCheck>,
}

pub fn run(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = open_session(global)?;
    let okrs = session.coordinator.okrs();
    let current = resolve_okr(okrs, &args.okr)?;

    let parent_id = match args.parent.as_deref() {
        Some(_) if current.is_root() => {
            return Err(miette::miette!(
                help = "global OKRs keep their display id and cannot be moved",
                "{} is a global OKR",
                current.label()
            ));
        }
        Some(reference) => Some(resolve_okr(okrs, reference)?.id.clone()),
        None => None,
    };
    let remove_ids = args
        .remove_kr
        .iter()
        .map(|reference| resolve_key_result(current, reference).map(|kr| kr.id.clone()))
        .collect::<Result<Vec<_>>>()?;

    let mut updated = current.clone();
    if let Some(parent_id) = parent_id {
        updated.parent_id = Some(parent_id);
    }
    if let Some(objective) = args.objective.as_deref().map(str::trim) {
        if objective.is_empty() {
            return Err(miette::miette!("Objective cannot be empty"));
        }
        updated.objective = objective.to_string();
    }
    if let Some(area) = args.area {
        updated.area = non_empty(area);
    }
    if let Some(owner) = args.owner {
        updated.owner = non_empty(owner);
    }

    updated.key_results.retain(|kr| !remove_ids.contains(&kr.id));
    for raw in &args.add_kr {
        updated.key_results.push(parse_key_result(raw)?);
    }

    for check in &args.check {
        set_checked(&mut updated, *check, true);
    }
    for check in &args.uncheck {
        set_checked(&mut updated, *check, false);
    }

    if updated == *current {
        if !global.quiet {
            println!("{} Nothing to change", style("!").yellow());
        }
        return Ok(());
    }

    let label = updated.label();
    let outcome = session.coordinator.replace(&updated)?;
    report_outcome(outcome, global);
    if !global.quiet {
        println!("{} Updated {}", style("✓").green(), style(label).cyan());
    }
    Ok(())
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn set_checked(okr: &mut Okr, id: QualityCheck, checked: bool) {
    match okr.quality_checklist.iter_mut().find(|item| item.id == id) {
        Some(item) => item.checked = checked,
        None => okr
            .quality_checklist
            .push(QualityChecklistItem { id, checked }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_checked_adds_missing_items() {
        let mut okr = Okr::new("Grow");
        set_checked(&mut okr, QualityCheck::Ownership, true);
        set_checked(&mut okr, QualityCheck::Ownership, false);
        assert_eq!(okr.quality_checklist.len(), 1);
        assert!(!okr.quality_checklist[0].checked);
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty("  ".to_string()), None);
        assert_eq!(non_empty(" Sales ".to_string()), Some("Sales".to_string()));
    }
}
