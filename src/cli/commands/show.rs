//! `okr show` command - One OKR in full

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{effective_format, open_session, resolve_okr};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::progress::{key_result_progress, okr_progress};
use crate::entities::{checklist_score, format_value, Okr};

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// OKR reference (OKR-3, 3, full id or id prefix)
    pub okr: String,

    /// Human-readable summary instead of the stored document
    #[arg(long)]
    pub summary: bool,
}

pub fn run(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let session = open_session(global)?;
    let okr = resolve_okr(session.coordinator.okrs(), &args.okr)?;

    if args.summary {
        print_summary(okr, session.coordinator.okrs());
        return Ok(());
    }

    match effective_format(global, &session.config) {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(okr).into_diagnostic()?);
        }
        OutputFormat::Id => println!("{}", okr.id),
        _ => print!("{}", serde_yml::to_string(okr).into_diagnostic()?),
    }
    Ok(())
}

fn print_summary(okr: &Okr, all: &[Okr]) {
    println!("{} {}", style(okr.label()).cyan().bold(), style(&okr.objective).bold());
    if let Some(parent) = okr.parent_id.as_deref() {
        let parent_label = all
            .iter()
            .find(|candidate| candidate.id == parent)
            .map(Okr::label)
            .unwrap_or_else(|| parent.to_string());
        println!("  {} {}", style("Parent:").dim(), parent_label);
    }
    if let Some(area) = &okr.area {
        println!("  {} {}", style("Area:").dim(), area);
    }
    if let Some(owner) = &okr.owner {
        println!("  {} {}", style("Owner:").dim(), owner);
    }
    println!(
        "  {} {}",
        style("Status:").dim(),
        okr.status.map(|s| s.label()).unwrap_or("(not set)")
    );
    println!("  {} {}%", style("Progress:").dim(), okr_progress(okr));
    let (checked, total) = checklist_score(&okr.quality_checklist);
    println!("  {} {}/{}", style("Quality:").dim(), checked, total);

    println!();
    println!("{}", style("Key Results").bold());
    if okr.key_results.is_empty() {
        println!("  {}", style("(none)").dim());
    }
    for (i, kr) in okr.key_results.iter().enumerate() {
        let current = kr
            .current
            .map(|value| format_value(value, kr.unit))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {}. {} {} (now {}, {}%)",
            i + 1,
            kr.metric_name,
            style(kr.range_label()).dim(),
            current,
            key_result_progress(kr)
        );
    }

    for (heading, text) in [
        ("Challenges", &okr.challenges),
        ("Needs", &okr.needs),
        ("Comments", &okr.comments),
    ] {
        if let Some(text) = text {
            println!();
            println!("{}", style(heading).bold());
            println!("  {}", text);
        }
    }

    if !okr.actions.is_empty() {
        println!();
        println!("{}", style("Actions").bold());
        for (i, action) in okr.actions.iter().enumerate() {
            let mark = if action.completed {
                style("✓").green()
            } else {
                style("○").dim()
            };
            println!(
                "  {}. {} {} ({}, due {})",
                i + 1,
                mark,
                action.text,
                action.owner,
                action.due_date.format("%Y-%m-%d")
            );
        }
    }
}
