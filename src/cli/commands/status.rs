//! `okr status` command - Executive dashboard

use chrono::{Local, NaiveDate};
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{effective_format, open_session, truncate_str};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::progress::{average_progress, okr_progress, rag_bucket, ActionSummary, RagSummary};
use crate::core::Status;
use crate::entities::Okr;
use crate::sync::Mode;

#[derive(clap::Args, Debug)]
pub struct StatusArgs {
    /// Also list every global OKR with its progress
    #[arg(long)]
    pub detailed: bool,
}

/// Everything the dashboard shows, computed from one snapshot
#[derive(Debug, serde::Serialize)]
struct Dashboard {
    mode: String,
    total: usize,
    global: usize,
    area: usize,
    rag: RagSummary,
    average_progress: u8,
    actions: ActionSummary,
}

impl Dashboard {
    fn collect(okrs: &[Okr], mode: Mode, today: NaiveDate) -> Self {
        let roots: Vec<&Okr> = okrs.iter().filter(|okr| okr.is_root()).collect();
        Self {
            mode: mode.to_string(),
            total: okrs.len(),
            global: roots.len(),
            area: okrs.len() - roots.len(),
            rag: RagSummary::from_roots(okrs),
            average_progress: average_progress(roots.iter().copied()),
            actions: ActionSummary::collect(okrs, today),
        }
    }
}

pub fn run(args: StatusArgs, global: &GlobalOpts) -> Result<()> {
    let session = open_session(global)?;
    let okrs = session.coordinator.okrs();
    let dashboard = Dashboard::collect(okrs, session.coordinator.mode(), Local::now().date_naive());

    if effective_format(global, &session.config) == OutputFormat::Json {
        let status = serde_json::json!({
            "dashboard": dashboard,
            "global_okrs": okrs
                .iter()
                .filter(|okr| okr.is_root())
                .map(|okr| serde_json::json!({
                    "id": okr.id,
                    "display_id": okr.display_id,
                    "objective": okr.objective,
                    "status": rag_bucket(okr),
                    "progress": okr_progress(okr),
                }))
                .collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&status).into_diagnostic()?);
        return Ok(());
    }

    let width = 60;
    println!("{}", style("OKR Status").bold().underlined());
    println!("{}", "═".repeat(width));
    println!(
        "  {} {}   {} {} global, {} area",
        style("Mode:").dim(),
        style(&dashboard.mode).cyan(),
        style("OKRs:").dim(),
        dashboard.global,
        dashboard.area
    );
    println!();

    println!("{}", style("Global OKRs").bold());
    for status in Status::all() {
        let count = dashboard.rag.count(*status);
        let label = format!("{:<12}", status.label());
        let styled = match status {
            Status::OnTrack => style(label).green(),
            Status::Progressing => style(label).yellow(),
            Status::OffTrack => style(label).red(),
        };
        println!("  {} {:>3}  {}", styled, count, bar(count, dashboard.rag.total(), 30));
    }
    println!(
        "  {:<12} {:>3}%",
        "Avg progress", dashboard.average_progress
    );
    println!();

    println!("{}", style("Actions").bold());
    println!(
        "  {:<12} {:>3}",
        style("Overdue").red(),
        dashboard.actions.overdue
    );
    println!("  {:<12} {:>3}", "Open", dashboard.actions.open);
    println!(
        "  {:<12} {:>3}",
        style("Completed").dim(),
        dashboard.actions.completed
    );

    if args.detailed {
        println!();
        println!("{}", style("Global OKRs").bold());
        for okr in okrs.iter().filter(|okr| okr.is_root()) {
            println!(
                "  {:<8} {:>4}%  {}",
                style(okr.label()).cyan(),
                okr_progress(okr),
                truncate_str(&okr.objective, width - 18)
            );
        }
    }
    println!("{}", "═".repeat(width));
    Ok(())
}

fn bar(count: usize, total: usize, width: usize) -> String {
    if total == 0 {
        return String::new();
    }
    let filled = (count * width + total / 2) / total;
    "█".repeat(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Action, KeyResult};

    #[test]
    fn test_dashboard_counts() {
        let mut a = Okr::new("A");
        a.status = Some(Status::OnTrack);
        let mut kr = KeyResult::new("Metric", 0.0, 10.0);
        kr.current = Some(5.0);
        a.key_results.push(kr);
        let b = Okr::new("B");
        let mut child = Okr::child_of(a.id.clone(), "A1");
        child.status = Some(Status::Progressing);
        child.actions.push(Action::new(
            "Late",
            "Dana",
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        ));

        let today = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        let dashboard = Dashboard::collect(&[a, b, child], Mode::LocalOnly, today);

        assert_eq!(dashboard.global, 2);
        assert_eq!(dashboard.area, 1);
        assert_eq!(dashboard.rag.on_track, 1);
        assert_eq!(dashboard.rag.off_track, 1);
        assert_eq!(dashboard.rag.progressing, 0);
        assert_eq!(dashboard.average_progress, 25);
        assert_eq!(dashboard.actions.overdue, 1);
    }

    #[test]
    fn test_bar() {
        assert_eq!(bar(0, 0, 10), "");
        assert_eq!(bar(1, 2, 10).chars().count(), 5);
    }
}
