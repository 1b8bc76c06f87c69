//! `okr watch` command - Follow changes other clients make to the shared database
//!
//! Polls the change feed at a fixed interval; every notification triggers a
//! full reload and a one-line summary of the new snapshot.

use chrono::Local;
use console::style;
use miette::Result;
use std::thread;
use std::time::Duration;

use crate::cli::helpers::{open_session, report_outcome};
use crate::cli::GlobalOpts;
use crate::core::progress::{average_progress, RagSummary};
use crate::entities::Okr;
use crate::sync::Mode;

#[derive(clap::Args, Debug)]
pub struct WatchArgs {
    /// Poll interval in milliseconds
    #[arg(long, short = 'i', default_value = "1000")]
    pub interval: u64,

    /// Exit after this many reloads
    #[arg(long, short = 'n')]
    pub count: Option<usize>,
}

pub fn run(args: WatchArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = open_session(global)?;
    if session.coordinator.mode() != Mode::RemoteActive {
        return Err(miette::miette!(
            help = "set remote_database with `okr config set remote_database <path>`",
            "watch needs a shared database; this workspace is local-only"
        ));
    }

    if !global.quiet {
        println!(
            "{} Watching for changes (every {} ms, Ctrl-C to stop)",
            style("●").cyan(),
            args.interval
        );
        println!("{}", summary_line(session.coordinator.okrs()));
    }

    let interval = Duration::from_millis(args.interval.max(10));
    let mut reloads = 0;
    while args.count.is_none_or(|limit| reloads < limit) {
        thread::sleep(interval);
        let Some(outcome) = session.coordinator.pump()? else {
            continue;
        };
        let synced = outcome.is_synced();
        report_outcome(outcome, global);
        if synced {
            reloads += 1;
            if !global.quiet {
                println!("{}", summary_line(session.coordinator.okrs()));
            }
        }
    }
    Ok(())
}

fn summary_line(okrs: &[Okr]) -> String {
    let rag = RagSummary::from_roots(okrs);
    format!(
        "{} {} OKR(s) | {} on track, {} progressing, {} off track | avg {}%",
        style(Local::now().format("%H:%M:%S")).dim(),
        okrs.len(),
        style(rag.on_track).green(),
        style(rag.progressing).yellow(),
        style(rag.off_track).red(),
        average_progress(okrs.iter().filter(|okr| okr.is_root()))
    )
}
