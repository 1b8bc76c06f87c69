//! `okr search` command - Find OKRs by text
//!
//! Matches objectives, key result metric names, areas and owners,
//! case-insensitively. An OKR also matches when something below it does.

use console::style;
use miette::Result;

use crate::cli::commands::list::print_okrs;
use crate::cli::helpers::{effective_format, open_session};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::search::{matches_directly, SearchIndex};
use crate::core::HierarchyIndex;
use crate::entities::Okr;

#[derive(clap::Args, Debug)]
pub struct SearchArgs {
    /// Search text
    pub query: String,

    /// Only OKRs whose own text matches
    #[arg(long, short = 'd')]
    pub direct: bool,

    /// Limit number of results
    #[arg(long, short = 'n', default_value = "50")]
    pub limit: usize,

    /// Show only count
    #[arg(long)]
    pub count: bool,
}

pub fn run(args: SearchArgs, global: &GlobalOpts) -> Result<()> {
    let session = open_session(global)?;
    let okrs = session.coordinator.okrs();

    let hits = find(okrs, &args.query, args.direct);
    if args.count {
        println!("{}", hits.len());
        return Ok(());
    }

    if hits.is_empty() {
        if !global.quiet {
            println!("{} No OKRs match '{}'", style("!").yellow(), args.query);
        }
        return Ok(());
    }

    let rows: Vec<(usize, &Okr)> = hits.into_iter().take(args.limit).collect();
    let format = match effective_format(global, &session.config) {
        OutputFormat::Auto => OutputFormat::Tsv,
        f => f,
    };
    print_okrs(&rows, format)
}

/// Hits in hierarchy order, each with its tree depth
fn find<'a>(okrs: &'a [Okr], query: &str, direct: bool) -> Vec<(usize, &'a Okr)> {
    if query.trim().is_empty() {
        return Vec::new();
    }
    let mut search = SearchIndex::new(okrs, query);
    HierarchyIndex::new(okrs)
        .flatten()
        .into_iter()
        .filter(|(_, okr)| {
            if direct {
                matches_directly(okr, query)
            } else {
                search.matches(&okr.id)
            }
        })
        .collect()
}
