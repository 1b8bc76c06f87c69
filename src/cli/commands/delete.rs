//! `okr delete` command - Remove an OKR and its whole subtree

use console::style;
use dialoguer::theme::ColorfulTheme;
use dialoguer::Confirm;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{open_session, report_outcome, resolve_okr};
use crate::cli::GlobalOpts;
use crate::core::collect_descendants;

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// OKR reference (OKR-3, 3, full id or id prefix)
    pub okr: String,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

pub fn run(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = open_session(global)?;
    let okrs = session.coordinator.okrs();
    let okr = resolve_okr(okrs, &args.okr)?;
    let id = okr.id.clone();
    let label = okr.label();
    let below = collect_descendants(&id, okrs).len().saturating_sub(1);

    if !args.yes {
        let prompt = if below > 0 {
            format!(
                "Delete {} \"{}\" and the {} OKR(s) below it?",
                label, okr.objective, below
            )
        } else {
            format!("Delete {} \"{}\"?", label, okr.objective)
        };
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .default(false)
            .interact()
            .into_diagnostic()?;
        if !confirmed {
            println!("{}", style("Cancelled").dim());
            return Ok(());
        }
    }

    let outcome = session.coordinator.remove(&id)?;
    report_outcome(outcome, global);

    if !global.quiet {
        println!(
            "{} Deleted {}{}",
            style("✓").green(),
            style(label).cyan(),
            if below > 0 {
                format!(" and {} OKR(s) below it", below)
            } else {
                String::new()
            }
        );
    }
    Ok(())
}
