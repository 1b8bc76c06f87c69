//! `okr new` command - Create a global or area OKR

use console::style;
use miette::Result;

use crate::cli::helpers::{open_session, parse_key_result, report_outcome, resolve_okr};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::Status;
use crate::entities::{checklist_with, Okr};

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// What the OKR sets out to achieve
    #[arg(long, short = 'O')]
    pub objective: String,

    /// Parent OKR; makes this an area OKR
    #[arg(long, short = 'p')]
    pub parent: Option<String>,

    /// Organizational area (area OKRs)
    #[arg(long, short = 'a')]
    pub area: Option<String>,

    /// Accountable person (default: configured owner)
    #[arg(long, short = 'o')]
    pub owner: Option<String>,

    /// Key result as METRIC:FROM:TO[:UNIT]; repeatable
    #[arg(long = "kr", short = 'k', value_name = "METRIC:FROM:TO[:UNIT]")]
    pub key_results: Vec<String>,

    /// Initial status
    #[arg(long)]
    pub status: Option<Status>,
}

pub fn run(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = open_session(global)?;

    let objective = args.objective.trim();
    if objective.is_empty() {
        return Err(miette::miette!("Objective cannot be empty"));
    }

    let mut okr = match args.parent.as_deref() {
        Some(reference) => {
            let parent = resolve_okr(session.coordinator.okrs(), reference)?;
            Okr::child_of(parent.id.clone(), objective)
        }
        None => Okr::new(objective),
    };
    okr.area = args.area.filter(|a| !a.trim().is_empty());
    okr.owner = Some(args.owner.unwrap_or_else(|| session.config.owner()));
    okr.status = args.status;
    okr.key_results = args
        .key_results
        .iter()
        .map(|raw| parse_key_result(raw))
        .collect::<Result<Vec<_>>>()?;
    okr.quality_checklist = checklist_with(&[]);

    let (created, outcome) = session.coordinator.create(okr)?;
    report_outcome(outcome, global);

    match global.format {
        OutputFormat::Id => println!("{}", created.id),
        _ if global.quiet => {}
        _ => println!(
            "{} Created {} {}",
            style("✓").green(),
            style(created.label()).cyan(),
            style(&created.objective).yellow()
        ),
    }
    Ok(())
}
